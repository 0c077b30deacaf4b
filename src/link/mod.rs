//! Serial link: line framing, byte transports and the cooperative driver
//! that feeds the object runtime.

pub mod channels;
pub mod codec;
pub mod io_task;
pub mod transport;

pub use codec::LineFramer;
pub use io_task::LinkDriver;
pub use transport::{NullTransport, Transport, TransportSink};
