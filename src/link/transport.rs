//! Transport abstraction: any byte-oriented channel.
//!
//! Concrete implementations:
//! - UART / USB-CDC serial console ([`crate::adapters::stdio::StdioTransport`])
//! - [`NullTransport`] for a runtime with no client attached
//!
//! The runtime itself only sees a [`MessageSink`]; [`TransportSink`]
//! adapts a transport by writing each message as one JSON line.

use log::warn;

use crate::error::LinkError;
use crate::ports::MessageSink;
use crate::protocol::Outbound;

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read.
    /// Returns 0 if no data is available (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Check if data is available for reading.
    fn available(&self) -> bool;
}

/// A null transport that discards all writes and never reads.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn available(&self) -> bool {
        false
    }
}

/// [`MessageSink`] that writes every message to a transport as one
/// `\n`-terminated JSON line.
///
/// Failed writes are logged and counted; the runtime never sees them.
pub struct TransportSink<T: Transport> {
    transport: T,
    dropped: u32,
}

impl<T: Transport> TransportSink<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            dropped: 0,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Messages lost to encode or write failures since creation.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Encode and write one message.
    pub fn try_send(&mut self, message: &Outbound) -> Result<(), LinkError> {
        let mut line = message.to_line().map_err(|_| LinkError::Encode)?;
        line.push('\n');
        self.write_all(line.as_bytes())?;
        self.transport.flush().map_err(|e| {
            warn!("link: flush failed: {:?}", e);
            LinkError::WriteFailed
        })
    }

    fn write_all(&mut self, mut data: &[u8]) -> Result<(), LinkError> {
        while !data.is_empty() {
            match self.transport.write(data) {
                Ok(0) => return Err(LinkError::WriteFailed),
                Ok(n) => data = &data[n.min(data.len())..],
                Err(e) => {
                    warn!("link: write failed: {:?}", e);
                    return Err(LinkError::WriteFailed);
                }
            }
        }
        Ok(())
    }
}

impl<T: Transport> MessageSink for TransportSink<T> {
    fn send(&mut self, message: &Outbound) {
        if let Err(e) = self.try_send(message) {
            self.dropped = self.dropped.wrapping_add(1);
            warn!("link: {} dropped: {}", message.kind(), e);
        }
    }
}
