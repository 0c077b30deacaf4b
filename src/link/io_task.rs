//! Link driver: connects a byte transport to the object runtime.
//!
//! [`LinkDriver`] is the synchronous core: `poll_rx` drains the transport
//! through the line framer into the dispatcher, `poll_tick` runs the tick
//! emitter. [`run`] drives it cooperatively on an `edge-executor`
//! `LocalExecutor` with `async-io-mini` timers (no busy-spinning). Two
//! tasks share the driver through `Rc<RefCell<_>>`:
//!
//! 1. **RX**: polls the transport every `rx_poll_interval_ms`; a transport
//!    error (e.g. the peer hung up) ends the task and with it [`run`]
//! 2. **Tick**: runs the publish hook every `publish_interval_ms` and
//!    offers the tick emitter a pass every [`TICK_POLL_MS`]
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────┐
//!  │  futures_lite::future::block_on                      │
//!  │  ┌────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                  │  │
//!  │  │   ┌──────────────┐        ┌────────────────┐   │  │
//!  │  │   │ RX  1ms ⏱    │        │ Tick 10ms ⏱    │   │  │
//!  │  │   └──────┬───────┘        └───────┬────────┘   │  │
//!  │  │          └──── Rc<RefCell<LinkDriver>> ─┘      │  │
//!  │  └────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────┘
//! ```
//!
//! Only one task holds the `RefCell` borrow at a time and neither awaits
//! while holding it, so message handling stays run-to-completion.

use core::cell::RefCell;
use core::time::Duration;
use std::rc::Rc;

use log::{info, warn};

use super::codec::LineFramer;
use super::transport::{Transport, TransportSink};
use crate::config::RuntimeConfig;
use crate::error::{self, LinkError};
use crate::ports::{Clock, MessageSink};
use crate::runtime::ObjectRuntime;

const READ_BUF_SIZE: usize = 256;

/// Granularity of the tick task; the emitter's own gate sets the pace.
pub const TICK_POLL_MS: u64 = 10;

// ── Synchronous driver ───────────────────────────────────────

pub struct LinkDriver<T: Transport> {
    runtime: ObjectRuntime,
    sink: TransportSink<T>,
    framer: LineFramer,
}

impl<T: Transport> LinkDriver<T> {
    pub fn new(runtime: ObjectRuntime, transport: T, config: &RuntimeConfig) -> Self {
        Self {
            runtime,
            sink: TransportSink::new(transport),
            framer: LineFramer::new(config.line_max_len, config.line_idle_timeout_ms),
        }
    }

    /// Drain everything the transport has, dispatching complete lines.
    /// Returns the number of lines handed to the dispatcher.
    pub fn poll_rx(&mut self, now_ms: u64) -> Result<usize, T::Error> {
        let mut buf = [0u8; READ_BUF_SIZE];
        let mut lines = 0;
        loop {
            let n = self.sink.transport_mut().read(&mut buf)?;
            if n == 0 {
                break;
            }
            for &byte in &buf[..n] {
                if let Some(line) = self.framer.feed(byte, now_ms) {
                    self.runtime.handle_line(line, &mut self.sink);
                    lines += 1;
                }
            }
        }
        self.framer.poll_idle(now_ms);
        Ok(lines)
    }

    /// Offer the tick emitter a pass.
    pub fn poll_tick(&mut self, now_ms: u64) -> usize {
        self.runtime.tick(now_ms, &mut self.sink)
    }

    /// Run application code that needs the runtime and the outbound sink,
    /// e.g. a `push_record` after changing a typed record.
    pub fn with_runtime<R>(&mut self, f: impl FnOnce(&mut ObjectRuntime, &mut dyn MessageSink) -> R) -> R {
        f(&mut self.runtime, &mut self.sink)
    }

    pub fn runtime(&self) -> &ObjectRuntime {
        &self.runtime
    }

    pub fn sink(&self) -> &TransportSink<T> {
        &self.sink
    }

    pub fn into_parts(self) -> (ObjectRuntime, T) {
        (self.runtime, self.sink.into_inner())
    }
}

// ── Async loop ───────────────────────────────────────────────

type SharedDriver<T> = Rc<RefCell<LinkDriver<T>>>;

async fn rx_loop<T: Transport, C: Clock>(
    driver: SharedDriver<T>,
    clock: Rc<C>,
    interval_ms: u32,
) -> LinkError {
    loop {
        {
            let now = clock.now_ms();
            if let Err(e) = driver.borrow_mut().poll_rx(now) {
                warn!("link: transport read failed: {:?}", e);
                return LinkError::Disconnected;
            }
        }
        async_io_mini::Timer::after(Duration::from_millis(u64::from(interval_ms))).await;
    }
}

async fn tick_loop<T, C, P>(driver: SharedDriver<T>, clock: Rc<C>, publish_interval_ms: u32, mut publish: P)
where
    T: Transport,
    C: Clock,
    P: FnMut(&mut ObjectRuntime, &mut dyn MessageSink, u64),
{
    let mut last_publish = clock.now_ms();
    loop {
        {
            let now = clock.now_ms();
            let mut d = driver.borrow_mut();
            if now.wrapping_sub(last_publish) >= u64::from(publish_interval_ms) {
                last_publish = now;
                d.with_runtime(|rt, sink| publish(rt, sink, now));
            }
            d.poll_tick(now);
        }
        async_io_mini::Timer::after(Duration::from_millis(TICK_POLL_MS)).await;
    }
}

/// Drive `driver` until the transport reports an error, which is returned
/// as [`Error::Link`](crate::error::Error::Link).
///
/// `publish` is the application hook, called every `publish_interval_ms`
/// with the runtime, the outbound sink and the current time.
pub fn run<T, C, P>(
    driver: LinkDriver<T>,
    clock: C,
    config: &RuntimeConfig,
    publish: P,
) -> error::Result<()>
where
    T: Transport,
    C: Clock,
    P: FnMut(&mut ObjectRuntime, &mut dyn MessageSink, u64),
{
    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();

    let driver: SharedDriver<T> = Rc::new(RefCell::new(driver));
    let clock = Rc::new(clock);

    let rx = executor.spawn(rx_loop(driver.clone(), clock.clone(), config.rx_poll_interval_ms));
    executor
        .spawn(tick_loop(
            driver.clone(),
            clock,
            config.publish_interval_ms,
            publish,
        ))
        .detach();

    info!(
        "link: started (rx every {} ms, publish every {} ms)",
        config.rx_poll_interval_ms, config.publish_interval_ms
    );

    let reason = futures_lite::future::block_on(executor.run(rx));
    info!(
        "link: stopped: {} ({} outbound message(s) dropped)",
        reason,
        driver.borrow().sink().dropped()
    );
    Err(reason.into())
}
