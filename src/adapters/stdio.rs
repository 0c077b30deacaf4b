//! Serial-console transport.
//!
//! On the device the console UART (or USB-CDC) is mapped to the process's
//! stdin/stdout by ESP-IDF's VFS layer; on a host it is the terminal or a
//! pipe. Reading stdin blocks, so a dedicated reader thread pushes received
//! bytes into an [`RxChannel`] and [`Transport::read`] drains it without
//! blocking. Writes go straight to the output stream.

use std::io::{Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use crate::error::LinkError;
use crate::link::channels::{self, RxChannel, RxChunk};
use crate::link::transport::Transport;

const READER_BUF_SIZE: usize = 256;

pub struct StdioTransport {
    rx: Arc<RxChannel>,
    closed: Arc<AtomicBool>,
    leftover: RxChunk,
    leftover_pos: usize,
    out: Box<dyn Write>,
}

impl StdioTransport {
    /// Attach to the process's stdin/stdout.
    pub fn spawn() -> std::io::Result<Self> {
        Self::with_io(std::io::stdin(), std::io::stdout())
    }

    /// Attach to an arbitrary blocking reader and writer.
    pub fn with_io(
        input: impl Read + Send + 'static,
        output: impl Write + 'static,
    ) -> std::io::Result<Self> {
        let rx = Arc::new(RxChannel::new());
        let closed = Arc::new(AtomicBool::new(false));

        let thread_rx = Arc::clone(&rx);
        let thread_closed = Arc::clone(&closed);
        std::thread::Builder::new()
            .name("link-rx".into())
            .spawn(move || reader_loop(input, &thread_rx, &thread_closed))?;

        Ok(Self {
            rx,
            closed,
            leftover: RxChunk::new(),
            leftover_pos: 0,
            out: Box::new(output),
        })
    }

    fn take_leftover(&mut self, buf: &mut [u8]) -> usize {
        let rest = &self.leftover[self.leftover_pos..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.leftover_pos += n;
        if self.leftover_pos >= self.leftover.len() {
            self.leftover.clear();
            self.leftover_pos = 0;
        }
        n
    }
}

fn reader_loop(mut input: impl Read, rx: &RxChannel, closed: &AtomicBool) {
    let mut buf = [0u8; READER_BUF_SIZE];
    loop {
        match input.read(&mut buf) {
            Ok(0) => {
                info!("link-rx: input closed");
                break;
            }
            Ok(n) => {
                for chunk in channels::chunks(&buf[..n]) {
                    futures_lite::future::block_on(rx.send(chunk));
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => {
                warn!("link-rx: read failed: {}", e);
                break;
            }
        }
    }
    closed.store(true, Ordering::Release);
}

impl Transport for StdioTransport {
    type Error = LinkError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        let mut n = self.take_leftover(buf);
        while n < buf.len() {
            let Ok(chunk) = self.rx.try_receive() else {
                break;
            };
            self.leftover = chunk;
            n += self.take_leftover(&mut buf[n..]);
        }
        if n == 0 && self.closed.load(Ordering::Acquire) && self.rx.is_empty() {
            return Err(LinkError::Disconnected);
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, LinkError> {
        self.out.write(data).map_err(|_| LinkError::WriteFailed)
    }

    fn flush(&mut self) -> Result<(), LinkError> {
        self.out.flush().map_err(|_| LinkError::WriteFailed)
    }

    fn available(&self) -> bool {
        self.leftover_pos < self.leftover.len() || !self.rx.is_empty()
    }
}
