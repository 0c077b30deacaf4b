//! Mock link adapters for integration tests.
//!
//! `RecordingSink` keeps every outbound message, both typed and as the JSON
//! a client would read, so tests can assert on the full message history
//! without a transport. `ScriptedTransport` replays canned input bytes.

use domlink::link::Transport;
use domlink::{MessageSink, ObjectRuntime, Outbound};
use serde_json::Value as Json;

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub sent: Vec<Outbound>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message as its wire JSON.
    pub fn json(&self) -> Vec<Json> {
        self.sent
            .iter()
            .map(|m| serde_json::to_value(m).expect("outbound encodes"))
            .collect()
    }

    /// Wire JSON of messages whose `type` is `kind`.
    pub fn of_type(&self, kind: &str) -> Vec<Json> {
        self.json()
            .into_iter()
            .filter(|m| m["type"] == kind)
            .collect()
    }

    pub fn updates(&self) -> Vec<Json> {
        self.of_type("update")
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }

    /// Send `line` to `runtime` and return only what it emitted.
    pub fn exchange(&mut self, runtime: &mut ObjectRuntime, line: &str) -> Vec<Json> {
        self.clear();
        runtime.handle_line(line, self);
        self.json()
    }
}

impl MessageSink for RecordingSink {
    fn send(&mut self, message: &Outbound) {
        self.sent.push(message.clone());
    }
}

// ── ScriptedTransport ─────────────────────────────────────────

/// Serves `input` in chunks of at most `chunk` bytes per read and records
/// every written byte.
pub struct ScriptedTransport {
    input: Vec<u8>,
    chunk: usize,
    pub output: Vec<u8>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(input: &[u8], chunk: usize) -> Self {
        Self {
            input: input.to_vec(),
            chunk: chunk.max(1),
            output: Vec::new(),
        }
    }

    pub fn output_lines(&self) -> Vec<Json> {
        String::from_utf8(self.output.clone())
            .expect("output is UTF-8")
            .lines()
            .map(|l| serde_json::from_str(l).expect("each output line is JSON"))
            .collect()
    }
}

impl Transport for ScriptedTransport {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let n = buf.len().min(self.chunk).min(self.input.len());
        buf[..n].copy_from_slice(&self.input[..n]);
        self.input.drain(..n);
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        self.output.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn available(&self) -> bool {
        !self.input.is_empty()
    }
}
