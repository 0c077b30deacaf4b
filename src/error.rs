//! Unified error types for the DomLink runtime.
//!
//! Protocol-level failures never propagate as Rust errors: they are reported
//! to the client as an `error` string inside the relevant response, so
//! [`ProtocolError`] is a wire value and never enters [`Error`]. Link-level
//! failures ([`LinkError`]) are returned by the transport layer; the one
//! that stops the driver surfaces as [`Error::Link`]. All variants are
//! `Copy` so they can be passed around without allocation.

use core::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Protocol errors (wire taxonomy)
// ---------------------------------------------------------------------------

/// Error reported to the client inside a response's `error` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolError {
    /// No materialised or creatable object exists for the path.
    NotFound,
    /// The schema exists but is excluded from discovery and subscription.
    NotDiscoverable,
    /// The schema forbids subscription.
    NotSubscribable,
    /// The schema forbids `set`.
    ReadOnly,
}

impl ProtocolError {
    /// The exact string sent on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::NotDiscoverable => "not_discoverable",
            Self::NotSubscribable => "not_subscribable",
            Self::ReadOnly => "read_only",
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The transport accepted fewer bytes than the encoded line.
    WriteFailed,
    /// The transport has no peer attached.
    Disconnected,
    /// An outbound message could not be serialised.
    Encode,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed => write!(f, "transport write failed"),
            Self::Disconnected => write!(f, "transport disconnected"),
            Self::Encode => write!(f, "message encoding failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Failures reported to the embedding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The link driver stopped.
    Link(LinkError),
    /// Configuration is invalid or could not be parsed.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
