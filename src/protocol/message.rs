//! Wire shapes of the line-JSON protocol.
//!
//! Every message is one JSON object on one line with a `type` tag. Inbound
//! lines are parsed leniently into a [`Request`]; anything that does not
//! make a complete request is dropped by returning `None`.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::ProtocolError;
use crate::object::FieldMap;
use crate::schema::{FieldType, ObjectSchema};

// ── Inbound ──────────────────────────────────────────────────

/// Raw inbound message, before the `type` is interpreted.
#[derive(Debug, Deserialize)]
struct RawRequest {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: Option<Json>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    changes: Option<Json>,
    #[serde(default)]
    field: Option<Json>,
}

/// Interpreted command of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Discover,
    Get,
    Subscribe,
    Unsubscribe,
    /// Requested field changes, values still raw JSON.
    Set(Vec<(String, Json)>),
    Delete(String),
}

/// One parsed inbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Client correlation id, echoed verbatim.
    pub id: Option<Json>,
    /// Object name; empty when the client omitted it.
    pub path: String,
    pub command: Command,
}

impl Request {
    /// Parse one line. Returns `None` for unparsable JSON, an unknown
    /// `type`, or a `set`/`delete` without its required sub-field.
    pub fn parse(line: &str) -> Option<Self> {
        let raw: RawRequest = serde_json::from_str(line).ok()?;
        let command = match raw.kind.as_str() {
            "discover" => Command::Discover,
            "get" => Command::Get,
            "subscribe" => Command::Subscribe,
            "unsubscribe" => Command::Unsubscribe,
            "set" => match raw.changes? {
                Json::Object(map) => Command::Set(map.into_iter().collect()),
                _ => return None,
            },
            "delete" => match raw.field? {
                Json::String(field) => Command::Delete(field),
                _ => return None,
            },
            _ => return None,
        };
        Some(Self {
            id: raw.id,
            path: raw.path.unwrap_or_default(),
            command,
        })
    }
}

// ── Outbound ─────────────────────────────────────────────────

/// One field entry of a `discover.response` schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInfo {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Schema block of a `discover.response`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaInfo {
    pub name: &'static str,
    pub subscribable: bool,
    #[serde(rename = "readOnly")]
    pub read_only: bool,
    pub discoverable: bool,
    pub fields: Vec<FieldInfo>,
    pub subscriber_count: u8,
    pub subscribed: bool,
}

impl SchemaInfo {
    pub fn describe(schema: &ObjectSchema, subscriber_count: u8) -> Self {
        Self {
            name: schema.name(),
            subscribable: schema.is_subscribable(),
            read_only: schema.is_read_only(),
            discoverable: schema.is_discoverable(),
            fields: schema
                .fields()
                .iter()
                .map(|f| FieldInfo {
                    name: f.name(),
                    field_type: f.field_type(),
                })
                .collect(),
            subscriber_count,
            subscribed: subscriber_count > 0,
        }
    }
}

/// `_meta` block of a `state` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateMeta {
    pub subscriber_count: u8,
    pub subscribed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribable: Option<bool>,
    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discoverable: Option<bool>,
}

impl StateMeta {
    pub fn new(subscriber_count: u8, schema: Option<&ObjectSchema>) -> Self {
        Self {
            subscriber_count,
            subscribed: subscriber_count > 0,
            subscribable: schema.map(ObjectSchema::is_subscribable),
            read_only: schema.map(ObjectSchema::is_read_only),
            discoverable: schema.map(ObjectSchema::is_discoverable),
        }
    }
}

/// Every message the runtime can emit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Outbound {
    #[serde(rename = "discover.response")]
    Discover {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Json>,
        found: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        schema: Option<SchemaInfo>,
    },
    #[serde(rename = "state")]
    State {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Json>,
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<FieldMap>,
        #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
        meta: Option<StateMeta>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<ProtocolError>,
    },
    #[serde(rename = "subscribe.response")]
    Subscribe {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Json>,
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        subscriber_count: Option<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        subscribed: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<ProtocolError>,
    },
    #[serde(rename = "unsubscribe.response")]
    Unsubscribe {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Json>,
        path: String,
        subscriber_count: u8,
        subscribed: bool,
        removed: bool,
    },
    #[serde(rename = "set.response")]
    Set {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Json>,
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<ProtocolError>,
    },
    #[serde(rename = "update")]
    Update { path: String, changes: FieldMap },
}

impl Outbound {
    /// Wire `type` tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Discover { .. } => "discover.response",
            Self::State { .. } => "state",
            Self::Subscribe { .. } => "subscribe.response",
            Self::Unsubscribe { .. } => "unsubscribe.response",
            Self::Set { .. } => "set.response",
            Self::Update { .. } => "update",
        }
    }

    /// Encode as one JSON line without the trailing newline.
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
