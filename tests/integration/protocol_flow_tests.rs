//! Integration tests for the request/response protocol.
//!
//! Covers every message type end to end through `handle_line`, including
//! the discover → subscribe → set walkthrough a client performs on connect.

use domlink::{FieldDescriptor, FieldType, ObjectRuntime, ObjectSchema};
use serde_json::json;

use crate::mock_link::RecordingSink;

fn field(name: &'static str, ty: FieldType) -> FieldDescriptor {
    FieldDescriptor::new(name, ty)
}

/// `S` = {enabled: boolean, power: number}, subscribable, writable,
/// discoverable.
fn runtime_with_s() -> ObjectRuntime {
    let mut rt = ObjectRuntime::default();
    rt.register_schema(
        ObjectSchema::new(
            "S",
            [field("enabled", FieldType::Boolean), field("power", FieldType::Number)],
        )
        .subscribable(true)
        .read_only(false)
        .discoverable(true),
    );
    rt
}

// ── Connect walkthrough ───────────────────────────────────────

#[test]
fn discover_subscribe_set_walkthrough() {
    let mut rt = runtime_with_s();
    let mut sink = RecordingSink::new();

    let out = sink.exchange(&mut rt, r#"{"type":"discover","id":"1","path":"S"}"#);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["type"], "discover.response");
    assert_eq!(out[0]["id"], "1");
    assert_eq!(out[0]["found"], true);
    assert_eq!(
        out[0]["schema"]["fields"],
        json!([{"name": "enabled", "type": "boolean"}, {"name": "power", "type": "number"}])
    );
    assert_eq!(out[0]["schema"]["subscribed"], false);
    assert_eq!(out[0]["schema"]["subscriber_count"], 0);

    let out = sink.exchange(&mut rt, r#"{"type":"subscribe","id":"2","path":"S"}"#);
    assert_eq!(out.len(), 2);
    assert_eq!(
        out[0],
        json!({"type": "subscribe.response", "id": "2", "path": "S",
               "subscriber_count": 1, "subscribed": true})
    );
    assert_eq!(out[1]["type"], "state");
    assert_eq!(out[1]["value"], json!({"enabled": false, "power": 0.0}));

    let out = sink.exchange(
        &mut rt,
        r#"{"type":"set","id":"3","path":"S","changes":{"power":12.5}}"#,
    );
    assert_eq!(
        out,
        [
            json!({"type": "update", "path": "S", "changes": {"power": 12.5}}),
            json!({"type": "set.response", "id": "3", "path": "S"}),
        ]
    );
    assert!(out[1].get("error").is_none());
}

// ── discover ──────────────────────────────────────────────────

#[test]
fn discover_found_tracks_discoverable_only() {
    let mut rt = ObjectRuntime::default();
    rt.register_schema(ObjectSchema::new("hidden", []).subscribable(true));
    rt.register_schema(ObjectSchema::new("ro", []).read_only(true).discoverable(true));
    let mut sink = RecordingSink::new();

    let out = sink.exchange(&mut rt, r#"{"type":"discover","id":"a","path":"hidden"}"#);
    assert_eq!(out, [json!({"type": "discover.response", "id": "a", "found": false})]);

    let out = sink.exchange(&mut rt, r#"{"type":"discover","id":"b","path":"ro"}"#);
    assert_eq!(out[0]["found"], true);
    assert_eq!(out[0]["schema"]["readOnly"], true);
    assert_eq!(out[0]["schema"]["subscribable"], false);

    let out = sink.exchange(&mut rt, r#"{"type":"discover","id":"c","path":"nothing"}"#);
    assert_eq!(out[0]["found"], false);
}

#[test]
fn discover_does_not_materialise() {
    let mut rt = runtime_with_s();
    let mut sink = RecordingSink::new();
    sink.exchange(&mut rt, r#"{"type":"discover","path":"S"}"#);
    let out = sink.exchange(&mut rt, r#"{"type":"get","id":"g","path":"S"}"#);
    assert_eq!(out[0]["error"], "not_found");
}

// ── get ───────────────────────────────────────────────────────

#[test]
fn get_after_set_carries_meta() {
    let mut rt = runtime_with_s();
    let mut sink = RecordingSink::new();
    sink.exchange(&mut rt, r#"{"type":"set","path":"S","changes":{"enabled":true}}"#);

    let out = sink.exchange(&mut rt, r#"{"type":"get","id":9,"path":"S"}"#);
    assert_eq!(
        out,
        [json!({
            "type": "state", "id": 9, "path": "S",
            "value": {"enabled": true, "power": 0.0},
            "_meta": {"subscriber_count": 0, "subscribed": false,
                      "subscribable": true, "readOnly": false, "discoverable": true}
        })]
    );
}

#[test]
fn get_defaults_match_declared_types() {
    let mut rt = ObjectRuntime::default();
    rt.register_schema(
        ObjectSchema::new(
            "d",
            [
                field("b", FieldType::Boolean),
                field("n", FieldType::Number),
                field("s", FieldType::String),
            ],
        )
        .discoverable(true)
        .subscribable(true),
    );
    let mut sink = RecordingSink::new();
    let out = sink.exchange(&mut rt, r#"{"type":"subscribe","id":"1","path":"d"}"#);
    assert_eq!(out[1]["value"], json!({"b": false, "n": 0.0, "s": ""}));
}

// ── subscribe / unsubscribe ───────────────────────────────────

#[test]
fn subscribe_errors_follow_precedence() {
    let mut rt = ObjectRuntime::default();
    rt.register_schema(ObjectSchema::new("neither", []));
    rt.register_schema(ObjectSchema::new("quiet", []).discoverable(true));
    let mut sink = RecordingSink::new();

    let cases = [
        ("ghost", "not_found"),
        ("neither", "not_discoverable"),
        ("quiet", "not_subscribable"),
    ];
    for (path, error) in cases {
        let line = format!(r#"{{"type":"subscribe","id":"x","path":"{path}"}}"#);
        let out = sink.exchange(&mut rt, &line);
        assert_eq!(
            out,
            [json!({"type": "subscribe.response", "id": "x", "path": path, "error": error})]
        );
    }
    assert!(rt.subscriptions().is_empty());
}

#[test]
fn repeated_subscribe_keeps_single_subscriber() {
    let mut rt = runtime_with_s();
    let mut sink = RecordingSink::new();
    sink.exchange(&mut rt, r#"{"type":"subscribe","path":"S"}"#);
    let out = sink.exchange(&mut rt, r#"{"type":"subscribe","path":"S"}"#);
    assert_eq!(out[0]["subscriber_count"], 1);
}

#[test]
fn unsubscribe_is_idempotent() {
    let mut rt = runtime_with_s();
    let mut sink = RecordingSink::new();
    sink.exchange(&mut rt, r#"{"type":"subscribe","path":"S"}"#);

    for _ in 0..2 {
        let out = sink.exchange(&mut rt, r#"{"type":"unsubscribe","id":"u","path":"S"}"#);
        assert_eq!(
            out,
            [json!({"type": "unsubscribe.response", "id": "u", "path": "S",
                    "subscriber_count": 0, "subscribed": false, "removed": true})]
        );
    }

    let out = sink.exchange(&mut rt, r#"{"type":"unsubscribe","path":"never"}"#);
    assert_eq!(out[0]["removed"], true);
    assert!(out[0].get("error").is_none());
}

// ── set ───────────────────────────────────────────────────────

#[test]
fn set_without_subscriber_emits_no_update() {
    let mut rt = runtime_with_s();
    let mut sink = RecordingSink::new();
    let out = sink.exchange(&mut rt, r#"{"type":"set","id":"1","path":"S","changes":{"power":1}}"#);
    assert_eq!(out, [json!({"type": "set.response", "id": "1", "path": "S"})]);
}

#[test]
fn set_after_unsubscribe_emits_no_update() {
    let mut rt = runtime_with_s();
    let mut sink = RecordingSink::new();
    sink.exchange(&mut rt, r#"{"type":"subscribe","path":"S"}"#);
    sink.exchange(&mut rt, r#"{"type":"unsubscribe","path":"S"}"#);
    sink.exchange(&mut rt, r#"{"type":"set","path":"S","changes":{"power":1}}"#);
    assert!(sink.updates().is_empty());
}

#[test]
fn set_on_read_only_is_rejected() {
    let mut rt = ObjectRuntime::default();
    rt.register_schema(
        ObjectSchema::new("ro", [field("v", FieldType::Number)])
            .read_only(true)
            .discoverable(true)
            .subscribable(true),
    );
    let mut sink = RecordingSink::new();
    sink.exchange(&mut rt, r#"{"type":"subscribe","path":"ro"}"#);

    let out = sink.exchange(&mut rt, r#"{"type":"set","id":"w","path":"ro","changes":{"v":5}}"#);
    assert_eq!(
        out,
        [json!({"type": "set.response", "id": "w", "path": "ro", "error": "read_only"})]
    );
    let out = sink.exchange(&mut rt, r#"{"type":"get","path":"ro"}"#);
    assert_eq!(out[0]["value"], json!({"v": 0.0}));
}

#[test]
fn set_on_unknown_object_is_not_found() {
    let mut rt = runtime_with_s();
    let mut sink = RecordingSink::new();
    let out = sink.exchange(&mut rt, r#"{"type":"set","id":"1","path":"Q","changes":{"a":1}}"#);
    assert_eq!(
        out,
        [json!({"type": "set.response", "id": "1", "path": "Q", "error": "not_found"})]
    );
    assert!(!rt.store().contains("Q"));
}

#[test]
fn set_after_subscribable_revoked_emits_no_update() {
    let mut rt = runtime_with_s();
    let mut sink = RecordingSink::new();
    sink.exchange(&mut rt, r#"{"type":"subscribe","path":"S"}"#);
    rt.register_schema(
        ObjectSchema::new(
            "S",
            [field("enabled", FieldType::Boolean), field("power", FieldType::Number)],
        )
        .discoverable(true),
    );
    assert!(rt.subscriptions().is_subscribed("S"));

    let out = sink.exchange(&mut rt, r#"{"type":"set","id":"3","path":"S","changes":{"power":7}}"#);
    assert_eq!(out, [json!({"type": "set.response", "id": "3", "path": "S"})]);
    assert_eq!(rt.field("S", "power"), Some(&domlink::Value::Number(7.0)));
}

// ── delete ────────────────────────────────────────────────────

#[test]
fn delete_soft_deletes_and_snapshots() {
    let mut rt = runtime_with_s();
    let mut sink = RecordingSink::new();
    sink.exchange(&mut rt, r#"{"type":"subscribe","path":"S"}"#);

    let out = sink.exchange(&mut rt, r#"{"type":"delete","path":"S","field":"power"}"#);
    assert_eq!(
        out,
        [
            json!({"type": "update", "path": "S", "changes": {"power": "deleted"}}),
            json!({"type": "state", "path": "S", "value": {"enabled": false, "power": "deleted"}}),
        ]
    );

    // The key stays; get reports the marker.
    let out = sink.exchange(&mut rt, r#"{"type":"get","path":"S"}"#);
    assert_eq!(out[0]["value"]["power"], "deleted");
}

#[test]
fn delete_after_subscribable_revoked_sends_state_only() {
    let mut rt = runtime_with_s();
    let mut sink = RecordingSink::new();
    sink.exchange(&mut rt, r#"{"type":"subscribe","path":"S"}"#);
    rt.register_schema(
        ObjectSchema::new(
            "S",
            [field("enabled", FieldType::Boolean), field("power", FieldType::Number)],
        )
        .discoverable(true),
    );

    let out = sink.exchange(&mut rt, r#"{"type":"delete","path":"S","field":"enabled"}"#);
    assert_eq!(
        out,
        [json!({"type": "state", "path": "S", "value": {"enabled": "deleted", "power": 0.0}})]
    );
}

#[test]
fn delete_on_unmaterialised_object_is_silent() {
    let mut rt = runtime_with_s();
    let mut sink = RecordingSink::new();
    assert!(sink.exchange(&mut rt, r#"{"type":"delete","path":"S","field":"power"}"#).is_empty());
    assert!(!rt.store().contains("S"));
}

// ── malformed input ───────────────────────────────────────────

#[test]
fn malformed_input_is_dropped_silently() {
    let mut rt = runtime_with_s();
    let mut sink = RecordingSink::new();
    for line in [
        "",
        "{",
        "[1,2,3]",
        r#"{"path":"S"}"#,
        r#"{"type":"reboot","path":"S"}"#,
        r#"{"type":"set","id":"1","path":"S"}"#,
        r#"{"type":"delete","path":"S"}"#,
    ] {
        assert!(sink.exchange(&mut rt, line).is_empty(), "line {line:?} produced output");
    }
}
