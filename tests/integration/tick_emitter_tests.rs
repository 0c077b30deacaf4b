//! Integration tests for the tick emitter and the link driver around it.

use domlink::config::RuntimeConfig;
use domlink::link::LinkDriver;
use domlink::{FieldDescriptor, FieldType, ObjectRuntime, ObjectSchema, Value};
use serde_json::json;

use crate::mock_link::{RecordingSink, ScriptedTransport};

fn runtime_with(names: &[&'static str]) -> ObjectRuntime {
    let mut rt = ObjectRuntime::default();
    for &name in names {
        rt.register_schema(
            ObjectSchema::new(name, [FieldDescriptor::new("v", FieldType::Number)])
                .subscribable(true)
                .discoverable(true),
        );
    }
    rt
}

fn subscribe_all(rt: &mut ObjectRuntime, sink: &mut RecordingSink, names: &[&str]) {
    for name in names {
        let line = format!(r#"{{"type":"subscribe","path":"{name}"}}"#);
        sink.exchange(rt, &line);
    }
    sink.clear();
}

#[test]
fn tick_is_rate_limited() {
    let mut rt = runtime_with(&["a"]);
    let mut sink = RecordingSink::new();
    subscribe_all(&mut rt, &mut sink, &["a"]);

    assert_eq!(rt.tick(1_000, &mut sink), 1);
    assert_eq!(rt.tick(1_200, &mut sink), 0);
    assert_eq!(rt.tick(1_500, &mut sink), 0);
    assert_eq!(rt.tick(1_501, &mut sink), 1);
    assert_eq!(sink.updates().len(), 2);
}

#[test]
fn tick_emits_full_field_set() {
    let mut rt = ObjectRuntime::default();
    rt.register_schema(
        ObjectSchema::new(
            "m",
            [
                FieldDescriptor::new("on", FieldType::Boolean),
                FieldDescriptor::new("v", FieldType::Number),
            ],
        )
        .subscribable(true)
        .discoverable(true),
    );
    let mut sink = RecordingSink::new();
    subscribe_all(&mut rt, &mut sink, &["m"]);
    sink.exchange(&mut rt, r#"{"type":"set","path":"m","changes":{"v":3}}"#);
    sink.clear();

    rt.tick(0, &mut sink);
    assert_eq!(
        sink.json(),
        [json!({"type": "update", "path": "m", "changes": {"on": false, "v": 3.0}})]
    );
}

#[test]
fn tick_fan_out_is_bounded() {
    let names = ["a", "b", "c", "d", "e", "f", "g"];
    let mut rt = runtime_with(&names);
    let mut sink = RecordingSink::new();
    subscribe_all(&mut rt, &mut sink, &names);

    assert_eq!(rt.tick(0, &mut sink), 5);
    let paths: Vec<_> = sink.updates().iter().map(|u| u["path"].clone()).collect();
    assert_eq!(paths, [json!("a"), json!("b"), json!("c"), json!("d"), json!("e")]);

    rt.set_max_updates_per_tick(10);
    sink.clear();
    assert_eq!(rt.tick(10_000, &mut sink), 7);
}

#[test]
fn tick_skips_unsubscribed_objects() {
    let mut rt = runtime_with(&["a", "b"]);
    let mut sink = RecordingSink::new();
    subscribe_all(&mut rt, &mut sink, &["a", "b"]);
    sink.exchange(&mut rt, r#"{"type":"unsubscribe","path":"a"}"#);
    sink.clear();

    assert_eq!(rt.tick(0, &mut sink), 1);
    assert_eq!(sink.updates()[0]["path"], "b");
}

#[test]
fn tick_with_no_subscribers_is_silent() {
    let mut rt = runtime_with(&["a"]);
    let mut sink = RecordingSink::new();
    sink.exchange(&mut rt, r#"{"type":"set","path":"a","changes":{"v":1}}"#);
    sink.clear();
    assert_eq!(rt.tick(0, &mut sink), 0);
    assert!(sink.sent.is_empty());
}

#[test]
fn revoked_subscribable_silences_pushes_and_ticks() {
    let mut rt = runtime_with(&["a", "b"]);
    let mut sink = RecordingSink::new();
    subscribe_all(&mut rt, &mut sink, &["a", "b"]);
    rt.register_schema(
        ObjectSchema::new("a", [FieldDescriptor::new("v", FieldType::Number)]).discoverable(true),
    );

    assert!(rt.set_field_number("a", "v", 9.0, &mut sink));
    assert!(rt.push_record("a", &mut sink));
    assert!(sink.sent.is_empty());
    assert_eq!(rt.field("a", "v"), Some(&Value::Number(9.0)));

    assert_eq!(rt.tick(0, &mut sink), 1);
    assert_eq!(sink.updates().len(), 1);
    assert_eq!(sink.updates()[0]["path"], "b");
}

#[test]
fn tick_skips_only_object_once_unsubscribable() {
    let mut rt = runtime_with(&["a"]);
    let mut sink = RecordingSink::new();
    subscribe_all(&mut rt, &mut sink, &["a"]);
    rt.register_schema(
        ObjectSchema::new("a", [FieldDescriptor::new("v", FieldType::Number)]).discoverable(true),
    );

    assert_eq!(rt.tick(0, &mut sink), 0);
    assert!(sink.sent.is_empty());
}

#[test]
fn config_sets_tick_pacing() {
    let config = RuntimeConfig {
        tick_interval_ms: 100,
        max_updates_per_tick: 1,
        ..RuntimeConfig::default()
    };
    let mut rt = ObjectRuntime::new(&config);
    for name in ["a", "b"] {
        rt.register_schema(
            ObjectSchema::new(name, [FieldDescriptor::new("v", FieldType::Number)])
                .subscribable(true)
                .discoverable(true),
        );
    }
    let mut sink = RecordingSink::new();
    subscribe_all(&mut rt, &mut sink, &["a", "b"]);

    assert_eq!(rt.tick(0, &mut sink), 1);
    assert_eq!(rt.tick(101, &mut sink), 1);
}

// ── LinkDriver over a scripted transport ──────────────────────

#[test]
fn driver_handles_fragmented_input() {
    let input = concat!(
        r#"{"type":"subscribe","id":"s","path":"a"}"#,
        "\r\n",
        r#"{"type":"set","id":"t","path":"a","changes":{"v":4}}"#,
        "\n",
    );
    let rt = runtime_with(&["a"]);
    let mut driver = LinkDriver::new(
        rt,
        ScriptedTransport::new(input.as_bytes(), 5),
        &RuntimeConfig::default(),
    );

    assert_eq!(driver.poll_rx(0), Ok(2));
    assert_eq!(driver.poll_tick(0), 1);

    let (_, transport) = driver.into_parts();
    let kinds: Vec<_> = transport
        .output_lines()
        .iter()
        .map(|m| m["type"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        kinds,
        ["subscribe.response", "state", "update", "set.response", "update"]
    );
}

#[test]
fn driver_drops_idle_partial_line() {
    let rt = runtime_with(&["a"]);
    let mut driver = LinkDriver::new(
        rt,
        ScriptedTransport::new(br#"{"type":"get","#, 64),
        &RuntimeConfig::default(),
    );
    assert_eq!(driver.poll_rx(0), Ok(0));
    assert_eq!(driver.poll_rx(1_000), Ok(0));

    let (_, transport) = driver.into_parts();
    assert!(transport.output.is_empty());
}
