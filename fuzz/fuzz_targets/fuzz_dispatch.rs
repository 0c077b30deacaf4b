//! Fuzz target: `ObjectRuntime::handle_line`
//!
//! Feeds arbitrary text to a runtime holding one object per permission
//! combination. The runtime must never panic, and every message it emits
//! must encode to a single JSON line.
//!
//! cargo fuzz run fuzz_dispatch

#![no_main]

use domlink::{FieldDescriptor, FieldType, MessageSink, ObjectRuntime, ObjectSchema, Outbound};
use libfuzzer_sys::fuzz_target;

const NAMES: [&str; 8] = ["o0", "o1", "o2", "o3", "o4", "o5", "o6", "o7"];

struct Check;

impl MessageSink for Check {
    fn send(&mut self, message: &Outbound) {
        let line = message.to_line().expect("outbound encodes");
        assert!(!line.contains('\n'));
    }
}

fn runtime() -> ObjectRuntime {
    let mut rt = ObjectRuntime::default();
    for (bits, name) in NAMES.into_iter().enumerate() {
        rt.register_schema(
            ObjectSchema::new(
                name,
                [
                    FieldDescriptor::new("on", FieldType::Boolean),
                    FieldDescriptor::new("level", FieldType::Number),
                    FieldDescriptor::new("label", FieldType::String),
                ],
            )
            .subscribable(bits & 1 != 0)
            .read_only(bits & 2 != 0)
            .discoverable(bits & 4 != 0),
        );
    }
    rt
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let mut rt = runtime();

    for (i, line) in text.lines().enumerate() {
        rt.handle_line(line, &mut Check);
        rt.tick(i as u64 * 600, &mut Check);
    }
    for name in NAMES {
        rt.push_record(name, &mut Check);
    }
});
