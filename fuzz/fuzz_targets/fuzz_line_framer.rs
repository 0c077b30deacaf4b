//! Fuzz target: `LineFramer::feed`
//!
//! Pushes arbitrary bytes through the line framer with a small bound so the
//! discard path is hit often. Delivered lines must respect the bound and
//! carry no terminator.
//!
//! cargo fuzz run fuzz_line_framer

#![no_main]

use domlink::link::LineFramer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&bound, bytes)) = data.split_first() else {
        return;
    };
    let max = usize::from(bound).max(1);
    let mut framer = LineFramer::new(max, 50);

    for (i, &b) in bytes.iter().enumerate() {
        // Every 16th byte arrives late enough to trip the idle timeout.
        let now = (i as u64) * 4 + if i % 16 == 15 { 100 } else { 0 };
        framer.poll_idle(now);
        if let Some(line) = framer.feed(b, now) {
            assert!(line.len() <= max, "line exceeds bound");
            assert!(!line.is_empty(), "framer must not yield empty lines");
            assert!(!line.contains('\n'));
        }
    }

    framer.reset();
    assert_eq!(framer.pending(), 0);
});
