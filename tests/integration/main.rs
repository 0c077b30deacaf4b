//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters. All tests run on the host with no serial link
//! required.

mod mock_link;
mod protocol_flow_tests;
mod tick_emitter_tests;
