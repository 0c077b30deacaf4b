//! Built-in demo objects: `laser` and `plasma`.
//!
//! `laser` locates its fields by absolute address inside its cell;
//! `plasma` locates them by offset and is bound with
//! [`ObjectRuntime::bind_record`]. Both are subscribable, writable and
//! discoverable.

use crate::object::RecordCell;
use crate::ports::MessageSink;
use crate::record_field;
use crate::runtime::ObjectRuntime;
use crate::schema::ObjectSchema;

#[derive(Debug, Clone, PartialEq)]
pub struct Laser {
    pub enabled: bool,
    pub power: f64,
    pub mode: String,
}

impl Default for Laser {
    fn default() -> Self {
        Self {
            enabled: false,
            power: 0.0,
            mode: "yok".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plasma {
    pub temperature: f64,
    pub active: bool,
    pub profile: String,
}

impl Default for Plasma {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            active: false,
            profile: "yok".into(),
        }
    }
}

/// Handles to the demo records plus the sample generator feeding them.
pub struct DemoObjects {
    pub laser: &'static RecordCell<Laser>,
    pub plasma: &'static RecordCell<Plasma>,
    seed: u32,
}

impl DemoObjects {
    /// Allocate the records for the lifetime of the process and register
    /// both schemas with `runtime`.
    pub fn install(runtime: &mut ObjectRuntime) -> Self {
        let laser: &'static RecordCell<Laser> = Box::leak(Box::default());
        let plasma: &'static RecordCell<Plasma> = Box::leak(Box::default());

        runtime.register_schema(
            ObjectSchema::new(
                "laser",
                [
                    record_field!(at laser => Laser, enabled),
                    record_field!(at laser => Laser, power),
                    record_field!(at laser => Laser, mode),
                ],
            )
            .subscribable(true)
            .discoverable(true),
        );
        runtime.register_schema(
            ObjectSchema::new(
                "plasma",
                [
                    record_field!(Plasma, temperature),
                    record_field!(Plasma, active),
                    record_field!(Plasma, profile),
                ],
            )
            .subscribable(true)
            .discoverable(true),
        );
        runtime.bind_record("plasma", plasma);

        Self {
            laser,
            plasma,
            seed: 0x9E37_79B9,
        }
    }

    /// Next sample in `[10.00, 40.00)`, two decimals.
    fn next_sample(&mut self) -> f64 {
        // xorshift32
        let mut x = self.seed;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.seed = x;
        f64::from(1000 + x % 3000) / 100.0
    }

    /// Write a fresh sample into both records and push them to the runtime.
    pub fn publish(&mut self, runtime: &mut ObjectRuntime, sink: &mut dyn MessageSink) {
        let sample = self.next_sample();
        self.laser.update(|l| l.power = sample);
        runtime.push_record("laser", sink);
        self.plasma.update(|p| p.temperature = sample);
        runtime.push_record("plasma", sink);
    }
}
