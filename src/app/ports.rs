//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Decoder / AlarmMonitor / Button (domain)
//! ```
//!
//! Driven adapters (GPIO line, actuators, clock, event sinks) implement these
//! traits. The domain consumes them via generics, so the decoder and the alarm
//! logic never touch hardware directly and run unchanged against the mocks in
//! `tests/`.

use crate::alarm::ActuatorOutputs;

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic microsecond clock.
///
/// Takes `&self` so that it can be shared with interrupt context.
pub trait Clock {
    fn now_us(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Single-wire line port (driven adapter: domain ↔ sensor data pin)
// ───────────────────────────────────────────────────────────────

/// Direction of the bidirectional sensor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The MCU samples the line; the pull-up or the sensor sets the level.
    Input,
    /// The MCU drives the line.
    Output,
}

/// A GPIO line with microsecond-resolution timing, as needed by the
/// single-wire sensor protocol.
///
/// `sleep_us` must busy-wait: the decoder's polling loop is not a
/// suspension point.
pub trait TimedLine: Clock {
    fn set_direction(&mut self, direction: Direction);

    /// Drive the line (only meaningful in [`Direction::Output`]).
    fn write(&mut self, high: bool);

    /// Sample the current line level.
    fn read(&mut self) -> bool;

    fn sleep_us(&mut self, us: u32);

    fn sleep_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → lamp + buzzer)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the lamp and buzzer.
///
/// Called both from the alarm task and from the button ISR, hence `&self`
/// and `Sync`. Implementations must be bounded, non-blocking register
/// writes.
pub trait ActuatorPort: Sync {
    /// Drive both outputs to the given levels.
    fn apply(&self, outputs: ActuatorOutputs);

    /// Kill both outputs.
    fn all_off(&self) {
        self.apply(ActuatorOutputs::OFF);
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
