//! Humidity alarm state machine.
//!
//! Two states, no terminal state:
//!
//! ```text
//!            humidity > 90 && !silenced
//!   ┌──────┐ ─────────────────────────▶ ┌───────────┐
//!   │ Idle │                            │ Triggered │ ◀─┐ humidity > 90
//!   └──────┘ ◀───────────────────────── └───────────┘ ──┘ && !silenced
//!       humidity <= 90 || silenced
//! ```
//!
//! Rules are evaluated in priority order: silence first, then the
//! rising edge, then the falling edge, else hold. Outputs are rewritten on
//! every evaluation even when unchanged.
//!
//! ## Shared state with the button ISR
//!
//! [`SilenceFlag`] is written by the button ISR and read here. The ISR
//! sets it, forces the outputs off and clears it again within the same
//! invocation, so an evaluation only sees it when it happens to run inside
//! that window. This is a best-effort "startle" mute, not a latch. The flag
//! is a relaxed atomic and must stay lock-free: no blocking primitive may be
//! taken in interrupt context. Whether the momentary window is intended or a
//! latent bug of the deployed firmware is unresolved; keep the behaviour
//! until that is settled.

use core::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{ActuatorPort, EventSink};
use crate::sensors::dht::Reading;

/// Humidity (%RH) above which the alarm triggers.
pub const HUMIDITY_ALARM_THRESHOLD: f32 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmState {
    #[default]
    Idle,
    Triggered,
}

/// Lamp and buzzer levels, always written together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorOutputs {
    pub lamp: bool,
    pub buzzer: bool,
}

impl ActuatorOutputs {
    pub const OFF: Self = Self {
        lamp: false,
        buzzer: false,
    };
    pub const ON: Self = Self {
        lamp: true,
        buzzer: true,
    };
}

// ───────────────────────────────────────────────────────────────
// Silence flag
// ───────────────────────────────────────────────────────────────

/// Advisory mute signal from the button ISR to the alarm task.
///
/// Relaxed ordering throughout: there is no data published alongside the
/// flag and no delivery guarantee to uphold.
#[derive(Debug, Default)]
pub struct SilenceFlag(AtomicBool);

impl SilenceFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ───────────────────────────────────────────────────────────────
// Transition function
// ───────────────────────────────────────────────────────────────

/// Pure transition function with the default 90 %RH threshold.
pub fn evaluate(
    latest: Reading,
    silenced: bool,
    current: AlarmState,
) -> (AlarmState, ActuatorOutputs) {
    evaluate_with_threshold(latest, silenced, current, HUMIDITY_ALARM_THRESHOLD)
}

/// Pure transition function.
pub fn evaluate_with_threshold(
    latest: Reading,
    silenced: bool,
    current: AlarmState,
    threshold: f32,
) -> (AlarmState, ActuatorOutputs) {
    if silenced {
        (AlarmState::Idle, ActuatorOutputs::OFF)
    } else if latest.humidity > threshold && current != AlarmState::Triggered {
        (AlarmState::Triggered, ActuatorOutputs::ON)
    } else if latest.humidity <= threshold {
        (AlarmState::Idle, ActuatorOutputs::OFF)
    } else {
        (AlarmState::Triggered, ActuatorOutputs::ON)
    }
}

// ───────────────────────────────────────────────────────────────
// Monitor (alarm task state)
// ───────────────────────────────────────────────────────────────

/// Owns the alarm state and applies each decision to the actuators.
pub struct AlarmMonitor {
    state: AlarmState,
    threshold: f32,
    outputs: ActuatorOutputs,
}

impl AlarmMonitor {
    pub fn new(threshold: f32) -> Self {
        Self {
            state: AlarmState::Idle,
            threshold,
            outputs: ActuatorOutputs::OFF,
        }
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// The most recently applied decision.
    pub fn outputs(&self) -> ActuatorOutputs {
        self.outputs
    }

    /// Evaluate `reading` against the current silence flag, drive the
    /// actuators, and report a state change.
    pub fn process(
        &mut self,
        reading: Reading,
        silence: &SilenceFlag,
        actuators: &impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> AlarmState {
        let silenced = silence.is_raised();
        let (next, outputs) =
            evaluate_with_threshold(reading, silenced, self.state, self.threshold);

        actuators.apply(outputs);
        self.outputs = outputs;

        if next != self.state {
            match next {
                AlarmState::Triggered => warn!(
                    "Alarm: humidity {:.1}% above {:.1}% threshold",
                    reading.humidity, self.threshold
                ),
                AlarmState::Idle if silenced => info!("Alarm: silenced by button"),
                AlarmState::Idle => info!("Alarm: humidity back to {:.1}%", reading.humidity),
            }
            sink.emit(&AppEvent::AlarmChanged {
                from: self.state,
                to: next,
            });
            self.state = next;
        }
        next
    }
}
