//! Outbound application events.
//!
//! Tasks emit these through the [`EventSink`](super::ports::EventSink)
//! port. Adapters on the other side decide what to do with them; the
//! firmware just logs them to the serial console.

use crate::alarm::{ActuatorOutputs, AlarmState};
use crate::drivers::button::ButtonReaction;
use crate::error::DecodeError;
use crate::sensors::dht::Reading;

/// Structured events emitted by the tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller has started (carries the initial alarm state).
    Started(AlarmState),

    /// A valid frame was decoded and handed to the sample channel.
    ReadingTaken { reading: Reading, elapsed_ms: u64 },

    /// A read cycle failed; no reading was produced this period.
    DecodeFailed(DecodeError),

    /// The sample channel stayed full past the send timeout.
    ReadingDropped(Reading),

    /// The alarm state machine changed state.
    AlarmChanged { from: AlarmState, to: AlarmState },

    /// One alarm evaluation finished (includes the channel wait).
    AlarmEvaluated {
        state: AlarmState,
        outputs: ActuatorOutputs,
        elapsed_ms: u64,
    },

    /// The silence button fired and forced the actuators off.
    ButtonReaction(ButtonReaction),

    /// A CPU-bound filler task completed one lap.
    FillerLap { task: &'static str, elapsed_ms: u64 },
}
