//! Application boundary — port traits and the events the tasks emit.
//!
//! All interaction with hardware happens through the **port traits** defined
//! in [`ports`], keeping the decoder, the alarm state machine and the button
//! handler fully testable without real peripherals.

pub mod events;
pub mod ports;
