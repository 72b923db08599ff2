//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | alarm={:?}", state);
            }
            AppEvent::ReadingTaken { reading, elapsed_ms } => {
                info!(
                    "SAMPLE | RH={:.1}% | T={:.1}\u{00b0}C ({:.1}\u{00b0}F) | took {}ms",
                    reading.humidity,
                    reading.temperature,
                    reading.fahrenheit(),
                    elapsed_ms,
                );
            }
            AppEvent::DecodeFailed(e) => {
                warn!("SAMPLE | read failed: {}", e);
            }
            AppEvent::ReadingDropped(reading) => {
                warn!(
                    "SAMPLE | channel full, dropped RH={:.1}%",
                    reading.humidity
                );
            }
            AppEvent::AlarmChanged { from, to } => {
                info!("ALARM | {:?} -> {:?}", from, to);
            }
            AppEvent::AlarmEvaluated {
                state,
                outputs,
                elapsed_ms,
            } => {
                info!(
                    "ALARM | state={:?} lamp={} buzzer={} | took {}ms",
                    state,
                    if outputs.lamp { "ON" } else { "off" },
                    if outputs.buzzer { "ON" } else { "off" },
                    elapsed_ms,
                );
            }
            AppEvent::ButtonReaction(r) => {
                info!(
                    "BUTTON | lamp+buzzer reset in {}us (pressed at {}us)",
                    r.reaction_us, r.pressed_at_us
                );
            }
            AppEvent::FillerLap { task, elapsed_ms } => {
                info!("FILLER | {} lap took {}ms", task, elapsed_ms);
            }
        }
    }
}
