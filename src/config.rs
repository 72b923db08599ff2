//! System configuration parameters
//!
//! All tunable parameters for the HumidAlarm controller. Configuration is
//! static: the firmware boots with [`SystemConfig::default()`], validates it,
//! and never persists changes.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Minimum time the sensor needs between two start pulses.
pub const MIN_SAMPLE_PERIOD_MS: u32 = 2000;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Alarm ---
    /// Relative humidity (%RH) above which the alarm triggers
    pub humidity_alarm_threshold: f32,

    // --- Sampling ---
    /// Delay between two sensor read cycles (milliseconds)
    pub sample_period_ms: u32,
    /// How long the sensor task waits for space in the sample channel (milliseconds)
    pub send_timeout_ms: u32,
    /// How long the alarm task waits for a reading; `None` waits forever
    pub receive_timeout_ms: Option<u32>,

    // --- Button ---
    /// Falling edges closer than this to the last accepted press are ignored (milliseconds)
    pub button_debounce_ms: u32,

    // --- Filler load ---
    /// Outer loop count of each CPU-bound filler lap
    pub filler_outer_loops: u32,
    /// Inner loop count of each CPU-bound filler lap
    pub filler_inner_loops: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Alarm
            humidity_alarm_threshold: 90.0,

            // Sampling
            sample_period_ms: MIN_SAMPLE_PERIOD_MS,
            send_timeout_ms: 10,
            receive_timeout_ms: None,

            // Button
            button_debounce_ms: 50,

            // Filler load
            filler_outer_loops: 7000,
            filler_inner_loops: 7000,
        }
    }
}

impl SystemConfig {
    /// Reject values that would make the controller misbehave.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.humidity_alarm_threshold) {
            return Err(Error::Config("humidity threshold outside 0..=100 %RH"));
        }
        if self.sample_period_ms < MIN_SAMPLE_PERIOD_MS {
            return Err(Error::Config("sample period shorter than sensor minimum"));
        }
        if self.filler_outer_loops == 0 || self.filler_inner_loops == 0 {
            return Err(Error::Config("filler loop sizes must be non-zero"));
        }
        Ok(())
    }

    /// Debounce window in microseconds, as compared by the button ISR.
    pub fn button_debounce_us(&self) -> u32 {
        self.button_debounce_ms.saturating_mul(1000)
    }
}
