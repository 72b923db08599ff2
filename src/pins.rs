//! GPIO pin assignments for the HumidAlarm board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensor
// ---------------------------------------------------------------------------

/// DHT single-wire data line. Open-drain with an external pull-up:
/// the MCU drives it low for the start pulse, then releases it to the sensor.
pub const DHT_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Digital output: alarm lamp (active HIGH).
pub const LAMP_GPIO: i32 = 22;

/// Digital output: piezo buzzer driver (active HIGH).
pub const BUZZER_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// User input
// ---------------------------------------------------------------------------

/// Silence button. Active-low momentary switch with pull-up, interrupt on
/// falling edge.
pub const BUTTON_GPIO: i32 = 20;
