//! ESP32 time adapter.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic, safe
//!   to read from ISR context).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` anchored at
//!   first use, for host-side testing and simulation.
//!
//! The adapter is zero-sized and `const`-constructible so the firmware can
//! keep it in a `static` shared with the button ISR.

use crate::app::ports::Clock;

#[cfg(not(target_os = "espidf"))]
static EPOCH: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();

/// Monotonic clock for the ESP32-S3 platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct Esp32TimeAdapter;

impl Esp32TimeAdapter {
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for Esp32TimeAdapter {
    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    fn now_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time reads the RTC-backed system timer;
        // callable from any task or ISR.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since first use (monotonic).
    #[cfg(not(target_os = "espidf"))]
    fn now_us(&self) -> u64 {
        EPOCH
            .get_or_init(std::time::Instant::now)
            .elapsed()
            .as_micros() as u64
    }
}
