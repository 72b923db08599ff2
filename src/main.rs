//! HumidAlarm Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioLine          GpioActuators   LogEventSink   Esp32Time    │
//! │  (TimedLine)       (ActuatorPort)  (EventSink)    (Clock)      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  DHT decoder · SampleChannel · AlarmMonitor (pure)     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  sensor · alarm · filler ×2 tasks   +   silence-button ISR     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

mod esp_link_shims;

use anyhow::Result;
use log::{error, info};

use humidalarm::adapters::hardware::{GpioActuators, GpioLine};
use humidalarm::adapters::time::Esp32TimeAdapter;
use humidalarm::alarm::SilenceFlag;
use humidalarm::app::ports::ActuatorPort;
use humidalarm::channel::SampleChannel;
use humidalarm::config::SystemConfig;
use humidalarm::drivers::button::SilenceButton;
use humidalarm::drivers::hw_init;
use humidalarm::pins;
use humidalarm::scheduler::{self, Shared};

// ── Process-lifetime state ────────────────────────────────────
//
// Shared between the tasks and the button ISR, so it lives in statics.

static SAMPLES: SampleChannel = SampleChannel::new();
static SILENCE: SilenceFlag = SilenceFlag::new();
static ACTUATORS: GpioActuators = GpioActuators::new(pins::LAMP_GPIO, pins::BUZZER_GPIO);
static CLOCK: Esp32TimeAdapter = Esp32TimeAdapter::new();
static BUTTON: SilenceButton<'static, GpioActuators, Esp32TimeAdapter> =
    SilenceButton::new(&SILENCE, &ACTUATORS, &CLOCK, 0);

/// Installed as the GPIO ISR for the button pin.
fn on_button_edge() {
    // Outcome is picked up later through `take_reaction`.
    let _ = BUTTON.on_falling_edge();
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  HumidAlarm v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config ─────────────────────────────────────────────
    let config = SystemConfig::default();
    config.validate()?;
    info!("Config: {}", serde_json::to_string(&config)?);

    // ── 3. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {}", e);
        return Err(e.into());
    }
    ACTUATORS.all_off();

    BUTTON.set_debounce_us(config.button_debounce_us());
    hw_init::init_isr_service(on_button_edge)?;

    // ── 4. Tasks ──────────────────────────────────────────────
    let shared = Shared {
        channel: &SAMPLES,
        silence: &SILENCE,
        actuators: &ACTUATORS,
        button: &BUTTON,
        clock: &CLOCK,
    };
    let handles = scheduler::spawn_all(&config, GpioLine::new(pins::DHT_GPIO), shared)?;
    info!("Started {} tasks", handles.len());

    // Tasks never return; a join only completes if one panicked.
    for handle in handles {
        let name = handle.thread().name().unwrap_or("?").to_owned();
        if handle.join().is_err() {
            error!("task '{}' panicked", name);
        }
    }
    Ok(())
}
