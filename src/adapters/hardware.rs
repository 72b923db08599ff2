//! Hardware adapters — bridge the board's GPIO to the domain port traits.
//!
//! | Adapter           | Implements  | Backed by                          |
//! |-------------------|-------------|------------------------------------|
//! | `GpioLine`        | TimedLine   | raw ESP-IDF GPIO + `Ets` busy-wait |
//! | `GpioActuators`   | ActuatorPort| raw ESP-IDF `gpio_set_level`       |
//! | `EmbeddedHalLine` | TimedLine   | any embedded-hal 1.0 open-drain pin|
//!
//! On non-espidf targets `GpioLine` and `GpioActuators` run on the
//! `hw_init` simulation stubs; the last actuator write is mirrored into
//! atomics so a host run can be inspected.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, ErrorKind, ErrorType, InputPin, OutputPin};
use log::warn;

use crate::adapters::time::Esp32TimeAdapter;
use crate::alarm::ActuatorOutputs;
use crate::app::ports::{ActuatorPort, Clock, Direction, TimedLine};
use crate::drivers::hw_init;

// ── Sensor line ───────────────────────────────────────────────

/// The sensor data pin driven through the raw ESP-IDF GPIO helpers.
pub struct GpioLine {
    pin: i32,
    clock: Esp32TimeAdapter,
}

impl GpioLine {
    pub fn new(pin: i32) -> Self {
        Self {
            pin,
            clock: Esp32TimeAdapter::new(),
        }
    }
}

impl Clock for GpioLine {
    fn now_us(&self) -> u64 {
        self.clock.now_us()
    }
}

impl TimedLine for GpioLine {
    fn set_direction(&mut self, direction: Direction) {
        hw_init::gpio_set_output(self.pin, direction == Direction::Output);
    }

    fn write(&mut self, high: bool) {
        hw_init::gpio_write(self.pin, high);
    }

    fn read(&mut self) -> bool {
        hw_init::gpio_read(self.pin)
    }

    fn sleep_us(&mut self, us: u32) {
        hw_init::delay_us(us);
    }

    fn sleep_ms(&mut self, ms: u32) {
        hw_init::delay_ms(ms);
    }
}

// ── Actuators ─────────────────────────────────────────────────

/// Lamp + buzzer outputs. Stateless apart from the host-side mirror, so a
/// single `static` instance is shared by the alarm task and the ISR.
pub struct GpioActuators {
    lamp_gpio: i32,
    buzzer_gpio: i32,
    lamp: AtomicBool,
    buzzer: AtomicBool,
}

impl GpioActuators {
    pub const fn new(lamp_gpio: i32, buzzer_gpio: i32) -> Self {
        Self {
            lamp_gpio,
            buzzer_gpio,
            lamp: AtomicBool::new(false),
            buzzer: AtomicBool::new(false),
        }
    }

    /// Last levels written.
    pub fn outputs(&self) -> ActuatorOutputs {
        ActuatorOutputs {
            lamp: self.lamp.load(Ordering::Relaxed),
            buzzer: self.buzzer.load(Ordering::Relaxed),
        }
    }
}

impl ActuatorPort for GpioActuators {
    fn apply(&self, outputs: ActuatorOutputs) {
        hw_init::gpio_write(self.lamp_gpio, outputs.lamp);
        hw_init::gpio_write(self.buzzer_gpio, outputs.buzzer);
        self.lamp.store(outputs.lamp, Ordering::Relaxed);
        self.buzzer.store(outputs.buzzer, Ordering::Relaxed);
    }
}

// ── Generic embedded-hal line ─────────────────────────────────

/// [`TimedLine`] over an embedded-hal open-drain pin.
///
/// Open-drain has no direction register: "input" means releasing the pin
/// (writing high) so the pull-up or the sensor sets the level. A failed pin
/// read counts as low, so the frame fails validation. The first pin error
/// is logged and kept until [`take_pin_error`](Self::take_pin_error).
pub struct EmbeddedHalLine<P, D, C> {
    pin: P,
    delay: D,
    clock: C,
    pin_error: Option<ErrorKind>,
}

impl<P, D, C> EmbeddedHalLine<P, D, C>
where
    P: InputPin + OutputPin,
    D: DelayNs,
    C: Clock,
{
    pub fn new(pin: P, delay: D, clock: C) -> Self {
        Self {
            pin,
            delay,
            clock,
            pin_error: None,
        }
    }

    pub fn release(self) -> (P, D, C) {
        (self.pin, self.delay, self.clock)
    }

    /// Oldest pin error since the last call. A frame read while one was
    /// pending should not be trusted even if it validated.
    pub fn take_pin_error(&mut self) -> Option<ErrorKind> {
        self.pin_error.take()
    }

    fn check<T>(&mut self, op: &'static str, result: Result<T, <P as ErrorType>::Error>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                if self.pin_error.is_none() {
                    warn!("dht line: pin {} failed ({:?})", op, e.kind());
                    self.pin_error = Some(e.kind());
                }
                None
            }
        }
    }
}

impl<P, D, C: Clock> Clock for EmbeddedHalLine<P, D, C> {
    fn now_us(&self) -> u64 {
        self.clock.now_us()
    }
}

impl<P, D, C> TimedLine for EmbeddedHalLine<P, D, C>
where
    P: InputPin + OutputPin,
    D: DelayNs,
    C: Clock,
{
    fn set_direction(&mut self, direction: Direction) {
        if direction == Direction::Input {
            let released = self.pin.set_high();
            self.check("release", released);
        }
    }

    fn write(&mut self, high: bool) {
        let written = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        self.check("write", written);
    }

    fn read(&mut self) -> bool {
        let level = self.pin.is_high();
        self.check("read", level).unwrap_or(false)
    }

    fn sleep_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
