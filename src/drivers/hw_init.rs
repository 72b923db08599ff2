//! One-shot hardware peripheral initialization plus the raw GPIO helpers
//! the adapters build on.
//!
//! Configures GPIO directions and the button interrupt using raw ESP-IDF
//! sys calls. Called once from `main()` before the tasks are spawned.
//! Every helper has a host fallback so the adapters compile and run in
//! tests.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    IsrHandlerFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::IsrHandlerFailed(rc) => write!(f, "GPIO ISR handler add failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before any task is spawned.
    unsafe {
        init_sensor_line()?;
        init_gpio_outputs()?;
        init_button()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── Sensor line ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_sensor_line() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::DHT_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }

    info!("hw_init: sensor line GPIO{} idle (input, pull-up)", pins::DHT_GPIO);
    Ok(())
}

/// Switch a pin between input and push-pull output.
#[cfg(target_os = "espidf")]
pub fn gpio_set_output(pin: i32, output: bool) {
    let mode = if output {
        gpio_mode_t_GPIO_MODE_OUTPUT
    } else {
        gpio_mode_t_GPIO_MODE_INPUT
    };
    // SAFETY: direction change on a pin configured in init_sensor_line();
    // only the sensor task touches that pin.
    unsafe { gpio_set_direction(pin, mode); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_set_output(_pin: i32, _output: bool) {}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access.
    (unsafe { gpio_get_level(pin) }) != 0
}

/// Idle bus level: the pull-up holds the line high.
#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [pins::LAMP_GPIO, pins::BUZZER_GPIO];

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: GPIO outputs configured (lamp, buzzer)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level is a single register write on a configured
    // output pin; IRAM-safe and callable from the button ISR.
    unsafe { gpio_set_level(pin, u32::from(high)); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── Delays ────────────────────────────────────────────────────

/// Busy-wait; does not yield to the scheduler.
#[cfg(target_os = "espidf")]
pub fn delay_us(us: u32) {
    esp_idf_hal::delay::Ets::delay_us(us);
}

#[cfg(not(target_os = "espidf"))]
pub fn delay_us(us: u32) {
    let until = std::time::Instant::now() + std::time::Duration::from_micros(u64::from(us));
    while std::time::Instant::now() < until {
        core::hint::spin_loop();
    }
}

/// Task delay; yields to the scheduler.
#[cfg(target_os = "espidf")]
pub fn delay_ms(ms: u32) {
    esp_idf_hal::delay::FreeRtos::delay_ms(ms);
}

#[cfg(not(target_os = "espidf"))]
pub fn delay_ms(ms: u32) {
    std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
}

// ── Button + ISR service ──────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_button() -> Result<(), HwInitError> {
    let btn_cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::BUTTON_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
    };
    let ret = unsafe { gpio_config(&btn_cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }

    info!("hw_init: button GPIO{} configured (falling edge)", pins::BUTTON_GPIO);
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn button_gpio_isr(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the `fn()` registered in init_isr_service(); fn
    // pointers and data pointers have the same size on Xtensa/RISC-V.
    let handler = unsafe { core::mem::transmute::<*mut core::ffi::c_void, fn()>(arg) };
    handler();
}

/// Install the per-pin GPIO ISR service and route the button falling edge
/// to `on_button`. `on_button` runs in interrupt context.
#[cfg(target_os = "espidf")]
pub fn init_isr_service(on_button: fn()) -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed (acceptable). The handler only touches
    // atomics and output registers.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        gpio_set_intr_type(pins::BUTTON_GPIO, gpio_int_type_t_GPIO_INTR_NEGEDGE);
        let ret = gpio_isr_handler_add(
            pins::BUTTON_GPIO,
            Some(button_gpio_isr),
            on_button as *mut core::ffi::c_void,
        );
        if ret != ESP_OK as i32 {
            return Err(HwInitError::IsrHandlerFailed(ret));
        }
        gpio_intr_enable(pins::BUTTON_GPIO);

        info!("hw_init: ISR service installed (button)");
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service(_on_button: fn()) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
