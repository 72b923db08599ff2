//! Silence button, hardware initialisation, and task pinning.

pub mod button;
pub mod hw_init;
pub mod task_pin;
