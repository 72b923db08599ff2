//! `critical-section` 1.x implementation for the firmware binary.
//!
//! HumidAlarm's only cross-task queue is the static `SampleChannel`, an
//! embassy-sync channel locked with `CriticalSectionRawMutex`. That mutex
//! calls `_critical_section_1_0_acquire`/`_release`, and nothing else in the
//! ESP-IDF std build defines those symbols, so without this module the
//! firmware fails to link. The host tests get theirs from the
//! `critical-section/std` dev-dependency instead.
//!
//! The lock is one process-wide std mutex, re-entrant per thread. Only the
//! sensor and alarm tasks touch the channel; the button ISR never does, so
//! blocking here never happens in interrupt context.

#[cfg(target_os = "espidf")]
mod imp {
    use core::cell::RefCell;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    static CHANNEL_LOCK: Mutex<()> = Mutex::new(());

    /// This thread's hold on [`CHANNEL_LOCK`].
    struct Nesting {
        depth: u8,
        guard: Option<MutexGuard<'static, ()>>,
    }

    thread_local! {
        static NESTING: RefCell<Nesting> = const {
            RefCell::new(Nesting { depth: 0, guard: None })
        };
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn _critical_section_1_0_acquire() -> u8 {
        NESTING.with_borrow_mut(|n| {
            if n.guard.is_none() {
                // Guards `()`, so a poisoned lock holds nothing stale.
                n.guard = Some(CHANNEL_LOCK.lock().unwrap_or_else(PoisonError::into_inner));
            }
            n.depth = n.depth.saturating_add(1);
            n.depth
        })
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn _critical_section_1_0_release(_token: u8) {
        NESTING.with_borrow_mut(|n| {
            n.depth = n.depth.saturating_sub(1);
            if n.depth == 0 {
                n.guard = None;
            }
        })
    }
}
