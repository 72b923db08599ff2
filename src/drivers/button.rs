//! Silence button — falling-edge ISR handler.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up. The GPIO interrupt fires on
//! the falling edge and calls [`SilenceButton::on_falling_edge`] directly in
//! interrupt context.
//!
//! ## Handler body
//!
//! | Step | Action                                   |
//! |------|------------------------------------------|
//! | 1    | timestamp the press                      |
//! | 2    | raise the [`SilenceFlag`]                |
//! | 3    | force lamp and buzzer off                |
//! | 4    | compute the reaction time                |
//! | 5    | clear the [`SilenceFlag`]                |
//!
//! Edges within the debounce window of the last accepted press are
//! ignored. Everything is lock-free atomics; the handler never blocks,
//! never touches the sample channel, and never logs. The reaction is left
//! in a mailbox that a task drains with [`SilenceButton::take_reaction`].

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::alarm::SilenceFlag;
use crate::app::ports::{ActuatorPort, Clock};

/// One accepted button press, as measured inside the ISR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonReaction {
    /// Press timestamp (µs since boot, truncated to u32).
    pub pressed_at_us: u32,
    /// Time from the edge to the actuators being forced off (µs).
    pub reaction_us: u32,
}

pub struct SilenceButton<'a, A: ActuatorPort, C: Clock> {
    silence: &'a SilenceFlag,
    actuators: &'a A,
    clock: &'a C,
    debounce_us: AtomicU32,
    /// Timestamp of the last accepted press.
    last_press_us: AtomicU32,
    pressed_once: AtomicBool,
    presses: AtomicU32,
    // Reaction mailbox: written by the ISR, drained by a task.
    pending: AtomicBool,
    pending_at_us: AtomicU32,
    pending_reaction_us: AtomicU32,
}

impl<'a, A: ActuatorPort, C: Clock> SilenceButton<'a, A, C> {
    pub const fn new(
        silence: &'a SilenceFlag,
        actuators: &'a A,
        clock: &'a C,
        debounce_us: u32,
    ) -> Self {
        Self {
            silence,
            actuators,
            clock,
            debounce_us: AtomicU32::new(debounce_us),
            last_press_us: AtomicU32::new(0),
            pressed_once: AtomicBool::new(false),
            presses: AtomicU32::new(0),
            pending: AtomicBool::new(false),
            pending_at_us: AtomicU32::new(0),
            pending_reaction_us: AtomicU32::new(0),
        }
    }

    /// ISR body. Returns the reaction for an accepted press, `None` for a
    /// bounce.
    pub fn on_falling_edge(&self) -> Option<ButtonReaction> {
        let pressed_at_us = self.clock.now_us() as u32;

        if self.pressed_once.load(Ordering::Relaxed) {
            let since = pressed_at_us.wrapping_sub(self.last_press_us.load(Ordering::Relaxed));
            if since < self.debounce_us.load(Ordering::Relaxed) {
                return None;
            }
        }
        self.last_press_us.store(pressed_at_us, Ordering::Relaxed);
        self.pressed_once.store(true, Ordering::Relaxed);

        self.silence.raise();
        self.actuators.all_off();

        let reaction = ButtonReaction {
            pressed_at_us,
            reaction_us: (self.clock.now_us() as u32).wrapping_sub(pressed_at_us),
        };
        self.pending_at_us.store(reaction.pressed_at_us, Ordering::Relaxed);
        self.pending_reaction_us.store(reaction.reaction_us, Ordering::Relaxed);
        self.pending.store(true, Ordering::Release);
        self.presses.fetch_add(1, Ordering::Relaxed);

        self.silence.clear();
        Some(reaction)
    }

    /// Take the most recent unreported reaction, if any.
    ///
    /// Presses that land before the previous one was taken overwrite it.
    pub fn take_reaction(&self) -> Option<ButtonReaction> {
        if !self.pending.swap(false, Ordering::Acquire) {
            return None;
        }
        Some(ButtonReaction {
            pressed_at_us: self.pending_at_us.load(Ordering::Relaxed),
            reaction_us: self.pending_reaction_us.load(Ordering::Relaxed),
        })
    }

    /// Replace the debounce window. Takes effect from the next edge.
    pub fn set_debounce_us(&self, debounce_us: u32) {
        self.debounce_us.store(debounce_us, Ordering::Relaxed);
    }

    /// Accepted presses since boot.
    pub fn presses(&self) -> u32 {
        self.presses.load(Ordering::Relaxed)
    }
}
