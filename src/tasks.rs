//! Task bodies.
//!
//! Each task is split into a `step` that does one unit of work and a
//! never-returning `run` that loops over it. None of the tasks is ever
//! cancelled; the controller runs until power-off.
//!
//! ```text
//!  SensorTask ── Reading ──▶ SampleChannel ──▶ AlarmTask ──▶ lamp + buzzer
//!                                                 ▲               ▲
//!                                   SilenceFlag ──┘    Button ISR ┘
//!  FillerTask ×2 (CPU load, no data dependency)
//! ```

use core::hint::black_box;
use core::time::Duration;

use log::debug;

use crate::alarm::{AlarmMonitor, AlarmState, SilenceFlag};
use crate::app::events::AppEvent;
use crate::app::ports::{ActuatorPort, Clock, EventSink, TimedLine};
use crate::channel::SampleChannel;
use crate::drivers::button::SilenceButton;
use crate::drivers::hw_init;
use crate::error::{ChannelError, Result};
use crate::sensors::SensorSampler;
use crate::sensors::dht::Reading;

// ───────────────────────────────────────────────────────────────
// Sensor task (producer)
// ───────────────────────────────────────────────────────────────

pub struct SensorTask<'a, L: TimedLine> {
    sampler: SensorSampler<L>,
    channel: &'a SampleChannel,
    period: Duration,
}

impl<'a, L: TimedLine> SensorTask<'a, L> {
    pub fn new(sampler: SensorSampler<L>, channel: &'a SampleChannel, period: Duration) -> Self {
        Self {
            sampler,
            channel,
            period,
        }
    }

    /// One read cycle. Failures are already reported through `sink`.
    pub fn step(&mut self, sink: &mut impl EventSink) -> Result<Reading> {
        self.sampler.sample_once(self.channel, sink)
    }

    pub fn run(mut self, sink: &mut impl EventSink) -> ! {
        loop {
            if let Err(e) = self.step(sink) {
                debug!("sensor task: cycle skipped ({})", e);
            }
            hw_init::delay_ms(self.period.as_millis() as u32);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Alarm task (consumer)
// ───────────────────────────────────────────────────────────────

pub struct AlarmTask<'a, A: ActuatorPort, C: Clock> {
    monitor: AlarmMonitor,
    channel: &'a SampleChannel,
    silence: &'a SilenceFlag,
    actuators: &'a A,
    button: &'a SilenceButton<'a, A, C>,
    clock: &'a C,
    receive_timeout: Option<Duration>,
}

impl<'a, A: ActuatorPort, C: Clock> AlarmTask<'a, A, C> {
    pub fn new(
        monitor: AlarmMonitor,
        channel: &'a SampleChannel,
        silence: &'a SilenceFlag,
        actuators: &'a A,
        button: &'a SilenceButton<'a, A, C>,
        clock: &'a C,
        receive_timeout: Option<Duration>,
    ) -> Self {
        Self {
            monitor,
            channel,
            silence,
            actuators,
            button,
            clock,
            receive_timeout,
        }
    }

    /// Wait for the next reading and evaluate it. Returns `None` when the
    /// receive timeout elapsed; the actuators then keep their last decision.
    pub fn step(&mut self, sink: &mut impl EventSink) -> Option<AlarmState> {
        let start_us = self.clock.now_us();

        let state = match self.channel.receive(self.receive_timeout) {
            Some(reading) => Some(self.monitor.process(
                reading,
                self.silence,
                self.actuators,
                sink,
            )),
            None => {
                debug!("alarm task: {}", ChannelError::Timeout);
                None
            }
        };

        if let Some(reaction) = self.button.take_reaction() {
            sink.emit(&AppEvent::ButtonReaction(reaction));
        }

        sink.emit(&AppEvent::AlarmEvaluated {
            state: self.monitor.state(),
            outputs: self.monitor.outputs(),
            elapsed_ms: self.clock.now_us().saturating_sub(start_us) / 1000,
        });
        state
    }

    pub fn monitor(&self) -> &AlarmMonitor {
        &self.monitor
    }

    pub fn run(mut self, sink: &mut impl EventSink) -> ! {
        sink.emit(&AppEvent::Started(self.monitor.state()));
        loop {
            self.step(sink);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Filler tasks (CPU load)
// ───────────────────────────────────────────────────────────────

/// Burn `outer × inner` increments. Returns the final count.
pub fn filler_lap(outer: u32, inner: u32) -> u64 {
    let mut sink = 0u64;
    for _ in 0..outer {
        for _ in 0..inner {
            sink = black_box(sink + 1);
        }
    }
    sink
}

/// Best-effort CPU hog; yields only at lap boundaries.
pub struct FillerTask<'a, C: Clock> {
    name: &'static str,
    outer: u32,
    inner: u32,
    clock: &'a C,
}

impl<'a, C: Clock> FillerTask<'a, C> {
    pub fn new(name: &'static str, outer: u32, inner: u32, clock: &'a C) -> Self {
        Self {
            name,
            outer,
            inner,
            clock,
        }
    }

    pub fn step(&mut self, sink: &mut impl EventSink) -> u64 {
        let start_us = self.clock.now_us();
        let count = filler_lap(self.outer, self.inner);
        sink.emit(&AppEvent::FillerLap {
            task: self.name,
            elapsed_ms: self.clock.now_us().saturating_sub(start_us) / 1000,
        });
        count
    }

    pub fn run(mut self, sink: &mut impl EventSink) -> ! {
        loop {
            self.step(sink);
            std::thread::yield_now();
        }
    }
}
