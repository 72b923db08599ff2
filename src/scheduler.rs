//! Task table and start-up.
//!
//! Four fixed-priority tasks share one core so the fillers genuinely
//! compete with the sensor and alarm paths:
//!
//! ```text
//! ┌───────────┬──────────┬───────┬────────────────────────────────────┐
//! │ Task      │ Priority │ Stack │ Role                               │
//! ├───────────┼──────────┼───────┼────────────────────────────────────┤
//! │ sensor    │ 2        │ 4 KB  │ read DHT, enqueue Reading, sleep   │
//! │ alarm     │ 2        │ 4 KB  │ dequeue, run FSM, drive actuators  │
//! │ filler-1  │ 1        │ 4 KB  │ CPU load                           │
//! │ filler-2  │ 1        │ 4 KB  │ CPU load                           │
//! └───────────┴──────────┴───────┴────────────────────────────────────┘
//! ```
//!
//! The button handler is not a task; it runs in interrupt context above
//! all of these (see [`crate::drivers::button`]).

use core::time::Duration;
use std::io;
use std::thread::JoinHandle;

use crate::adapters::log_sink::LogEventSink;
use crate::alarm::{AlarmMonitor, SilenceFlag};
use crate::app::ports::{ActuatorPort, Clock, TimedLine};
use crate::channel::SampleChannel;
use crate::config::SystemConfig;
use crate::drivers::button::SilenceButton;
use crate::drivers::task_pin::{spawn_on_core, Core};
use crate::sensors::SensorSampler;
use crate::tasks::{AlarmTask, FillerTask, SensorTask};

/// Static description of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    /// Null-terminated, as FreeRTOS wants it.
    pub name: &'static str,
    pub priority: u8,
    pub stack_kb: usize,
    pub core: Core,
}

impl TaskSpec {
    pub fn display_name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }
}

pub const SENSOR_TASK: TaskSpec = TaskSpec {
    name: "sensor\0",
    priority: 2,
    stack_kb: 4,
    core: Core::App,
};

pub const ALARM_TASK: TaskSpec = TaskSpec {
    name: "alarm\0",
    priority: 2,
    stack_kb: 4,
    core: Core::App,
};

pub const FILLER_TASKS: [TaskSpec; 2] = [
    TaskSpec {
        name: "filler-1\0",
        priority: 1,
        stack_kb: 4,
        core: Core::App,
    },
    TaskSpec {
        name: "filler-2\0",
        priority: 1,
        stack_kb: 4,
        core: Core::App,
    },
];

/// Process-lifetime state shared between tasks and the button ISR.
pub struct Shared<A: ActuatorPort + 'static, C: Clock + Sync + 'static> {
    pub channel: &'static SampleChannel,
    pub silence: &'static SilenceFlag,
    pub actuators: &'static A,
    pub button: &'static SilenceButton<'static, A, C>,
    pub clock: &'static C,
}

impl<A: ActuatorPort + 'static, C: Clock + Sync + 'static> Clone for Shared<A, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: ActuatorPort + 'static, C: Clock + Sync + 'static> Copy for Shared<A, C> {}

fn spawn(spec: &TaskSpec, f: impl FnOnce() + Send + 'static) -> io::Result<JoinHandle<()>> {
    spawn_on_core(spec.core, spec.priority, spec.stack_kb, spec.name, f)
}

/// Spawn the sensor, alarm and filler tasks. None of them returns.
pub fn spawn_all<L, A, C>(
    config: &SystemConfig,
    line: L,
    shared: Shared<A, C>,
) -> io::Result<Vec<JoinHandle<()>>>
where
    L: TimedLine + Send + 'static,
    A: ActuatorPort + 'static,
    C: Clock + Sync + 'static,
{
    let mut handles = Vec::with_capacity(2 + FILLER_TASKS.len());

    let sampler = SensorSampler::new(line, Duration::from_millis(u64::from(config.send_timeout_ms)));
    let period = Duration::from_millis(u64::from(config.sample_period_ms));
    handles.push(spawn(&SENSOR_TASK, move || {
        SensorTask::new(sampler, shared.channel, period).run(&mut LogEventSink::new());
    })?);

    let threshold = config.humidity_alarm_threshold;
    let receive_timeout = config
        .receive_timeout_ms
        .map(|ms| Duration::from_millis(u64::from(ms)));
    handles.push(spawn(&ALARM_TASK, move || {
        AlarmTask::new(
            AlarmMonitor::new(threshold),
            shared.channel,
            shared.silence,
            shared.actuators,
            shared.button,
            shared.clock,
            receive_timeout,
        )
        .run(&mut LogEventSink::new());
    })?);

    for spec in &FILLER_TASKS {
        let (outer, inner) = (config.filler_outer_loops, config.filler_inner_loops);
        let name = spec.display_name();
        handles.push(spawn(spec, move || {
            FillerTask::new(name, outer, inner, shared.clock).run(&mut LogEventSink::new());
        })?);
    }

    Ok(handles)
}
