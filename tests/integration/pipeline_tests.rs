//! Sensor task → sample channel → alarm task, end to end on mocks.

use core::time::Duration;

use humidalarm::alarm::{ActuatorOutputs, AlarmMonitor, AlarmState, HUMIDITY_ALARM_THRESHOLD, SilenceFlag};
use humidalarm::app::events::AppEvent;
use humidalarm::channel::{SAMPLE_CHANNEL_DEPTH, SampleChannel};
use humidalarm::drivers::button::SilenceButton;
use humidalarm::error::{ChannelError, DecodeError, Error};
use humidalarm::sensors::SensorSampler;
use humidalarm::sensors::dht::{RawFrame, Reading};
use humidalarm::tasks::{AlarmTask, FillerTask, SensorTask};

use crate::mock_hw::{ManualClock, MockActuators, RecordingSink, ScriptedLine};

const HUMID: [u8; 4] = [0x03, 0xB6, 0x00, 0xFA]; // 95.0 %RH
const DRY: [u8; 4] = [0x01, 0xF4, 0x00, 0xC8]; // 50.0 %RH

fn frames(data: &[[u8; 4]]) -> Vec<[u8; 5]> {
    data.iter().map(|d| RawFrame::with_checksum(*d).bytes()).collect()
}

fn sampler(data: &[[u8; 4]]) -> SensorSampler<ScriptedLine> {
    SensorSampler::new(
        ScriptedLine::with_frames(&frames(data)),
        Duration::from_millis(10),
    )
}

/// Everything the alarm task borrows.
struct Rig {
    channel: SampleChannel,
    silence: SilenceFlag,
    actuators: MockActuators,
    clock: ManualClock,
}

impl Rig {
    fn new() -> Self {
        Self {
            channel: SampleChannel::new(),
            silence: SilenceFlag::new(),
            actuators: MockActuators::new(),
            clock: ManualClock::new(0),
        }
    }

    fn button(&self) -> SilenceButton<'_, MockActuators, ManualClock> {
        SilenceButton::new(&self.silence, &self.actuators, &self.clock, 50_000)
    }
}

fn alarm_task<'a>(
    rig: &'a Rig,
    button: &'a SilenceButton<'a, MockActuators, ManualClock>,
) -> AlarmTask<'a, MockActuators, ManualClock> {
    AlarmTask::new(
        AlarmMonitor::new(HUMIDITY_ALARM_THRESHOLD),
        &rig.channel,
        &rig.silence,
        &rig.actuators,
        button,
        &rig.clock,
        Some(Duration::from_millis(5)),
    )
}

#[test]
fn humid_reading_raises_alarm_and_dry_reading_clears_it() {
    let rig = Rig::new();
    let button = rig.button();
    let mut sensor = sampler(&[HUMID, DRY]);
    let mut alarm = alarm_task(&rig, &button);
    let mut sink = RecordingSink::new();

    sensor.sample_once(&rig.channel, &mut sink).unwrap();
    assert_eq!(alarm.step(&mut sink), Some(AlarmState::Triggered));
    assert_eq!(rig.actuators.last(), Some(ActuatorOutputs::ON));

    sensor.sample_once(&rig.channel, &mut sink).unwrap();
    assert_eq!(alarm.step(&mut sink), Some(AlarmState::Idle));
    assert_eq!(rig.actuators.last(), Some(ActuatorOutputs::OFF));

    let changes: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::AlarmChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![
            (AlarmState::Idle, AlarmState::Triggered),
            (AlarmState::Triggered, AlarmState::Idle),
        ]
    );
}

#[test]
fn sustained_humidity_rewrites_outputs_without_new_transition() {
    let rig = Rig::new();
    let button = rig.button();
    let mut sensor = sampler(&[HUMID, HUMID, HUMID]);
    let mut alarm = alarm_task(&rig, &button);
    let mut sink = RecordingSink::new();

    for _ in 0..3 {
        sensor.sample_once(&rig.channel, &mut sink).unwrap();
        assert_eq!(alarm.step(&mut sink), Some(AlarmState::Triggered));
    }

    assert_eq!(*rig.actuators.writes.lock().unwrap(), vec![ActuatorOutputs::ON; 3]);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::AlarmChanged { .. })), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::AlarmEvaluated { .. })), 3);
}

#[test]
fn readings_arrive_in_production_order() {
    let rig = Rig::new();
    let mut sensor = sampler(&[DRY, HUMID, DRY]);
    let mut sink = RecordingSink::new();

    for _ in 0..3 {
        sensor.sample_once(&rig.channel, &mut sink).unwrap();
    }

    let received: Vec<f32> = std::iter::from_fn(|| rig.channel.try_receive())
        .map(|r| r.humidity.round())
        .collect();
    assert_eq!(received, vec![50.0, 95.0, 50.0]);
}

#[test]
fn failed_read_skips_the_cycle_and_keeps_last_decision() {
    let rig = Rig::new();
    let button = rig.button();
    let mut alarm = alarm_task(&rig, &button);
    let mut sink = RecordingSink::new();

    // Frame 1 is valid, frame 2 has a corrupted checksum, frame 3 never comes.
    let mut bad = RawFrame::with_checksum(DRY).bytes();
    bad[4] = bad[4].wrapping_add(1);
    let mut line = ScriptedLine::with_frames(&[RawFrame::with_checksum(HUMID).bytes(), bad]);
    line.queue(Vec::new());
    let mut sensor = SensorSampler::new(line, Duration::from_millis(10));

    sensor.sample_once(&rig.channel, &mut sink).unwrap();
    alarm.step(&mut sink);
    assert_eq!(rig.actuators.count(), 1);

    assert_eq!(
        sensor.sample_once(&rig.channel, &mut sink),
        Err(Error::Decode(DecodeError::ChecksumMismatch))
    );
    assert_eq!(
        sensor.sample_once(&rig.channel, &mut sink),
        Err(Error::Decode(DecodeError::Timeout))
    );
    assert!(rig.channel.is_empty());

    // Nothing to evaluate: the receive times out and outputs stay as they were.
    assert_eq!(alarm.step(&mut sink), None);
    assert_eq!(rig.actuators.count(), 1);
    assert_eq!(alarm.monitor().state(), AlarmState::Triggered);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::DecodeFailed(_))),
        2
    );
}

#[test]
fn full_channel_drops_newest_reading() {
    let rig = Rig::new();
    let mut sink = RecordingSink::new();
    let filler = Reading {
        humidity: 10.0,
        temperature: 20.0,
    };
    for _ in 0..SAMPLE_CHANNEL_DEPTH {
        rig.channel.send(filler, Duration::ZERO).unwrap();
    }

    let mut sensor = SensorSampler::new(
        ScriptedLine::with_frames(&frames(&[HUMID])),
        Duration::ZERO,
    );
    assert_eq!(
        sensor.sample_once(&rig.channel, &mut sink),
        Err(Error::Channel(ChannelError::Full))
    );

    assert_eq!(rig.channel.len(), SAMPLE_CHANNEL_DEPTH);
    assert!(std::iter::from_fn(|| rig.channel.try_receive()).all(|r| r == filler));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ReadingDropped(_))), 1);
}

#[test]
fn sensor_task_step_reports_elapsed_read_time() {
    let rig = Rig::new();
    let mut task = SensorTask::new(sampler(&[DRY]), &rig.channel, Duration::from_secs(2));
    let mut sink = RecordingSink::new();

    task.step(&mut sink).unwrap();

    // Start pulse alone is 18 ms of virtual time.
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ReadingTaken { elapsed_ms, .. } if *elapsed_ms >= 18
    )));
    assert_eq!(rig.channel.len(), 1);
}

#[test]
fn alarm_task_reports_button_reaction_once() {
    let rig = Rig::new();
    let button = rig.button();
    let mut alarm = alarm_task(&rig, &button);
    let mut sink = RecordingSink::new();

    rig.clock.set(1_000_000);
    button.on_falling_edge().unwrap();

    alarm.step(&mut sink);
    alarm.step(&mut sink);

    assert_eq!(sink.count(|e| matches!(e, AppEvent::ButtonReaction(_))), 1);
}

#[test]
fn filler_step_reports_its_own_name() {
    let clock = ManualClock::new(0);
    let mut filler = FillerTask::new("filler-2", 10, 10, &clock);
    let mut sink = RecordingSink::new();

    assert_eq!(filler.step(&mut sink), 100);
    assert_eq!(
        sink.events,
        vec![AppEvent::FillerLap {
            task: "filler-2",
            elapsed_ms: 0
        }]
    );
}
