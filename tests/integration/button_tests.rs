//! Silence button interplay with the alarm state machine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use humidalarm::alarm::{ActuatorOutputs, AlarmMonitor, AlarmState, SilenceFlag};
use humidalarm::app::events::AppEvent;
use humidalarm::drivers::button::SilenceButton;
use humidalarm::sensors::dht::Reading;

use crate::mock_hw::{ManualClock, MockActuators, RecordingSink};

const HUMID: Reading = Reading {
    humidity: 95.0,
    temperature: 24.0,
};

#[test]
fn press_silences_outputs_until_next_evaluation() {
    let silence = SilenceFlag::new();
    let actuators = MockActuators::new();
    let clock = ManualClock::new(5_000_000);
    let button = SilenceButton::new(&silence, &actuators, &clock, 50_000);
    let mut monitor = AlarmMonitor::new(90.0);
    let mut sink = RecordingSink::new();

    monitor.process(HUMID, &silence, &actuators, &mut sink);
    assert_eq!(actuators.last(), Some(ActuatorOutputs::ON));

    button.on_falling_edge().unwrap();
    assert_eq!(actuators.last(), Some(ActuatorOutputs::OFF));
    assert!(!silence.is_raised());

    // The mute is momentary: the next humid reading sounds the alarm again.
    assert_eq!(
        monitor.process(HUMID, &silence, &actuators, &mut sink),
        AlarmState::Triggered
    );
    assert_eq!(actuators.last(), Some(ActuatorOutputs::ON));
}

#[test]
fn evaluation_inside_silence_window_resets_alarm() {
    let silence = SilenceFlag::new();
    let actuators = MockActuators::new();
    let mut monitor = AlarmMonitor::new(90.0);
    let mut sink = RecordingSink::new();

    monitor.process(HUMID, &silence, &actuators, &mut sink);

    // An evaluation that lands between the ISR's raise and clear.
    silence.raise();
    assert_eq!(
        monitor.process(HUMID, &silence, &actuators, &mut sink),
        AlarmState::Idle
    );
    silence.clear();

    assert_eq!(actuators.last(), Some(ActuatorOutputs::OFF));
    assert_eq!(
        sink.events.last(),
        Some(&AppEvent::AlarmChanged {
            from: AlarmState::Triggered,
            to: AlarmState::Idle,
        })
    );
}

#[test]
fn bounces_do_not_touch_outputs() {
    let silence = SilenceFlag::new();
    let actuators = MockActuators::new();
    let clock = ManualClock::new(0);
    let button = SilenceButton::new(&silence, &actuators, &clock, 50_000);

    clock.set(100_000);
    assert!(button.on_falling_edge().is_some());
    for t in [100_500, 110_000, 149_999] {
        clock.set(t);
        assert!(button.on_falling_edge().is_none());
    }

    assert_eq!(actuators.count(), 1);
    assert_eq!(button.presses(), 1);
}

#[test]
fn presses_from_another_thread_always_leave_flag_cleared() {
    let silence = Arc::new(SilenceFlag::new());
    let actuators = Arc::new(MockActuators::new());
    let clock = Arc::new(ManualClock::new(0));
    let done = Arc::new(AtomicBool::new(false));

    let isr = {
        let (silence, actuators, clock, done) =
            (silence.clone(), actuators.clone(), clock.clone(), done.clone());
        std::thread::spawn(move || {
            let button = SilenceButton::new(&*silence, &*actuators, &*clock, 0);
            for i in 0..200u64 {
                clock.set(i * 1_000);
                button.on_falling_edge();
            }
            done.store(true, Ordering::SeqCst);
            button.presses()
        })
    };

    let mut monitor = AlarmMonitor::new(90.0);
    let mut sink = RecordingSink::new();
    while !done.load(Ordering::SeqCst) {
        monitor.process(HUMID, &silence, &*actuators, &mut sink);
    }

    assert_eq!(isr.join().unwrap(), 200);
    assert!(!silence.is_raised());
    // Once the presses stop, humidity alone decides again.
    assert_eq!(
        monitor.process(HUMID, &silence, &*actuators, &mut sink),
        AlarmState::Triggered
    );
    assert_eq!(actuators.last(), Some(ActuatorOutputs::ON));
}
