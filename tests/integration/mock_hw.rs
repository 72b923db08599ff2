//! Mock hardware for integration tests.
//!
//! `ScriptedLine` plays back a DHT waveform in virtual time: the clock only
//! moves when the decoder sleeps, so every level lasts exactly the number
//! of polling ticks it was scripted for. The actuator and event mocks
//! record every call so tests can assert on the full history.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use humidalarm::alarm::ActuatorOutputs;
use humidalarm::app::events::AppEvent;
use humidalarm::app::ports::{ActuatorPort, Clock, Direction, EventSink, TimedLine};

// ── Waveform ──────────────────────────────────────────────────

/// One line level held for `us` microseconds.
pub type Segment = (bool, u64);

/// Bit-phase lengths as produced by a real sensor.
pub const ZERO_HIGH_US: u64 = 27;
pub const ONE_HIGH_US: u64 = 70;
const BIT_LOW_US: u64 = 50;

/// Time the pull-up holds the line high after release, including the
/// decoder's 40 µs wait.
const RELEASE_HIGH_US: u64 = 60;

/// Sensor response to a start pulse, carrying `bytes` MSB-first.
pub fn waveform(bytes: &[u8]) -> Vec<Segment> {
    let mut segs = vec![(true, RELEASE_HIGH_US), (false, 80), (true, 80)];
    for &byte in bytes {
        for bit in (0..8u32).rev() {
            let one = (byte >> bit) & 1 == 1;
            segs.push((false, BIT_LOW_US));
            segs.push((true, if one { ONE_HIGH_US } else { ZERO_HIGH_US }));
        }
    }
    // Trailing low, then the line idles high.
    segs.push((false, BIT_LOW_US));
    segs
}

/// Full 40-bit response in which every data bit is held high for
/// `high_us`.
pub fn uniform_waveform(high_us: u64) -> Vec<Segment> {
    let mut segs = vec![(true, RELEASE_HIGH_US), (false, 80), (true, 80)];
    for _ in 0..40 {
        segs.push((false, BIT_LOW_US));
        segs.push((true, high_us));
    }
    segs.push((false, BIT_LOW_US));
    segs
}

/// Waveform that stops after `bits` data bits and leaves the line high.
pub fn truncated_waveform(bytes: &[u8], bits: usize) -> Vec<Segment> {
    let mut segs = waveform(bytes);
    segs.truncate(3 + bits * 2);
    segs.push((false, BIT_LOW_US));
    segs
}

// ── ScriptedLine ──────────────────────────────────────────────

/// A sensor line that answers each start pulse with the next queued
/// waveform. With nothing queued the sensor stays silent (line high).
pub struct ScriptedLine {
    now: u64,
    direction: Direction,
    driven: bool,
    released_at: Option<u64>,
    current: Vec<Segment>,
    queued: VecDeque<Vec<Segment>>,
    pub start_pulses: usize,
}

#[allow(dead_code)]
impl ScriptedLine {
    pub fn new() -> Self {
        Self {
            now: 0,
            direction: Direction::Input,
            driven: true,
            released_at: None,
            current: Vec::new(),
            queued: VecDeque::new(),
            start_pulses: 0,
        }
    }

    pub fn with_frames(frames: &[[u8; 5]]) -> Self {
        let mut line = Self::new();
        for frame in frames {
            line.queue(waveform(frame));
        }
        line
    }

    pub fn queue(&mut self, segments: Vec<Segment>) {
        self.queued.push_back(segments);
    }

    fn level_at(&self, offset: u64) -> bool {
        let mut t = 0;
        for &(level, len) in &self.current {
            if offset < t + len {
                return level;
            }
            t += len;
        }
        true
    }
}

impl Clock for ScriptedLine {
    fn now_us(&self) -> u64 {
        self.now
    }
}

impl TimedLine for ScriptedLine {
    fn set_direction(&mut self, direction: Direction) {
        if self.direction == Direction::Output && direction == Direction::Input {
            self.released_at = Some(self.now);
            self.current = self.queued.pop_front().unwrap_or_default();
            self.start_pulses += 1;
        }
        self.direction = direction;
    }

    fn write(&mut self, high: bool) {
        self.driven = high;
    }

    fn read(&mut self) -> bool {
        match (self.direction, self.released_at) {
            (Direction::Output, _) => self.driven,
            (Direction::Input, None) => true,
            (Direction::Input, Some(at)) => self.level_at(self.now - at),
        }
    }

    fn sleep_us(&mut self, us: u32) {
        self.now += u64::from(us);
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.now += u64::from(ms) * 1000;
    }
}

// ── Actuators ─────────────────────────────────────────────────

/// Records every write to the lamp and buzzer.
pub struct MockActuators {
    pub writes: Mutex<Vec<ActuatorOutputs>>,
}

#[allow(dead_code)]
impl MockActuators {
    pub fn new() -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn last(&self) -> Option<ActuatorOutputs> {
        self.writes.lock().unwrap().last().copied()
    }

    pub fn count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

impl ActuatorPort for MockActuators {
    fn apply(&self, outputs: ActuatorOutputs) {
        self.writes.lock().unwrap().push(outputs);
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Hand-driven clock for the button and task timing.
pub struct ManualClock(AtomicU64);

#[allow(dead_code)]
impl ManualClock {
    pub fn new(start_us: u64) -> Self {
        Self(AtomicU64::new(start_us))
    }

    pub fn set(&self, us: u64) {
        self.0.store(us, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
