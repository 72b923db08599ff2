//! DHT single-wire humidity/temperature sensor decoder.
//!
//! The MCU wakes the sensor with an 18 ms low pulse, releases the line and
//! then classifies every level change by how long the previous level lasted:
//!
//! ```text
//!  MCU start      sensor ack          bit 0            bit 1
//! ▔▔╲______╱▔▔▔╲_______╱▔▔▔▔▔▔▔╲_____╱▔▔╲_____╱▔▔▔▔▔▔╲___ ...
//!    18 ms    40us  80us    80us    50us 27us 50us  70us
//!                                         "0"         "1"
//! ```
//!
//! The loop runs a fixed 85 iterations. Each iteration busy-polls the line in
//! 1 µs ticks until it leaves the previous level, giving up at the tick cap.
//! Only even iterations from index 4 onwards (the high half of each data bit)
//! contribute a bit: more than 46 ticks high encodes `1`. Bits are packed
//! MSB-first into five bytes — humidity ×2, temperature ×2, checksum.
//!
//! ## Inherited conversion quirks
//!
//! The conversion keeps two fallbacks observed on the deployed sensors:
//! a humidity above 100 %RH is replaced by the raw high byte, and a
//! temperature magnitude above 125 °C is replaced by the raw high byte
//! (sign bit included) before the sign is applied. These look like
//! workarounds for DHT11 frames decoded with DHT22 scaling. They are kept
//! as-is and pinned by tests; do not "fix" them without checking hardware.

use log::debug;

use crate::app::ports::{Direction, TimedLine};
use crate::error::DecodeError;

/// Level-change iterations per read cycle.
pub const MAX_TIMINGS: usize = 85;

/// Polling ticks (≈ µs) after which a level wait is abandoned.
pub const TICK_CAP: u32 = 255;

/// Bits in a complete frame (4 data bytes + checksum).
pub const FRAME_BITS: usize = 40;

const START_SIGNAL_LOW_MS: u32 = 18;
const RELEASE_WAIT_US: u32 = 40;
const FIRST_DATA_ITERATION: usize = 4;
/// High-phase length (ticks) above which a bit reads as `1`.
const ONE_THRESHOLD_TICKS: u32 = 46;

const HUMIDITY_MAX: f32 = 100.0;
const TEMPERATURE_MAX: f32 = 125.0;

// ───────────────────────────────────────────────────────────────
// Reading
// ───────────────────────────────────────────────────────────────

/// One validated sensor measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Relative humidity (%RH). Normally 0..=100; see the module docs for
    /// the raw-byte fallback.
    pub humidity: f32,
    /// Temperature (°C). Magnitude normally ≤ 125; see the module docs.
    pub temperature: f32,
}

impl Reading {
    pub fn fahrenheit(&self) -> f32 {
        self.temperature * 9.0 / 5.0 + 32.0
    }
}

// ───────────────────────────────────────────────────────────────
// Raw frame
// ───────────────────────────────────────────────────────────────

/// The five bytes of one transmission, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawFrame {
    bytes: [u8; 5],
}

impl RawFrame {
    /// Frame exactly as received: humidity high/low, temperature high/low,
    /// checksum.
    pub const fn new(bytes: [u8; 5]) -> Self {
        Self { bytes }
    }

    /// Frame carrying `data` with a correct checksum appended.
    pub fn with_checksum(data: [u8; 4]) -> Self {
        let [b0, b1, b2, b3] = data;
        Self::new([b0, b1, b2, b3, checksum(data)])
    }

    pub fn bytes(&self) -> [u8; 5] {
        self.bytes
    }

    /// True when the checksum byte equals the low 8 bits of the data sum.
    pub fn checksum_ok(&self) -> bool {
        let [b0, b1, b2, b3, sum] = self.bytes;
        sum == checksum([b0, b1, b2, b3])
    }

    /// Convert to engineering units. Does not check the checksum.
    pub fn to_reading(&self) -> Reading {
        let [b0, b1, b2, b3, _] = self.bytes;

        let mut humidity = f32::from(u16::from(b0) << 8 | u16::from(b1)) / 10.0;
        if humidity > HUMIDITY_MAX {
            humidity = f32::from(b0);
        }

        let mut temperature = f32::from(u16::from(b2 & 0x7F) << 8 | u16::from(b3)) / 10.0;
        if temperature > TEMPERATURE_MAX {
            temperature = f32::from(b2);
        }
        if b2 & 0x80 != 0 {
            temperature = -temperature;
        }

        Reading {
            humidity,
            temperature,
        }
    }
}

fn checksum(data: [u8; 4]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// MSB-first bit accumulator. Bits past the 40th are counted but dropped.
#[derive(Debug, Default)]
struct BitPacker {
    frame: [u8; 5],
    bits: usize,
}

impl BitPacker {
    fn push(&mut self, one: bool) {
        if self.bits < FRAME_BITS {
            let byte = &mut self.frame[self.bits / 8];
            *byte = (*byte << 1) | u8::from(one);
        }
        self.bits += 1;
    }
}

// ───────────────────────────────────────────────────────────────
// Decoder
// ───────────────────────────────────────────────────────────────

/// Run one complete read cycle on `line` and validate the result.
///
/// Never retries: a failure is reported and the caller decides when to try
/// again (the sensor needs ~2 s between start pulses anyway).
pub fn decode(line: &mut impl TimedLine) -> Result<Reading, DecodeError> {
    let frame = read_frame(line)?;
    if !frame.checksum_ok() {
        debug!("dht: checksum mismatch, frame={:02x?}", frame.bytes());
        return Err(DecodeError::ChecksumMismatch);
    }
    Ok(frame.to_reading())
}

/// Handshake plus timing-classification loop. Returns the raw frame once
/// 40 bits were collected; the checksum is not inspected here.
pub fn read_frame(line: &mut impl TimedLine) -> Result<RawFrame, DecodeError> {
    start_signal(line);

    let mut last = true;
    let mut packer = BitPacker::default();

    for i in 0..MAX_TIMINGS {
        let ticks = ticks_while(line, last);
        last = line.read();
        if ticks == TICK_CAP {
            // Normal end of frame once all 40 bits are in: the sensor
            // releases the line and it idles high.
            break;
        }
        if i >= FIRST_DATA_ITERATION && i % 2 == 0 {
            packer.push(ticks > ONE_THRESHOLD_TICKS);
        }
    }

    if packer.bits < FRAME_BITS {
        debug!("dht: timed out after {} bits", packer.bits);
        return Err(DecodeError::Timeout);
    }
    Ok(RawFrame::new(packer.frame))
}

fn start_signal(line: &mut impl TimedLine) {
    line.set_direction(Direction::Output);
    line.write(false);
    line.sleep_ms(START_SIGNAL_LOW_MS);
    line.set_direction(Direction::Input);
    line.sleep_us(RELEASE_WAIT_US);
}

/// Busy-poll while the line stays at `level`. Returns the ticks counted,
/// saturating at [`TICK_CAP`].
fn ticks_while(line: &mut impl TimedLine, level: bool) -> u32 {
    let mut ticks = 0;
    while line.read() == level {
        ticks += 1;
        line.sleep_us(1);
        if ticks == TICK_CAP {
            break;
        }
    }
    ticks
}

/// A sensor bound to its data line.
pub struct DhtSensor<L: TimedLine> {
    line: L,
}

impl<L: TimedLine> DhtSensor<L> {
    pub fn new(line: L) -> Self {
        Self { line }
    }

    /// See [`decode`].
    pub fn read(&mut self) -> Result<Reading, DecodeError> {
        decode(&mut self.line)
    }

    pub fn line(&self) -> &L {
        &self.line
    }
}
