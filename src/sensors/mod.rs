//! Sensor subsystem — the DHT decoder and the sampling step the sensor task
//! runs each period.
//!
//! A read failure or a full channel is reported and skipped; the next
//! period simply tries again. Nothing here retries on its own.

pub mod dht;

use core::time::Duration;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, TimedLine};
use crate::channel::SampleChannel;
use crate::error::Result;
use dht::{DhtSensor, Reading};

/// Producer side of the sample channel.
pub struct SensorSampler<L: TimedLine> {
    sensor: DhtSensor<L>,
    send_timeout: Duration,
}

impl<L: TimedLine> SensorSampler<L> {
    pub fn new(line: L, send_timeout: Duration) -> Self {
        Self {
            sensor: DhtSensor::new(line),
            send_timeout,
        }
    }

    /// One read cycle: decode a frame and enqueue the reading.
    ///
    /// Only checksum-valid readings ever reach the channel.
    pub fn sample_once(
        &mut self,
        channel: &SampleChannel,
        sink: &mut impl EventSink,
    ) -> Result<Reading> {
        let start_us = self.sensor.line().now_us();

        let reading = match self.sensor.read() {
            Ok(r) => r,
            Err(e) => {
                sink.emit(&AppEvent::DecodeFailed(e));
                return Err(e.into());
            }
        };

        if let Err(e) = channel.send(reading, self.send_timeout) {
            sink.emit(&AppEvent::ReadingDropped(reading));
            return Err(e.into());
        }

        let elapsed_ms = self.sensor.line().now_us().saturating_sub(start_us) / 1000;
        sink.emit(&AppEvent::ReadingTaken {
            reading,
            elapsed_ms,
        });
        Ok(reading)
    }
}
