//! Sample channel between the sensor task and the alarm task.
//!
//! Wraps an `embassy-sync` bounded MPMC channel so both blocking tasks
//! can share it without heap allocation. The channel is the only ordering
//! guarantee in the system: readings are delivered in the order they were
//! sent, and nothing is duplicated or lost except by an explicit
//! drop-on-full that the producer is told about.
//!
//! ```text
//! ┌──────────────┐   Reading (cap 10)   ┌──────────────┐
//! │ Sensor Task  │─────────────────────▶│  Alarm Task  │
//! │ send+timeout │                      │ receive      │
//! └──────────────┘                      └──────────────┘
//! ```

use core::time::Duration;

use async_io_mini::Timer;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use futures_lite::future::{block_on, or};

use crate::error::ChannelError;
use crate::sensors::dht::Reading;

/// Channel depth: readings buffered while the alarm task is busy.
pub const SAMPLE_CHANNEL_DEPTH: usize = 10;

/// Bounded FIFO of [`Reading`]s.
///
/// `new` is `const`, so the firmware keeps one in a `static` and hands
/// `&'static` references to each task.
pub struct SampleChannel {
    inner: Channel<CriticalSectionRawMutex, Reading, SAMPLE_CHANNEL_DEPTH>,
}

impl Default for SampleChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleChannel {
    pub const fn new() -> Self {
        Self {
            inner: Channel::new(),
        }
    }

    /// Enqueue `reading`, waiting up to `timeout` for space.
    ///
    /// A zero timeout makes a single attempt. On [`ChannelError::Full`] the
    /// reading has been dropped.
    pub fn send(&self, reading: Reading, timeout: Duration) -> Result<(), ChannelError> {
        // `or` polls the send first, so free space always wins over an
        // already-expired timer.
        block_on(or(
            async {
                self.inner.send(reading).await;
                Ok(())
            },
            async {
                Timer::after(timeout).await;
                Err(ChannelError::Full)
            },
        ))
    }

    /// Dequeue the oldest reading.
    ///
    /// `None` as timeout blocks until a reading arrives. With a bound,
    /// returns `None` once it elapses with nothing delivered.
    pub fn receive(&self, timeout: Option<Duration>) -> Option<Reading> {
        let Some(timeout) = timeout else {
            return Some(block_on(self.inner.receive()));
        };

        block_on(or(async { Some(self.inner.receive().await) }, async {
            Timer::after(timeout).await;
            None
        }))
    }

    /// Non-blocking dequeue.
    pub fn try_receive(&self) -> Option<Reading> {
        self.inner.try_receive().ok()
    }

    /// Readings currently buffered.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
