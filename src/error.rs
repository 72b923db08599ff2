//! Unified error types for the HumidAlarm firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! task loops' error handling uniform. All variants are `Copy` so they can
//! be passed through events and logs without allocation. Nothing here is
//! fatal: every failure is handled locally by skipping a cycle or dropping
//! a sample.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor frame could not be decoded.
    Decode(DecodeError),
    /// The sample channel refused or failed to deliver a reading.
    Channel(ChannelError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "decode: {e}"),
            Self::Channel(e) => write!(f, "channel: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

/// Failures of a single sensor read cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A line-level wait hit the tick cap before 40 bits were collected.
    Timeout,
    /// A full frame arrived but its checksum byte did not match.
    ChecksumMismatch,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "line timeout"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Channel errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// Producer could not enqueue within its timeout; the reading is dropped.
    Full,
    /// Consumer's wait elapsed with nothing delivered.
    Timeout,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "channel full"),
            Self::Timeout => write!(f, "receive timed out"),
        }
    }
}

impl From<ChannelError> for Error {
    fn from(e: ChannelError) -> Self {
        Self::Channel(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
