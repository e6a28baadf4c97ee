//! Unified error type for hidlink.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.
//!
//! The transfer state machine itself never fails: exhausted streams end a
//! transfer early and unknown requests are left to the transport to stall.
//! Errors only surface at the edges - parsing what the transport hands us
//! and pushing into a bounded FIFO.

use core::fmt;

/// Crate result type.
pub type Result<T> = core::result::Result<T, Error>;

/// Top-level error type used across the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A setup packet must be exactly 8 bytes; fewer were supplied.
    ShortSetupPacket,

    /// The serial FIFO is full; the byte was dropped.
    FifoFull,

    /// The programmer's outgoing queue is full; the byte was not queued.
    BufferOverflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ShortSetupPacket => f.write_str("setup packet shorter than 8 bytes"),
            Error::FifoFull => f.write_str("serial FIFO full"),
            Error::BufferOverflow => f.write_str("queue full"),
        }
    }
}
