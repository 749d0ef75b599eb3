//! Error types for strip and shelf operations.
//!
//! Out-of-bounds indices and ranges reject the operation and leave the
//! buffer untouched. Invalid geometry is clamped with a logged warning
//! instead of failing, so it never appears here. Hardware failures leave
//! the strip disconnected; there is no automatic retry.

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Failure of a strip or shelf operation.
#[derive(Debug, Error)]
pub enum Error {
    /// An LED or compartment index beyond the addressable length.
    #[error("index {index} out of bounds (length {count})")]
    IndexOutOfBounds { index: usize, count: usize },

    /// An inclusive LED range that is inverted or beyond the strip.
    #[error("range {first}..={last} out of bounds (length {count})")]
    RangeOutOfBounds {
        first: usize,
        last: usize,
        count: usize,
    },

    /// A brightness value above the 5-bit protocol maximum.
    #[error("brightness {value} exceeds maximum {max}")]
    BrightnessOutOfBounds { value: u8, max: u8 },

    /// Pixel storage could not be grown; the prior buffer is preserved.
    #[error("failed to allocate pixel storage")]
    Allocation(#[from] TryReserveError),

    /// The LED device could not be opened or configured.
    #[error("LED device unavailable: {0}")]
    Device(#[source] io::Error),

    /// The hardware write call failed outright.
    #[error("SPI transfer failed: {0}")]
    Transfer(#[source] io::Error),

    /// The hardware write call moved fewer bytes than requested.
    #[error("short SPI transfer: wrote {written} of {expected} bytes")]
    ShortTransfer { written: usize, expected: usize },

    /// `restore` was called without a saved snapshot.
    #[error("no saved strip state to restore")]
    NothingSaved,
}
