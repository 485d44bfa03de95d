//! Error types for regen-common.

use thiserror::Error;

use crate::MipIndex;

/// Common error type for regen operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer at {position}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        position: usize,
        needed: usize,
        available: usize,
    },

    /// A constant header field did not hold its expected value.
    #[error("unexpected value for {field}: expected {expected}, got {actual}")]
    ExpectedValue {
        field: &'static str,
        expected: String,
        actual: String,
    },

    /// Mip index lies outside the bounds of a chain.
    #[error("mip index {index} out of range for {levels}x{slots}x{faces} chain")]
    MipOutOfRange {
        index: MipIndex,
        levels: usize,
        slots: usize,
        faces: usize,
    },

    /// Mip level count exceeds what a texture of this kind can hold.
    #[error("too many mip levels: {count} (max {max})")]
    TooManyLevels { count: usize, max: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
