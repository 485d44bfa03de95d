//! Error types for DDS handling.

use thiserror::Error;

use crate::DxgiFormat;

/// Errors that can occur when working with DDS files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] regen_common::Error),

    /// Invalid DDS magic.
    #[error("invalid DDS magic: expected 'DDS ', got {0:?}")]
    InvalidMagic([u8; 4]),

    /// DXGI format code outside the known table.
    #[error("unknown DXGI format code {0}")]
    UnknownFormat(u32),

    /// Known format whose mip layout this crate cannot compute.
    #[error("unsupported pixel format {0:?}: mip sizes unknown, cannot extract mipmaps")]
    UnsupportedFormat(DxgiFormat),

    /// Number of stored mipmaps disagrees with the header.
    #[error("mipmap count mismatch: expected {expected}, got {actual}")]
    MipCountMismatch { expected: usize, actual: usize },

    /// A stored mipmap has the wrong byte length for its level.
    #[error("mipmap {index} size mismatch: expected {expected}, got {actual}")]
    MipSizeMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Result type for DDS operations.
pub type Result<T> = std::result::Result<T, Error>;
