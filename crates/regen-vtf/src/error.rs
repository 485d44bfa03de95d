//! Error types for VTF handling.

use thiserror::Error;

use regen_common::MipIndex;

use crate::ResourceKind;

/// Errors that can occur when working with VTF files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] regen_common::Error),

    /// Invalid VTF magic.
    #[error("invalid VTF magic: expected 'VTF\\0', got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Header version other than 7.5.
    #[error("VTF v{0}.{1} is not supported")]
    UnsupportedVersion(u32, u32),

    /// Resource table did not end where the header said it would.
    #[error("header size mismatch: header declares {declared} bytes, resource table ends at {actual}")]
    HeaderSizeMismatch { declared: usize, actual: usize },

    /// Image format code outside the known table.
    #[error("unknown VTF image format code {0}")]
    UnknownFormat(i32),

    /// Resource tag outside the known set.
    #[error("unknown resource tag {0:02X?}")]
    UnknownResource([u8; 3]),

    /// The same resource kind appears twice.
    #[error("duplicate {0:?} resource")]
    DuplicateResource(ResourceKind),

    /// Resource descriptor whose flags contradict its kind.
    #[error("invalid {kind:?} resource: {reason}")]
    InvalidResource {
        kind: ResourceKind,
        reason: &'static str,
    },

    /// A resource this operation needs is absent.
    #[error("missing {0:?} resource")]
    MissingResource(ResourceKind),

    /// A resource this crate can read but not produce.
    #[error("cannot write {0:?} resource")]
    UnsupportedResource(ResourceKind),

    /// Ambient table resource declared without table data, or vice versa.
    #[error("ambient table and CMA resource must both be present or both be absent")]
    MissingAmbientTable,

    /// Ambient table length disagrees with the frame count.
    #[error("ambient table holds {actual} bytes, expected {expected} for the frame count")]
    AmbientSizeMismatch { expected: usize, actual: usize },

    /// The header describes a texture the mip extraction cannot handle.
    #[error("precondition failed: {0}")]
    Precondition(&'static str),

    /// A mip inside the declared range has no data.
    #[error("missing mip data at {0}")]
    MissingMip(MipIndex),

    /// A mip has the wrong byte length for its level.
    #[error("mip {index} size mismatch: expected {expected}, got {actual}")]
    MipSizeMismatch {
        index: MipIndex,
        expected: usize,
        actual: usize,
    },
}

/// Result type for VTF operations.
pub type Result<T> = std::result::Result<T, Error>;
