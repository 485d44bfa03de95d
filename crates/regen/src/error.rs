//! Error types for cubemap conversion.

use thiserror::Error;

use regen_common::MipIndex;

/// Errors that can occur while converting between containers.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] regen_common::Error),

    /// DDS error.
    #[error("DDS: {0}")]
    Dds(#[from] regen_dds::Error),

    /// VTF error.
    #[error("VTF: {0}")]
    Vtf(#[from] regen_vtf::Error),

    /// Number of stored mipmaps disagrees with the header.
    #[error("mipmap count mismatch: expected {expected}, got {actual}")]
    MipCountMismatch { expected: usize, actual: usize },

    /// DDS array does not hold whole cubemaps.
    #[error("array size {0} is not a multiple of 6, not a cubemap array")]
    NotCubemaps(usize),

    /// A mip inside the chain bounds has no data.
    #[error("missing mip data at {0}")]
    MissingMip(MipIndex),

    /// Source texture does not have the shape the conversion expects.
    #[error("unexpected {field}: expected {expected}, got {actual}")]
    UnexpectedSource {
        field: &'static str,
        expected: String,
        actual: String,
    },

    /// Probe list and cubemap count disagree.
    #[error("{probes} probes given for {cubemaps} cubemaps")]
    ProbeCountMismatch { probes: usize, cubemaps: usize },
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;
