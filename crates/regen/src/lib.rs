//! Regen - cubemap conversion between Titanfall 2 and Apex Legends maps.
//!
//! Titanfall 2 ships a map's cubemaps as one `cubemaps.hdr.vtf`; Apex
//! Legends ships the same data as a BC6H DDS array of every face. This
//! crate converts between the two.
//!
//! # Crates
//!
//! - [`regen_common`] - binary reading, mip chain indexing, block sizes
//! - [`regen_dds`] - DX10 DDS files
//! - [`regen_vtf`] - VTF 7.5 environment maps and their ambient table
//!
//! # Example
//!
//! ```no_run
//! use regen::prelude::*;
//!
//! let dds = DdsTexture::from_file("cubemaps_hdr.dds")?;
//! let vtf = upgrade(&dds, None)?;
//! vtf.write_to_file("cubemaps.hdr.vtf")?;
//!
//! for face in downgrade(&vtf)? {
//!     face.texture.write_to_file(face.file_name("cubemaps.hdr.vtf"))?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod convert;
mod error;
pub mod probe;
pub mod remap;

pub use regen_common as common;
pub use regen_dds as dds;
pub use regen_vtf as vtf;

pub use error::{Error, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::convert::{downgrade, to_dds_array, upgrade, FaceTexture};
    pub use crate::probe::CubemapProbe;
    pub use regen_common::{MipChain, MipIndex, MipProfile};
    pub use regen_dds::{DdsTexture, DxgiFormat};
    pub use regen_vtf::{AmbientTable, VtfFlags, VtfFormat, VtfTexture};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
