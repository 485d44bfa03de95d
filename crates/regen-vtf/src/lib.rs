//! VTF cubemap texture handling.
//!
//! Reads and writes version 7.5 Valve texture files holding HDR
//! environment maps:
//!
//! - 80 byte header followed by a table of 8 byte resource entries
//! - an optional CMA resource: one ambient multiplier per cubemap, inline
//!   in its entry for a single cubemap, out of line otherwise
//! - the image data resource, always last, holding every mip of every face
//!   of every cubemap, smallest level first
//!
//! # Example
//!
//! ```no_run
//! use regen_vtf::VtfTexture;
//!
//! let vtf = VtfTexture::from_file("cubemaps.hdr.vtf")?;
//! println!("{} cubemaps, {:?}", vtf.frame_count, vtf.format);
//! if let Some(table) = &vtf.ambient {
//!     println!("ambient: {:?}", table.values);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod format;
mod header;
mod resource;
mod texture;

pub use error::{Error, Result};
pub use format::{VtfFlags, VtfFormat};
pub use header::{RawResource, VtfHeader};
pub use resource::{AmbientTable, Resource, ResourceFlags, ResourceKind, ResourcePayload};
pub use texture::{VtfTexture, VERSION};

/// VTF file magic bytes ("VTF\0").
pub const VTF_MAGIC: &[u8; 4] = b"VTF\0";
