//! DDS cubemap face handling.
//!
//! Reads and writes the DX10 DDS files that carry BC6H HDR cubemaps:
//!
//! - 148 byte header (`DDS ` magic, 124 byte header, 20 byte DX10 header)
//! - one mip chain per array slot, each stored smallest level first
//!
//! Every header field other than size, mip count, format, resource
//! dimension, misc flag and array size is a constant and is rejected if it
//! differs.
//!
//! # Example
//!
//! ```no_run
//! use regen_dds::DdsTexture;
//!
//! let dds = DdsTexture::from_file("cubemaps_hdr.dds")?;
//! println!("{}x{}, {} slots", dds.width, dds.height, dds.array_size);
//! dds.write_to_file("copy.dds")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod header;
mod texture;

pub use error::{Error, Result};
pub use header::{DdsHeader, DdsHeaderDxt10, DdsPixelFormat, DxgiFormat, FourCC, HEADER_LEN};
pub use texture::DdsTexture;

/// DDS file magic bytes ("DDS ").
pub const DDS_MAGIC: &[u8; 4] = b"DDS ";
