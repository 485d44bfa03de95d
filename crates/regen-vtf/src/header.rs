//! VTF header structures.

use regen_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::Result;

/// VTF 7.5 header, the 80 bytes preceding the resource table.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct VtfHeader {
    /// "VTF\0".
    pub magic: [u8; 4],
    /// Major, minor.
    pub version: [u32; 2],
    /// Header plus resource table, in bytes.
    pub header_size: u32,
    pub width: u16,
    pub height: u16,
    pub flags: u32,
    pub frame_count: u16,
    pub first_frame: u16,
    pub padding0: [u8; 4],
    pub reflectivity: [f32; 3],
    pub padding1: [u8; 4],
    pub bump_scale: f32,
    pub format: u32,
    pub mip_count: u8,
    pub low_res_format: i32,
    pub low_res_width: u8,
    pub low_res_height: u8,
    /// v7.2+
    pub mip_depth: u16,
    /// v7.3+
    pub padding2: [u8; 3],
    pub resource_count: u32,
    pub padding3: [u8; 8],
}

impl VtfHeader {
    /// Size of the fixed part of the header.
    pub const SIZE: usize = 80;

    /// Total header size for a given number of resources.
    pub const fn size_with_resources(resource_count: usize) -> usize {
        Self::SIZE + resource_count * RawResource::SIZE
    }

    /// Check that all padding is zero.
    pub fn validate_padding(&self) -> Result<()> {
        let Self {
            padding0,
            padding1,
            padding2,
            padding3,
            ..
        } = *self;

        BinaryReader::check("padding after first frame", [0u8; 4], padding0)?;
        BinaryReader::check("padding after reflectivity", [0u8; 4], padding1)?;
        BinaryReader::check("padding after mip depth", [0u8; 3], padding2)?;
        BinaryReader::check("padding after resource count", [0u8; 8], padding3)?;
        Ok(())
    }
}

/// One resource table entry as stored on disk.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct RawResource {
    pub tag: [u8; 3],
    pub flags: u8,
    /// Offset, checksum or inline value, depending on `tag` and `flags`.
    pub data: u32,
}

impl RawResource {
    pub const SIZE: usize = 8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_sizes() {
        assert_eq!(std::mem::size_of::<VtfHeader>(), VtfHeader::SIZE);
        assert_eq!(std::mem::size_of::<RawResource>(), RawResource::SIZE);
        assert_eq!(VtfHeader::size_with_resources(2), 96);
    }
}
