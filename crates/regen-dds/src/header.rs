//! DDS header structures.
//!
//! Only one header shape is accepted: a DX10 header describing a single
//! BC6H cubemap face. Every field that is not a texture property is a
//! constant and is checked on read.

use regen_common::{BinaryReader, MipProfile};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result};

/// DDS file header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsHeader {
    /// Header size (always 124).
    pub size: u32,
    /// Header flags.
    pub flags: u32,
    /// Image height.
    pub height: u32,
    /// Image width.
    pub width: u32,
    /// Pitch or linear size.
    pub pitch_or_linear_size: u32,
    /// Depth.
    pub depth: u32,
    /// Number of mipmap levels.
    pub mipmap_count: u32,
    /// Reserved.
    pub reserved1: [u32; 11],
    /// Pixel format.
    pub pixel_format: DdsPixelFormat,
    /// Surface capabilities.
    pub caps: u32,
    /// Surface capabilities 2.
    pub caps2: u32,
    /// Surface capabilities 3.
    pub caps3: u32,
    /// Surface capabilities 4.
    pub caps4: u32,
    /// Reserved.
    pub reserved2: u32,
}

impl DdsHeader {
    /// Expected header size.
    pub const SIZE: u32 = 124;
    /// CAPS | HEIGHT | WIDTH | PIXELFORMAT | MIPMAPCOUNT | LINEARSIZE
    pub const FLAGS: u32 = 0x000A_1007;
    pub const PITCH_OR_LINEAR_SIZE: u32 = 0x0001_0000;
    pub const DEPTH: u32 = 1;
    /// COMPLEX | TEXTURE | MIPMAP
    pub const CAPS: u32 = 0x0040_1008;

    /// Header for a face of the given size and mip count.
    pub fn new(width: u32, height: u32, mipmap_count: u32) -> Self {
        Self {
            size: Self::SIZE,
            flags: Self::FLAGS,
            height,
            width,
            pitch_or_linear_size: Self::PITCH_OR_LINEAR_SIZE,
            depth: Self::DEPTH,
            mipmap_count,
            reserved1: [0; 11],
            pixel_format: DdsPixelFormat::dx10(),
            caps: Self::CAPS,
            caps2: 0,
            caps3: 0,
            caps4: 0,
            reserved2: 0,
        }
    }

    /// Check if this is a DX10 extended header.
    pub fn is_dx10(&self) -> bool {
        self.pixel_format.four_cc == FourCC::DX10
    }

    /// Check every constant field against the values this codec writes.
    pub fn validate(&self) -> Result<()> {
        let Self {
            size,
            flags,
            pitch_or_linear_size,
            depth,
            reserved1,
            pixel_format,
            caps,
            caps2,
            caps3,
            caps4,
            reserved2,
            ..
        } = *self;

        BinaryReader::check("header size", Self::SIZE, size)?;
        BinaryReader::check("header flags", Self::FLAGS, flags)?;
        BinaryReader::check(
            "pitch or linear size",
            Self::PITCH_OR_LINEAR_SIZE,
            pitch_or_linear_size,
        )?;
        BinaryReader::check("depth", Self::DEPTH, depth)?;
        BinaryReader::check("reserved1", [0u32; 11], reserved1)?;
        pixel_format.validate()?;
        BinaryReader::check("caps", Self::CAPS, caps)?;
        BinaryReader::check("caps2..caps4", [0u32; 3], [caps2, caps3, caps4])?;
        BinaryReader::check("reserved2", 0, reserved2)?;
        Ok(())
    }
}

/// DDS pixel format.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsPixelFormat {
    /// Structure size (always 32).
    pub size: u32,
    /// Pixel format flags.
    pub flags: u32,
    /// Four-character code for compression.
    pub four_cc: FourCC,
    /// Number of bits per pixel (for uncompressed).
    pub rgb_bit_count: u32,
    /// Red bit mask.
    pub r_bit_mask: u32,
    /// Green bit mask.
    pub g_bit_mask: u32,
    /// Blue bit mask.
    pub b_bit_mask: u32,
    /// Alpha bit mask.
    pub a_bit_mask: u32,
}

impl DdsPixelFormat {
    pub const SIZE: u32 = 32;
    /// `four_cc` is valid.
    pub const FLAG_FOURCC: u32 = 0x04;

    /// Pixel format that defers to the DX10 extended header.
    pub const fn dx10() -> Self {
        Self {
            size: Self::SIZE,
            flags: Self::FLAG_FOURCC,
            four_cc: FourCC::DX10,
            rgb_bit_count: 0,
            r_bit_mask: 0,
            g_bit_mask: 0,
            b_bit_mask: 0,
            a_bit_mask: 0,
        }
    }

    fn validate(&self) -> Result<()> {
        let Self {
            size,
            flags,
            four_cc,
            rgb_bit_count,
            r_bit_mask,
            g_bit_mask,
            b_bit_mask,
            a_bit_mask,
        } = *self;

        BinaryReader::check("pixel format size", Self::SIZE, size)?;
        BinaryReader::check("pixel format flags", Self::FLAG_FOURCC, flags)?;
        BinaryReader::check("four cc", FourCC::DX10, four_cc)?;
        BinaryReader::check(
            "pixel format masks",
            [0u32; 5],
            [rgb_bit_count, r_bit_mask, g_bit_mask, b_bit_mask, a_bit_mask],
        )?;
        Ok(())
    }
}

/// Four-character code for compression type.
#[derive(Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(transparent)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// DX10 extended header.
    pub const DX10: Self = Self(*b"DX10");
}

impl std::fmt::Debug for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

/// DX10 extended header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsHeaderDxt10 {
    /// DXGI format.
    pub dxgi_format: u32,
    /// Resource dimension.
    pub resource_dimension: u32,
    /// Misc flags.
    pub misc_flag: u32,
    /// Array size.
    pub array_size: u32,
    /// Misc flags 2 (reserved).
    pub misc_flags2: u32,
}

impl DdsHeaderDxt10 {
    /// `D3D10_RESOURCE_DIMENSION_TEXTURE2D`
    pub const TEXTURE2D: u32 = 3;
    /// `D3D11_RESOURCE_MISC_TEXTURECUBE`
    pub const MISC_TEXTURECUBE: u32 = 0x04;
}

/// Offset of the first mipmap: magic + header + DX10 header.
pub const HEADER_LEN: usize =
    4 + std::mem::size_of::<DdsHeader>() + std::mem::size_of::<DdsHeaderDxt10>();

/// DXGI formats a DDS file may declare.
///
/// Only [`DxgiFormat::BC6H_UF16`] has a known mip layout; the rest exist so
/// headers carrying them can be named in errors and reports.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u32)]
pub enum DxgiFormat {
    R32G32B32A32_FLOAT = 2,
    R16G16B16A16_FLOAT = 10,
    R8G8B8A8_UNORM = 28,
    R8G8B8A8_UNORM_SRGB = 29,
    BC1_UNORM = 71,
    BC1_UNORM_SRGB = 72,
    BC2_UNORM = 74,
    BC2_UNORM_SRGB = 75,
    BC3_UNORM = 77,
    BC3_UNORM_SRGB = 78,
    BC4_UNORM = 80,
    BC4_SNORM = 81,
    BC5_UNORM = 83,
    BC5_SNORM = 84,
    B8G8R8A8_UNORM = 87,
    BC6H_UF16 = 95,
    BC6H_SF16 = 96,
    BC7_UNORM = 98,
    BC7_UNORM_SRGB = 99,
}

impl DxgiFormat {
    /// The numeric DXGI code.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Per-level byte layout, for formats whose mips can be extracted.
    pub fn mip_profile(self) -> Option<MipProfile> {
        match self {
            Self::BC6H_UF16 => Some(MipProfile::BC6H),
            _ => None,
        }
    }
}

impl TryFrom<u32> for DxgiFormat {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self> {
        Ok(match code {
            2 => Self::R32G32B32A32_FLOAT,
            10 => Self::R16G16B16A16_FLOAT,
            28 => Self::R8G8B8A8_UNORM,
            29 => Self::R8G8B8A8_UNORM_SRGB,
            71 => Self::BC1_UNORM,
            72 => Self::BC1_UNORM_SRGB,
            74 => Self::BC2_UNORM,
            75 => Self::BC2_UNORM_SRGB,
            77 => Self::BC3_UNORM,
            78 => Self::BC3_UNORM_SRGB,
            80 => Self::BC4_UNORM,
            81 => Self::BC4_SNORM,
            83 => Self::BC5_UNORM,
            84 => Self::BC5_SNORM,
            87 => Self::B8G8R8A8_UNORM,
            95 => Self::BC6H_UF16,
            96 => Self::BC6H_SF16,
            98 => Self::BC7_UNORM,
            99 => Self::BC7_UNORM_SRGB,
            other => return Err(Error::UnknownFormat(other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_len() {
        assert_eq!(std::mem::size_of::<DdsHeader>(), DdsHeader::SIZE as usize);
        assert_eq!(std::mem::size_of::<DdsPixelFormat>(), DdsPixelFormat::SIZE as usize);
        assert_eq!(HEADER_LEN, 148);
    }

    #[test]
    fn test_new_header_validates() {
        let header = DdsHeader::new(256, 256, 9);
        assert!(header.is_dx10());
        assert!(header.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_changed_constant() {
        let mut header = DdsHeader::new(256, 256, 9);
        header.caps = 0x1000;
        assert!(matches!(
            header.validate(),
            Err(Error::Common(regen_common::Error::ExpectedValue { field: "caps", .. }))
        ));
    }

    #[test]
    fn test_dxgi_format_codes() {
        assert_eq!(DxgiFormat::BC6H_UF16.code(), 0x5F);
        assert_eq!(DxgiFormat::try_from(0x5F).unwrap(), DxgiFormat::BC6H_UF16);
        assert!(matches!(DxgiFormat::try_from(1), Err(Error::UnknownFormat(1))));
    }

    #[test]
    fn test_only_bc6h_has_profile() {
        assert_eq!(DxgiFormat::BC6H_UF16.mip_profile(), Some(MipProfile::BC6H));
        assert_eq!(DxgiFormat::BC7_UNORM.mip_profile(), None);
    }
}
