//! VTF image formats and texture flags.

use bitflags::bitflags;
use regen_common::MipProfile;

use crate::{Error, Result};

/// Image formats a VTF header may declare.
///
/// The Source engine table, plus the BC6H format later engine branches
/// added for HDR cubemaps.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(i32)]
pub enum VtfFormat {
    NONE = -1,
    RGBA_8888 = 0,
    ABGR_8888 = 1,
    RGB_888 = 2,
    BGR_888 = 3,
    RGB_565 = 4,
    I_8 = 5,
    IA_88 = 6,
    P_8 = 7,
    A_8 = 8,
    RGB_888_BLUESCREEN = 9,
    BGR_888_BLUESCREEN = 10,
    ARGB_8888 = 11,
    BGRA_8888 = 12,
    DXT1 = 13,
    DXT3 = 14,
    DXT5 = 15,
    BGRX_8888 = 16,
    BGR_565 = 17,
    BGRX_5551 = 18,
    BGRA_4444 = 19,
    DXT1_ONE_BIT_ALPHA = 20,
    BGRA_5551 = 21,
    UV_88 = 22,
    UVWQ_8888 = 23,
    RGBA_16161616F = 24,
    RGBA_16161616 = 25,
    UVLX_8888 = 26,
    R_32F = 27,
    RGB_323232F = 28,
    RGBA_32323232F = 29,
    NV_DST16 = 30,
    NV_DST24 = 31,
    NV_INTZ = 32,
    NV_RAWZ = 33,
    ATI_DST16 = 34,
    ATI_DST24 = 35,
    NV_NULL = 36,
    ATI2N = 37,
    ATI1N = 38,
    /// r2 / r5 `cubemaps.hdr.vtf` only.
    BC6H_UF16 = 66,
}

impl VtfFormat {
    /// The numeric format code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Per-level byte layout, for the format and size combinations whose
    /// mips can be extracted.
    ///
    /// Two profiles are known: 64x64 RGBA8888 (r1 cubemaps) and 256x256
    /// BC6H (r2 cubemaps). Anything else yields `None`.
    pub fn mip_profile(self, width: u16, height: u16) -> Option<MipProfile> {
        match (self, width, height) {
            (Self::RGBA_8888, 64, 64) => Some(MipProfile::RGBA8888),
            (Self::BC6H_UF16, 256, 256) => Some(MipProfile::BC6H),
            _ => None,
        }
    }
}

impl TryFrom<i32> for VtfFormat {
    type Error = Error;

    fn try_from(code: i32) -> Result<Self> {
        const TABLE: [VtfFormat; 39] = [
            VtfFormat::RGBA_8888,
            VtfFormat::ABGR_8888,
            VtfFormat::RGB_888,
            VtfFormat::BGR_888,
            VtfFormat::RGB_565,
            VtfFormat::I_8,
            VtfFormat::IA_88,
            VtfFormat::P_8,
            VtfFormat::A_8,
            VtfFormat::RGB_888_BLUESCREEN,
            VtfFormat::BGR_888_BLUESCREEN,
            VtfFormat::ARGB_8888,
            VtfFormat::BGRA_8888,
            VtfFormat::DXT1,
            VtfFormat::DXT3,
            VtfFormat::DXT5,
            VtfFormat::BGRX_8888,
            VtfFormat::BGR_565,
            VtfFormat::BGRX_5551,
            VtfFormat::BGRA_4444,
            VtfFormat::DXT1_ONE_BIT_ALPHA,
            VtfFormat::BGRA_5551,
            VtfFormat::UV_88,
            VtfFormat::UVWQ_8888,
            VtfFormat::RGBA_16161616F,
            VtfFormat::RGBA_16161616,
            VtfFormat::UVLX_8888,
            VtfFormat::R_32F,
            VtfFormat::RGB_323232F,
            VtfFormat::RGBA_32323232F,
            VtfFormat::NV_DST16,
            VtfFormat::NV_DST24,
            VtfFormat::NV_INTZ,
            VtfFormat::NV_RAWZ,
            VtfFormat::ATI_DST16,
            VtfFormat::ATI_DST24,
            VtfFormat::NV_NULL,
            VtfFormat::ATI2N,
            VtfFormat::ATI1N,
        ];

        match code {
            -1 => Ok(Self::NONE),
            66 => Ok(Self::BC6H_UF16),
            0..=38 => Ok(TABLE[code as usize]),
            other => Err(Error::UnknownFormat(other)),
        }
    }
}

bitflags! {
    /// Texture flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct VtfFlags: u32 {
        const POINT_SAMPLE = 0x0000_0001;
        const TRILINEAR = 0x0000_0002;
        const CLAMP_S = 0x0000_0004;
        const CLAMP_T = 0x0000_0008;
        const ANISOTROPIC = 0x0000_0010;
        const HINT_DXT5 = 0x0000_0020;
        const PWL_CORRECTED = 0x0000_0040;
        const NORMAL = 0x0000_0080;
        const NO_MIP = 0x0000_0100;
        const NO_LOD = 0x0000_0200;
        const ALL_MIPS = 0x0000_0400;
        const PROCEDURAL = 0x0000_0800;
        const ONE_BIT_ALPHA = 0x0000_1000;
        const EIGHT_BIT_ALPHA = 0x0000_2000;
        const ENVMAP = 0x0000_4000;
        const RENDER_TARGET = 0x0000_8000;
        const DEPTH_RENDER_TARGET = 0x0001_0000;
        const NO_DEBUG_OVERRIDE = 0x0002_0000;
        const SINGLE_COPY = 0x0004_0000;
        const PRE_SRGB = 0x0008_0000;
        const NO_DEPTH_BUFFER = 0x0080_0000;
        const CLAMP_U = 0x0200_0000;
        const VERTEX_TEXTURE = 0x0400_0000;
        const SSBUMP = 0x0800_0000;
        const BORDER = 0x2000_0000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_codes_round_trip() {
        for code in (-1..=38).chain([66]) {
            assert_eq!(VtfFormat::try_from(code).unwrap().code(), code);
        }
    }

    #[test]
    fn test_unknown_format_code() {
        assert!(matches!(VtfFormat::try_from(39), Err(Error::UnknownFormat(39))));
        assert!(matches!(VtfFormat::try_from(-2), Err(Error::UnknownFormat(-2))));
    }

    #[test]
    fn test_known_profiles() {
        assert_eq!(
            VtfFormat::BC6H_UF16.mip_profile(256, 256),
            Some(MipProfile::BC6H)
        );
        assert_eq!(
            VtfFormat::RGBA_8888.mip_profile(64, 64),
            Some(MipProfile::RGBA8888)
        );
        assert_eq!(VtfFormat::BC6H_UF16.mip_profile(128, 128), None);
        assert_eq!(VtfFormat::DXT5.mip_profile(32, 32), None);
    }

    #[test]
    fn test_unknown_flag_bits_are_kept() {
        let flags = VtfFlags::from_bits_retain(0x4000 | 0x0010_0000);
        assert!(flags.contains(VtfFlags::ENVMAP));
        assert_eq!(flags.bits(), 0x0010_4000);
    }
}
