//! Reading and writing DDS cubemap faces.

use std::fs;
use std::path::Path;

use regen_common::{disk_order, BinaryReader, IntoBytes};
use tracing::debug;

use crate::header::{DdsHeader, DdsHeaderDxt10, DxgiFormat, HEADER_LEN};
use crate::{Error, Result, DDS_MAGIC};

/// A DX10 DDS texture holding one mip chain per array slot.
///
/// Mipmaps are kept largest first: `mipmaps[slot * mip_count + level]`,
/// level 0 being the full resolution image. The file stores each slot's
/// chain smallest first.
///
/// `height` is the header dword at offset 12 and `width` the one at 16,
/// the order the DDS format defines. Other tools that read offset 12 as
/// width disagree only on non-square textures.
///
/// Files written by this crate hold a single cube face (`array_size` 1,
/// `misc_flag` 0) rather than a native 6-face cubemap, which common
/// viewers fail to open.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DdsTexture {
    pub width: u32,
    pub height: u32,
    pub mip_count: u32,
    pub format: DxgiFormat,
    /// Always 3 (`TEXTURE2D`) for the files this crate handles.
    pub resource_dimension: u32,
    pub misc_flag: u32,
    pub array_size: u32,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub mipmaps: Vec<Vec<u8>>,
}

impl Default for DdsTexture {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            mip_count: 0,
            format: DxgiFormat::BC6H_UF16,
            resource_dimension: DdsHeaderDxt10::TEXTURE2D,
            misc_flag: 0,
            array_size: 1,
            mipmaps: Vec::new(),
        }
    }
}

impl DdsTexture {
    /// Create an empty single-face texture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a DDS file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        Self::parse(&data)
    }

    /// Parse a DDS file from bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);

        let magic: [u8; 4] = reader.read_array()?;
        if &magic != DDS_MAGIC {
            return Err(Error::InvalidMagic(magic));
        }

        let header: DdsHeader = reader.read_struct()?;
        header.validate()?;
        let dx10: DdsHeaderDxt10 = reader.read_struct()?;
        BinaryReader::check("misc flags 2", 0, dx10.misc_flags2)?;

        let mut texture = Self {
            width: header.width,
            height: header.height,
            mip_count: header.mipmap_count,
            format: DxgiFormat::try_from(dx10.dxgi_format)?,
            resource_dimension: dx10.resource_dimension,
            misc_flag: dx10.misc_flag,
            array_size: dx10.array_size,
            mipmaps: Vec::new(),
        };

        debug!(
            width = texture.width,
            height = texture.height,
            mip_count = texture.mip_count,
            format = ?texture.format,
            array_size = texture.array_size,
            "parsed DDS header"
        );

        let sizes = texture.level_sizes()?;
        let mip_count = sizes.len();
        let needed = (texture.array_size as usize)
            .checked_mul(sizes.iter().sum())
            .unwrap_or(usize::MAX);
        if needed > reader.remaining() {
            return Err(regen_common::Error::UnexpectedEof {
                position: reader.position(),
                needed,
                available: reader.remaining(),
            }
            .into());
        }
        texture.mipmaps = Vec::with_capacity(texture.array_size as usize * mip_count);

        for _ in 0..texture.array_size {
            let mut chain = vec![Vec::new(); mip_count];
            for level in disk_order(mip_count) {
                chain[level] = reader.read_bytes(sizes[level])?.to_vec();
            }
            texture.mipmaps.extend(chain);
        }

        if !reader.is_empty() {
            debug!(trailing = reader.remaining(), "ignoring bytes after last mipmap");
        }

        Ok(texture)
    }

    /// Byte length of each level, largest first.
    pub fn level_sizes(&self) -> Result<Vec<usize>> {
        let profile = self
            .format
            .mip_profile()
            .ok_or(Error::UnsupportedFormat(self.format))?;
        Ok(profile.level_sizes(self.mip_count as usize)?)
    }

    /// Get one mip level of one array slot.
    pub fn mip(&self, slot: usize, level: usize) -> Option<&[u8]> {
        if level >= self.mip_count as usize {
            return None;
        }
        self.mipmaps
            .get(slot * self.mip_count as usize + level)
            .map(Vec::as_slice)
    }

    /// Convert to DDS bytes for writing.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mip_count = self.mip_count as usize;
        let expected = self.array_size as usize * mip_count;
        if self.mipmaps.len() != expected {
            return Err(Error::MipCountMismatch {
                expected,
                actual: self.mipmaps.len(),
            });
        }

        let sizes = self.level_sizes()?;
        for (index, mip) in self.mipmaps.iter().enumerate() {
            let expected = sizes[index % mip_count];
            if mip.len() != expected {
                return Err(Error::MipSizeMismatch {
                    index,
                    expected,
                    actual: mip.len(),
                });
            }
        }

        let header = DdsHeader::new(self.width, self.height, self.mip_count);
        let dx10 = DdsHeaderDxt10 {
            dxgi_format: self.format.code(),
            resource_dimension: self.resource_dimension,
            misc_flag: self.misc_flag,
            array_size: self.array_size,
            misc_flags2: 0,
        };

        let data_len: usize = sizes.iter().sum::<usize>() * self.array_size as usize;
        let mut output = Vec::with_capacity(HEADER_LEN + data_len);
        output.extend_from_slice(DDS_MAGIC);
        output.extend_from_slice(header.as_bytes());
        output.extend_from_slice(dx10.as_bytes());

        if mip_count > 0 {
            for chain in self.mipmaps.chunks(mip_count) {
                for level in disk_order(mip_count) {
                    output.extend_from_slice(&chain[level]);
                }
            }
        }

        Ok(output)
    }

    /// Write to a DDS file, creating the parent directory if needed.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let buffer = self.to_bytes()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, buffer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A BC6H texture whose every mip byte encodes (slot, level).
    fn sample(size: u32, mip_count: u32, array_size: u32) -> DdsTexture {
        let mut texture = DdsTexture {
            width: size,
            height: size,
            mip_count,
            array_size,
            ..DdsTexture::new()
        };
        let sizes = texture.level_sizes().unwrap();
        for slot in 0..array_size as usize {
            for (level, &len) in sizes.iter().enumerate() {
                texture.mipmaps.push(vec![(slot * 16 + level) as u8; len]);
            }
        }
        texture
    }

    #[test]
    fn test_cubemap_array_256() {
        let texture = sample(256, 9, 6);
        let bytes = texture.to_bytes().unwrap();
        let parsed = DdsTexture::parse(&bytes).unwrap();

        assert_eq!(parsed.mipmaps.len(), 54);
        let sizes: Vec<_> = parsed.mipmaps[..9].iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![65536, 16384, 4096, 1024, 256, 64, 16, 16, 16]);
        assert_eq!(parsed.mip(5, 0).unwrap()[0], 5 * 16);
        assert_eq!(parsed, texture);
    }

    #[test]
    fn test_smallest_level_first_on_disk() {
        let texture = sample(16, 5, 2);
        let bytes = texture.to_bytes().unwrap();

        // Slot 0: levels 4, 3, 2 (16 bytes each), 1 (64), then 0 (256).
        assert_eq!(bytes[HEADER_LEN], 4);
        assert_eq!(bytes[HEADER_LEN + 16], 3);
        assert_eq!(bytes[HEADER_LEN + 48], 1);
        assert_eq!(bytes[HEADER_LEN + 112], 0);
        // Slot 1 follows the 368 bytes of slot 0, smallest level first.
        assert_eq!(bytes[HEADER_LEN + 368], 16 + 4);
        assert_eq!(bytes.len(), HEADER_LEN + 2 * 368);
    }

    #[test]
    fn test_header_bytes() {
        let bytes = sample(256, 9, 1).to_bytes().unwrap();
        let u32_at = |at: usize| u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap());

        assert_eq!(&bytes[..4], b"DDS ");
        assert_eq!(u32_at(4), 0x7C);
        assert_eq!(u32_at(8), 0x000A_1007);
        assert_eq!(u32_at(28), 9);
        assert_eq!(&bytes[84..88], b"DX10");
        assert_eq!(u32_at(108), 0x0040_1008);
        assert_eq!(u32_at(128), 0x5F);
        assert_eq!(u32_at(132), 3);
        assert_eq!(u32_at(136), 0);
        assert_eq!(u32_at(140), 1);
    }

    #[test]
    fn test_height_stored_before_width() {
        let mut texture = sample(64, 7, 1);
        texture.width = 128;
        let bytes = texture.to_bytes().unwrap();
        assert_eq!(&bytes[12..16], &64u32.to_le_bytes());
        assert_eq!(&bytes[16..20], &128u32.to_le_bytes());

        let parsed = DdsTexture::parse(&bytes).unwrap();
        assert_eq!((parsed.width, parsed.height), (128, 64));
    }

    #[test]
    fn test_round_trip_various_chains() {
        for (size, mip_count, array_size) in [(4, 1, 1), (64, 7, 3), (2048, 12, 1)] {
            let texture = sample(size, mip_count, array_size);
            let parsed = DdsTexture::parse(&texture.to_bytes().unwrap()).unwrap();
            assert_eq!(parsed, texture);
        }
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = sample(16, 5, 1).to_bytes().unwrap();
        bytes[..4].copy_from_slice(b"DDS\0");
        assert!(matches!(DdsTexture::parse(&bytes), Err(Error::InvalidMagic(_))));
    }

    #[test]
    fn test_rejects_changed_constant() {
        let mut bytes = sample(16, 5, 1).to_bytes().unwrap();
        // pitch or linear size
        bytes[20] = 0xFF;
        assert!(matches!(
            DdsTexture::parse(&bytes),
            Err(Error::Common(regen_common::Error::ExpectedValue { .. }))
        ));
    }

    #[test]
    fn test_rejects_unsupported_format() {
        let mut bytes = sample(16, 5, 1).to_bytes().unwrap();
        bytes[128..132].copy_from_slice(&DxgiFormat::BC7_UNORM.code().to_le_bytes());
        assert!(matches!(
            DdsTexture::parse(&bytes),
            Err(Error::UnsupportedFormat(DxgiFormat::BC7_UNORM))
        ));
    }

    #[test]
    fn test_truncated_file() {
        let bytes = sample(64, 7, 1).to_bytes().unwrap();
        assert!(matches!(
            DdsTexture::parse(&bytes[..bytes.len() - 1]),
            Err(Error::Common(regen_common::Error::UnexpectedEof { .. }))
        ));
    }

    #[test]
    fn test_array_size_beyond_data() {
        let mut bytes = sample(4, 1, 1).to_bytes().unwrap();
        bytes[140..144].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            DdsTexture::parse(&bytes),
            Err(Error::Common(regen_common::Error::UnexpectedEof {
                position: HEADER_LEN,
                available: 16,
                ..
            }))
        ));
    }

    #[test]
    fn test_to_bytes_checks_mip_count() {
        let mut texture = sample(16, 5, 2);
        texture.mipmaps.pop();
        assert!(matches!(
            texture.to_bytes(),
            Err(Error::MipCountMismatch {
                expected: 10,
                actual: 9
            })
        ));
    }

    #[test]
    fn test_to_bytes_checks_mip_size() {
        let mut texture = sample(16, 5, 1);
        texture.mipmaps[0].truncate(10);
        assert!(matches!(
            texture.to_bytes(),
            Err(Error::MipSizeMismatch { index: 0, .. })
        ));
    }
}
