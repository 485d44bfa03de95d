//! VTF resource table entries and the CMA ambient table.
//!
//! A resource entry's 4-byte payload means different things depending on
//! its kind and flags; [`ResourcePayload`] names which one it is.

use std::io::Write;

use bitflags::bitflags;
use byteorder::{LittleEndian, WriteBytesExt};
use regen_common::BinaryReader;

use crate::header::RawResource;
use crate::{Error, Result};

/// Kinds of resource a VTF 7.3+ file may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ResourceKind {
    /// Low resolution preview image.
    Thumbnail,
    /// The mip chain. Always last in the file.
    ImageData,
    SpriteSheet,
    /// CRC of the image data, stored in the payload.
    Checksum,
    /// Per-cubemap ambient multiplier ("CMA").
    AmbientTable,
    /// Level of detail clamps.
    LodInfo,
    ExtendedFlags,
    KeyValues,
}

impl ResourceKind {
    /// Every kind, in tag order.
    pub const ALL: [Self; 8] = [
        Self::Thumbnail,
        Self::ImageData,
        Self::SpriteSheet,
        Self::Checksum,
        Self::AmbientTable,
        Self::LodInfo,
        Self::ExtendedFlags,
        Self::KeyValues,
    ];

    /// The 3-byte tag identifying this kind on disk.
    pub const fn tag(self) -> [u8; 3] {
        match self {
            Self::Thumbnail => [0x01, 0x00, 0x00],
            Self::ImageData => [0x30, 0x00, 0x00],
            Self::SpriteSheet => [0x10, 0x00, 0x00],
            Self::Checksum => *b"CRC",
            Self::AmbientTable => *b"CMA",
            Self::LodInfo => *b"LOD",
            Self::ExtendedFlags => *b"TSO",
            Self::KeyValues => *b"KVD",
        }
    }

    /// Look up the kind for a tag.
    pub fn from_tag(tag: [u8; 3]) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or(Error::UnknownResource(tag))
    }
}

bitflags! {
    /// Resource entry flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct ResourceFlags: u8 {
        /// The payload is the data itself, nothing is stored out of line.
        const NO_DATA = 0x02;
    }
}

/// What a resource entry's payload holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ResourcePayload {
    /// Absolute file offset of the resource data.
    Offset(u32),
    /// Four bytes of data stored in the entry itself.
    Inline([u8; 4]),
    /// Checksum value.
    Checksum(u32),
}

/// One entry of the resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Resource {
    pub kind: ResourceKind,
    pub flags: ResourceFlags,
    pub payload: ResourcePayload,
}

impl Resource {
    /// A resource whose data lives out of line. The offset is filled in
    /// when the file is written.
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            flags: ResourceFlags::empty(),
            payload: ResourcePayload::Offset(0),
        }
    }

    /// Interpret an on-disk entry.
    pub fn from_raw(raw: RawResource) -> Result<Self> {
        let kind = ResourceKind::from_tag(raw.tag)?;
        let flags = ResourceFlags::from_bits_retain(raw.flags);
        let data = raw.data;

        let payload = if kind == ResourceKind::Checksum {
            if !flags.contains(ResourceFlags::NO_DATA) {
                return Err(Error::InvalidResource {
                    kind,
                    reason: "checksum must be stored inline",
                });
            }
            ResourcePayload::Checksum(data)
        } else if flags.contains(ResourceFlags::NO_DATA) {
            ResourcePayload::Inline(data.to_le_bytes())
        } else {
            ResourcePayload::Offset(data)
        };

        Ok(Self {
            kind,
            flags,
            payload,
        })
    }

    /// Convert to the on-disk entry.
    pub fn to_raw(&self) -> RawResource {
        let data = match self.payload {
            ResourcePayload::Offset(offset) => offset,
            ResourcePayload::Inline(bytes) => u32::from_le_bytes(bytes),
            ResourcePayload::Checksum(crc) => crc,
        };
        RawResource {
            tag: self.kind.tag(),
            flags: self.flags.bits(),
            data,
        }
    }

    /// File offset of the resource data, if it is stored out of line.
    pub fn offset(&self) -> Option<usize> {
        match self.payload {
            ResourcePayload::Offset(offset) => Some(offset as usize),
            _ => None,
        }
    }
}

/// Per-cubemap ambient light multipliers, one per frame.
///
/// Carries the same values as the map's `CUBEMAPS_AMBIENT_RCP` lump. A
/// table of one value is stored inline in its resource entry; longer
/// tables are stored out of line as a byte length followed by the floats.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AmbientTable {
    pub values: Vec<f32>,
}

impl AmbientTable {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True if the table fits in its resource entry.
    pub fn is_inline(&self) -> bool {
        self.values.len() == 1
    }

    /// Read the table a CMA resource points at.
    pub fn read(data: &[u8], resource: &Resource, frame_count: usize) -> Result<Self> {
        match resource.payload {
            ResourcePayload::Inline(bytes) => {
                if frame_count != 1 {
                    return Err(Error::AmbientSizeMismatch {
                        expected: frame_count * 4,
                        actual: 4,
                    });
                }
                Ok(Self::new(vec![f32::from_le_bytes(bytes)]))
            }
            ResourcePayload::Offset(offset) => {
                let mut reader = BinaryReader::new_at(data, offset as usize);
                let size = reader.read_u32()? as usize;
                if size != frame_count * 4 {
                    return Err(Error::AmbientSizeMismatch {
                        expected: frame_count * 4,
                        actual: size,
                    });
                }
                Ok(Self::new(reader.read_f32_vec(frame_count)?))
            }
            ResourcePayload::Checksum(_) => Err(Error::InvalidResource {
                kind: resource.kind,
                reason: "ambient table cannot hold a checksum",
            }),
        }
    }

    /// Bytes this table occupies out of line.
    pub fn byte_len(&self) -> usize {
        if self.is_inline() {
            0
        } else {
            (self.values.len() + 1) * 4
        }
    }

    /// Write the out-of-line block. Nothing is written for inline tables.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        if self.is_inline() {
            return Ok(());
        }
        writer.write_u32::<LittleEndian>(self.values.len() as u32 * 4)?;
        for &value in &self.values {
            writer.write_f32::<LittleEndian>(value)?;
        }
        Ok(())
    }
}
