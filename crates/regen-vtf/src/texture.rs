//! Reading and writing VTF cubemap textures.

use std::fs;
use std::path::Path;

use regen_common::{disk_order, BinaryReader, IntoBytes, MipChain, MipIndex, CUBE_FACES};
use tracing::{debug, warn};

use crate::format::{VtfFlags, VtfFormat};
use crate::header::{RawResource, VtfHeader};
use crate::resource::{AmbientTable, Resource, ResourceFlags, ResourceKind, ResourcePayload};
use crate::{Error, Result, VTF_MAGIC};

/// The only header version this crate reads or writes.
pub const VERSION: (u32, u32) = (7, 5);

/// A VTF 7.5 environment map holding `frame_count` cubemaps.
///
/// `mipmaps` is addressed by `(level, frame, face)` with level 0 the
/// largest. It is left empty when the format and size are not one of the
/// known profiles, so the header can still be inspected.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VtfTexture {
    pub version: (u32, u32),
    pub width: u16,
    pub height: u16,
    pub flags: VtfFlags,
    pub frame_count: u16,
    pub first_frame: u16,
    pub reflectivity: [f32; 3],
    pub bump_scale: f32,
    pub format: VtfFormat,
    pub mip_count: u8,
    pub low_res_format: VtfFormat,
    pub low_res_width: u8,
    pub low_res_height: u8,
    pub mip_depth: u16,
    /// Resource table, in file order.
    pub resources: Vec<Resource>,
    /// Present iff an [`ResourceKind::AmbientTable`] resource is.
    pub ambient: Option<AmbientTable>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub mipmaps: MipChain,
}

impl Default for VtfTexture {
    fn default() -> Self {
        Self {
            version: VERSION,
            width: 0,
            height: 0,
            flags: VtfFlags::empty(),
            frame_count: 0,
            first_frame: 0,
            reflectivity: [0.0; 3],
            bump_scale: 0.0,
            format: VtfFormat::NONE,
            mip_count: 0,
            low_res_format: VtfFormat::NONE,
            low_res_width: 0,
            low_res_height: 0,
            mip_depth: 0,
            resources: Vec::new(),
            ambient: None,
            mipmaps: MipChain::empty(),
        }
    }
}

impl VtfTexture {
    /// Create an empty texture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a VTF file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        Self::parse(&data)
    }

    /// Parse a VTF file from bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);

        let magic: [u8; 4] = reader.read_array()?;
        if &magic != VTF_MAGIC {
            return Err(Error::InvalidMagic(magic));
        }
        let version = (reader.read_u32()?, reader.read_u32()?);
        if version != VERSION {
            return Err(Error::UnsupportedVersion(version.0, version.1));
        }

        reader.seek(0);
        let header: VtfHeader = reader.read_struct()?;
        header.validate_padding()?;

        let mut texture = Self {
            version,
            width: header.width,
            height: header.height,
            flags: VtfFlags::from_bits_retain(header.flags),
            frame_count: header.frame_count,
            first_frame: header.first_frame,
            reflectivity: header.reflectivity,
            bump_scale: header.bump_scale,
            format: VtfFormat::try_from(header.format as i32)?,
            mip_count: header.mip_count,
            low_res_format: VtfFormat::try_from(header.low_res_format)?,
            low_res_width: header.low_res_width,
            low_res_height: header.low_res_height,
            mip_depth: header.mip_depth,
            resources: Vec::new(),
            ambient: None,
            mipmaps: MipChain::empty(),
        };

        let header_size = header.header_size as usize;
        let table_size = (header.resource_count as usize)
            .checked_mul(RawResource::SIZE)
            .and_then(|len| len.checked_add(VtfHeader::SIZE))
            .unwrap_or(usize::MAX);
        if table_size != header_size {
            return Err(Error::HeaderSizeMismatch {
                declared: header_size,
                actual: table_size,
            });
        }

        for _ in 0..header.resource_count {
            let resource = Resource::from_raw(reader.read_struct::<RawResource>()?)?;
            if texture.resource(resource.kind).is_some() {
                return Err(Error::DuplicateResource(resource.kind));
            }
            texture.resources.push(resource);
        }

        debug!(
            width = texture.width,
            height = texture.height,
            format = ?texture.format,
            frames = texture.frame_count,
            mips = texture.mip_count,
            resources = texture.resources.len(),
            "parsed VTF header"
        );

        if let Some(resource) = texture.resource(ResourceKind::AmbientTable) {
            let table = AmbientTable::read(data, resource, texture.frame_count as usize)?;
            texture.ambient = Some(table);
        }

        let image_offset = texture.check_envmap_layout()?;

        let Some(profile) = texture.format.mip_profile(texture.width, texture.height) else {
            warn!(
                format = ?texture.format,
                width = texture.width,
                height = texture.height,
                "no mip layout for this format and size, mipmaps not extracted"
            );
            return Ok(texture);
        };

        let mip_count = texture.mip_count as usize;
        let frames = texture.frame_count as usize;
        let sizes = profile.level_sizes(mip_count)?;
        let available = data.len().saturating_sub(image_offset);
        let needed = (frames * CUBE_FACES)
            .checked_mul(sizes.iter().sum())
            .unwrap_or(usize::MAX);
        if needed > available {
            return Err(regen_common::Error::UnexpectedEof {
                position: image_offset,
                needed,
                available,
            }
            .into());
        }

        let mut mipmaps = MipChain::new(mip_count, frames);
        reader.seek(image_offset);
        // Smallest level first, as engine-written files store it.
        for level in disk_order(mip_count) {
            for slot in 0..frames {
                for face in 0..CUBE_FACES {
                    let block = reader.read_bytes(sizes[level])?;
                    mipmaps.insert(MipIndex::new(level, slot, face), block.to_vec())?;
                }
            }
        }
        texture.mipmaps = mipmaps;

        Ok(texture)
    }

    /// Check the header describes a plain environment map and return the
    /// offset of its image data.
    fn check_envmap_layout(&self) -> Result<usize> {
        if !self.flags.contains(VtfFlags::ENVMAP) {
            return Err(Error::Precondition("ENVMAP flag not set"));
        }
        if self.low_res_format != VtfFormat::NONE {
            return Err(Error::Precondition("low res format is not NONE"));
        }
        if (self.low_res_width, self.low_res_height) != (0, 0) {
            return Err(Error::Precondition("low res size is not 0x0"));
        }
        if self.first_frame != 0 {
            return Err(Error::Precondition("first frame is not 0"));
        }
        self.resource(ResourceKind::ImageData)
            .ok_or(Error::MissingResource(ResourceKind::ImageData))?
            .offset()
            .ok_or(Error::InvalidResource {
                kind: ResourceKind::ImageData,
                reason: "image data must be stored out of line",
            })
    }

    /// Find a resource by kind.
    pub fn resource(&self, kind: ResourceKind) -> Option<&Resource> {
        self.resources.iter().find(|r| r.kind == kind)
    }

    /// Size of the header and resource table.
    pub fn header_size(&self) -> usize {
        VtfHeader::size_with_resources(self.resources.len())
    }

    /// Get one image of the mip chain.
    pub fn mip(&self, level: usize, frame: usize, face: usize) -> Option<&[u8]> {
        self.mipmaps.get(MipIndex::new(level, frame, face))
    }

    /// The resource table as it will be written: payloads recomputed and
    /// image data moved last.
    ///
    /// Out-of-line data follows the table in the same order, starting at
    /// the header size.
    pub fn layout_resources(&self) -> Result<Vec<Resource>> {
        if self.ambient.is_some() != self.resource(ResourceKind::AmbientTable).is_some() {
            return Err(Error::MissingAmbientTable);
        }

        let (image, others): (Vec<&Resource>, Vec<&Resource>) = self
            .resources
            .iter()
            .partition(|r| r.kind == ResourceKind::ImageData);

        let mut cursor = self.header_size();
        let mut layout = Vec::with_capacity(self.resources.len());

        for resource in others {
            let mut resource = *resource;
            match resource.kind {
                ResourceKind::Checksum => {
                    return Err(Error::UnsupportedResource(ResourceKind::Checksum));
                }
                ResourceKind::AmbientTable => {
                    let table = self.ambient.as_ref().ok_or(Error::MissingAmbientTable)?;
                    let frames = self.frame_count as usize;
                    if table.len() != frames {
                        return Err(Error::AmbientSizeMismatch {
                            expected: frames * 4,
                            actual: table.len() * 4,
                        });
                    }
                    if table.is_inline() {
                        resource.flags.insert(ResourceFlags::NO_DATA);
                        resource.payload = ResourcePayload::Inline(table.values[0].to_le_bytes());
                    } else {
                        resource.flags.remove(ResourceFlags::NO_DATA);
                        resource.payload = ResourcePayload::Offset(cursor as u32);
                        cursor += table.byte_len();
                    }
                }
                kind => {
                    if !matches!(resource.payload, ResourcePayload::Inline(_)) {
                        return Err(Error::UnsupportedResource(kind));
                    }
                }
            }
            layout.push(resource);
        }

        for resource in image {
            let mut resource = *resource;
            resource.flags.remove(ResourceFlags::NO_DATA);
            resource.payload = ResourcePayload::Offset(cursor as u32);
            layout.push(resource);
        }

        Ok(layout)
    }

    /// Replace the resource table with the one [`Self::to_bytes`] writes, so
    /// the in-memory texture matches what parsing the output gives back.
    pub fn refresh_resources(&mut self) -> Result<()> {
        self.resources = self.layout_resources()?;
        Ok(())
    }

    /// Convert to VTF bytes for writing.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.version != VERSION {
            return Err(Error::UnsupportedVersion(self.version.0, self.version.1));
        }
        self.check_envmap_layout()?;

        let resources = self.layout_resources()?;
        let header_size = self.header_size();

        let mip_count = self.mip_count as usize;
        let frames = self.frame_count as usize;
        let sizes = self
            .format
            .mip_profile(self.width, self.height)
            .map(|profile| profile.level_sizes(mip_count))
            .transpose()?;

        let mut blocks = Vec::with_capacity(mip_count * frames * CUBE_FACES);
        // Smallest level first, matching `parse`.
        for level in disk_order(mip_count) {
            for slot in 0..frames {
                for face in 0..CUBE_FACES {
                    let index = MipIndex::new(level, slot, face);
                    let block = self.mipmaps.get(index).ok_or(Error::MissingMip(index))?;
                    if let Some(sizes) = &sizes {
                        if block.len() != sizes[level] {
                            return Err(Error::MipSizeMismatch {
                                index,
                                expected: sizes[level],
                                actual: block.len(),
                            });
                        }
                    }
                    blocks.push(block);
                }
            }
        }

        let header = VtfHeader {
            magic: *VTF_MAGIC,
            version: [self.version.0, self.version.1],
            header_size: header_size as u32,
            width: self.width,
            height: self.height,
            flags: self.flags.bits(),
            frame_count: self.frame_count,
            first_frame: self.first_frame,
            padding0: [0; 4],
            reflectivity: self.reflectivity,
            padding1: [0; 4],
            bump_scale: self.bump_scale,
            format: self.format.code() as u32,
            mip_count: self.mip_count,
            low_res_format: self.low_res_format.code(),
            low_res_width: self.low_res_width,
            low_res_height: self.low_res_height,
            mip_depth: self.mip_depth,
            padding2: [0; 3],
            resource_count: resources.len() as u32,
            padding3: [0; 8],
        };

        let data_len: usize = blocks.iter().map(|b| b.len()).sum();
        let mut output = Vec::with_capacity(header_size + data_len);
        output.extend_from_slice(header.as_bytes());
        for resource in &resources {
            output.extend_from_slice(resource.to_raw().as_bytes());
        }
        debug_assert_eq!(output.len(), header_size);

        if let Some(table) = &self.ambient {
            table.write_to(&mut output)?;
        }

        let image = resources
            .iter()
            .find(|r| r.kind == ResourceKind::ImageData)
            .and_then(Resource::offset);
        debug!(
            header_size,
            image_offset = ?image,
            data_len,
            "laid out VTF resources"
        );
        debug_assert_eq!(image, Some(output.len()));

        for block in blocks {
            output.extend_from_slice(block);
        }

        Ok(output)
    }

    /// Write to a VTF file, creating the parent directory if needed.
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
