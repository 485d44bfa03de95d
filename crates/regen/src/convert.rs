//! Conversion pipelines between the two games' cubemap files.
//!
//! - [`upgrade`]: an Apex Legends `cubemaps_hdr.dds` (one DDS array of
//!   every cubemap face) to a Titanfall 2 `cubemaps.hdr.vtf`
//! - [`downgrade`]: a `cubemaps.hdr.vtf` to one DDS per face
//! - [`to_dds_array`]: a `cubemaps.hdr.vtf` back to a single DDS array

use std::fmt;

use regen_common::{MipChain, MipIndex, CUBE_FACES};
use regen_dds::{DdsHeaderDxt10, DdsTexture, DxgiFormat};
use regen_vtf::{Resource, ResourceKind, VtfFlags, VtfFormat, VtfTexture, VERSION};
use tracing::debug;

use crate::probe::{ambient_table, CubemapProbe};
use crate::remap::{chain_to_dds_mips, dds_to_chain};
use crate::{Error, Result};

/// Side of the cubemap faces both games ship.
pub const CUBEMAP_SIZE: u32 = 256;
/// Mip levels of a 256x256 face.
pub const CUBEMAP_MIPS: u32 = 9;
/// Flags of a shipped `cubemaps.hdr.vtf`.
pub const CUBEMAP_FLAGS: VtfFlags = VtfFlags::CLAMP_S
    .union(VtfFlags::CLAMP_T)
    .union(VtfFlags::NO_LOD)
    .union(VtfFlags::ENVMAP);
pub const CUBEMAP_REFLECTIVITY: [f32; 3] = [0.2, 0.2, 0.2];

/// One face of one cubemap as a standalone DDS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceTexture {
    pub cubemap: usize,
    pub face: usize,
    pub texture: DdsTexture,
}

impl FaceTexture {
    /// `{stem}.{cubemap}.{face}.dds`
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}.{}.dds", self.cubemap, self.face)
    }
}

fn check_source<T: PartialEq + fmt::Debug>(
    field: &'static str,
    expected: T,
    actual: T,
) -> Result<()> {
    if expected != actual {
        return Err(Error::UnexpectedSource {
            field,
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        });
    }
    Ok(())
}

/// Build a cubemap VTF from a DDS array holding `6 * n` faces.
///
/// With `probes`, a CMA resource is added carrying each probe's ambient
/// scalar; there must be exactly one probe per cubemap.
pub fn upgrade(dds: &DdsTexture, probes: Option<&[CubemapProbe]>) -> Result<VtfTexture> {
    check_source("format", DxgiFormat::BC6H_UF16, dds.format)?;
    check_source("size", (CUBEMAP_SIZE, CUBEMAP_SIZE), (dds.width, dds.height))?;
    check_source("mip count", CUBEMAP_MIPS, dds.mip_count)?;
    check_source(
        "resource dimension",
        DdsHeaderDxt10::TEXTURE2D,
        dds.resource_dimension,
    )?;

    let mipmaps = dds_to_chain(dds)?;
    let cubemaps = mipmaps.slots();
    let frame_count = u16::try_from(cubemaps).map_err(|_| Error::UnexpectedSource {
        field: "cubemap count",
        expected: format!("at most {}", u16::MAX),
        actual: cubemaps.to_string(),
    })?;

    let mut vtf = VtfTexture {
        version: VERSION,
        width: CUBEMAP_SIZE as u16,
        height: CUBEMAP_SIZE as u16,
        flags: CUBEMAP_FLAGS,
        frame_count,
        first_frame: 0,
        reflectivity: CUBEMAP_REFLECTIVITY,
        bump_scale: 1.0,
        format: VtfFormat::BC6H_UF16,
        mip_count: CUBEMAP_MIPS as u8,
        low_res_format: VtfFormat::NONE,
        low_res_width: 0,
        low_res_height: 0,
        mip_depth: 1,
        resources: Vec::new(),
        ambient: None,
        mipmaps,
    };

    if let Some(probes) = probes {
        if probes.len() != cubemaps {
            return Err(Error::ProbeCountMismatch {
                probes: probes.len(),
                cubemaps,
            });
        }
        vtf.resources.push(Resource::new(ResourceKind::AmbientTable));
        vtf.ambient = Some(ambient_table(probes));
    }
    vtf.resources.push(Resource::new(ResourceKind::ImageData));
    vtf.refresh_resources()?;

    debug!(cubemaps, ambient = vtf.ambient.is_some(), "built cubemap VTF");
    Ok(vtf)
}

fn bc6h_chain(vtf: &VtfTexture) -> Result<&MipChain> {
    check_source("format", VtfFormat::BC6H_UF16, vtf.format)?;
    if let Some(index) = vtf.mipmaps.first_missing() {
        return Err(Error::MissingMip(index));
    }
    if vtf.mipmaps.is_empty() {
        return Err(Error::UnexpectedSource {
            field: "mipmaps",
            expected: "extracted mip chain".to_string(),
            actual: "none".to_string(),
        });
    }
    Ok(&vtf.mipmaps)
}

fn dds_for(vtf: &VtfTexture, array_size: u32, mipmaps: Vec<Vec<u8>>) -> DdsTexture {
    DdsTexture {
        width: vtf.width as u32,
        height: vtf.height as u32,
        mip_count: vtf.mip_count as u32,
        format: DxgiFormat::BC6H_UF16,
        resource_dimension: DdsHeaderDxt10::TEXTURE2D,
        misc_flag: 0,
        array_size,
        mipmaps,
    }
}

/// Split a cubemap VTF into one single-face DDS per `(cubemap, face)`.
pub fn downgrade(vtf: &VtfTexture) -> Result<Vec<FaceTexture>> {
    let chain = bc6h_chain(vtf)?;
    let mut faces = Vec::with_capacity(chain.slots() * CUBE_FACES);

    for cubemap in 0..chain.slots() {
        for face in 0..CUBE_FACES {
            let mipmaps = (0..chain.levels())
                .map(|level| {
                    let index = MipIndex::new(level, cubemap, face);
                    chain
                        .get(index)
                        .map(<[u8]>::to_vec)
                        .ok_or(Error::MissingMip(index))
                })
                .collect::<Result<Vec<_>>>()?;
            faces.push(FaceTexture {
                cubemap,
                face,
                texture: dds_for(vtf, 1, mipmaps),
            });
        }
    }

    debug!(faces = faces.len(), "split cubemap VTF");
    Ok(faces)
}

/// Pack every face of a cubemap VTF into one DDS array, the layout
/// [`upgrade`] reads.
pub fn to_dds_array(vtf: &VtfTexture) -> Result<DdsTexture> {
    let chain = bc6h_chain(vtf)?;
    let array_size = (chain.slots() * CUBE_FACES) as u32;
    Ok(dds_for(vtf, array_size, chain_to_dds_mips(chain)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apex_cubemaps(cubemaps: u32) -> DdsTexture {
        let mut dds = DdsTexture {
            width: 256,
            height: 256,
            mip_count: 9,
            array_size: cubemaps * 6,
            ..DdsTexture::new()
        };
        let sizes = dds.level_sizes().unwrap();
        for array_index in 0..dds.array_size as usize {
            for (level, &len) in sizes.iter().enumerate() {
                dds.mipmaps.push(vec![(array_index * 9 + level) as u8; len]);
            }
        }
        dds
    }

    fn probes(count: usize) -> Vec<CubemapProbe> {
        (0..count)
            .map(|i| CubemapProbe::new([i as f32 * 64.0, 0.0, 32.0], 1.0 / (i + 1) as f32))
            .collect()
    }

    #[test]
    fn test_upgrade_header() {
        let vtf = upgrade(&apex_cubemaps(2), None).unwrap();
        assert_eq!(vtf.version, (7, 5));
        assert_eq!(vtf.frame_count, 2);
        assert_eq!(vtf.flags.bits(), 0x4000 | 0x200 | 0x8 | 0x4);
        assert_eq!(vtf.format, VtfFormat::BC6H_UF16);
        assert_eq!(vtf.mip_depth, 1);
        assert!(vtf.ambient.is_none());
        assert_eq!(vtf.resources.len(), 1);
        assert!(vtf.mipmaps.is_complete());
    }

    #[test]
    fn test_upgrade_keys_faces() {
        let dds = apex_cubemaps(2);
        let vtf = upgrade(&dds, None).unwrap();
        // array index 8 = cubemap 1, face 2
        assert_eq!(vtf.mip(3, 1, 2), dds.mip(8, 3));
    }

    #[test]
    fn test_upgrade_with_probes_round_trips_through_bytes() {
        let dds = apex_cubemaps(3);
        let probes = probes(3);
        let vtf = upgrade(&dds, Some(&probes)).unwrap();
        assert_eq!(vtf.ambient.as_ref().unwrap().values, vec![1.0, 0.5, 1.0 / 3.0]);

        let parsed = VtfTexture::parse(&vtf.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed, vtf);
        assert_eq!(to_dds_array(&parsed).unwrap(), dds);
    }

    #[test]
    fn test_upgrade_probe_count_must_match() {
        assert!(matches!(
            upgrade(&apex_cubemaps(2), Some(&probes(3))),
            Err(Error::ProbeCountMismatch {
                probes: 3,
                cubemaps: 2
            })
        ));
    }

    #[test]
    fn test_upgrade_rejects_other_sizes() {
        let mut dds = apex_cubemaps(1);
        dds.mip_count = 8;
        assert!(matches!(
            upgrade(&dds, None),
            Err(Error::UnexpectedSource {
                field: "mip count",
                ..
            })
        ));
    }

    #[test]
    fn test_downgrade_one_dds_per_face() {
        let dds = apex_cubemaps(2);
        let vtf = upgrade(&dds, None).unwrap();
        let faces = downgrade(&vtf).unwrap();

        assert_eq!(faces.len(), 12);
        let face = &faces[7];
        assert_eq!((face.cubemap, face.face), (1, 1));
        assert_eq!(face.texture.array_size, 1);
        assert_eq!(face.texture.misc_flag, 0);
        assert_eq!(face.texture.mipmaps.len(), 9);
        assert_eq!(face.texture.mip(0, 4), dds.mip(7, 4));
        assert_eq!(face.file_name("cubemaps.hdr.vtf"), "cubemaps.hdr.vtf.1.1.dds");

        let bytes = face.texture.to_bytes().unwrap();
        assert_eq!(DdsTexture::parse(&bytes).unwrap(), face.texture);
    }

    #[test]
    fn test_downgrade_requires_mips() {
        let mut vtf = upgrade(&apex_cubemaps(1), None).unwrap();
        vtf.mipmaps = MipChain::empty();
        assert!(matches!(
            downgrade(&vtf),
            Err(Error::UnexpectedSource {
                field: "mipmaps",
                ..
            })
        ));
    }
}
