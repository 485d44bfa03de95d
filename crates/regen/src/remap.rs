//! Re-keying mips between DDS array order and cubemap chain order.
//!
//! A DDS cubemap array addresses mips as `(array_index, level)` with
//! `array_index = cubemap * 6 + face`; a VTF addresses them as
//! `(level, cubemap, face)`. Both keep level 0 as the largest image, so
//! only the slot/face split changes.

use regen_common::{MipChain, MipIndex, CUBE_FACES};
use regen_dds::DdsTexture;

use crate::{Error, Result};

/// Split a DDS array index into `(cubemap, face)`.
pub const fn split_array_index(array_index: usize) -> (usize, usize) {
    (array_index / CUBE_FACES, array_index % CUBE_FACES)
}

/// Join `(cubemap, face)` into a DDS array index.
pub const fn array_index(slot: usize, face: usize) -> usize {
    slot * CUBE_FACES + face
}

/// Re-key a DDS cubemap array's mips into a chain of cubemaps.
pub fn dds_to_chain(dds: &DdsTexture) -> Result<MipChain> {
    let mip_count = dds.mip_count as usize;
    let array_size = dds.array_size as usize;

    let expected = array_size * mip_count;
    if dds.mipmaps.len() != expected {
        return Err(Error::MipCountMismatch {
            expected,
            actual: dds.mipmaps.len(),
        });
    }
    if array_size % CUBE_FACES != 0 {
        return Err(Error::NotCubemaps(array_size));
    }

    let mut chain = MipChain::new(mip_count, array_size / CUBE_FACES);
    for (index, mip) in dds.mipmaps.iter().enumerate() {
        let (slot, face) = split_array_index(index / mip_count);
        chain.insert(MipIndex::new(index % mip_count, slot, face), mip.clone())?;
    }
    Ok(chain)
}

/// Flatten a chain of cubemaps into DDS array order,
/// `mips[array_index * levels + level]`.
pub fn chain_to_dds_mips(chain: &MipChain) -> Result<Vec<Vec<u8>>> {
    let levels = chain.levels();
    let mut mips = Vec::with_capacity(chain.slots() * CUBE_FACES * levels);

    for slot in 0..chain.slots() {
        for face in 0..CUBE_FACES {
            for level in 0..levels {
                let index = MipIndex::new(level, slot, face);
                let mip = chain.get(index).ok_or(Error::MissingMip(index))?;
                mips.push(mip.to_vec());
            }
        }
    }
    Ok(mips)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dds_array(mip_count: u32, array_size: u32) -> DdsTexture {
        let mut dds = DdsTexture {
            width: 16,
            height: 16,
            mip_count,
            array_size,
            ..DdsTexture::new()
        };
        for array_index in 0..array_size {
            for level in 0..mip_count {
                dds.mipmaps.push(vec![array_index as u8, level as u8]);
            }
        }
        dds
    }

    #[test]
    fn test_array_index_split() {
        assert_eq!(split_array_index(0), (0, 0));
        assert_eq!(split_array_index(5), (0, 5));
        assert_eq!(split_array_index(13), (2, 1));
        assert_eq!(array_index(2, 1), 13);
    }

    #[test]
    fn test_dds_to_chain_keys() {
        let chain = dds_to_chain(&dds_array(3, 12)).unwrap();
        assert_eq!((chain.levels(), chain.slots(), chain.faces()), (3, 2, 6));
        assert!(chain.is_complete());
        // array index 7 = cubemap 1, face 1
        assert_eq!(chain.get(MipIndex::new(2, 1, 1)), Some(&[7u8, 2][..]));
    }

    #[test]
    fn test_remap_is_its_own_inverse() {
        let dds = dds_array(5, 18);
        let chain = dds_to_chain(&dds).unwrap();
        assert_eq!(chain_to_dds_mips(&chain).unwrap(), dds.mipmaps);
    }

    #[test]
    fn test_rejects_partial_cubemap() {
        assert!(matches!(
            dds_to_chain(&dds_array(3, 7)),
            Err(Error::NotCubemaps(7))
        ));
    }

    #[test]
    fn test_rejects_mip_count_mismatch() {
        let mut dds = dds_array(3, 6);
        dds.mipmaps.pop();
        assert!(matches!(
            dds_to_chain(&dds),
            Err(Error::MipCountMismatch {
                expected: 18,
                actual: 17
            })
        ));
    }

    #[test]
    fn test_chain_to_dds_reports_missing() {
        let mut chain = dds_to_chain(&dds_array(2, 6)).unwrap();
        chain.take(MipIndex::new(1, 0, 4));
        assert!(matches!(
            chain_to_dds_mips(&chain),
            Err(Error::MissingMip(index)) if index == MipIndex::new(1, 0, 4)
        ));
    }
}
