//! Cubemap mipmap addressing.
//!
//! Both containers describe the same logical space: a chain of mip levels,
//! each holding one image per `(slot, face)`, where a slot is one cubemap
//! instance and a face is one of its six sides. Level 0 is always the
//! largest image in memory; on disk both formats store the smallest level
//! first, and [`disk_order`] is the one place that reversal lives.

use std::fmt;

use crate::{Error, Result};

/// Number of faces on a cubemap.
pub const CUBE_FACES: usize = 6;

/// Largest mip chain either container can describe (a 32768² base level).
pub const MAX_MIP_LEVELS: usize = 16;

/// Address of one image in a cubemap mip chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MipIndex {
    /// Mip level, 0 = largest.
    pub level: usize,
    /// Cubemap instance (VTF frame, DDS `array_index / 6`).
    pub slot: usize,
    /// Cube face, `0..6`.
    pub face: usize,
}

impl MipIndex {
    pub const fn new(level: usize, slot: usize, face: usize) -> Self {
        Self { level, slot, face }
    }
}

impl fmt::Display for MipIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(mip {}, slot {}, face {})", self.level, self.slot, self.face)
    }
}

/// Iterate the in-memory level indices of a chain in on-disk order.
///
/// Yields `mip_count - 1` down to `0`, so the n-th item is the level stored
/// n-th in the file. Readers and writers of both containers go through here.
pub fn disk_order(mip_count: usize) -> impl DoubleEndedIterator<Item = usize> + Clone {
    (0..mip_count).rev()
}

/// Byte layout of one mip level for a pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipProfile {
    /// Fixed-size blocks covering `block_dim` x `block_dim` texels. Levels
    /// smaller than one block still occupy a whole block.
    Block { block_dim: usize, block_bytes: usize },
    /// Uncompressed texels, down to a single 1x1 texel.
    Texel { texel_bytes: usize },
}

impl MipProfile {
    /// BC6H: 16 bytes per 4x4 block.
    pub const BC6H: Self = Self::Block {
        block_dim: 4,
        block_bytes: 16,
    };

    /// 8-bit RGBA: 4 bytes per texel.
    pub const RGBA8888: Self = Self::Texel { texel_bytes: 4 };

    /// Byte length of the level stored at on-disk position `disk_index`.
    ///
    /// The first level on disk is 1x1, each following one doubles the side.
    fn level_size(&self, disk_index: usize) -> usize {
        let side = 1usize << disk_index;
        match *self {
            Self::Block {
                block_dim,
                block_bytes,
            } => {
                let blocks = side.div_ceil(block_dim).max(1);
                blocks * blocks * block_bytes
            }
            Self::Texel { texel_bytes } => side * side * texel_bytes,
        }
    }

    /// Byte lengths of every level of a chain, indexed by in-memory level
    /// (0 = largest).
    ///
    /// The same table drives reading and writing so both agree on block
    /// boundaries.
    pub fn level_sizes(&self, mip_count: usize) -> Result<Vec<usize>> {
        if mip_count > MAX_MIP_LEVELS {
            return Err(Error::TooManyLevels {
                count: mip_count,
                max: MAX_MIP_LEVELS,
            });
        }
        let mut sizes = vec![0; mip_count];
        for (disk_index, level) in disk_order(mip_count).enumerate() {
            sizes[level] = self.level_size(disk_index);
        }
        Ok(sizes)
    }
}

/// Dense storage for a `levels x slots x faces` mip chain.
///
/// Every address inside the bounds has a place whether or not it has been
/// filled yet, so a missing image is a presence check, not a failed lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MipChain {
    levels: usize,
    slots: usize,
    faces: usize,
    blocks: Vec<Option<Vec<u8>>>,
}

impl MipChain {
    /// Create an unfilled chain of cubemaps.
    pub fn new(levels: usize, slots: usize) -> Self {
        Self::with_faces(levels, slots, CUBE_FACES)
    }

    /// Create an unfilled chain with an explicit face count.
    pub fn with_faces(levels: usize, slots: usize, faces: usize) -> Self {
        Self {
            levels,
            slots,
            faces,
            blocks: vec![None; levels * slots * faces],
        }
    }

    /// A chain with no addresses at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn faces(&self) -> usize {
        self.faces
    }

    /// True if the chain has no images stored.
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(Option::is_none)
    }

    /// Number of images stored.
    pub fn len(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }

    /// True if every address inside the bounds holds an image.
    pub fn is_complete(&self) -> bool {
        self.blocks.iter().all(Option::is_some)
    }

    fn offset(&self, index: MipIndex) -> Option<usize> {
        if index.level >= self.levels || index.slot >= self.slots || index.face >= self.faces {
            return None;
        }
        Some((index.level * self.slots + index.slot) * self.faces + index.face)
    }

    fn out_of_range(&self, index: MipIndex) -> Error {
        Error::MipOutOfRange {
            index,
            levels: self.levels,
            slots: self.slots,
            faces: self.faces,
        }
    }

    /// Get the image at `index`, if present.
    pub fn get(&self, index: MipIndex) -> Option<&[u8]> {
        self.offset(index)
            .and_then(|i| self.blocks[i].as_deref())
    }

    /// Store an image, replacing whatever was there.
    pub fn insert(&mut self, index: MipIndex, data: Vec<u8>) -> Result<()> {
        let i = self.offset(index).ok_or_else(|| self.out_of_range(index))?;
        self.blocks[i] = Some(data);
        Ok(())
    }

    /// Remove and return the image at `index`.
    pub fn take(&mut self, index: MipIndex) -> Option<Vec<u8>> {
        let i = self.offset(index)?;
        self.blocks[i].take()
    }

    /// All addresses in storage order: level outer, slot middle, face inner.
    pub fn indices(&self) -> impl Iterator<Item = MipIndex> {
        let (slots, faces) = (self.slots, self.faces);
        (0..self.levels).flat_map(move |level| {
            (0..slots).flat_map(move |slot| {
                (0..faces).map(move |face| MipIndex::new(level, slot, face))
            })
        })
    }

    /// First address (in storage order) without an image.
    pub fn first_missing(&self) -> Option<MipIndex> {
        self.indices().find(|&index| self.get(index).is_none())
    }

    /// Iterate stored images in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (MipIndex, &[u8])> {
        self.indices()
            .zip(self.blocks.iter())
            .filter_map(|(index, block)| block.as_deref().map(|data| (index, data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_order_reverses_levels() {
        assert_eq!(disk_order(4).collect::<Vec<_>>(), vec![3, 2, 1, 0]);
        assert_eq!(disk_order(0).count(), 0);
    }

    #[test]
    fn test_bc6h_level_sizes_256() {
        let sizes = MipProfile::BC6H.level_sizes(9).unwrap();
        assert_eq!(
            sizes,
            vec![65536, 16384, 4096, 1024, 256, 64, 16, 16, 16]
        );
    }

    #[test]
    fn test_bc6h_floors_at_one_block() {
        assert_eq!(MipProfile::BC6H.level_size(0), 16);
        assert_eq!(MipProfile::BC6H.level_size(1), 16);
        assert_eq!(MipProfile::BC6H.level_size(2), 16);
        assert_eq!(MipProfile::BC6H.level_size(3), 64);
    }

    #[test]
    fn test_level_sizes_non_increasing() {
        for profile in [MipProfile::BC6H, MipProfile::RGBA8888] {
            for mip_count in 1..=12 {
                let sizes = profile.level_sizes(mip_count).unwrap();
                assert!(sizes.windows(2).all(|w| w[0] >= w[1]), "{profile:?} {sizes:?}");
            }
        }
    }

    #[test]
    fn test_rgba8888_level_sizes_64() {
        let sizes = MipProfile::RGBA8888.level_sizes(7).unwrap();
        assert_eq!(sizes, vec![16384, 4096, 1024, 256, 64, 16, 4]);
    }

    #[test]
    fn test_too_many_levels() {
        assert!(matches!(
            MipProfile::BC6H.level_sizes(MAX_MIP_LEVELS + 1),
            Err(Error::TooManyLevels { .. })
        ));
    }

    #[test]
    fn test_chain_insert_and_get() {
        let mut chain = MipChain::new(2, 1);
        assert!(chain.is_empty());
        assert_eq!(chain.first_missing(), Some(MipIndex::new(0, 0, 0)));

        chain.insert(MipIndex::new(1, 0, 5), vec![7; 16]).unwrap();
        assert_eq!(chain.get(MipIndex::new(1, 0, 5)), Some(&[7u8; 16][..]));
        assert_eq!(chain.get(MipIndex::new(0, 0, 5)), None);
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_complete());
    }

    #[test]
    fn test_chain_rejects_out_of_range() {
        let mut chain = MipChain::new(2, 1);
        assert!(matches!(
            chain.insert(MipIndex::new(0, 1, 0), vec![]),
            Err(Error::MipOutOfRange { .. })
        ));
        assert!(chain.get(MipIndex::new(0, 0, 6)).is_none());
    }

    #[test]
    fn test_chain_storage_order() {
        let mut chain = MipChain::new(2, 2);
        for index in chain.indices().collect::<Vec<_>>() {
            chain.insert(index, vec![index.level as u8]).unwrap();
        }
        assert!(chain.is_complete());
        assert_eq!(chain.first_missing(), None);

        let order: Vec<_> = chain.iter().map(|(index, _)| index).collect();
        assert_eq!(order.len(), 24);
        assert_eq!(order[0], MipIndex::new(0, 0, 0));
        assert_eq!(order[5], MipIndex::new(0, 0, 5));
        assert_eq!(order[6], MipIndex::new(0, 1, 0));
        assert_eq!(order[12], MipIndex::new(1, 0, 0));
    }
}
