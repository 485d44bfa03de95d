//! Common utilities for regen.
//!
//! This crate provides the pieces shared by the DDS and VTF codecs:
//!
//! - [`BinaryReader`] - Zero-copy binary reading from byte slices
//! - [`MipIndex`] / [`MipChain`] - The `(level, slot, face)` address space of
//!   a cubemap mipmap chain, backed by a dense array
//! - [`MipProfile`] - Per-level byte lengths for the supported pixel layouts
//! - [`disk_order`] - The level reversal between in-memory and on-disk order

mod error;
mod mips;
mod reader;

pub use error::{Error, Result};
pub use mips::{disk_order, MipChain, MipIndex, MipProfile, CUBE_FACES, MAX_MIP_LEVELS};
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
