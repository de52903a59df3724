//! Global id resolution.
//!
//! A packed global id keeps its flip flags in the top three bits:
//!
//! | bit | meaning              |
//! |-----|----------------------|
//! | 31  | horizontal flip      |
//! | 30  | vertical flip        |
//! | 29  | diagonal flip        |
//! | 0-28| tileset-spanning gid |
//!
//! Resolution strips the flags and finds the owning tileset by a linear scan over the
//! declared tileset order, first match wins. Overlapping ranges are not detected.

use crate::codec::BYTES_PER_CELL;
use crate::error::{Error, Result};
use crate::tile::Tile;
use crate::tileset::Tileset;

pub const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;
pub const FLIPPED_VERTICALLY: u32 = 0x4000_0000;
pub const FLIPPED_DIAGONALLY: u32 = 0x2000_0000;

/// All three flip bits.
pub const FLIP_MASK: u32 = FLIPPED_HORIZONTALLY | FLIPPED_VERTICALLY | FLIPPED_DIAGONALLY;

/// Clear bits 31, 30 and 29.
#[inline]
pub fn strip_flags(packed: u32) -> u32 {
    packed & !FLIP_MASK
}

/// Keep only bits 31, 30 and 29.
#[inline]
pub fn flag_bits(packed: u32) -> u32 {
    packed & FLIP_MASK
}

/// Flip flags extracted from a packed global id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlipFlags {
    pub horizontal: bool,
    pub vertical: bool,
    pub diagonal: bool,
}

impl FlipFlags {
    pub fn from_packed(packed: u32) -> Self {
        Self {
            horizontal: packed & FLIPPED_HORIZONTALLY != 0,
            vertical: packed & FLIPPED_VERTICALLY != 0,
            diagonal: packed & FLIPPED_DIAGONALLY != 0,
        }
    }
}

/// Find the index of the first tileset whose `[firstgid, firstgid + tilecount - 1]` range
/// contains `gid`.
pub fn find_tileset(gid: u32, tilesets: &[Tileset]) -> Option<usize> {
    tilesets.iter().position(|tileset| tileset.contains_gid(gid))
}

/// Resolve one packed id into a [`Tile`].
///
/// `0` yields [`Tile::NIL`]. Any other value must land in a tileset's range once its flip
/// bits are cleared.
pub fn resolve_gid(packed: u32, tilesets: &[Tileset]) -> Result<Tile> {
    if packed == 0 {
        return Ok(Tile::NIL);
    }

    let gid = strip_flags(packed);
    let flags = FlipFlags::from_packed(packed);

    let index = find_tileset(gid, tilesets).ok_or(Error::UnresolvableGid(gid))?;
    let first_gid = tilesets[index].first_gid;

    Ok(Tile {
        gid,
        lid: gid - first_gid,
        tileset_index: Some(index),
        flipped_h: flags.horizontal,
        flipped_v: flags.vertical,
        flipped_d: flags.diagonal,
    })
}

/// Resolve a decoded byte sequence into tiles.
///
/// # Arguments
/// * `bytes` - Packed little-endian ids from [`crate::codec::decode`]
/// * `tilesets` - The map's tilesets, in declaration order
/// * `expected_cells` - `width * height` for finite layers, 256 for chunks
///
/// # Returns
/// * `Ok(Vec<Tile>)` - One tile per cell, in input (row-major) order
/// * `Err(Error::DataSizeMismatch)` - If `bytes` does not hold exactly `expected_cells` ids
/// * `Err(Error::UnresolvableGid)` - If an id matches no tileset
pub fn resolve(bytes: &[u8], tilesets: &[Tileset], expected_cells: usize) -> Result<Vec<Tile>> {
    let expected = expected_cells * BYTES_PER_CELL;
    if bytes.len() != expected {
        return Err(Error::DataSizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }

    bytes
        .chunks_exact(BYTES_PER_CELL)
        .map(|cell| {
            let packed = u32::from_le_bytes([cell[0], cell[1], cell[2], cell[3]]);
            resolve_gid(packed, tilesets)
        })
        .collect()
}
