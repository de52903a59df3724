//! Resolved tile cells.

/// One decoded cell of a tile layer or chunk.
///
/// Empty cells (global id 0) are represented by [`Tile::NIL`], which carries no tileset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tile {
    /// Global id with the flip bits cleared
    pub gid: u32,

    /// Local tile id within the owning tileset (`gid - firstgid`)
    pub lid: u32,

    /// Index of the owning tileset in `TileMap::tilesets`
    pub tileset_index: Option<usize>,

    /// Horizontal flip flag (bit 31)
    pub flipped_h: bool,

    /// Vertical flip flag (bit 30)
    pub flipped_v: bool,

    /// Diagonal flip flag (bit 29)
    pub flipped_d: bool,
}

impl Tile {
    /// An empty cell.
    pub const NIL: Tile = Tile {
        gid: 0,
        lid: 0,
        tileset_index: None,
        flipped_h: false,
        flipped_v: false,
        flipped_d: false,
    };

    /// Whether this cell is empty.
    #[inline]
    pub fn is_nil(&self) -> bool {
        self.tileset_index.is_none()
    }

    /// Whether any flip flag is set.
    #[inline]
    pub fn is_flipped(&self) -> bool {
        self.flipped_h || self.flipped_v || self.flipped_d
    }
}
