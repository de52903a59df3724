//! # `bevy_tiledjson_core`
//!
//! Decode-and-resolve pipeline for Tiled JSON maps (`.tmj`). Turns a map file into a fully
//! resolved model: every tile cell decoded and matched to its tileset, external tilesets
//! merged, object templates applied, polygon points in map coordinates.
//!
//! **This crate has no Bevy dependency.** The Bevy asset integration lives in
//! `bevy_tiledjson_assets`.
//!
//! ## Pipeline
//!
//! 1. Parse the map JSON into raw DTOs ([`TileMap`], [`Layer`], [`Tileset`])
//! 2. Merge every external tileset (`source` → `.tsj` file)
//! 3. Walk the layer tree depth-first:
//!    - tile layers: [`codec::decode`] then [`gid::resolve`], per layer or per 16×16 chunk
//!    - object layers: [`template::apply_templates`], tile-object resolution, point translation
//!    - groups: recurse
//!
//! Any failure aborts the whole load. A partially resolved map is never returned.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bevy_tiledjson_core::prelude::*;
//!
//! let map = Loader::new().load_tmj_map("assets/maps/level1.tmj")?;
//! for layer in map.layers_recursive() {
//!     if let Layer::Tiles(tiles) = layer {
//!         for (x, y, tile) in tiles.iter_tiles() {
//!             println!("{x},{y}: gid {} from tileset {:?}", tile.gid, tile.tileset_index);
//!         }
//!     }
//! }
//! # Ok::<(), bevy_tiledjson_core::Error>(())
//! ```

pub mod codec;
pub mod error;
pub mod gid;
pub mod layer;
pub mod loader;
pub mod map;
pub mod object;
pub mod properties;
pub mod template;
pub mod tile;
pub mod tileset;
pub mod walker;

pub use error::{Error, Result};
pub use layer::Layer;
pub use loader::{FilesystemReader, LoadSession, Loader, MemoryReader, ResourceReader, load_tile_map};
pub use map::TileMap;
pub use tile::Tile;
pub use tileset::Tileset;

pub mod prelude {
    //! Common imports for `bevy_tiledjson_core` users.

    pub use crate::error::Error;
    pub use crate::layer::{
        Chunk, GroupLayer, ImageLayer, Layer, LayerInfo, ObjectLayer, ObjectList, TileData,
        TileLayer,
    };
    pub use crate::loader::{
        FilesystemReader, LoadSession, Loader, MemoryReader, ResourceReader, load_tile_map,
    };
    pub use crate::map::{CHUNK_CELLS, CHUNK_HEIGHT, CHUNK_WIDTH, TileMap};
    pub use crate::object::{Object, ObjectShape, Point, Text};
    pub use crate::properties::{FromTiledProperty, Properties, Property};
    pub use crate::template::{Template, TemplateTileset};
    pub use crate::tile::Tile;
    pub use crate::tileset::{TileDefinition, Tileset};
}
