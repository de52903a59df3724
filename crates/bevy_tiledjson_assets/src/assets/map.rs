use bevy::{platform::collections::HashMap, prelude::*};
use bevy_tiledjson_core::layer::Layer;
use bevy_tiledjson_core::properties::Properties;
use bevy_tiledjson_core::{Tile, TileMap, Tileset};

#[derive(TypePath, Asset, Debug)]
pub struct TiledJsonMapAsset {
    /// The fully resolved map
    pub map: TileMap,

    // ===== PROCESSED DATA FOR BEVY =====
    /// Map size in tiles (for tilemap systems)
    pub tilemap_size: UVec2,

    /// Map tile size in pixels
    pub tile_size: UVec2,

    /// Map bounding box in pixels
    pub rect: Rect,

    // ===== INFINITE MAP SUPPORT =====
    /// Offset shifting negative chunks into positive space (pixels)
    pub tiled_offset: Vec2,
    /// Top-left chunk, in chunk units
    pub topleft_chunk: (i32, i32),
    /// Bottom-right chunk, in chunk units
    pub bottomright_chunk: (i32, i32),

    // ===== CUSTOM PROPERTIES =====
    /// Custom properties set on the map in Tiled
    pub properties: Properties,

    /// Custom properties set on layers
    /// Key: Layer ID
    pub layer_properties: HashMap<u32, Properties>,

    /// Custom properties set on objects
    /// Key: Object ID
    pub object_properties: HashMap<u32, Properties>,
}

impl TiledJsonMapAsset {
    /// Find a layer anywhere in the tree by id.
    pub fn layer(&self, id: u32) -> Option<&Layer> {
        self.map.layers_recursive().find(|layer| layer.id() == id)
    }

    /// The tileset owning a resolved tile.
    #[inline]
    pub fn tileset_of(&self, tile: &Tile) -> Option<&Tileset> {
        self.map.tileset_of(tile)
    }

    /// Pixel position of a tile coordinate's top-left corner, offset into positive space.
    pub fn tile_to_pixel(&self, x: i32, y: i32) -> Vec2 {
        Vec2::new(
            x as f32 * self.tile_size.x as f32,
            y as f32 * self.tile_size.y as f32,
        ) + self.tiled_offset
    }
}
