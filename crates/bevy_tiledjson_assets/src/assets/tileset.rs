use bevy::{platform::collections::HashMap, prelude::*};
use bevy_tiledjson_core::properties::Properties;
use bevy_tiledjson_core::tileset::{TileDefinition, Tileset};

/// Bevy asset wrapper for standalone Tiled JSON tilesets (.tsj files)
///
/// Supports both texture atlas tilesets (single spritesheet) and image collection
/// tilesets (individual images per tile).
#[derive(TypePath, Asset, Debug)]
pub struct TiledJsonTilesetAsset {
    /// Parsed tileset data
    pub tileset: Tileset,

    // ===== PROCESSED DATA FOR CONVENIENCE =====
    /// Tile size in pixels (width, height)
    pub tile_size: UVec2,

    /// Tileset grid dimensions in tiles (columns, rows)
    ///
    /// For image collection tilesets, this is `UVec2::ZERO`.
    pub grid_size: UVec2,

    /// Spacing between tiles in the atlas (pixels)
    pub spacing: u32,

    /// Margin around the tileset in the atlas (pixels)
    pub margin: u32,

    // ===== CUSTOM PROPERTIES =====
    /// Custom properties set on the tileset in Tiled
    pub properties: Properties,

    /// Custom properties set on individual tiles
    /// Key: Local tile ID (0-based, NOT GID)
    pub tile_properties: HashMap<u32, Properties>,
}

impl TiledJsonTilesetAsset {
    /// Build the asset and its derived data from a parsed tileset.
    pub fn from_tileset(tileset: Tileset) -> Self {
        let grid_size = if tileset.columns == 0 {
            UVec2::ZERO
        } else {
            UVec2::new(
                tileset.columns,
                tileset.tile_count.div_ceil(tileset.columns),
            )
        };

        let tile_properties = tileset
            .tiles
            .iter()
            .filter(|tile| !tile.properties.is_empty())
            .map(|tile| (tile.id, tile.properties.clone()))
            .collect();

        Self {
            tile_size: UVec2::new(tileset.tile_width, tileset.tile_height),
            grid_size,
            spacing: tileset.spacing,
            margin: tileset.margin,
            properties: tileset.properties.clone(),
            tile_properties,
            tileset,
        }
    }

    /// Check if this is an image collection tileset (vs. texture atlas)
    #[inline]
    pub fn is_image_collection(&self) -> bool {
        self.tileset.columns == 0
    }

    /// Per-tile data for a local tile id
    pub fn tile(&self, local_tile_id: u32) -> Option<&TileDefinition> {
        self.tileset.tile(local_tile_id)
    }

    /// Pixel rect of a tile inside the atlas image, or `None` for image collections
    /// and out-of-range ids.
    pub fn atlas_rect(&self, local_tile_id: u32) -> Option<URect> {
        if self.is_image_collection() || local_tile_id >= self.tileset.tile_count {
            return None;
        }
        let column = local_tile_id % self.grid_size.x;
        let row = local_tile_id / self.grid_size.x;
        let min = UVec2::new(
            self.margin + column * (self.tile_size.x + self.spacing),
            self.margin + row * (self.tile_size.y + self.spacing),
        );
        Some(URect::from_corners(min, min + self.tile_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tileset(value: &str) -> Tileset {
        bevy_tiledjson_core::Loader::new()
            .load_tsj_tileset_from_slice(value.as_bytes())
            .unwrap()
    }

    #[test]
    fn test_grid_size_rounds_rows_up() {
        let asset = TiledJsonTilesetAsset::from_tileset(tileset(
            r#"{ "tilewidth": 16, "tileheight": 8, "columns": 4, "tilecount": 10 }"#,
        ));
        assert_eq!(asset.grid_size, UVec2::new(4, 3));
        assert_eq!(asset.tile_size, UVec2::new(16, 8));
        assert!(!asset.is_image_collection());
    }

    #[test]
    fn test_image_collection_has_zero_grid() {
        let asset = TiledJsonTilesetAsset::from_tileset(tileset(
            r#"{ "columns": 0, "tilecount": 3, "tiles": [{ "id": 1, "image": "a.png" }] }"#,
        ));
        assert_eq!(asset.grid_size, UVec2::ZERO);
        assert!(asset.is_image_collection());
        assert_eq!(asset.atlas_rect(0), None);
        assert_eq!(asset.tile(1).map(|tile| tile.image.as_str()), Some("a.png"));
    }

    #[test]
    fn test_atlas_rect_accounts_for_margin_and_spacing() {
        let asset = TiledJsonTilesetAsset::from_tileset(tileset(
            r#"{ "tilewidth": 16, "tileheight": 16, "columns": 4, "tilecount": 8, "margin": 1, "spacing": 2 }"#,
        ));
        let rect = asset.atlas_rect(5).unwrap();
        assert_eq!(rect.min, UVec2::new(19, 19));
        assert_eq!(rect.max, UVec2::new(35, 35));
        assert_eq!(asset.atlas_rect(8), None);
    }

    #[test]
    fn test_tile_properties_are_keyed_by_local_id() {
        let asset = TiledJsonTilesetAsset::from_tileset(tileset(
            r#"{
                "columns": 2, "tilecount": 4,
                "tiles": [
                    { "id": 0 },
                    { "id": 3, "properties": [{ "name": "solid", "type": "bool", "value": true }] }
                ]
            }"#,
        ));
        assert_eq!(asset.tile_properties.len(), 1);
        assert_eq!(asset.tile_properties.get(&3).and_then(|props| props.get_as::<bool>("solid")), Some(true));
    }
}
