//! The root map aggregate.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::Result;
use crate::layer::{Layer, ObjectList};
use crate::loader::LoadSession;
use crate::properties::Properties;
use crate::tile::Tile;
use crate::tileset::{self, Tileset};
use crate::walker::LayerWalker;

/// Width of an infinite map chunk in tiles.
pub const CHUNK_WIDTH: u32 = 16;
/// Height of an infinite map chunk in tiles.
pub const CHUNK_HEIGHT: u32 = 16;
/// Cells decoded from every chunk, whatever its declared size.
pub const CHUNK_CELLS: usize = (CHUNK_WIDTH * CHUNK_HEIGHT) as usize;

/// A Tiled JSON map.
///
/// Freshly deserialized maps hold raw layer data. [`TileMap::resolve`] (called by
/// [`crate::Loader`]) merges external tilesets and resolves the layer tree.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TileMap {
    // ===== FORMAT =====
    #[serde(deserialize_with = "string_or_number")]
    pub version: String,
    #[serde(rename = "tiledversion")]
    pub tiled_version: String,
    /// Always `map`
    #[serde(rename = "type")]
    pub kind: String,
    pub class: String,

    // ===== LAYOUT =====
    /// `orthogonal`, `isometric`, `staggered` or `hexagonal`
    pub orientation: String,
    /// `right-down`, `right-up`, `left-down` or `left-up`
    #[serde(rename = "renderorder")]
    pub render_order: String,
    #[serde(rename = "staggeraxis")]
    pub stagger_axis: String,
    #[serde(rename = "staggerindex")]
    pub stagger_index: String,
    #[serde(rename = "hexsidelength")]
    pub hex_side_length: u32,
    #[serde(rename = "backgroundcolor")]
    pub background_color: String,

    // ===== DIMENSIONS =====
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    #[serde(rename = "tilewidth")]
    pub tile_width: u32,
    #[serde(rename = "tileheight")]
    pub tile_height: u32,
    pub infinite: bool,

    // ===== IDS =====
    #[serde(rename = "nextlayerid")]
    pub next_layer_id: u32,
    #[serde(rename = "nextobjectid")]
    pub next_object_id: u32,

    // ===== CONTENT =====
    pub tilesets: Vec<Tileset>,
    pub layers: Vec<Layer>,
    pub properties: Properties,
}

impl TileMap {
    /// Resolve external tilesets, then every layer.
    ///
    /// Tilesets must be complete before any gid can be matched, so they always go first.
    pub fn resolve(&mut self, session: &mut LoadSession<'_>) -> Result<()> {
        tileset::resolve_all(&mut self.tilesets, session)?;

        LayerWalker {
            tilesets: &self.tilesets,
            infinite: self.infinite,
            width: self.width,
            height: self.height,
            session,
        }
        .resolve_all(&mut self.layers)
    }

    /// The tileset owning `tile`, or `None` for an empty cell.
    pub fn tileset_of(&self, tile: &Tile) -> Option<&Tileset> {
        tile.tileset_index.and_then(|index| self.tilesets.get(index))
    }

    /// The tileset owning `gid` (flip bits are ignored).
    pub fn tileset_for_gid(&self, gid: u32) -> Option<(usize, &Tileset)> {
        let index = crate::gid::find_tileset(crate::gid::strip_flags(gid), &self.tilesets)?;
        Some((index, &self.tilesets[index]))
    }

    /// Iterate over every layer, depth-first, groups before their children.
    pub fn layers_recursive(&self) -> LayersRecursive<'_> {
        LayersRecursive {
            stack: vec![self.layers.iter()],
        }
    }

    /// Whether no tileset, tile layer or object layer is left in its raw state.
    pub fn is_fully_resolved(&self) -> bool {
        self.tilesets.iter().all(|tileset| !tileset.is_unresolved())
            && self.layers_recursive().all(|layer| match layer {
                Layer::Tiles(tiles) => tiles.is_resolved(),
                Layer::Objects(objects) => matches!(objects.objects, ObjectList::Resolved(_)),
                Layer::Image(_) | Layer::Group(_) => true,
            })
    }
}

/// Depth-first layer iterator returned by [`TileMap::layers_recursive`].
pub struct LayersRecursive<'a> {
    stack: Vec<std::slice::Iter<'a, Layer>>,
}

impl<'a> Iterator for LayersRecursive<'a> {
    type Item = &'a Layer;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(layer) => {
                    if let Layer::Group(group) = layer {
                        self.stack.push(group.layers.iter());
                    }
                    return Some(layer);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Accept a version written as either a string (`"1.10"`) or a number (`1.1`).
pub(crate) fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::Error;
    use crate::loader::{LoadSession, Loader, MemoryReader};

    fn load(map: serde_json::Value) -> Result<TileMap> {
        Loader::with_reader(MemoryReader::new()).load_tmj_map_from_slice(map.to_string().as_bytes(), "")
    }

    #[test]
    fn test_finite_two_cell_layer() {
        let map = load(json!({
            "width": 2, "height": 1, "tilewidth": 16, "tileheight": 16, "infinite": false,
            "tilesets": [{ "firstgid": 1, "tilecount": 10 }],
            "layers": [{ "type": "tilelayer", "id": 1, "name": "ground", "width": 2, "height": 1, "data": [0, 5] }]
        }))
        .unwrap();

        let layer = map.layers[0].as_tiles().unwrap();
        let tiles = layer.data.tiles().unwrap();
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0], Tile::NIL);
        assert_eq!(
            tiles[1],
            Tile {
                gid: 5,
                lid: 4,
                tileset_index: Some(0),
                ..Default::default()
            }
        );
        assert!(map.tileset_of(&tiles[1]).is_some());
        assert!(map.tileset_of(&tiles[0]).is_none());
    }

    #[test]
    fn test_infinite_chunk_size_mismatch_returns_no_map() {
        let result = load(json!({
            "width": 16, "height": 16, "infinite": true,
            "tilesets": [{ "firstgid": 1, "tilecount": 10 }],
            "layers": [{
                "type": "tilelayer", "id": 1, "name": "world",
                "chunks": [{ "x": 0, "y": 0, "width": 16, "height": 16, "data": [1, 2, 3] }]
            }]
        }));

        let err = result.unwrap_err();
        assert!(matches!(
            err.root_cause(),
            Error::DataSizeMismatch {
                expected: 1024,
                actual: 12
            }
        ));
    }

    #[test]
    fn test_version_accepts_number_or_string() {
        let map: TileMap = serde_json::from_value(json!({ "version": 1.1 })).unwrap();
        assert_eq!(map.version, "1.1");
        let map: TileMap = serde_json::from_value(json!({ "version": "1.10" })).unwrap();
        assert_eq!(map.version, "1.10");
    }

    #[test]
    fn test_layers_recursive_is_depth_first() {
        let map: TileMap = serde_json::from_value(json!({
            "layers": [
                { "type": "group", "id": 1, "name": "a", "layers": [
                    { "type": "imagelayer", "id": 2, "name": "b" },
                    { "type": "group", "id": 3, "name": "c", "layers": [
                        { "type": "objectgroup", "id": 4, "name": "d" }
                    ]}
                ]},
                { "type": "tilelayer", "id": 5, "name": "e" }
            ]
        }))
        .unwrap();

        let names: Vec<&str> = map.layers_recursive().map(Layer::name).collect();
        assert_eq!(names, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_tileset_for_gid_ignores_flip_bits() {
        let map: TileMap = serde_json::from_value(json!({
            "tilesets": [
                { "firstgid": 1, "name": "a", "tilecount": 4 },
                { "firstgid": 5, "name": "b", "tilecount": 4 }
            ]
        }))
        .unwrap();

        let (index, tileset) = map.tileset_for_gid(0x8000_0006).unwrap();
        assert_eq!(index, 1);
        assert_eq!(tileset.name, "b");
        assert!(map.tileset_for_gid(9).is_none());
    }

    #[test]
    fn test_defaults_for_missing_keys() {
        let map: TileMap = serde_json::from_value(json!({})).unwrap();
        assert_eq!(map.width, 0);
        assert!(!map.infinite);
        assert!(map.layers.is_empty());
        assert!(map.is_fully_resolved());
    }

    #[test]
    fn test_empty_infinite_layer_counts_as_resolved() {
        let map = load(json!({
            "width": 16, "height": 16, "infinite": true,
            "tilesets": [{ "firstgid": 1, "tilecount": 10 }],
            "layers": [{ "type": "tilelayer", "id": 1, "name": "empty", "chunks": [] }]
        }))
        .unwrap();
        assert!(map.is_fully_resolved());
    }

    #[test]
    fn test_resolve_can_be_retried_after_a_failure() {
        let mut map: TileMap = serde_json::from_value(json!({
            "width": 1, "height": 1, "infinite": false,
            "tilesets": [{ "firstgid": 1, "tilecount": 4 }],
            "layers": [{ "type": "objectgroup", "id": 2, "name": "props", "objects": [
                { "id": 1, "template": "chest.tj", "x": 4, "y": 4 },
                { "id": 2, "x": 1, "y": 1 }
            ]}]
        }))
        .unwrap();

        let mut reader = MemoryReader::new();
        {
            let mut session = LoadSession::new("maps", &mut reader);
            assert_eq!(session.base_dir(), std::path::Path::new("maps"));
            assert!(map.resolve(&mut session).is_err());
            assert!(session.templates().is_empty());
        }
        assert!(!map.is_fully_resolved());

        reader.insert(
            "maps/chest.tj",
            json!({ "type": "template", "object": { "name": "chest", "width": 16 } }).to_string(),
        );
        let mut session = LoadSession::new("maps", &mut reader);
        map.resolve(&mut session).unwrap();
        assert!(!session.templates().is_empty());
        assert!(map.is_fully_resolved());

        let objects = map.layers[0].as_objects().unwrap().objects.objects().unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name, "chest");
        assert_eq!(objects[0].x, 4.0);
        assert!(!objects[0].is_tile());
    }
}
