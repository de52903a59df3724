//! Tilesets and external tileset resolution.
//!
//! A map's `tilesets` array holds either complete tileset records, or stubs carrying only
//! `firstgid` and a `source` path to a `.tsj` file. [`resolve_all`] loads each stub's file and
//! merges the file's scalar fields onto the stub.

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, ResultExt};
use crate::loader::LoadSession;
use crate::map::string_or_number;
use crate::object::Object;
use crate::properties::Properties;

/// Grid settings used for tile objects of orthogonal or isometric image collections.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Grid {
    /// `orthogonal` or `isometric`
    pub orientation: String,
    pub width: u32,
    pub height: u32,
}

/// Pixel offset applied when drawing tiles of this tileset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TileOffset {
    pub x: i32,
    pub y: i32,
}

/// Legacy terrain definition.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Terrain {
    pub name: String,
    /// Local id of the tile representing the terrain
    pub tile: i32,
    pub properties: Properties,
}

/// One frame of a tile animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Frame {
    /// Local tile id shown during this frame
    #[serde(rename = "tileid")]
    pub tile_id: u32,
    /// Milliseconds
    pub duration: u32,
}

/// Collision shapes attached to a tile.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct CollisionGroup {
    #[serde(rename = "draworder")]
    pub draw_order: String,
    /// Shapes in tile-local coordinates
    pub objects: Vec<Object>,
}

/// Per-tile data of a tileset.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TileDefinition {
    /// Local id within the tileset
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: String,

    // ===== IMAGE (image collections) =====
    pub image: String,
    #[serde(rename = "imagewidth")]
    pub image_width: u32,
    #[serde(rename = "imageheight")]
    pub image_height: u32,

    pub probability: f64,
    /// Terrain indices for the top-left, top-right, bottom-left and bottom-right corners
    pub terrain: Vec<i32>,
    pub animation: Vec<Frame>,
    #[serde(rename = "objectgroup")]
    pub object_group: Option<CollisionGroup>,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct WangColor {
    pub name: String,
    pub color: String,
    pub tile: i32,
    pub probability: f64,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct WangTile {
    #[serde(rename = "tileid")]
    pub tile_id: u32,
    /// Color indices, clockwise from the top edge
    #[serde(rename = "wangid")]
    pub wang_id: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct WangSet {
    pub name: String,
    /// `corner`, `edge` or `mixed`
    #[serde(rename = "type")]
    pub kind: String,
    pub tile: i32,
    pub colors: Vec<WangColor>,
    #[serde(rename = "cornercolors")]
    pub corner_colors: Vec<WangColor>,
    #[serde(rename = "edgecolors")]
    pub edge_colors: Vec<WangColor>,
    #[serde(rename = "wangtiles")]
    pub wang_tiles: Vec<WangTile>,
    pub properties: Properties,
}

/// A tileset, either embedded in a map or loaded from a `.tsj` file.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Tileset {
    // ===== IDENTITY =====
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub class: String,
    /// Path to the external tileset file, relative to the referencing file
    pub source: Option<String>,
    #[serde(rename = "firstgid")]
    pub first_gid: u32,
    #[serde(deserialize_with = "string_or_number")]
    pub version: String,
    #[serde(rename = "tiledversion")]
    pub tiled_version: String,

    // ===== IMAGE =====
    pub image: String,
    #[serde(rename = "imagewidth")]
    pub image_width: u32,
    #[serde(rename = "imageheight")]
    pub image_height: u32,
    #[serde(rename = "transparentcolor")]
    pub transparent_color: String,
    #[serde(rename = "backgroundcolor")]
    pub background_color: String,

    // ===== LAYOUT =====
    #[serde(rename = "tilewidth")]
    pub tile_width: u32,
    #[serde(rename = "tileheight")]
    pub tile_height: u32,
    pub spacing: u32,
    pub margin: u32,
    #[serde(rename = "tilecount")]
    pub tile_count: u32,
    /// `0` for image collection tilesets
    pub columns: u32,
    #[serde(rename = "objectalignment")]
    pub object_alignment: String,

    // ===== COLLECTIONS =====
    pub grid: Option<Grid>,
    #[serde(rename = "tileoffset")]
    pub tile_offset: Option<TileOffset>,
    pub terrains: Vec<Terrain>,
    pub tiles: Vec<TileDefinition>,
    pub wangsets: Vec<WangSet>,
    pub properties: Properties,

    #[serde(skip)]
    pub(crate) merged: bool,
}

impl Tileset {
    /// The external file path, if this tileset still references one.
    pub fn external_source(&self) -> Option<&str> {
        self.source.as_deref().filter(|source| !source.is_empty())
    }

    /// Whether this tileset needs its external file merged before use.
    #[inline]
    pub fn is_unresolved(&self) -> bool {
        self.external_source().is_some() && !self.merged
    }

    /// Last global id owned by this tileset, or `None` for an empty tileset.
    pub fn last_gid(&self) -> Option<u32> {
        let last = u64::from(self.first_gid) + u64::from(self.tile_count);
        (self.tile_count > 0).then(|| (last - 1).min(u64::from(u32::MAX)) as u32)
    }

    /// Whether `gid` (flip bits cleared) falls in `[firstgid, firstgid + tilecount - 1]`.
    pub fn contains_gid(&self, gid: u32) -> bool {
        let gid = u64::from(gid);
        let first = u64::from(self.first_gid);
        gid >= first && gid < first + u64::from(self.tile_count)
    }

    /// Per-tile data for local id `lid`, if the tileset defines any.
    pub fn tile(&self, lid: u32) -> Option<&TileDefinition> {
        self.tiles.iter().find(|tile| tile.id == lid)
    }

    /// Copy the scalar fields of a loaded external tileset onto this record.
    ///
    /// `first_gid` is owned by the referencing map and is never overwritten. `source` is
    /// kept so the tileset can still be matched by file name. Collections are left
    /// untouched.
    pub fn merge_external(&mut self, external: Tileset) {
        if !external.name.is_empty() {
            self.name = external.name;
        }
        if !external.kind.is_empty() {
            self.kind = external.kind;
        }
        if !external.class.is_empty() {
            self.class = external.class;
        }
        self.version = external.version;
        self.tiled_version = external.tiled_version;

        self.image = external.image;
        self.image_width = external.image_width;
        self.image_height = external.image_height;
        self.transparent_color = external.transparent_color;
        self.background_color = external.background_color;

        self.tile_width = external.tile_width;
        self.tile_height = external.tile_height;
        self.spacing = external.spacing;
        self.margin = external.margin;
        self.tile_count = external.tile_count;
        self.columns = external.columns;
        self.object_alignment = external.object_alignment;

        self.merged = true;
    }
}

/// Merge every external tileset's file into its map record.
///
/// Tilesets without a `source`, or already merged, are left alone. The first failure aborts
/// with the tileset's index attached.
pub fn resolve_all(tilesets: &mut [Tileset], session: &mut LoadSession<'_>) -> Result<()> {
    for (index, tileset) in tilesets.iter_mut().enumerate() {
        if !tileset.is_unresolved() {
            continue;
        }
        let Some(source) = tileset.external_source().map(str::to_string) else {
            continue;
        };

        debug!("Loading external tileset {} (firstgid {})", source, tileset.first_gid);
        let external: Tileset = session.read_json(&source).in_tileset(index)?;
        tileset.merge_external(external);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::Error;
    use crate::loader::MemoryReader;

    fn external_tileset() -> serde_json::Value {
        json!({
            "name": "terrain",
            "type": "tileset",
            "version": 1.10,
            "tiledversion": "1.10.2",
            "image": "terrain.png",
            "imagewidth": 128,
            "imageheight": 64,
            "tilewidth": 16,
            "tileheight": 16,
            "tilecount": 32,
            "columns": 8,
            "spacing": 1,
            "firstgid": 99,
            "tiles": [{ "id": 3, "animation": [{ "tileid": 3, "duration": 100 }] }]
        })
    }

    #[test]
    fn test_contains_gid_does_not_overflow() {
        let tileset = Tileset {
            first_gid: u32::MAX - 1,
            tile_count: 10,
            ..Default::default()
        };
        assert!(tileset.contains_gid(u32::MAX));
        assert!(!tileset.contains_gid(u32::MAX - 2));
        assert_eq!(tileset.last_gid(), Some(u32::MAX));

        let empty = Tileset {
            first_gid: 1,
            ..Default::default()
        };
        assert!(!empty.contains_gid(1));
        assert_eq!(empty.last_gid(), None);
    }

    #[test]
    fn test_merge_external_keeps_first_gid_and_collections() {
        let mut stub: Tileset =
            serde_json::from_value(json!({ "firstgid": 5, "source": "terrain.tsj" })).unwrap();
        let external: Tileset = serde_json::from_value(external_tileset()).unwrap();

        assert!(stub.is_unresolved());
        stub.merge_external(external);

        assert!(!stub.is_unresolved());
        assert_eq!(stub.first_gid, 5);
        assert_eq!(stub.name, "terrain");
        assert_eq!(stub.tile_count, 32);
        assert_eq!(stub.columns, 8);
        assert_eq!(stub.version, "1.1");
        assert_eq!(stub.source.as_deref(), Some("terrain.tsj"));
        assert!(stub.tiles.is_empty());
    }

    #[test]
    fn test_resolve_all_loads_relative_to_base_dir() {
        let mut reader = MemoryReader::new();
        reader.insert("maps/tilesets/terrain.tsj", external_tileset().to_string());
        let mut session = LoadSession::new("maps", &mut reader);

        let mut tilesets: Vec<Tileset> = serde_json::from_value(json!([
            { "firstgid": 1, "name": "inline", "tilecount": 4 },
            { "firstgid": 5, "source": "tilesets/terrain.tsj" }
        ]))
        .unwrap();

        resolve_all(&mut tilesets, &mut session).unwrap();
        assert_eq!(tilesets[0].name, "inline");
        assert_eq!(tilesets[1].name, "terrain");
        assert!(tilesets.iter().all(|tileset| !tileset.is_unresolved()));
    }

    #[test]
    fn test_resolve_all_fails_on_missing_file() {
        let mut reader = MemoryReader::new();
        let mut session = LoadSession::new("maps", &mut reader);
        let mut tilesets = vec![Tileset {
            first_gid: 1,
            source: Some("gone.tsj".to_string()),
            ..Default::default()
        }];

        let err = resolve_all(&mut tilesets, &mut session).unwrap_err();
        assert!(matches!(err, Error::InTileset { index: 0, .. }));
        assert!(matches!(err.root_cause(), Error::Io { .. }));
    }

    #[test]
    fn test_resolve_all_fails_on_malformed_file() {
        let mut reader = MemoryReader::new();
        reader.insert("maps/tilesets/broken.tsj", "{ \"name\": ");
        let mut session = LoadSession::new("maps", &mut reader);
        let mut tilesets = vec![Tileset {
            first_gid: 1,
            source: Some("tilesets/broken.tsj".to_string()),
            ..Default::default()
        }];

        let err = resolve_all(&mut tilesets, &mut session).unwrap_err();
        assert!(matches!(err, Error::InTileset { index: 0, .. }));
        assert!(matches!(
            err.root_cause(),
            Error::Json { path, .. } if path == std::path::Path::new("maps/tilesets/broken.tsj")
        ));
        assert!(tilesets[0].is_unresolved());
    }

    #[test]
    fn test_empty_source_is_not_external() {
        let tileset: Tileset =
            serde_json::from_value(json!({ "firstgid": 1, "source": "", "tilecount": 2 })).unwrap();
        assert!(!tileset.is_unresolved());
    }

    #[test]
    fn test_tile_definitions() {
        let tileset: Tileset = serde_json::from_value(json!({
            "firstgid": 1,
            "tilecount": 4,
            "tiles": [{
                "id": 2,
                "type": "wall",
                "objectgroup": {
                    "draworder": "index",
                    "objects": [{ "id": 1, "width": 16, "height": 8 }]
                }
            }]
        }))
        .unwrap();

        let wall = tileset.tile(2).unwrap();
        assert_eq!(wall.kind, "wall");
        let group = wall.object_group.as_ref().unwrap();
        assert_eq!(group.objects[0].width, 16.0);
        assert!(group.objects[0].visible);
        assert!(tileset.tile(1).is_none());
    }
}
