//! Layer data structures.
//!
//! Layers deserialize in their raw state: tile data is an untouched array or string and
//! objects are as-declared records. [`crate::walker::LayerWalker`] replaces both in place
//! with their resolved forms.

use serde::Deserialize;

use crate::map::{CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::object::{Object, ObjectRecord};
use crate::properties::Properties;
use crate::tile::Tile;

/// A map layer, discriminated by its `type` key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum Layer {
    #[serde(rename = "tilelayer")]
    Tiles(TileLayer),
    #[serde(rename = "objectgroup")]
    Objects(ObjectLayer),
    #[serde(rename = "imagelayer")]
    Image(ImageLayer),
    #[serde(rename = "group")]
    Group(GroupLayer),
}

impl Layer {
    pub fn info(&self) -> &LayerInfo {
        match self {
            Layer::Tiles(layer) => &layer.info,
            Layer::Objects(layer) => &layer.info,
            Layer::Image(layer) => &layer.info,
            Layer::Group(layer) => &layer.info,
        }
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.info().id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.info().name
    }

    #[inline]
    pub fn properties(&self) -> &Properties {
        &self.info().properties
    }

    /// The `type` string this layer was declared with.
    pub fn kind(&self) -> &'static str {
        match self {
            Layer::Tiles(_) => "tilelayer",
            Layer::Objects(_) => "objectgroup",
            Layer::Image(_) => "imagelayer",
            Layer::Group(_) => "group",
        }
    }

    pub fn as_tiles(&self) -> Option<&TileLayer> {
        match self {
            Layer::Tiles(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_objects(&self) -> Option<&ObjectLayer> {
        match self {
            Layer::Objects(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupLayer> {
        match self {
            Layer::Group(layer) => Some(layer),
            _ => None,
        }
    }
}

/// Fields shared by every layer kind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayerInfo {
    pub id: u32,
    pub name: String,
    pub class: String,

    // ===== PLACEMENT =====
    pub x: i32,
    pub y: i32,
    #[serde(rename = "offsetx")]
    pub offset_x: f64,
    #[serde(rename = "offsety")]
    pub offset_y: f64,
    #[serde(rename = "parallaxx")]
    pub parallax_x: f64,
    #[serde(rename = "parallaxy")]
    pub parallax_y: f64,

    // ===== DISPLAY =====
    pub opacity: f64,
    pub visible: bool,
    #[serde(rename = "tintcolor")]
    pub tint_color: String,

    pub properties: Properties,
}

impl Default for LayerInfo {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            class: String::new(),
            x: 0,
            y: 0,
            offset_x: 0.0,
            offset_y: 0.0,
            parallax_x: 1.0,
            parallax_y: 1.0,
            opacity: 1.0,
            visible: true,
            tint_color: String::new(),
            properties: Properties::default(),
        }
    }
}

/// Tile data as parsed, or once resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum TileData {
    /// A JSON array of numbers (csv encoding)
    RawNumeric(Vec<f64>),
    /// A JSON string (base64 encoding)
    RawText(String),
    /// One tile per cell, row-major
    Resolved(Vec<Tile>),
}

impl Default for TileData {
    fn default() -> Self {
        TileData::RawNumeric(Vec::new())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTileData {
    Numeric(Vec<f64>),
    Text(String),
}

impl From<RawTileData> for TileData {
    fn from(raw: RawTileData) -> Self {
        match raw {
            RawTileData::Numeric(values) => TileData::RawNumeric(values),
            RawTileData::Text(text) => TileData::RawText(text),
        }
    }
}

impl<'de> Deserialize<'de> for TileData {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawTileData::deserialize(deserializer).map(TileData::from)
    }
}

impl TileData {
    /// The resolved tiles, or `None` if the data has not been resolved yet.
    pub fn tiles(&self) -> Option<&[Tile]> {
        match self {
            TileData::Resolved(tiles) => Some(tiles),
            _ => None,
        }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, TileData::Resolved(_))
    }
}

/// A rectangular block of an infinite tile layer.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Chunk {
    /// Left edge in tiles
    pub x: i32,
    /// Top edge in tiles
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub data: TileData,
}

impl Chunk {
    /// Whether map tile coordinate `(x, y)` falls inside this chunk.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (dx, dy) = (i64::from(x) - i64::from(self.x), i64::from(y) - i64::from(self.y));
        dx >= 0 && dy >= 0 && dx < i64::from(CHUNK_WIDTH) && dy < i64::from(CHUNK_HEIGHT)
    }

    /// Tile at chunk-local coordinate `(x, y)`.
    pub fn tile_at(&self, x: u32, y: u32) -> Option<&Tile> {
        if x >= CHUNK_WIDTH || y >= CHUNK_HEIGHT {
            return None;
        }
        let index = (y * CHUNK_WIDTH + x) as usize;
        self.data.tiles()?.get(index)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TileLayer {
    #[serde(flatten)]
    pub info: LayerInfo,

    /// Width in tiles (finite maps only, filled in from the map when missing)
    pub width: u32,
    /// Height in tiles (finite maps only, filled in from the map when missing)
    pub height: u32,
    #[serde(rename = "startx")]
    pub start_x: i32,
    #[serde(rename = "starty")]
    pub start_y: i32,

    /// `csv`, `base64`, or empty (csv)
    pub encoding: String,
    /// `gzip`, `zlib`, or empty (none)
    pub compression: String,

    /// Cell data of a finite layer
    pub data: TileData,
    /// Cell data of an infinite layer
    pub chunks: Vec<Chunk>,
}

impl TileLayer {
    /// Tile at map tile coordinate `(x, y)`.
    ///
    /// Looks in `chunks` when the layer has any, otherwise in `data`. Returns `None` for
    /// coordinates outside the layer or if the layer is not resolved.
    pub fn tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        if !self.chunks.is_empty() {
            let chunk = self.chunks.iter().find(|chunk| chunk.contains(x, y))?;
            return chunk.tile_at((x - chunk.x) as u32, (y - chunk.y) as u32);
        }

        let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.tiles()?.get((y * self.width + x) as usize)
    }

    /// Iterate over every non-empty resolved cell as `(x, y, tile)` in map tile coordinates.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (i32, i32, &Tile)> + '_ {
        let finite = self
            .chunks
            .is_empty()
            .then(|| self.data.tiles())
            .flatten()
            .into_iter()
            .flat_map(move |tiles| {
                let width = self.width.max(1) as usize;
                tiles
                    .iter()
                    .enumerate()
                    .map(move |(i, tile)| ((i % width) as i32, (i / width) as i32, tile))
            });

        let chunked = self.chunks.iter().flat_map(|chunk| {
            chunk.data.tiles().into_iter().flat_map(move |tiles| {
                tiles.iter().enumerate().map(move |(i, tile)| {
                    let (dx, dy) = (i as u32 % CHUNK_WIDTH, i as u32 / CHUNK_WIDTH);
                    (chunk.x + dx as i32, chunk.y + dy as i32, tile)
                })
            })
        });

        finite.chain(chunked).filter(|(_, _, tile)| !tile.is_nil())
    }

    /// Whether the layer's data (or every chunk) has been resolved.
    pub fn is_resolved(&self) -> bool {
        if self.chunks.is_empty() {
            self.data.is_resolved()
        } else {
            self.chunks.iter().all(|chunk| chunk.data.is_resolved())
        }
    }
}

/// An object layer's objects, as parsed or once resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectList {
    Raw(Vec<ObjectRecord>),
    Resolved(Vec<Object>),
}

impl Default for ObjectList {
    fn default() -> Self {
        ObjectList::Raw(Vec::new())
    }
}

impl<'de> Deserialize<'de> for ObjectList {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<ObjectRecord>::deserialize(deserializer).map(ObjectList::Raw)
    }
}

impl ObjectList {
    /// The resolved objects, or `None` if the layer has not been resolved yet.
    pub fn objects(&self) -> Option<&[Object]> {
        match self {
            ObjectList::Resolved(objects) => Some(objects),
            ObjectList::Raw(_) => None,
        }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, ObjectList::Resolved(_))
    }

    pub fn len(&self) -> usize {
        match self {
            ObjectList::Raw(records) => records.len(),
            ObjectList::Resolved(objects) => objects.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ObjectLayer {
    #[serde(flatten)]
    pub info: LayerInfo,

    /// `topdown` or `index`
    #[serde(rename = "draworder")]
    pub draw_order: String,
    pub color: String,
    pub objects: ObjectList,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ImageLayer {
    #[serde(flatten)]
    pub info: LayerInfo,

    pub image: String,
    #[serde(rename = "imagewidth")]
    pub image_width: u32,
    #[serde(rename = "imageheight")]
    pub image_height: u32,
    #[serde(rename = "transparentcolor")]
    pub transparent_color: String,
    #[serde(rename = "repeatx")]
    pub repeat_x: bool,
    #[serde(rename = "repeaty")]
    pub repeat_y: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct GroupLayer {
    #[serde(flatten)]
    pub info: LayerInfo,

    pub layers: Vec<Layer>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_layer_kinds_and_defaults() {
        let layers: Vec<Layer> = serde_json::from_value(json!([
            { "type": "tilelayer", "id": 1, "name": "ground", "width": 2, "height": 1, "data": [0, 5] },
            { "type": "objectgroup", "id": 2, "name": "things", "objects": [] },
            { "type": "imagelayer", "id": 3, "name": "sky", "image": "sky.png", "opacity": 0.5 },
            { "type": "group", "id": 4, "name": "world", "layers": [] }
        ]))
        .unwrap();

        let kinds: Vec<&str> = layers.iter().map(Layer::kind).collect();
        assert_eq!(kinds, ["tilelayer", "objectgroup", "imagelayer", "group"]);

        let ground = layers[0].as_tiles().unwrap();
        assert_eq!(ground.info.name, "ground");
        assert_eq!(ground.data, TileData::RawNumeric(vec![0.0, 5.0]));
        assert!(ground.info.visible);
        assert_eq!(ground.info.opacity, 1.0);
        assert_eq!(layers[2].info().opacity, 0.5);

        assert!(layers[3].as_group().unwrap().layers.is_empty());
        assert!(layers[0].as_group().is_none());
    }

    #[test]
    fn test_tile_data_shapes() {
        let text: TileData = serde_json::from_value(json!("AAAA")).unwrap();
        assert_eq!(text, TileData::RawText("AAAA".to_string()));

        let numbers: TileData = serde_json::from_value(json!([1, 2147483649u32])).unwrap();
        assert_eq!(numbers, TileData::RawNumeric(vec![1.0, 2147483649.0]));

        assert!(serde_json::from_value::<TileData>(json!({ "oops": true })).is_err());
    }

    #[test]
    fn test_unknown_layer_type_is_rejected() {
        let result = serde_json::from_value::<Layer>(json!({ "type": "mystery", "id": 1 }));
        assert!(result.is_err());
    }

    fn tile(gid: u32) -> Tile {
        Tile {
            gid,
            lid: gid - 1,
            tileset_index: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_finite_tile_lookup() {
        let layer = TileLayer {
            width: 2,
            height: 2,
            data: TileData::Resolved(vec![Tile::NIL, tile(2), tile(3), Tile::NIL]),
            ..Default::default()
        };

        assert_eq!(layer.tile_at(1, 0).map(|t| t.gid), Some(2));
        assert_eq!(layer.tile_at(0, 1).map(|t| t.gid), Some(3));
        assert!(layer.tile_at(0, 0).unwrap().is_nil());
        assert_eq!(layer.tile_at(2, 0), None);
        assert_eq!(layer.tile_at(-1, 0), None);

        let cells: Vec<(i32, i32, u32)> = layer.iter_tiles().map(|(x, y, t)| (x, y, t.gid)).collect();
        assert_eq!(cells, [(1, 0, 2), (0, 1, 3)]);
    }

    #[test]
    fn test_chunked_tile_lookup() {
        let mut tiles = vec![Tile::NIL; 256];
        tiles[17] = tile(4);
        let layer = TileLayer {
            chunks: vec![Chunk {
                x: -16,
                y: 0,
                width: 16,
                height: 16,
                data: TileData::Resolved(tiles),
            }],
            ..Default::default()
        };

        assert_eq!(layer.tile_at(-15, 1).map(|t| t.gid), Some(4));
        assert_eq!(layer.tile_at(0, 0), None);

        let cells: Vec<(i32, i32, u32)> = layer.iter_tiles().map(|(x, y, t)| (x, y, t.gid)).collect();
        assert_eq!(cells, [(-15, 1, 4)]);
        assert!(layer.is_resolved());
    }

    #[test]
    fn test_unresolved_data_has_no_tiles() {
        let layer = TileLayer {
            width: 1,
            height: 1,
            data: TileData::RawNumeric(vec![1.0]),
            ..Default::default()
        };
        assert_eq!(layer.tile_at(0, 0), None);
        assert!(!layer.is_resolved());
    }
}
