//! Objects placed in object layers.
//!
//! Objects are parsed as [`ObjectRecord`]s, which remember which fields the file actually
//! declared. That is what lets a template instance act as a diff against its template's
//! object: [`merge_template_object`] copies only the declared fields onto the template's
//! base record. The record is then flattened into an [`Object`] with every field filled in.

use serde::Deserialize;

use crate::properties::Properties;
use crate::template::TemplateTileset;

/// A point of a polygon or polyline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Text object contents.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Text {
    /// The raw text value
    pub text: String,
    /// Hex color of the text (`#RRGGBB` or `#AARRGGBB`)
    pub color: String,
    #[serde(rename = "fontfamily")]
    pub font_family: String,
    #[serde(rename = "pixelsize")]
    pub pixel_size: u32,
    /// `left`, `center`, `right` or `justify`
    pub halign: String,
    /// `top`, `center` or `bottom`
    pub valign: String,
    pub wrap: bool,
    pub bold: bool,
    pub italic: bool,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: String::new(),
            font_family: String::new(),
            pixel_size: 16,
            halign: String::new(),
            valign: String::new(),
            wrap: false,
            bold: false,
            italic: false,
        }
    }
}

/// An object exactly as declared in a map or template file.
///
/// `None` means the key was absent.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ObjectRecord {
    pub id: Option<u32>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub template: Option<String>,
    pub gid: Option<u32>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub visible: Option<bool>,
    pub ellipse: Option<bool>,
    pub point: Option<bool>,
    pub text: Option<Text>,
    pub polygon: Option<Vec<Point>>,
    pub polyline: Option<Vec<Point>>,
    pub properties: Properties,
}

impl ObjectRecord {
    /// The template reference, if the record declares a non-empty one.
    pub fn template_path(&self) -> Option<&str> {
        self.template.as_deref().filter(|path| !path.is_empty())
    }
}

/// Copy `value` over `slot` if the instance declared it.
fn overlay<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if let Some(value) = value {
        *slot = Some(value.clone());
    }
}

/// Copy a point list over `slot` if the instance declared a non-empty one.
fn overlay_points(slot: &mut Option<Vec<Point>>, points: &Option<Vec<Point>>) {
    if let Some(points) = points
        && !points.is_empty()
    {
        *slot = Some(points.clone());
    }
}

/// Merge a template instance onto its template's object.
///
/// Field table:
///
/// | field                                   | rule                                        |
/// |-----------------------------------------|---------------------------------------------|
/// | id, name, type, x, y, width, height,    | instance value replaces base when declared  |
/// | rotation, visible, ellipse, point       |                                             |
/// | text                                    | instance value used only if base has none   |
/// | gid                                     | replaces base only when declared and not 0  |
/// | properties                              | [`Properties::merge`] (override or append)  |
/// | polygon, polyline                       | non-empty instance list replaces base       |
/// | template                                | cleared                                     |
pub fn merge_template_object(mut base: ObjectRecord, instance: &ObjectRecord) -> ObjectRecord {
    overlay(&mut base.id, &instance.id);
    overlay(&mut base.name, &instance.name);
    overlay(&mut base.kind, &instance.kind);
    overlay(&mut base.x, &instance.x);
    overlay(&mut base.y, &instance.y);
    overlay(&mut base.width, &instance.width);
    overlay(&mut base.height, &instance.height);
    overlay(&mut base.rotation, &instance.rotation);
    overlay(&mut base.visible, &instance.visible);
    overlay(&mut base.ellipse, &instance.ellipse);
    overlay(&mut base.point, &instance.point);
    if base.text.is_none() {
        base.text = instance.text.clone();
    }

    // A zero gid never names a tile, so it never overrides one
    if let Some(gid) = instance.gid
        && gid != 0
    {
        base.gid = Some(gid);
    }

    base.properties.merge(&instance.properties);
    overlay_points(&mut base.polygon, &instance.polygon);
    overlay_points(&mut base.polyline, &instance.polyline);

    base.template = None;
    base
}

/// The shape of an object, derived from its discriminator fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectShape<'a> {
    Rectangle { width: f64, height: f64 },
    Ellipse { width: f64, height: f64 },
    Point,
    Polygon(&'a [Point]),
    Polyline(&'a [Point]),
    Text(&'a Text),
    Tile { width: f64, height: f64 },
}

/// A fully resolved object.
///
/// Template data is merged in, flip flags are split off `gid`, and polygon / polyline points
/// are in map coordinates (the object's `x`, `y` already added).
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "ObjectRecord")]
pub struct Object {
    pub id: u32,
    pub name: String,
    pub kind: String,

    /// Global id with flip bits cleared, `0` for non-tile objects
    pub gid: u32,
    /// Local id within the owning tileset (tile objects only)
    pub lid: u32,
    /// Index of the owning tileset in `TileMap::tilesets` (tile objects only)
    pub tileset_index: Option<usize>,

    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, clockwise
    pub rotation: f64,
    pub visible: bool,

    pub ellipse: bool,
    pub point: bool,
    pub text: Option<Text>,
    pub polygon: Vec<Point>,
    pub polyline: Vec<Point>,

    pub properties: Properties,

    pub flipped_h: bool,
    pub flipped_v: bool,
    pub flipped_d: bool,

    /// Abbreviated tileset of the template this object was built from, if any
    pub template_tileset: Option<TemplateTileset>,

    /// Whether `gid` still counts from the template tileset's `firstgid`
    pub(crate) template_local_gid: bool,
}

impl From<ObjectRecord> for Object {
    fn from(record: ObjectRecord) -> Self {
        Self {
            id: record.id.unwrap_or_default(),
            name: record.name.unwrap_or_default(),
            kind: record.kind.unwrap_or_default(),
            gid: record.gid.unwrap_or_default(),
            lid: 0,
            tileset_index: None,
            x: record.x.unwrap_or_default(),
            y: record.y.unwrap_or_default(),
            width: record.width.unwrap_or_default(),
            height: record.height.unwrap_or_default(),
            rotation: record.rotation.unwrap_or_default(),
            visible: record.visible.unwrap_or(true),
            ellipse: record.ellipse.unwrap_or_default(),
            point: record.point.unwrap_or_default(),
            text: record.text,
            polygon: record.polygon.unwrap_or_default(),
            polyline: record.polyline.unwrap_or_default(),
            properties: record.properties,
            flipped_h: false,
            flipped_v: false,
            flipped_d: false,
            template_tileset: None,
            template_local_gid: false,
        }
    }
}

impl Object {
    /// Whether this object displays a tile.
    #[inline]
    pub fn is_tile(&self) -> bool {
        self.gid != 0
    }

    pub fn shape(&self) -> ObjectShape<'_> {
        if self.gid != 0 {
            ObjectShape::Tile {
                width: self.width,
                height: self.height,
            }
        } else if self.point {
            ObjectShape::Point
        } else if self.ellipse {
            ObjectShape::Ellipse {
                width: self.width,
                height: self.height,
            }
        } else if !self.polygon.is_empty() {
            ObjectShape::Polygon(&self.polygon)
        } else if !self.polyline.is_empty() {
            ObjectShape::Polyline(&self.polyline)
        } else if let Some(text) = &self.text {
            ObjectShape::Text(text)
        } else {
            ObjectShape::Rectangle {
                width: self.width,
                height: self.height,
            }
        }
    }

    /// Move polygon and polyline points from object-relative to map coordinates.
    pub fn translate_points(&mut self) {
        let (dx, dy) = (self.x, self.y);
        for point in self.polygon.iter_mut().chain(self.polyline.iter_mut()) {
            point.x += dx;
            point.y += dy;
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> ObjectRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_record_tracks_declared_fields() {
        let rec = record(json!({ "id": 4, "template": "chest.tj", "x": 10.0, "y": 20.0 }));
        assert_eq!(rec.id, Some(4));
        assert_eq!(rec.template_path(), Some("chest.tj"));
        assert_eq!(rec.name, None);
        assert_eq!(rec.visible, None);
    }

    #[test]
    fn test_merge_keeps_template_fields_the_instance_omits() {
        let base = record(json!({
            "name": "chest", "type": "loot", "width": 16.0, "height": 16.0,
            "visible": true, "gid": 3
        }));
        let instance = record(json!({ "id": 9, "template": "chest.tj", "x": 64.0, "y": 32.0 }));

        let merged = Object::from(merge_template_object(base, &instance));
        assert_eq!(merged.id, 9);
        assert_eq!(merged.name, "chest");
        assert_eq!(merged.kind, "loot");
        assert_eq!((merged.x, merged.y), (64.0, 32.0));
        assert_eq!((merged.width, merged.height), (16.0, 16.0));
        assert_eq!(merged.gid, 3);
        assert!(merged.visible);
    }

    #[test]
    fn test_merge_zero_gid_never_overrides() {
        let base = record(json!({ "gid": 7 }));
        let merged = merge_template_object(base.clone(), &record(json!({ "gid": 0 })));
        assert_eq!(merged.gid, Some(7));

        let merged = merge_template_object(base, &record(json!({ "gid": 8 })));
        assert_eq!(merged.gid, Some(8));
    }

    #[test]
    fn test_merge_point_list_override() {
        let base = record(json!({ "polygon": [{ "x": 0, "y": 0 }, { "x": 8, "y": 0 }, { "x": 8, "y": 8 }] }));

        let instance = record(json!({ "polygon": [{ "x": 1, "y": 1 }, { "x": 2, "y": 2 }, { "x": 3, "y": 1 }] }));
        let merged = merge_template_object(base.clone(), &instance);
        assert_eq!(merged.polygon, instance.polygon);

        let merged = merge_template_object(base.clone(), &record(json!({ "polygon": [] })));
        assert_eq!(merged.polygon, base.polygon);

        let merged = merge_template_object(base.clone(), &record(json!({})));
        assert_eq!(merged.polygon, base.polygon);
    }

    #[test]
    fn test_merge_properties_and_clears_template() {
        let base = record(json!({
            "properties": [
                { "name": "hp", "type": "string", "value": "5" },
                { "name": "mana", "type": "string", "value": "3" }
            ]
        }));
        let instance = record(json!({
            "template": "enemy.tj",
            "properties": [{ "name": "hp", "type": "string", "value": "10" }]
        }));

        let merged = merge_template_object(base, &instance);
        assert_eq!(merged.template, None);
        assert_eq!(merged.properties.get("hp"), Some(&json!("10")));
        assert_eq!(merged.properties.get("mana"), Some(&json!("3")));
        assert_eq!(merged.properties.len(), 2);
    }

    #[test]
    fn test_merge_keeps_template_text() {
        let base = record(json!({ "text": { "text": "Welcome", "pixelsize": 12 } }));
        let instance = record(json!({ "text": { "text": "Goodbye" } }));
        let merged = Object::from(merge_template_object(base, &instance));
        assert_eq!(merged.text.map(|text| text.text), Some("Welcome".to_string()));

        let merged = Object::from(merge_template_object(record(json!({})), &instance));
        assert_eq!(merged.text.map(|text| text.text), Some("Goodbye".to_string()));
    }

    #[test]
    fn test_translate_points_is_additive() {
        let mut object = Object::from(record(json!({
            "x": 100.0, "y": 50.0,
            "polygon": [{ "x": 0, "y": 0 }, { "x": 10, "y": -5 }],
            "polyline": [{ "x": 1, "y": 1 }]
        })));
        object.translate_points();

        assert_eq!(object.polygon[0], Point { x: 100.0, y: 50.0 });
        assert_eq!(object.polygon[1], Point { x: 110.0, y: 45.0 });
        assert_eq!(object.polyline[0], Point { x: 101.0, y: 51.0 });
    }

    #[test]
    fn test_shape_discriminators() {
        let ellipse = Object::from(record(json!({ "ellipse": true, "width": 4.0, "height": 2.0 })));
        assert_eq!(
            ellipse.shape(),
            ObjectShape::Ellipse {
                width: 4.0,
                height: 2.0
            }
        );

        let point = Object::from(record(json!({ "point": true })));
        assert_eq!(point.shape(), ObjectShape::Point);
        assert!(!point.is_tile());

        let tile = Object::from(record(json!({ "gid": 3, "point": true })));
        assert!(tile.is_tile());
        assert!(matches!(tile.shape(), ObjectShape::Tile { .. }));

        let text = Object::from(record(json!({ "text": { "text": "hello", "wrap": true } })));
        assert!(matches!(text.shape(), ObjectShape::Text(t) if t.text == "hello" && t.wrap));
    }
}
