//! Custom properties.
//!
//! Maps, layers, tilesets, tiles and objects all carry an ordered list of
//! `{ name, type, value }` properties. Values stay as raw JSON; the
//! [`FromTiledProperty`] trait converts them to Rust types on access.

use serde::Deserialize;
use serde_json::Value;

/// A single custom property.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Property {
    pub name: String,

    /// `string`, `int`, `float`, `bool`, `color`, `file`, `object` or `class`
    #[serde(rename = "type")]
    pub property_type: String,

    /// Custom type name for `class` (and enum) properties
    #[serde(rename = "propertytype")]
    pub custom_type: String,

    pub value: Value,
}

/// An ordered list of properties, looked up by name.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(transparent)]
pub struct Properties(Vec<Property>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Property> {
        self.0.iter()
    }

    pub fn push(&mut self, property: Property) {
        self.0.push(property);
    }

    /// Get a property by name.
    pub fn get_property(&self, name: &str) -> Option<&Property> {
        self.0.iter().find(|p| p.name == name)
    }

    /// Get a property's raw value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.get_property(name).map(|p| &p.value)
    }

    /// Get a property's value converted to `T`.
    ///
    /// Returns `None` if the property is missing or has an incompatible value.
    pub fn get_as<T: FromTiledProperty>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(T::from_property)
    }

    /// Apply `overrides` on top of these properties.
    ///
    /// A property whose name already exists has its value replaced in place; any other
    /// property is appended. Existing order is preserved.
    pub fn merge(&mut self, overrides: &Properties) {
        for property in overrides.iter() {
            match self.0.iter_mut().find(|p| p.name == property.name) {
                Some(existing) => existing.value = property.value.clone(),
                None => self.0.push(property.clone()),
            }
        }
    }
}

impl From<Vec<Property>> for Properties {
    fn from(properties: Vec<Property>) -> Self {
        Self(properties)
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = &'a Property;
    type IntoIter = std::slice::Iter<'a, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Trait for types that can be read out of a property value.
///
/// # Example
///
/// ```
/// use bevy_tiledjson_core::properties::FromTiledProperty;
///
/// let value = serde_json::json!(true);
/// assert_eq!(bool::from_property(&value), Some(true));
/// ```
pub trait FromTiledProperty: Sized {
    /// Attempt to convert a raw property value to this type.
    ///
    /// Returns `Some(value)` if conversion succeeds, `None` otherwise.
    fn from_property(value: &Value) -> Option<Self>;
}

impl FromTiledProperty for bool {
    fn from_property(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromTiledProperty for i32 {
    fn from_property(value: &Value) -> Option<Self> {
        value.as_i64().and_then(|i| i32::try_from(i).ok())
    }
}

impl FromTiledProperty for u32 {
    fn from_property(value: &Value) -> Option<Self> {
        value.as_u64().and_then(|i| u32::try_from(i).ok())
    }
}

impl FromTiledProperty for f32 {
    fn from_property(value: &Value) -> Option<Self> {
        value.as_f64().map(|f| f as f32)
    }
}

impl FromTiledProperty for f64 {
    fn from_property(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromTiledProperty for String {
    fn from_property(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn props(pairs: &[(&str, Value)]) -> Properties {
        pairs
            .iter()
            .map(|(name, value)| Property {
                name: name.to_string(),
                value: value.clone(),
                ..Default::default()
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_merge_overrides_existing_value() {
        let mut base = props(&[("hp", json!("5")), ("mana", json!("3"))]);
        base.merge(&props(&[("hp", json!("10"))]));
        assert_eq!(base, props(&[("hp", json!("10")), ("mana", json!("3"))]));
    }

    #[test]
    fn test_merge_appends_new_entries_in_order() {
        let mut base = props(&[("hp", json!("5")), ("mana", json!("3"))]);
        base.merge(&props(&[("speed", json!("2"))]));
        let names: Vec<&str> = base.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["hp", "mana", "speed"]);
    }

    #[test]
    fn test_typed_access() {
        let properties: Properties = serde_json::from_value(json!([
            { "name": "solid", "type": "bool", "value": true },
            { "name": "damage", "type": "int", "value": -4 },
            { "name": "speed", "type": "float", "value": 1.5 },
            { "name": "label", "type": "string", "value": "door" }
        ]))
        .unwrap();

        assert_eq!(properties.get_as::<bool>("solid"), Some(true));
        assert_eq!(properties.get_as::<i32>("damage"), Some(-4));
        assert_eq!(properties.get_as::<u32>("damage"), None);
        assert_eq!(properties.get_as::<f32>("speed"), Some(1.5));
        assert_eq!(properties.get_as::<String>("label").as_deref(), Some("door"));
        assert_eq!(properties.get_as::<bool>("missing"), None);
        assert_eq!(
            properties.get_property("damage").map(|p| p.property_type.as_str()),
            Some("int")
        );
    }
}
