//! Bevy asset types for Tiled JSON files.

pub mod map;
pub mod tileset;
