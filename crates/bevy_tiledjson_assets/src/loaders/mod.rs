//! Asset loaders for `.tmj` maps and `.tsj` tilesets.

pub mod map;
pub mod tileset;
