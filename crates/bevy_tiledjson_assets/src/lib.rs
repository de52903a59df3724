//! # `bevy_tiledjson_assets`
//!
//! Bevy asset loading for Tiled JSON files, backed by `bevy_tiledjson_core`.
//!
//! - `.tmj` maps load as [`TiledJsonMapAsset`]: the fully resolved map plus bounds, infinite
//!   map chunk data and property tables
//! - `.tsj` tilesets load as [`TiledJsonTilesetAsset`]
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_tiledjson_assets::prelude::*;
//!
//! #[derive(Resource)]
//! struct Level(Handle<TiledJsonMapAsset>);
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(TiledJsonAssetsPlugin::default())
//!         .add_systems(Startup, load_map)
//!         .run();
//! }
//!
//! fn load_map(mut commands: Commands, asset_server: Res<AssetServer>) {
//!     commands.insert_resource(Level(asset_server.load("maps/level1.tmj")));
//! }
//! ```

pub mod assets;
pub mod loaders;
pub mod plugin;

pub use assets::{map::TiledJsonMapAsset, tileset::TiledJsonTilesetAsset};
pub use plugin::{TiledJsonAssetsConfig, TiledJsonAssetsPlugin};

pub mod prelude {
    //! Common imports for `bevy_tiledjson_assets` users.

    pub use crate::assets::{map::TiledJsonMapAsset, tileset::TiledJsonTilesetAsset};
    pub use crate::loaders::{map::MapLoaderError, tileset::TilesetLoaderError};
    pub use crate::plugin::{TiledJsonAssetsConfig, TiledJsonAssetsPlugin};
}
