//! # bevy_tiledjson
//!
//! Tiled JSON map loading for Bevy.
//!
//! This is a unified meta-crate that combines the `bevy_tiledjson_*` sub-crates with
//! convenient feature flags.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_tiledjson::prelude::*;
//!
//! #[derive(Resource)]
//! struct Level(Handle<TiledJsonMapAsset>);
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(BevyTiledJsonPlugin::default())
//!         .add_systems(Startup, load_map)
//!         .run();
//! }
//!
//! fn load_map(mut commands: Commands, asset_server: Res<AssetServer>) {
//!     commands.insert_resource(Level(asset_server.load("maps/level1.tmj")));
//! }
//! ```
//!
//! ## Features
//!
//! - **default**: Includes the `assets` feature
//! - **assets**: Bevy asset loaders for `.tmj` maps and `.tsj` tilesets
//!
//! ## Architecture
//!
//! - **Layer 1** ([`core`]): Engine-agnostic decode-and-resolve pipeline
//! - **Layer 2** (`assets`): Bevy asset loading on top of Layer 1
//!
//! Without the `assets` feature, [`core`] can be used on its own:
//!
//! ```rust,no_run
//! use bevy_tiledjson::core::Loader;
//!
//! let map = Loader::new().load_tmj_map("assets/maps/level1.tmj")?;
//! # Ok::<(), bevy_tiledjson::core::Error>(())
//! ```

#[cfg(feature = "assets")]
pub mod plugin;

// Re-export sub-crates for advanced usage
pub use bevy_tiledjson_core as core;

#[cfg(feature = "assets")]
pub use bevy_tiledjson_assets as assets;

/// Unified prelude for bevy_tiledjson
///
/// This module re-exports the most commonly used types from all sub-crates
/// for convenient access.
pub mod prelude {
    // Core functionality (always available)
    pub use crate::core::prelude::*;

    #[cfg(feature = "assets")]
    pub use crate::assets::prelude::*;

    // Unified plugin
    #[cfg(feature = "assets")]
    pub use crate::plugin::BevyTiledJsonPlugin;
}
