//! Unified plugin for bevy_tiledjson.

use bevy::prelude::*;

use bevy_tiledjson_assets::{TiledJsonAssetsConfig, TiledJsonAssetsPlugin};

/// Unified plugin that adds all enabled bevy_tiledjson functionality.
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_tiledjson::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(
///         BevyTiledJsonPlugin::default().with_assets(TiledJsonAssetsConfig {
///             asset_root: "game/assets".into(),
///         }),
///     )
///     .run();
/// ```
#[derive(Default)]
pub struct BevyTiledJsonPlugin {
    /// Asset loader configuration
    pub assets: TiledJsonAssetsConfig,
}

impl BevyTiledJsonPlugin {
    /// Create with custom asset loader configuration
    pub fn with_assets(mut self, config: TiledJsonAssetsConfig) -> Self {
        self.assets = config;
        self
    }
}

impl Plugin for BevyTiledJsonPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(TiledJsonAssetsPlugin::new(self.assets.clone()));

        info!("BevyTiledJsonPlugin initialized");
    }
}
