use std::path::PathBuf;

use bevy::prelude::*;

use crate::assets::{map::TiledJsonMapAsset, tileset::TiledJsonTilesetAsset};
use crate::loaders::{map::TiledJsonMapAssetLoader, tileset::TiledJsonTilesetAssetLoader};

/// Configuration for the Tiled JSON asset loaders.
#[derive(Resource, Clone, Debug)]
pub struct TiledJsonAssetsConfig {
    /// Filesystem directory Bevy serves assets from.
    ///
    /// Map files are read through Bevy's asset reader, but the tilesets and templates they
    /// reference are read from disk under this directory.
    pub asset_root: PathBuf,
}

impl Default for TiledJsonAssetsConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
        }
    }
}

/// Plugin that registers the Tiled JSON asset types and loaders
///
/// # Example
/// ```no_run
/// use bevy::prelude::*;
/// use bevy_tiledjson_assets::TiledJsonAssetsPlugin;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(TiledJsonAssetsPlugin::default())
///     .run();
/// ```
///
/// # What this plugin does
///
/// - Registers 2 asset types: `TiledJsonMapAsset`, `TiledJsonTilesetAsset`
/// - Registers 2 asset loaders for `.tmj` and `.tsj` files
/// - Inserts the [`TiledJsonAssetsConfig`] resource
///
/// # What this plugin does NOT do
///
/// - Entity spawning
/// - Rendering or image loading
#[derive(Default)]
pub struct TiledJsonAssetsPlugin {
    pub config: TiledJsonAssetsConfig,
}

impl TiledJsonAssetsPlugin {
    pub fn new(config: TiledJsonAssetsConfig) -> Self {
        Self { config }
    }
}

impl Plugin for TiledJsonAssetsPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<TiledJsonMapAsset>()
            .init_asset::<TiledJsonTilesetAsset>();

        app.register_asset_loader(TiledJsonMapAssetLoader::new(&self.config))
            .register_asset_loader(TiledJsonTilesetAssetLoader);

        app.insert_resource(self.config.clone());
    }
}
