use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    prelude::*,
    tasks::ConditionalSendFuture,
};
use bevy_tiledjson_core::Loader;
use thiserror::Error;

use crate::assets::tileset::TiledJsonTilesetAsset;

/// Asset loader for standalone Tiled JSON tilesets (.tsj files)
///
/// Tilesets embedded in or referenced by a map are merged by the map loader; this loader
/// is for tilesets used on their own.
#[derive(Default)]
pub struct TiledJsonTilesetAssetLoader;

#[derive(Debug, Error)]
pub enum TilesetLoaderError {
    #[error("Failed to load tileset: {0}")]
    Core(#[from] bevy_tiledjson_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssetLoader for TiledJsonTilesetAssetLoader {
    type Asset = TiledJsonTilesetAsset;
    type Settings = ();
    type Error = TilesetLoaderError;

    fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        load_context: &mut LoadContext,
    ) -> impl ConditionalSendFuture<Output = Result<Self::Asset, Self::Error>> {
        async move {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).await?;

            let tileset = Loader::new().load_tsj_tileset_from_slice(&bytes)?;
            if tileset.columns == 0 && tileset.tiles.is_empty() && tileset.tile_count > 0 {
                warn!(
                    "Tileset {:?} has no columns and no per-tile images",
                    load_context.asset_path()
                );
            }
            debug!(
                "Loaded tileset {:?} ({} tiles)",
                load_context.asset_path(),
                tileset.tile_count
            );

            Ok(TiledJsonTilesetAsset::from_tileset(tileset))
        }
    }

    fn extensions(&self) -> &[&str] {
        &["tsj"]
    }
}
