use std::path::{Path, PathBuf};

use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    platform::collections::HashMap,
    prelude::*,
    tasks::ConditionalSendFuture,
};
use bevy_tiledjson_core::layer::Layer;
use bevy_tiledjson_core::map::{CHUNK_HEIGHT, CHUNK_WIDTH};
use bevy_tiledjson_core::properties::Properties;
use bevy_tiledjson_core::{Loader, TileMap};
use normalize_path::NormalizePath;
use thiserror::Error;

use crate::assets::map::TiledJsonMapAsset;
use crate::plugin::TiledJsonAssetsConfig;

/// Asset loader for Tiled JSON maps (.tmj files)
///
/// External tilesets and object templates referenced by the map are read from disk
/// relative to the map, and fully merged into the resulting asset.
///
/// It also calculates processed data for infinite maps.
#[derive(Default)]
pub struct TiledJsonMapAssetLoader {
    /// Filesystem directory Bevy serves assets from
    pub asset_root: PathBuf,
}

impl TiledJsonMapAssetLoader {
    pub fn new(config: &TiledJsonAssetsConfig) -> Self {
        Self {
            asset_root: config.asset_root.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MapLoaderError {
    #[error("Failed to load map: {0}")]
    Core(#[from] bevy_tiledjson_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl AssetLoader for TiledJsonMapAssetLoader {
    type Asset = TiledJsonMapAsset;
    type Settings = ();
    type Error = MapLoaderError;

    fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        load_context: &mut LoadContext,
    ) -> impl ConditionalSendFuture<Output = Result<Self::Asset, Self::Error>> {
        async move {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).await?;

            // References inside the map resolve against its directory on disk
            let base_dir = asset_base_dir(&self.asset_root, load_context.asset_path().path())?;
            debug!("Resolving map {:?} against {:?}", load_context.asset_path(), base_dir);

            let map = Loader::new().load_tmj_map_from_slice(&bytes, &base_dir)?;
            Ok(build_map_asset(map))
        }
    }

    fn extensions(&self) -> &[&str] {
        &["tmj"]
    }
}

/// Directory on disk that an asset's relative references resolve against.
///
/// # Arguments
/// * `asset_root` - Filesystem directory Bevy serves assets from
/// * `asset_path` - Asset-root-relative path of the file being loaded
///
/// # Returns
/// * `Ok(PathBuf)` - `asset_root/<parent of asset_path>`
/// * `Err(MapLoaderError::InvalidPath)` - If the asset path has no parent
pub(crate) fn asset_base_dir(asset_root: &Path, asset_path: &Path) -> Result<PathBuf, MapLoaderError> {
    let parent = asset_path.parent().ok_or_else(|| {
        MapLoaderError::InvalidPath(format!("No parent directory for asset: {:?}", asset_path))
    })?;
    Ok(asset_root.join(parent).normalize())
}

/// Derive the Bevy-facing data of a resolved map.
pub fn build_map_asset(map: TileMap) -> TiledJsonMapAsset {
    let (tilemap_size, tile_size, rect) = calculate_map_bounds(&map);
    let (tiled_offset, topleft_chunk, bottomright_chunk) = calculate_infinite_map_data(&map);

    let mut layer_properties = HashMap::default();
    collect_layer_properties(&map.layers, &mut layer_properties);

    let mut object_properties = HashMap::default();
    collect_object_properties(&map.layers, &mut object_properties);

    TiledJsonMapAsset {
        properties: map.properties.clone(),
        map,
        tilemap_size,
        tile_size,
        rect,
        tiled_offset,
        topleft_chunk,
        bottomright_chunk,
        layer_properties,
        object_properties,
    }
}

/// Chunk-unit bounding box `(min_x, min_y, max_x, max_y)` over every tile layer, or `None`
/// if the map has no chunks.
fn chunk_bounds(map: &TileMap) -> Option<(i32, i32, i32, i32)> {
    map.layers_recursive()
        .filter_map(Layer::as_tiles)
        .flat_map(|layer| layer.chunks.iter())
        .map(|chunk| {
            (
                chunk.x.div_euclid(CHUNK_WIDTH as i32),
                chunk.y.div_euclid(CHUNK_HEIGHT as i32),
            )
        })
        .fold(None, |bounds, (x, y)| {
            Some(match bounds {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            })
        })
}

/// Calculate map bounds and tilemap size
///
/// For finite maps, uses the map dimensions directly.
/// For infinite maps, calculates bounds from chunk data.
///
/// # Returns
/// * `(tilemap_size, tile_size, rect)` tuple
fn calculate_map_bounds(map: &TileMap) -> (UVec2, UVec2, Rect) {
    let tile_size = UVec2::new(map.tile_width, map.tile_height);

    let tilemap_size = if map.infinite {
        match chunk_bounds(map) {
            Some((min_x, min_y, max_x, max_y)) => UVec2::new(
                (max_x - min_x + 1) as u32 * CHUNK_WIDTH,
                (max_y - min_y + 1) as u32 * CHUNK_HEIGHT,
            ),
            None => UVec2::ZERO,
        }
    } else {
        UVec2::new(map.width, map.height)
    };

    let rect = Rect::new(
        0.0,
        0.0,
        tilemap_size.x as f32 * tile_size.x as f32,
        tilemap_size.y as f32 * tile_size.y as f32,
    );

    (tilemap_size, tile_size, rect)
}

/// Calculate infinite map offset and chunk bounds
///
/// For infinite maps, finds the topmost-left and bottommost-right chunks,
/// and calculates an offset to shift the entire map into positive coordinate space.
///
/// For finite maps (or infinite maps without chunks), returns zero offset
/// and (0,0) chunk bounds.
///
/// # Returns
/// * `(tiled_offset, topleft_chunk, bottomright_chunk)` tuple
fn calculate_infinite_map_data(map: &TileMap) -> (Vec2, (i32, i32), (i32, i32)) {
    let Some((min_x, min_y, max_x, max_y)) = map.infinite.then(|| chunk_bounds(map)).flatten()
    else {
        return (Vec2::ZERO, (0, 0), (0, 0));
    };

    let offset_x = if min_x < 0 {
        -min_x as f32 * CHUNK_WIDTH as f32 * map.tile_width as f32
    } else {
        0.0
    };
    let offset_y = if min_y < 0 {
        -min_y as f32 * CHUNK_HEIGHT as f32 * map.tile_height as f32
    } else {
        0.0
    };

    (Vec2::new(offset_x, offset_y), (min_x, min_y), (max_x, max_y))
}

/// Recursively collect layer properties from all layers including nested groups.
fn collect_layer_properties(layers: &[Layer], layer_properties: &mut HashMap<u32, Properties>) {
    for layer in layers {
        if !layer.properties().is_empty() {
            layer_properties.insert(layer.id(), layer.properties().clone());
        }
        if let Layer::Group(group) = layer {
            collect_layer_properties(&group.layers, layer_properties);
        }
    }
}

/// Recursively collect object properties from all object layers including nested groups.
fn collect_object_properties(layers: &[Layer], object_properties: &mut HashMap<u32, Properties>) {
    for layer in layers {
        match layer {
            Layer::Objects(object_layer) => {
                for object in object_layer.objects.objects().unwrap_or_default() {
                    if !object.properties.is_empty() {
                        object_properties.insert(object.id, object.properties.clone());
                    }
                }
            }
            Layer::Group(group) => collect_object_properties(&group.layers, object_properties),
            Layer::Tiles(_) | Layer::Image(_) => {}
        }
    }
}
