//! Quick start example demonstrating basic `bevy_tiledjson` usage.
//!
//! Loads a Tiled JSON map through the asset server and logs what was resolved once it
//! is ready.

use bevy::prelude::*;
use bevy_tiledjson::prelude::*;

#[derive(Resource)]
struct Level(Handle<TiledJsonMapAsset>);

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(BevyTiledJsonPlugin::default())
        .add_systems(Startup, load_map)
        .add_systems(Update, report_map)
        .run();
}

fn load_map(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.insert_resource(Level(asset_server.load("maps/level1.tmj")));
}

fn report_map(
    mut events: MessageReader<AssetEvent<TiledJsonMapAsset>>,
    level: Res<Level>,
    maps: Res<Assets<TiledJsonMapAsset>>,
) {
    for event in events.read() {
        if !event.is_loaded_with_dependencies(&level.0) {
            continue;
        }
        let Some(asset) = maps.get(&level.0) else {
            continue;
        };

        info!(
            "Map loaded: {}x{} tiles, {} tilesets",
            asset.tilemap_size.x,
            asset.tilemap_size.y,
            asset.map.tilesets.len()
        );

        for layer in asset.map.layers_recursive() {
            match layer {
                Layer::Tiles(tiles) => {
                    info!("  tile layer `{}`: {} tiles", layer.name(), tiles.iter_tiles().count());
                }
                Layer::Objects(objects) => {
                    for object in objects.objects.objects().unwrap_or_default() {
                        info!(
                            "  object {} `{}` at ({}, {}) gid {}",
                            object.id, object.name, object.x, object.y, object.gid
                        );
                    }
                }
                Layer::Image(_) | Layer::Group(_) => {
                    info!("  {} `{}`", layer.kind(), layer.name());
                }
            }
        }
    }
}
