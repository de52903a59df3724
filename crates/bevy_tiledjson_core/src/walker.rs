//! Layer tree resolution.
//!
//! [`LayerWalker`] visits the layer tree depth-first and moves every node's data from its
//! raw to its resolved state:
//!
//! - **group**: recurse into child layers
//! - **tile**: decode and resolve the flat data or each chunk
//! - **object**: apply templates, resolve tile objects, translate polygon points
//! - **image**: nothing to resolve
//!
//! Data that is already resolved is left alone, so walking a tree twice is harmless.

use tracing::trace;

use crate::codec::{self, Compression, Encoding};
use crate::error::{Error, Result, ResultExt};
use crate::gid::{self, FlipFlags};
use crate::layer::{Chunk, GroupLayer, Layer, ObjectLayer, ObjectList, TileData, TileLayer};
use crate::loader::{LoadSession, same_file_name};
use crate::map::CHUNK_CELLS;
use crate::object::Object;
use crate::template::apply_templates;
use crate::tileset::Tileset;

pub struct LayerWalker<'a, 's> {
    pub tilesets: &'a [Tileset],
    pub infinite: bool,
    /// Map width in tiles
    pub width: u32,
    /// Map height in tiles
    pub height: u32,
    pub session: &'a mut LoadSession<'s>,
}

impl LayerWalker<'_, '_> {
    /// Resolve every layer in `layers`, recursing into groups.
    pub fn resolve_all(&mut self, layers: &mut [Layer]) -> Result<()> {
        for layer in layers.iter_mut() {
            let id = layer.id();
            let result = match layer {
                Layer::Group(group) => self.resolve_group(group),
                Layer::Tiles(tiles) => self.resolve_tile_layer(tiles),
                Layer::Objects(objects) => self.resolve_object_layer(objects),
                Layer::Image(_) => Ok(()),
            };
            result.in_layer(|| layer.name().to_string(), id)?;
        }
        Ok(())
    }

    fn resolve_group(&mut self, group: &mut GroupLayer) -> Result<()> {
        self.resolve_all(&mut group.layers)
    }

    fn resolve_tile_layer(&mut self, layer: &mut TileLayer) -> Result<()> {
        let encoding = Encoding::parse(&layer.encoding)?;
        let compression = Compression::parse(&layer.compression)?;

        if self.infinite {
            for chunk in layer.chunks.iter_mut() {
                self.resolve_chunk(chunk, encoding, compression)
                    .in_chunk(chunk.x, chunk.y)?;
            }
            // Chunked layers carry no flat data
            if !layer.data.is_resolved() {
                layer.data = TileData::Resolved(Vec::new());
            }
            return Ok(());
        }

        // Finite data is always sized by the map
        if layer.width == 0 && layer.height == 0 {
            layer.width = self.width;
            layer.height = self.height;
        }

        let cells = (self.width as usize) * (self.height as usize);
        trace!(
            "Decoding tile layer {} ({} cells, {}, {})",
            layer.info.name,
            cells,
            encoding.as_str(),
            compression.as_str()
        );
        self.resolve_data(&mut layer.data, encoding, compression, cells)
    }

    fn resolve_chunk(&self, chunk: &mut Chunk, encoding: Encoding, compression: Compression) -> Result<()> {
        trace!(
            "Decoding chunk ({}, {}) ({}, {})",
            chunk.x,
            chunk.y,
            encoding.as_str(),
            compression.as_str()
        );
        self.resolve_data(&mut chunk.data, encoding, compression, CHUNK_CELLS)
    }

    fn resolve_data(
        &self,
        data: &mut TileData,
        encoding: Encoding,
        compression: Compression,
        expected_cells: usize,
    ) -> Result<()> {
        if data.is_resolved() {
            return Ok(());
        }
        let bytes = codec::decode(data, encoding, compression)?;
        let tiles = gid::resolve(&bytes, self.tilesets, expected_cells)?;
        *data = TileData::Resolved(tiles);
        Ok(())
    }

    fn resolve_object_layer(&mut self, layer: &mut ObjectLayer) -> Result<()> {
        let ObjectList::Raw(records) = &layer.objects else {
            return Ok(());
        };

        // Raw records stay in place until every object resolves
        let mut objects = apply_templates(records.clone(), self.session)?;
        for object in objects.iter_mut() {
            self.resolve_object(object).in_object(object.id)?;
            object.translate_points();
        }

        layer.objects = ObjectList::Resolved(objects);
        Ok(())
    }

    /// Resolve a tile object's gid against the map's tilesets.
    fn resolve_object(&self, object: &mut Object) -> Result<()> {
        if object.gid == 0 {
            return Ok(());
        }

        let flags = FlipFlags::from_packed(object.gid);
        let mut gid = gid::strip_flags(object.gid);

        if object.template_local_gid
            && let Some(template_tileset) = &object.template_tileset
        {
            gid = self.rebase_template_gid(gid, template_tileset.first_gid, &template_tileset.source)?;
        }

        let index = gid::find_tileset(gid, self.tilesets).ok_or(Error::UnresolvableGid(gid))?;

        object.gid = gid;
        object.lid = gid - self.tilesets[index].first_gid;
        object.tileset_index = Some(index);
        object.flipped_h = flags.horizontal;
        object.flipped_v = flags.vertical;
        object.flipped_d = flags.diagonal;
        object.template_local_gid = false;
        Ok(())
    }

    /// Move a gid counted from a template's tileset onto the matching map tileset.
    fn rebase_template_gid(&self, gid: u32, template_first_gid: u32, source: &str) -> Result<u32> {
        let tileset = self
            .tilesets
            .iter()
            .find(|tileset| {
                tileset
                    .source
                    .as_deref()
                    .is_some_and(|map_source| same_file_name(map_source, source))
            })
            .ok_or_else(|| Error::NoMatchingTileset(source.to_string()))?;

        gid.checked_sub(template_first_gid.max(1))
            .and_then(|local| local.checked_add(tileset.first_gid))
            .ok_or(Error::UnresolvableGid(gid))
    }
}
