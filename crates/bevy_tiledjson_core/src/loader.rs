//! Map loading entry points.
//!
//! A [`Loader`] reads a `.tmj` map through a [`ResourceReader`], then resolves it within a
//! [`LoadSession`]. The session carries the base directory that relative references
//! (tileset `source`, object `template`) are resolved against, and the template cache for
//! that one load. Nothing is shared between loads.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use normalize_path::NormalizePath;
use serde::de::DeserializeOwned;
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::map::TileMap;
use crate::template::{Template, TemplateCache};
use crate::tileset::Tileset;

/// Source of raw file bytes.
pub trait ResourceReader: Send {
    fn read(&mut self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads resources from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemReader;

impl ResourceReader for FilesystemReader {
    fn read(&mut self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

/// Serves resources from memory, keyed by normalized path.
///
/// Counts reads per path.
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    files: HashMap<PathBuf, Vec<u8>>,
    reads: HashMap<PathBuf, usize>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.as_ref().normalize(), bytes.into());
    }

    /// How many times `path` has been read.
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        self.reads
            .get(&path.as_ref().normalize())
            .copied()
            .unwrap_or_default()
    }
}

impl ResourceReader for MemoryReader {
    fn read(&mut self, path: &Path) -> io::Result<Vec<u8>> {
        let path = path.normalize();
        *self.reads.entry(path.clone()).or_default() += 1;
        self.files.get(&path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no resource at `{}`", path.display()),
            )
        })
    }
}

/// State of one map load.
pub struct LoadSession<'r> {
    base_dir: PathBuf,
    reader: &'r mut dyn ResourceReader,
    templates: TemplateCache,
}

impl<'r> LoadSession<'r> {
    pub fn new(base_dir: impl Into<PathBuf>, reader: &'r mut dyn ResourceReader) -> Self {
        Self {
            base_dir: base_dir.into(),
            reader,
            templates: TemplateCache::default(),
        }
    }

    /// Directory relative references resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a reference as written in a file to the path handed to the reader.
    pub fn resolve_path(&self, reference: &str) -> PathBuf {
        let reference = Path::new(reference);
        if reference.is_absolute() {
            reference.normalize()
        } else {
            self.base_dir.join(reference).normalize()
        }
    }

    /// Read and parse a referenced JSON file.
    pub fn read_json<T: DeserializeOwned>(&mut self, reference: &str) -> Result<T> {
        let path = self.resolve_path(reference);
        let bytes = self.reader.read(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| Error::Json { path, source })
    }

    /// Load a template unless this session already has it.
    pub fn ensure_template(&mut self, reference: &str) -> Result<&Template> {
        if self.templates.contains(reference) {
            trace!("Template cache hit: {}", reference);
        } else {
            debug!("Loading template {}", reference);
            let template: Template = self.read_json(reference)?;
            self.templates.insert(reference, template);
        }

        self.templates
            .get(reference)
            .ok_or_else(|| Error::TemplateNotLoaded(reference.to_string()))
    }

    pub fn templates(&self) -> &TemplateCache {
        &self.templates
    }
}

/// Whether two references name files with the same file name.
pub(crate) fn same_file_name(a: &str, b: &str) -> bool {
    match (Path::new(a).file_name(), Path::new(b).file_name()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Loads Tiled JSON maps and tilesets.
///
/// # Example
/// ```no_run
/// use bevy_tiledjson_core::Loader;
///
/// let mut loader = Loader::new();
/// let map = loader.load_tmj_map("assets/maps/level.tmj")?;
/// println!("{} layers", map.layers.len());
/// # Ok::<(), bevy_tiledjson_core::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Loader<R: ResourceReader = FilesystemReader> {
    reader: R,
}

impl Loader {
    /// Create a loader that reads from the filesystem.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: ResourceReader> Loader<R> {
    pub fn with_reader(reader: R) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_reader(self) -> R {
        self.reader
    }

    /// Load and fully resolve a `.tmj` map.
    ///
    /// # Arguments
    /// * `path` - Path of the map file; its parent directory is the base for references
    ///
    /// # Returns
    /// * `Ok(TileMap)` - The resolved map
    /// * `Err(Error)` - The first failure, wrapped in layer / chunk / object context
    pub fn load_tmj_map(&mut self, path: impl AsRef<Path>) -> Result<TileMap> {
        let path = path.as_ref().normalize();
        let bytes = self.reader.read(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let map = self.resolve_map(&bytes, &path, base_dir)?;
        info!(
            "Loaded map {} ({} layers, {} tilesets)",
            path.display(),
            map.layers.len(),
            map.tilesets.len()
        );
        Ok(map)
    }

    /// Resolve a map document already in memory.
    ///
    /// References are resolved against `base_dir`.
    pub fn load_tmj_map_from_slice(
        &mut self,
        bytes: &[u8],
        base_dir: impl AsRef<Path>,
    ) -> Result<TileMap> {
        let map = self.resolve_map(bytes, Path::new("<memory>"), base_dir.as_ref().to_path_buf())?;
        info!(
            "Loaded map ({} layers, {} tilesets)",
            map.layers.len(),
            map.tilesets.len()
        );
        Ok(map)
    }

    /// Load a standalone `.tsj` tileset.
    pub fn load_tsj_tileset(&mut self, path: impl AsRef<Path>) -> Result<Tileset> {
        let path = path.as_ref().normalize();
        let bytes = self.reader.read(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        parse_json(&bytes, &path)
    }

    /// Parse a standalone tileset document already in memory.
    pub fn load_tsj_tileset_from_slice(&mut self, bytes: &[u8]) -> Result<Tileset> {
        parse_json(bytes, Path::new("<memory>"))
    }

    fn resolve_map(&mut self, bytes: &[u8], path: &Path, base_dir: PathBuf) -> Result<TileMap> {
        let mut map: TileMap = parse_json(bytes, path)?;
        let mut session = LoadSession::new(base_dir, &mut self.reader);
        map.resolve(&mut session)?;
        Ok(map)
    }
}

fn parse_json<T: DeserializeOwned>(bytes: &[u8], path: &Path) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and resolve a `.tmj` map from the filesystem.
pub fn load_tile_map(path: impl AsRef<Path>) -> Result<TileMap> {
    Loader::new().load_tmj_map(path)
}
