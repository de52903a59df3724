//! Error types for map loading.
//!
//! Every error is fatal to the load in progress. Errors raised deep inside the layer tree are
//! wrapped in context variants ([`Error::InLayer`], [`Error::InChunk`], [`Error::InObject`],
//! [`Error::InTileset`]) on the way out, so the surfaced message names the path through the map
//! that triggered it. Use [`Error::root_cause`] to match on the underlying failure.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    // ===== FORMAT =====
    #[error("unsupported tile data encoding `{0}`")]
    UnsupportedEncoding(String),

    #[error("unsupported tile data compression `{0}`")]
    UnsupportedCompression(String),

    #[error("{encoding} tile data must be {expected}")]
    DataTypeMismatch {
        encoding: &'static str,
        expected: &'static str,
    },

    #[error("base64 tile data is an empty string")]
    MissingData,

    #[error("malformed base64 tile data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("malformed {compression} tile data: {source}")]
    Decompress {
        compression: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse `{}`: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // ===== SIZE =====
    #[error("tile data holds {actual} bytes but {expected} were expected")]
    DataSizeMismatch { expected: usize, actual: usize },

    // ===== REFERENTIAL =====
    #[error("global id {0} could not be found in any tileset")]
    UnresolvableGid(u32),

    #[error("template `{0}` was not loaded")]
    TemplateNotLoaded(String),

    #[error("template tileset `{0}` does not match any loaded tileset")]
    NoMatchingTileset(String),

    // ===== I/O =====
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // ===== MERGE =====
    #[error("cannot merge {0}: it does not hold an object record")]
    MergeNotRecord(String),

    // ===== CONTEXT =====
    #[error("in tileset #{index}: {source}")]
    InTileset {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("in layer `{name}` (id {id}): {source}")]
    InLayer {
        name: String,
        id: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("in chunk at ({x}, {y}): {source}")]
    InChunk {
        x: i32,
        y: i32,
        #[source]
        source: Box<Error>,
    },

    #[error("in object {id}: {source}")]
    InObject {
        id: u32,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Peel off every context wrapper and return the error that started the failure.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::InTileset { source, .. }
            | Error::InLayer { source, .. }
            | Error::InChunk { source, .. }
            | Error::InObject { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Attach layer-tree context to a failed result.
pub(crate) trait ResultExt<T> {
    fn in_tileset(self, index: usize) -> Result<T>;
    fn in_layer(self, name: impl FnOnce() -> String, id: u32) -> Result<T>;
    fn in_chunk(self, x: i32, y: i32) -> Result<T>;
    fn in_object(self, id: u32) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn in_tileset(self, index: usize) -> Result<T> {
        self.map_err(|source| Error::InTileset {
            index,
            source: Box::new(source),
        })
    }

    fn in_layer(self, name: impl FnOnce() -> String, id: u32) -> Result<T> {
        self.map_err(|source| Error::InLayer {
            name: name(),
            id,
            source: Box::new(source),
        })
    }

    fn in_chunk(self, x: i32, y: i32) -> Result<T> {
        self.map_err(|source| Error::InChunk {
            x,
            y,
            source: Box::new(source),
        })
    }

    fn in_object(self, id: u32) -> Result<T> {
        self.map_err(|source| Error::InObject {
            id,
            source: Box::new(source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_peels_nested_context() {
        let err: Result<()> = Err(Error::UnresolvableGid(42));
        let err = err
            .in_chunk(-16, 0)
            .in_layer(|| "ground".to_string(), 3)
            .in_layer(|| "world".to_string(), 1)
            .unwrap_err();

        assert!(matches!(err.root_cause(), Error::UnresolvableGid(42)));
        let message = err.to_string();
        assert!(message.starts_with("in layer `world` (id 1): in layer `ground` (id 3)"));
        assert!(message.contains("in chunk at (-16, 0)"));
    }
}
