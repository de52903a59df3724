//! Tile data decoding.
//!
//! Turns a layer's or chunk's raw `data` field into a flat little-endian byte sequence,
//! 4 bytes per cell. Checking the byte count against the expected cell volume is left to
//! [`crate::gid::resolve`].

use std::io::Read;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use flate2::read::{GzDecoder, ZlibDecoder};

use crate::error::{Error, Result};
use crate::layer::TileData;

/// Size of one packed global id in bytes.
pub const BYTES_PER_CELL: usize = 4;

/// How a tile layer's `data` field is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// An array of integers, one per cell. Written as `"csv"` or omitted.
    #[default]
    Csv,
    /// A base64 string of packed little-endian ids.
    Base64,
}

impl Encoding {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "" | "csv" => Ok(Encoding::Csv),
            "base64" => Ok(Encoding::Base64),
            other => Err(Error::UnsupportedEncoding(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Csv => "csv",
            Encoding::Base64 => "base64",
        }
    }
}

/// Compression applied to base64 tile data before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Zlib,
}

impl Compression {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "" => Ok(Compression::None),
            "gzip" => Ok(Compression::Gzip),
            "zlib" => Ok(Compression::Zlib),
            other => Err(Error::UnsupportedCompression(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Compression::None => "uncompressed",
            Compression::Gzip => "gzip",
            Compression::Zlib => "zlib",
        }
    }
}

/// Decode raw tile data into packed little-endian cells.
///
/// # Arguments
/// * `data` - The raw `data` field (numeric array or text)
/// * `encoding` - The layer's declared encoding
/// * `compression` - The layer's declared compression (only applies to base64)
///
/// # Returns
/// * `Ok(Vec<u8>)` - 4 bytes per decoded cell
/// * `Err(Error)` - If the data shape does not fit the encoding, or the payload is malformed
pub fn decode(data: &TileData, encoding: Encoding, compression: Compression) -> Result<Vec<u8>> {
    match (encoding, data) {
        (Encoding::Csv, TileData::RawNumeric(values)) => Ok(decode_plain(values)),
        (Encoding::Csv, _) => Err(Error::DataTypeMismatch {
            encoding: Encoding::Csv.as_str(),
            expected: "an array of integers",
        }),
        (Encoding::Base64, TileData::RawText(text)) => decode_base64(text, compression),
        (Encoding::Base64, _) => Err(Error::DataTypeMismatch {
            encoding: Encoding::Base64.as_str(),
            expected: "a string",
        }),
    }
}

/// Pack each numeric element as an unsigned 32-bit little-endian value.
///
/// Values are truncated to their low 32 bits.
pub fn decode_plain(values: &[f64]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * BYTES_PER_CELL);
    for value in values {
        let id = *value as i64 as u32;
        bytes.extend_from_slice(&id.to_le_bytes());
    }
    bytes
}

/// Strip base64 and, if needed, decompress the payload.
pub fn decode_base64(text: &str, compression: Compression) -> Result<Vec<u8>> {
    // Whitespace (padding, line breaks) is not part of the payload
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(Error::MissingData);
    }

    let payload = BASE64_STANDARD.decode(compact.as_bytes())?;

    match compression {
        Compression::None => Ok(payload),
        Compression::Gzip => inflate(GzDecoder::new(payload.as_slice()), compression),
        Compression::Zlib => inflate(ZlibDecoder::new(payload.as_slice()), compression),
    }
}

fn inflate(mut reader: impl Read, compression: Compression) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| Error::Decompress {
            compression: compression.as_str(),
            source,
        })?;
    Ok(bytes)
}
