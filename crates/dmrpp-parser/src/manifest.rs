//! Chunk manifests: chunk grid position to byte range in the data file.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use crate::error::{DmrppError, DmrppResult};
use crate::xml::{Element, XmlNamespace};

/// Separator between per-dimension indices in a chunk key.
pub const CHUNK_KEY_SEPARATOR: &str = ".";

/// Grid index of a chunk, e.g. `"0.1.5"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ChunkKey(String);

impl ChunkKey {
    /// Build a key from per-dimension chunk indices.
    pub fn from_indices(indices: &[u64]) -> Self {
        let parts: Vec<String> = indices.iter().map(u64::to_string).collect();
        Self(parts.join(CHUNK_KEY_SEPARATOR))
    }

    /// Per-dimension chunk indices, `None` if the key is not well formed.
    pub fn indices(&self) -> Option<Vec<u64>> {
        self.0
            .split(CHUNK_KEY_SEPARATOR)
            .map(|part| part.parse().ok())
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Location of one chunk's stored bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkEntry {
    pub path: String,
    pub offset: u64,
    pub length: u64,
}

/// Sparse chunk manifest, in document order.
///
/// Only chunks listed in the document are present; missing grid cells are
/// not filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChunkManifest {
    entries: IndexMap<ChunkKey, ChunkEntry>,
}

impl ChunkManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the entry previously stored under `key`.
    pub fn insert(&mut self, key: ChunkKey, entry: ChunkEntry) -> Option<ChunkEntry> {
        self.entries.insert(key, entry)
    }

    /// Look up a chunk by its key string, e.g. `"0.1.5"`.
    pub fn get(&self, key: &str) -> Option<&ChunkEntry> {
        self.entries.get(&ChunkKey(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChunkKey, &ChunkEntry)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ChunkKey> {
        self.entries.keys()
    }

    /// Sum of all chunk lengths in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.entries.values().map(|e| e.length).sum()
    }
}

/// Explicit chunk sizes from `<dmrpp:chunkDimensionSizes>`, if present.
pub(crate) fn parse_chunk_dimension_sizes(chunks: &Element) -> DmrppResult<Option<Vec<u64>>> {
    let Some(text) = chunks
        .child(XmlNamespace::Dmrpp, "chunkDimensionSizes")
        .and_then(Element::text)
    else {
        return Ok(None);
    };
    text.split_whitespace()
        .map(|s| {
            s.parse()
                .map_err(|_| DmrppError::invalid_value(s, "chunkDimensionSizes"))
        })
        .collect::<DmrppResult<Vec<u64>>>()
        .map(Some)
}

/// Build the manifest for one variable from its `<dmrpp:chunk>` entries.
///
/// Each chunk's `chunkPositionInArray` is divided, per dimension, by the
/// chunk size to get its grid index. A chunk without a position is the
/// single chunk at the all-zero index. Scalars use a one-element index.
pub(crate) fn parse_chunks(
    variable: &str,
    chunks: &Element,
    chunk_shape: &[Option<u64>],
    path: &str,
) -> DmrppResult<ChunkManifest> {
    let rank = chunk_shape.len();
    let mut manifest = ChunkManifest::new();

    for chunk in chunks.children_named(XmlNamespace::Dmrpp, "chunk") {
        let offset = parse_u64(chunk, "offset")?;
        let length = parse_u64(chunk, "nBytes")?;

        let indices = match chunk.attr("chunkPositionInArray") {
            Some(position) if rank > 0 => grid_index(variable, position, chunk_shape)?,
            _ => vec![0; rank.max(1)],
        };

        let key = ChunkKey::from_indices(&indices);
        let entry = ChunkEntry {
            path: path.to_string(),
            offset,
            length,
        };
        if manifest.insert(key.clone(), entry).is_some() {
            warn!(variable, key = %key, "Duplicate chunk position, keeping the last entry");
        }
    }
    Ok(manifest)
}

fn parse_u64(element: &Element, attribute: &str) -> DmrppResult<u64> {
    let text = element.require_attr(attribute)?;
    text.trim()
        .parse()
        .map_err(|_| DmrppError::invalid_value(text, format!("chunk {}", attribute)))
}

/// `"[0,1023,10235]"` with chunk shape `[1,1023,2047]` is `[0,1,5]`.
fn grid_index(
    variable: &str,
    position: &str,
    chunk_shape: &[Option<u64>],
) -> DmrppResult<Vec<u64>> {
    let inner = position
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']');
    let positions = inner
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<u64>()
                .map_err(|_| DmrppError::invalid_value(position, "chunkPositionInArray"))
        })
        .collect::<DmrppResult<Vec<u64>>>()?;

    if positions.len() != chunk_shape.len() {
        return Err(DmrppError::invalid_chunk(
            variable,
            format!(
                "position {} has {} dimensions, chunk shape has {}",
                position,
                positions.len(),
                chunk_shape.len()
            ),
        ));
    }

    positions
        .iter()
        .zip(chunk_shape)
        .map(|(&pos, size)| match size {
            Some(size) if *size > 0 => Ok(pos / size),
            _ => Err(DmrppError::invalid_chunk(
                variable,
                "chunk size is unknown or zero",
            )),
        })
        .collect()
}
