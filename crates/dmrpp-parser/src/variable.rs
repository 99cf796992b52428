//! Variable builder: shape, dtype, encoding, chunk layout and filters.

use serde::Serialize;
use tracing::debug;

use crate::attribute::{parse_attributes, AttrValue, Attributes, Scalar};
use crate::dimension::{resolve_dims, Dimension, DimensionSizes};
use crate::dtype::{DapType, DataType};
use crate::error::DmrppResult;
use crate::filters::{parse_filters, Filter};
use crate::manifest::{parse_chunk_dimension_sizes, parse_chunks, ChunkManifest};
use crate::xml::{Element, XmlNamespace};

/// Attribute keys copied into a variable's encoding. This set is fixed.
pub const ENCODING_KEYS: [&str; 4] = ["_FillValue", "missing_value", "scale_factor", "add_offset"];

/// Attributes that only steer parsing and never reach the caller.
pub(crate) const PARSING_ONLY_ATTRIBUTES: [&str; 2] = ["fullnamepath", "origname"];

/// Memory layout of the chunks. DMR++ only describes row-major data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Order {
    #[default]
    C,
}

/// Array metadata handed to a chunked-array reader.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayMetadata {
    pub shape: Vec<Option<u64>>,
    /// Chunk shape; equal to `shape` for unchunked variables.
    pub chunks: Vec<Option<u64>>,
    pub dtype: DataType,
    pub fill_value: Scalar,
    pub filters: Option<Vec<Filter>>,
    pub order: Order,
}

/// A parsed DMR++ variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    pub dap_type: DapType,
    pub dims: Vec<String>,
    pub attrs: Attributes,
    pub encoding: Attributes,
    pub metadata: ArrayMetadata,
    pub manifest: Option<ChunkManifest>,
}

impl Variable {
    pub fn shape(&self) -> &[Option<u64>] {
        &self.metadata.shape
    }

    pub fn chunk_shape(&self) -> &[Option<u64>] {
        &self.metadata.chunks
    }

    pub fn dtype(&self) -> DataType {
        self.metadata.dtype
    }

    pub fn fill_value(&self) -> &Scalar {
        &self.metadata.fill_value
    }

    pub fn filters(&self) -> Option<&[Filter]> {
        self.metadata.filters.as_deref()
    }

    pub fn is_chunked(&self) -> bool {
        self.manifest.is_some()
    }

    /// Dimensions paired with their resolved sizes.
    pub fn dimensions(&self) -> Vec<Dimension> {
        self.dims
            .iter()
            .zip(&self.metadata.shape)
            .map(|(name, size)| Dimension {
                name: name.clone(),
                size: *size,
            })
            .collect()
    }
}

/// Build a [`Variable`] from its DAP type element.
///
/// `dims_table` holds the sizes declared for the enclosing scope and is used
/// for `<Dim>` tags that only carry a name. `data_path` is recorded in every
/// chunk manifest entry.
///
/// The fill value is taken from `_FillValue`, or from `missing_value` when
/// `_FillValue` is absent, and the attribute it came from is removed from
/// `attrs`. When both are present only `_FillValue` is removed;
/// `missing_value` stays in `attrs` as an ordinary attribute. Both remain
/// in `encoding`.
pub(crate) fn parse_variable(
    element: &Element,
    dap_type: DapType,
    dims_table: &DimensionSizes,
    data_path: &str,
) -> DmrppResult<Variable> {
    let name = element.require_attr("name")?.to_string();
    let dtype = dap_type.data_type();

    let dim_sizes = resolve_dims(element.children_named(XmlNamespace::Dap, "Dim"), dims_table)?;
    let shape: Vec<Option<u64>> = dim_sizes.values().copied().collect();

    let mut chunk_shape = shape.clone();
    let mut manifest = None;
    let mut filters = None;
    if let Some(chunks) = element.child(XmlNamespace::Dmrpp, "chunks") {
        if let Some(sizes) = parse_chunk_dimension_sizes(chunks)? {
            chunk_shape = sizes.into_iter().map(Some).collect();
        }
        manifest = Some(parse_chunks(&name, chunks, &chunk_shape, data_path)?);
        filters = parse_filters(chunks, dtype)?;
    }

    let mut attrs = parse_attributes(element.children_named(XmlNamespace::Dap, "Attribute"))?;
    let encoding: Attributes = ENCODING_KEYS
        .iter()
        .filter_map(|key| attrs.get(*key).map(|v| (key.to_string(), v.clone())))
        .collect();
    for key in PARSING_ONLY_ATTRIBUTES {
        attrs.shift_remove(key);
    }
    let fill_value = attrs
        .shift_remove("_FillValue")
        .or_else(|| attrs.shift_remove("missing_value"))
        .map(fill_scalar)
        .unwrap_or_else(Scalar::missing);

    debug!(
        variable = %name,
        dtype = %dtype,
        rank = shape.len(),
        chunks = manifest.as_ref().map(ChunkManifest::len).unwrap_or(0),
        "Parsed variable"
    );

    Ok(Variable {
        name,
        dap_type,
        dims: dim_sizes.into_keys().collect(),
        attrs,
        encoding,
        metadata: ArrayMetadata {
            shape,
            chunks: chunk_shape,
            dtype,
            fill_value,
            filters,
            order: Order::C,
        },
        manifest,
    })
}

fn fill_scalar(value: AttrValue) -> Scalar {
    match value {
        AttrValue::Scalar(scalar) => scalar,
        AttrValue::List(values) => values.into_iter().next().unwrap_or_else(Scalar::missing),
    }
}
