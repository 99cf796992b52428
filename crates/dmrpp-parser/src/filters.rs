//! Decoding of the `compressionType` descriptor on `<dmrpp:chunks>`.

use serde::Serialize;
use tracing::debug;

use crate::dtype::DataType;
use crate::error::{DmrppError, DmrppResult};
use crate::xml::Element;

/// zlib level used when `deflateLevel` is absent.
pub const DEFAULT_DEFLATE_LEVEL: u32 = 6;

/// One filter of a chunk's codec pipeline.
///
/// Filters are listed in the order they were applied on write; a reader
/// undoes them in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "id", rename_all = "lowercase")]
pub enum Filter {
    Shuffle { elementsize: usize },
    Zlib { level: u32 },
}

impl Filter {
    pub fn id(&self) -> &'static str {
        match self {
            Filter::Shuffle { .. } => "shuffle",
            Filter::Zlib { .. } => "zlib",
        }
    }
}

/// Decode the filters declared on a `<dmrpp:chunks>` element.
///
/// Returns `Ok(None)` when the element carries no `compressionType`.
/// Tokens other than `shuffle` and `deflate` are skipped.
pub(crate) fn parse_filters(
    chunks: &Element,
    dtype: DataType,
) -> DmrppResult<Option<Vec<Filter>>> {
    let Some(descriptor) = chunks.attr("compressionType") else {
        return Ok(None);
    };
    let tokens: Vec<&str> = descriptor.split_whitespace().collect();

    for unknown in tokens.iter().filter(|t| !matches!(**t, "shuffle" | "deflate")) {
        debug!(token = %unknown, "Ignoring unsupported compression token");
    }

    let mut filters = Vec::new();
    if tokens.contains(&"shuffle") {
        filters.push(Filter::Shuffle {
            elementsize: dtype.item_size(),
        });
    }
    if tokens.contains(&"deflate") {
        let level = match chunks.attr("deflateLevel") {
            Some(text) => text
                .trim()
                .parse()
                .map_err(|_| DmrppError::invalid_value(text, "deflateLevel"))?,
            None => DEFAULT_DEFLATE_LEVEL,
        };
        filters.push(Filter::Zlib { level });
    }
    Ok(Some(filters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    fn filters(xml: &str, dtype: DataType) -> Option<Vec<Filter>> {
        let root = parse_document(xml).unwrap();
        parse_filters(&root, dtype).unwrap()
    }

    #[test]
    fn test_shuffle_then_zlib() {
        let result = filters(
            r#"<chunks compressionType="shuffle deflate" deflateLevel="4"/>"#,
            DataType::Float32,
        );
        assert_eq!(
            result,
            Some(vec![
                Filter::Shuffle { elementsize: 4 },
                Filter::Zlib { level: 4 }
            ])
        );
    }

    #[test]
    fn test_token_order_does_not_matter() {
        let result = filters(r#"<chunks compressionType="deflate shuffle"/>"#, DataType::Int16);
        assert_eq!(
            result,
            Some(vec![
                Filter::Shuffle { elementsize: 2 },
                Filter::Zlib {
                    level: DEFAULT_DEFLATE_LEVEL
                }
            ])
        );
    }

    #[test]
    fn test_no_descriptor() {
        assert_eq!(filters(r#"<chunks/>"#, DataType::Float64), None);
    }

    #[test]
    fn test_unknown_tokens_are_ignored() {
        assert_eq!(
            filters(r#"<chunks compressionType="fletcher32 szip"/>"#, DataType::Float64),
            Some(vec![])
        );
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Filter::Shuffle { elementsize: 8 }).unwrap();
        assert_eq!(json, serde_json::json!({"id": "shuffle", "elementsize": 8}));
        let json = serde_json::to_value(Filter::Zlib { level: 6 }).unwrap();
        assert_eq!(json, serde_json::json!({"id": "zlib", "level": 6}));
    }
}
