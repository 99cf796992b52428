//! Dimension resolution for `<Dim>` and `<Dimension>` tags.
//!
//! Three flavours of tag appear in DMR++ documents:
//!
//! - named and sized: `<Dimension name="lat" size="1447"/>`
//! - named without size (unlimited, or sized elsewhere): `<Dim name="/time"/>`
//! - anonymous, size only: `<Dim size="300"/>`, named `phony_dim_<n>`

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{DmrppError, DmrppResult};
use crate::xml::Element;

/// Dimension name to size, in declaration order. `None` is an unset size.
pub type DimensionSizes = IndexMap<String, Option<u64>>;

/// Prefix used for anonymous dimensions.
pub const PHONY_DIM_PREFIX: &str = "phony_dim_";

/// A resolved dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dimension {
    pub name: String,
    /// `None` for unlimited dimensions whose size could not be resolved.
    pub size: Option<u64>,
}

impl Dimension {
    pub fn is_unlimited(&self) -> bool {
        self.size.is_none()
    }
}

/// One parsed dimension tag, before naming anonymous dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DimTag {
    Named { name: String, size: Option<u64> },
    Anonymous { size: u64 },
}

/// Parse a single `<Dim>` or `<Dimension>` tag.
///
/// Names are reduced to their last path component: `/gt1r/delta_time` is `delta_time`.
pub(crate) fn parse_dim(element: &Element) -> DmrppResult<DimTag> {
    let size = element.attr("size").map(parse_size).transpose()?;
    match (element.attr("name"), size) {
        (Some(name), size) => Ok(DimTag::Named {
            name: basename(name).to_string(),
            size,
        }),
        (None, Some(size)) => Ok(DimTag::Anonymous { size }),
        (None, None) => Err(DmrppError::MalformedDimension(format!(
            "<{}> tag has neither a name nor a size",
            element.name
        ))),
    }
}

fn parse_size(text: &str) -> DmrppResult<u64> {
    text.trim()
        .parse()
        .map_err(|_| DmrppError::invalid_value(text, "dimension size"))
}

/// Resolve dimension tags against a wider table of declared dimensions.
///
/// A size on the tag itself always wins. Tags without a size take the size
/// from `table` when a same-named entry exists and stay unset otherwise.
/// Anonymous tags are named `phony_dim_<n>`, `n` being the number of
/// dimensions already resolved in this call.
pub(crate) fn resolve_dims<'a>(
    tags: impl IntoIterator<Item = &'a Element>,
    table: &DimensionSizes,
) -> DmrppResult<DimensionSizes> {
    let mut dims = DimensionSizes::new();
    for tag in tags {
        match parse_dim(tag)? {
            DimTag::Anonymous { size } => {
                let name = format!("{}{}", PHONY_DIM_PREFIX, dims.len());
                dims.insert(name, Some(size));
            }
            DimTag::Named { name, size } => {
                dims.insert(name, size);
            }
        }
    }
    for (name, size) in dims.iter_mut() {
        if size.is_none() {
            if let Some(&declared) = table.get(name) {
                *size = declared;
            }
        }
    }
    Ok(dims)
}

pub(crate) fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{parse_document, XmlNamespace};

    fn resolve(xml: &str, table: &DimensionSizes) -> DmrppResult<DimensionSizes> {
        let root = parse_document(xml).unwrap();
        resolve_dims(root.children_named(XmlNamespace::Dap, "Dim"), table)
    }

    fn table(entries: &[(&str, Option<u64>)]) -> DimensionSizes {
        entries
            .iter()
            .map(|(name, size)| (name.to_string(), *size))
            .collect()
    }

    #[test]
    fn test_named_without_size_falls_back_to_table() {
        let dims = resolve(
            r#"<Float32 name="v"><Dim name="/lat"/><Dim name="/lon"/></Float32>"#,
            &table(&[("lat", Some(100)), ("lon", Some(200)), ("time", Some(5))]),
        )
        .unwrap();
        assert_eq!(dims, table(&[("lat", Some(100)), ("lon", Some(200))]));
    }

    #[test]
    fn test_unknown_name_stays_unset() {
        let dims = resolve(r#"<Float32 name="v"><Dim name="time"/></Float32>"#, &table(&[]))
            .unwrap();
        assert_eq!(dims.get("time"), Some(&None));
    }

    #[test]
    fn test_tag_size_wins_over_table() {
        let dims = resolve(
            r#"<Float32 name="v"><Dim name="lat" size="10"/></Float32>"#,
            &table(&[("lat", Some(100))]),
        )
        .unwrap();
        assert_eq!(dims.get("lat"), Some(&Some(10)));
    }

    #[test]
    fn test_anonymous_dims_numbered_in_order() {
        let dims = resolve(
            r#"<Float32 name="v"><Dim size="3"/><Dim size="4"/><Dim size="5"/></Float32>"#,
            &table(&[]),
        )
        .unwrap();
        let names: Vec<&str> = dims.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["phony_dim_0", "phony_dim_1", "phony_dim_2"]);
        let sizes: Vec<Option<u64>> = dims.values().copied().collect();
        assert_eq!(sizes, vec![Some(3), Some(4), Some(5)]);
    }

    #[test]
    fn test_anonymous_after_named_counts_all_dims() {
        let dims = resolve(
            r#"<Float32 name="v"><Dim name="time"/><Dim size="200"/></Float32>"#,
            &table(&[("time", Some(5))]),
        )
        .unwrap();
        assert_eq!(dims, table(&[("time", Some(5)), ("phony_dim_1", Some(200))]));
    }

    #[test]
    fn test_unnamed_unsized_is_malformed() {
        let err = resolve(r#"<Float32 name="v"><Dim/></Float32>"#, &table(&[])).unwrap_err();
        assert!(matches!(err, DmrppError::MalformedDimension(_)));
    }

    #[test]
    fn test_invalid_size() {
        let err =
            resolve(r#"<Float32 name="v"><Dim name="x" size="ten"/></Float32>"#, &table(&[]))
                .unwrap_err();
        assert!(matches!(err, DmrppError::InvalidValue { .. }));
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("/gt1r/heights/delta_time"), "delta_time");
        assert_eq!(basename("lat"), "lat");
    }
}
