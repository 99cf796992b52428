//! Parser entry point.

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::classify::{classify, FileFormat};
use crate::config::ParseOptions;
use crate::dataset::{build_dataset, Dataset};
use crate::error::{DmrppError, DmrppResult};
use crate::hierarchy::{
    normalize_group_path, original_names, root_scope, split_hdf5, split_netcdf4, GroupScope,
    GroupTable,
};
use crate::xml::{parse_document, Element};

/// Non-fatal condition met while selecting a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseNotice {
    /// No group was requested and several exist; the first was opened.
    DefaultGroupSelected {
        selected: String,
        available: Vec<String>,
    },
    /// A group was requested from a netCDF4 document without groups.
    GroupIgnored { requested: String },
}

impl fmt::Display for ParseNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseNotice::DefaultGroupSelected {
                selected,
                available,
            } => write!(
                f,
                "no group specified, opening '{}' of {} groups: {}",
                selected,
                available.len(),
                available.join(", ")
            ),
            ParseNotice::GroupIgnored { requested } => write!(
                f,
                "group '{}' ignored, document has no groups",
                requested
            ),
        }
    }
}

/// A dataset together with the notices raised while producing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDataset {
    pub dataset: Dataset,
    pub notices: Vec<ParseNotice>,
}

/// Parser over one DMR++ document.
///
/// The XML is parsed once on construction; each call to
/// [`DmrParser::parse_dataset`] builds a fresh [`Dataset`] from it.
#[derive(Debug, Clone)]
pub struct DmrParser {
    root: Element,
    data_filepath: String,
}

impl DmrParser {
    /// Parse `dmr`. Chunk manifests point at `data_filepath` when given,
    /// otherwise at the document's declared `name`.
    pub fn new(dmr: &str, data_filepath: Option<&str>) -> DmrppResult<Self> {
        let root = parse_document(dmr)?;
        let data_filepath = match data_filepath {
            Some(path) => path.to_string(),
            None => root.require_attr("name")?.to_string(),
        };
        Ok(Self {
            root,
            data_filepath,
        })
    }

    pub fn with_options(dmr: &str, options: &ParseOptions) -> DmrppResult<Self> {
        Self::new(dmr, options.data_filepath.as_deref())
    }

    /// Path recorded in chunk manifest entries.
    pub fn data_filepath(&self) -> &str {
        &self.data_filepath
    }

    /// Declared source file name of the document.
    pub fn document_name(&self) -> Option<&str> {
        self.root.attr("name")
    }

    pub fn format(&self) -> DmrppResult<FileFormat> {
        let mut names = Vec::with_capacity(2);
        names.extend(self.document_name());
        names.push(self.data_filepath.as_str());
        classify(&self.root, &names)
    }

    /// Paths of the groups the document can be opened at, in document order.
    pub fn group_paths(&self) -> DmrppResult<Vec<String>> {
        let format = self.format()?;
        let table = match format {
            FileFormat::Hdf5 => split_hdf5(&self.root)?,
            FileFormat::NetCdf4 => split_netcdf4(&self.root)?,
        };
        if table.is_empty() && format == FileFormat::NetCdf4 {
            return Ok(vec![String::new()]);
        }
        Ok(table.paths().map(str::to_string).collect())
    }

    /// Build the dataset for `group`, or for the default group when `None`.
    pub fn parse_dataset(&self, group: Option<&str>) -> DmrppResult<ParsedDataset> {
        let format = self.format()?;
        let requested = group.map(normalize_group_path);
        let parsed = match format {
            FileFormat::Hdf5 => self.parse_hdf5(requested.as_deref())?,
            FileFormat::NetCdf4 => self.parse_netcdf4(requested.as_deref())?,
        };
        info!(
            format = %format,
            group = %parsed.dataset.group,
            variables = parsed.dataset.len(),
            "Parsed DMR++ dataset"
        );
        Ok(parsed)
    }

    fn parse_hdf5(&self, group: Option<&str>) -> DmrppResult<ParsedDataset> {
        let table = split_hdf5(&self.root)?;
        if table.is_empty() {
            return Err(DmrppError::NoGroups);
        }
        let (scope, notices) = select_group(&table, group, FileFormat::Hdf5)?;
        let renames = original_names(scope)?;
        let mut dataset = build_dataset(&self.root, scope, FileFormat::Hdf5, &self.data_filepath)?;
        dataset.rename_variables(&renames);
        Ok(ParsedDataset { dataset, notices })
    }

    fn parse_netcdf4(&self, group: Option<&str>) -> DmrppResult<ParsedDataset> {
        let table = split_netcdf4(&self.root)?;
        let mut notices = Vec::new();

        let dataset = if table.is_empty() {
            if let Some(requested) = group.filter(|g| !g.is_empty()) {
                let notice = ParseNotice::GroupIgnored {
                    requested: requested.to_string(),
                };
                warn!("{}", notice);
                notices.push(notice);
            }
            self.build_root()?
        } else if group == Some("") {
            self.build_root()?
        } else {
            let (scope, selection_notices) = select_group(&table, group, FileFormat::NetCdf4)?;
            notices = selection_notices;
            build_dataset(&self.root, scope, FileFormat::NetCdf4, &self.data_filepath)?
        };
        Ok(ParsedDataset { dataset, notices })
    }

    fn build_root(&self) -> DmrppResult<Dataset> {
        let scope = root_scope(&self.root)?;
        build_dataset(&self.root, &scope, FileFormat::NetCdf4, &self.data_filepath)
    }
}

fn select_group<'t, 'a>(
    table: &'t GroupTable<'a>,
    group: Option<&str>,
    format: FileFormat,
) -> DmrppResult<(&'t GroupScope<'a>, Vec<ParseNotice>)> {
    match group {
        Some(path) => table
            .get(path)
            .map(|scope| (scope, Vec::new()))
            .ok_or_else(|| DmrppError::GroupNotFound {
                group: path.to_string(),
                format: format.to_string(),
            }),
        None => {
            let first = table.first().ok_or(DmrppError::NoGroups)?;
            let mut notices = Vec::new();
            if table.len() > 1 {
                let notice = ParseNotice::DefaultGroupSelected {
                    selected: first.path.clone(),
                    available: table.paths().map(str::to_string).collect(),
                };
                warn!("{}", notice);
                notices.push(notice);
            }
            Ok((first, notices))
        }
    }
}

/// Parse a DMR++ document in one call.
pub fn parse_dmrpp(dmr: &str, options: &ParseOptions) -> DmrppResult<ParsedDataset> {
    DmrParser::with_options(dmr, options)?.parse_dataset(options.group.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_outputs_are_send_sync() {
        assert_send_sync::<DmrParser>();
        assert_send_sync::<ParsedDataset>();
        assert_send_sync::<DmrppError>();
    }

    #[test]
    fn test_missing_name_without_override() {
        let err = DmrParser::new(r#"<Dataset><Float32 name="a"/></Dataset>"#, None).unwrap_err();
        assert!(matches!(err, DmrppError::MissingAttribute { .. }));
    }

    #[test]
    fn test_override_decides_format() {
        let parser =
            DmrParser::new(r#"<Dataset name="granule"><Float32 name="a"/></Dataset>"#, Some("g.nc"))
                .unwrap();
        assert_eq!(parser.format().unwrap(), FileFormat::NetCdf4);
        assert_eq!(parser.data_filepath(), "g.nc");
    }

    #[test]
    fn test_notice_display() {
        let notice = ParseNotice::DefaultGroupSelected {
            selected: "a".to_string(),
            available: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(notice.to_string(), "no group specified, opening 'a' of 2 groups: a, b");
    }

    #[test]
    fn test_flat_netcdf4_group_ignored() {
        let parser =
            DmrParser::new(r#"<Dataset name="f.nc"><Float32 name="a"/></Dataset>"#, None).unwrap();
        let parsed = parser.parse_dataset(Some("/science")).unwrap();
        assert_eq!(
            parsed.notices,
            vec![ParseNotice::GroupIgnored {
                requested: "science".to_string()
            }]
        );
        assert_eq!(parsed.dataset.group, "");
        assert_eq!(parser.group_paths().unwrap(), vec![String::new()]);
    }
}
