//! Decide whether a DMR++ document describes an HDF5 or a netCDF4 file.

use serde::Serialize;
use std::fmt;

use crate::error::{DmrppError, DmrppResult};
use crate::xml::{Element, XmlNamespace};

/// File format family the document was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FileFormat {
    Hdf5,
    NetCdf4,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Hdf5 => "HDF5",
            FileFormat::NetCdf4 => "netCDF4",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the document.
///
/// HDF5 documents tag attributes with `fullnamepath` or carry an
/// `HDF5_GLOBAL` container; otherwise a `.nc` file name means netCDF4.
/// `file_names` are the declared source name and the effective data path.
pub(crate) fn classify(root: &Element, file_names: &[&str]) -> DmrppResult<FileFormat> {
    let has_fullnamepath = root
        .descendants()
        .any(|e| e.is(XmlNamespace::Dap, "Attribute") && e.attr("name") == Some("fullnamepath"));
    if has_fullnamepath || root.dap_attribute("HDF5_GLOBAL").is_some() {
        return Ok(FileFormat::Hdf5);
    }
    if file_names.iter().any(|name| name.ends_with(".nc")) {
        return Ok(FileFormat::NetCdf4);
    }
    Err(DmrppError::unsupported(format!(
        "'{}' is neither HDF5-based nor a .nc file",
        file_names.first().copied().unwrap_or_default()
    )))
}
