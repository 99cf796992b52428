//! Error types for DMR++ parsing operations.

use thiserror::Error;

/// Result type for DMR++ parser operations.
pub type DmrppResult<T> = Result<T, DmrppError>;

/// Error types for DMR++ parsing.
///
/// Every variant is fatal for the document being parsed: no partially
/// constructed dataset is ever returned alongside an error.
#[derive(Error, Debug)]
pub enum DmrppError {
    /// Document is neither HDF5-based nor netCDF4-based.
    #[error("unsupported DMR++ document: {0}")]
    UnsupportedFormat(String),

    /// Requested group is absent from the resolved group set.
    #[error("group '{group}' not found in {format} DMR++ document")]
    GroupNotFound { group: String, format: String },

    /// An HDF5-based document in which no variable carries a `fullnamepath`.
    #[error("no groups found in HDF5-based DMR++ document")]
    NoGroups,

    /// A `Dim`/`Dimension` tag with neither a name nor a size.
    #[error("malformed dimension: {0}")]
    MalformedDimension(String),

    /// An attribute or variable declares a type outside the DAP4 type table.
    #[error("unknown DAP type '{0}'")]
    UnknownDapType(String),

    /// A required XML attribute is missing from an element.
    #[error("missing attribute '{attribute}' on <{element}>")]
    MissingAttribute { element: String, attribute: String },

    /// An attribute or value could not be converted to its declared type.
    #[error("invalid value '{value}' for {context}")]
    InvalidValue { value: String, context: String },

    /// Chunk layout is inconsistent with the variable it belongs to.
    #[error("invalid chunk layout for '{variable}': {reason}")]
    InvalidChunk { variable: String, reason: String },

    /// XML syntax error.
    #[error("XML error: {0}")]
    Xml(String),
}

impl DmrppError {
    /// Create an UnsupportedFormat error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Create a MissingAttribute error.
    pub fn missing_attribute(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Create an InvalidValue error.
    pub fn invalid_value(value: impl Into<String>, context: impl Into<String>) -> Self {
        Self::InvalidValue {
            value: value.into(),
            context: context.into(),
        }
    }

    /// Create an InvalidChunk error.
    pub fn invalid_chunk(variable: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidChunk {
            variable: variable.into(),
            reason: reason.into(),
        }
    }
}

impl From<quick_xml::Error> for DmrppError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DmrppError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(err.to_string())
    }
}
