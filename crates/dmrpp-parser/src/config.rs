//! Options controlling a parse.

use serde::{Deserialize, Serialize};

/// Options for [`crate::parse_dmrpp`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Path recorded in every chunk manifest entry. Defaults to the
    /// document's declared source name.
    pub data_filepath: Option<String>,

    /// Group to open. `None` selects the first group.
    pub group: Option<String>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the data file path written into chunk manifests.
    pub fn with_data_filepath(mut self, path: impl Into<String>) -> Self {
        self.data_filepath = Some(path.into());
        self
    }

    /// Select a group by path. Leading slashes are accepted.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = ParseOptions::new()
            .with_data_filepath("s3://bucket/ATL03.h5")
            .with_group("/gt1r/heights");
        assert_eq!(options.data_filepath.as_deref(), Some("s3://bucket/ATL03.h5"));
        assert_eq!(options.group.as_deref(), Some("/gt1r/heights"));
    }

    #[test]
    fn test_deserialize_partial() {
        let options: ParseOptions = serde_json::from_str(r#"{"group": "science"}"#).unwrap();
        assert_eq!(options, ParseOptions::new().with_group("science"));
    }
}
