//! Configuration for the validation CLI.

use dmrpp_parser::ParseOptions;
use serde::{Deserialize, Serialize};

/// How reports are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateConfig {
    /// Data file path written into chunk manifests instead of the
    /// document's declared name.
    pub data_path: Option<String>,

    /// Group to open; `None` opens the first group.
    pub group: Option<String>,

    /// Worker threads for batch checks.
    pub threads: usize,

    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    pub output: OutputFormat,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            group: None,
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            log_level: "warn".to_string(),
            json_logs: false,
            output: OutputFormat::Table,
        }
    }
}

impl ValidateConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.threads == 0 {
            return Err("threads must be > 0".to_string());
        }

        if self.log_level.trim().is_empty() {
            return Err("log_level must not be empty".to_string());
        }

        if matches!(&self.data_path, Some(path) if path.trim().is_empty()) {
            return Err("data_path must not be empty when given".to_string());
        }

        Ok(())
    }

    /// Parser options derived from this configuration.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            data_filepath: self.data_path.clone(),
            group: self.group.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ValidateConfig::default();
        assert!(config.threads > 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let config = ValidateConfig {
            threads: 0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err(), "threads must be > 0");
    }

    #[test]
    fn test_blank_data_path_rejected() {
        let config = ValidateConfig {
            data_path: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_options() {
        let config = ValidateConfig {
            data_path: Some("s3://bucket/f.nc".to_string()),
            group: Some("/science".to_string()),
            ..Default::default()
        };
        let options = config.parse_options();
        assert_eq!(options.data_filepath.as_deref(), Some("s3://bucket/f.nc"));
        assert_eq!(options.group.as_deref(), Some("/science"));
    }
}
