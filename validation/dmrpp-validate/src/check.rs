//! Parsing documents from disk, one at a time or in parallel.

use std::path::{Path, PathBuf};

use anyhow::Context;
use dmrpp_parser::{DmrParser, FileFormat};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ValidateConfig;
use crate::report::SummaryReport;

/// Read and parse one DMR++ document.
pub fn inspect_file(path: &Path, config: &ValidateConfig) -> anyhow::Result<SummaryReport> {
    debug!(path = %path.display(), "Reading DMR++ document");
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let parser = DmrParser::with_options(&xml, &config.parse_options())?;
    let groups = parser.group_paths()?;
    let parsed = parser.parse_dataset(config.group.as_deref())?;

    Ok(SummaryReport {
        file: path.display().to_string(),
        groups,
        parsed,
    })
}

/// Result of checking one document.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckOutcome {
    Passed {
        format: FileFormat,
        group: String,
        variables: usize,
        chunks: usize,
        notices: usize,
    },
    Failed {
        error: String,
    },
}

/// One checked file.
#[derive(Debug, Clone, Serialize)]
pub struct FileCheck {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: CheckOutcome,
}

impl FileCheck {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Passed { .. })
    }
}

/// Outcome of a batch check, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub files: Vec<FileCheck>,
}

impl CheckReport {
    pub fn passed(&self) -> usize {
        self.files.iter().filter(|f| f.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Parse every document on a pool of `config.threads` workers.
///
/// A failing document never stops the batch; its error is recorded instead.
pub fn check_files(paths: &[PathBuf], config: &ValidateConfig) -> anyhow::Result<CheckReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .context("Failed to build worker pool")?;

    let files: Vec<FileCheck> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| check_file(path, config))
            .collect()
    });

    let report = CheckReport { files };
    info!(
        total = report.files.len(),
        passed = report.passed(),
        failed = report.failed(),
        "Batch check finished"
    );
    Ok(report)
}

fn check_file(path: &Path, config: &ValidateConfig) -> FileCheck {
    let outcome = match inspect_file(path, config) {
        Ok(summary) => {
            let dataset = &summary.parsed.dataset;
            CheckOutcome::Passed {
                format: dataset.format,
                group: dataset.group.clone(),
                variables: dataset.len(),
                chunks: dataset
                    .variables()
                    .filter_map(|v| v.manifest.as_ref())
                    .map(|m| m.len())
                    .sum(),
                notices: summary.parsed.notices.len(),
            }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "DMR++ document failed to parse");
            CheckOutcome::Failed {
                error: format!("{:#}", e),
            }
        }
    };
    FileCheck {
        path: path.to_path_buf(),
        outcome,
    }
}
