//! Report types and their table/JSON rendering.

use anyhow::anyhow;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use dmrpp_parser::{ArrayMetadata, ChunkManifest, Filter, ParsedDataset};
use serde::Serialize;

use crate::check::{CheckOutcome, CheckReport};

/// Parsed document plus the groups it could have been opened at.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub file: String,
    pub groups: Vec<String>,
    #[serde(flatten)]
    pub parsed: ParsedDataset,
}

impl SummaryReport {
    /// Format the summary as two console tables: overview and variables.
    pub fn format_table(&self) -> String {
        let dataset = &self.parsed.dataset;

        let mut overview = new_table(vec![format!("DMR++ Summary: {}", self.file)]);
        overview.add_row(vec!["Format:", dataset.format.as_str()]);
        overview.add_row(vec!["Group:", &display_group(&dataset.group)]);
        overview.add_row(vec![
            "Groups:",
            &self
                .groups
                .iter()
                .map(|g| display_group(g))
                .collect::<Vec<_>>()
                .join(", "),
        ]);
        overview.add_row(vec![
            "Dimensions:",
            &dataset
                .dims
                .iter()
                .map(|(name, size)| format!("{}={}", name, format_size(*size)))
                .collect::<Vec<_>>()
                .join(", "),
        ]);
        overview.add_row(vec!["Attributes:", &dataset.attrs.len().to_string()]);
        overview.add_row(vec!["Chunk bytes:", &dataset.total_chunk_bytes().to_string()]);
        for notice in &self.parsed.notices {
            overview.add_row(vec!["Notice:".to_string(), notice.to_string()]);
        }

        let mut variables = new_table(vec![
            "Variable", "Role", "Type", "Shape", "Chunk shape", "Filters", "Chunks",
        ]);
        for var in dataset.variables() {
            let role = if dataset.is_coord(&var.name) {
                "coord"
            } else {
                "data"
            };
            variables.add_row(vec![
                var.name.clone(),
                role.to_string(),
                var.dtype().to_string(),
                format_shape(var.shape()),
                format_shape(var.chunk_shape()),
                format_filters(var.filters()),
                var.manifest
                    .as_ref()
                    .map(|m| m.len().to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]);
        }

        format!("{}\n{}", overview, variables)
    }

    /// Format the full parsed dataset as JSON.
    pub fn format_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Array metadata and chunk manifest of one variable.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestReport {
    pub variable: String,
    pub dims: Vec<String>,
    pub metadata: ArrayMetadata,
    pub manifest: ChunkManifest,
}

impl ManifestReport {
    /// Extract `variable` from a summary. Unchunked variables have no manifest.
    pub fn from_summary(summary: &SummaryReport, variable: &str) -> anyhow::Result<Self> {
        let dataset = &summary.parsed.dataset;
        let var = dataset.variable(variable).ok_or_else(|| {
            anyhow!(
                "variable '{}' not found in group '{}'",
                variable,
                display_group(&dataset.group)
            )
        })?;
        let manifest = var
            .manifest
            .clone()
            .ok_or_else(|| anyhow!("variable '{}' has no chunk manifest", variable))?;
        Ok(Self {
            variable: var.name.clone(),
            dims: var.dims.clone(),
            metadata: var.metadata.clone(),
            manifest,
        })
    }

    pub fn format_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl CheckReport {
    /// Format results as a console table, one row per file.
    pub fn format_table(&self) -> String {
        let mut table = new_table(vec![
            "File", "Status", "Format", "Group", "Variables", "Chunks", "Detail",
        ]);
        for file in &self.files {
            let path = file.path.display().to_string();
            match &file.outcome {
                CheckOutcome::Passed {
                    format,
                    group,
                    variables,
                    chunks,
                    notices,
                } => table.add_row(vec![
                    path,
                    "ok".to_string(),
                    format.to_string(),
                    display_group(group),
                    variables.to_string(),
                    chunks.to_string(),
                    if *notices > 0 {
                        format!("{} notice(s)", notices)
                    } else {
                        String::new()
                    },
                ]),
                CheckOutcome::Failed { error } => table.add_row(vec![
                    path,
                    "FAILED".to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    error.clone(),
                ]),
            };
        }
        format!(
            "{}\n{} passed, {} failed",
            table,
            self.passed(),
            self.failed()
        )
    }

    pub fn format_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn new_table<T: ToString>(header: Vec<T>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.into_iter().map(|h| h.to_string()).collect::<Vec<_>>());
    table
}

fn display_group(group: &str) -> String {
    if group.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", group)
    }
}

fn format_size(size: Option<u64>) -> String {
    size.map(|s| s.to_string())
        .unwrap_or_else(|| "unlimited".to_string())
}

fn format_shape(shape: &[Option<u64>]) -> String {
    let parts: Vec<String> = shape.iter().map(|s| format_size(*s)).collect();
    format!("({})", parts.join(", "))
}

fn format_filters(filters: Option<&[Filter]>) -> String {
    match filters {
        None => "-".to_string(),
        Some([]) => "none".to_string(),
        Some(filters) => filters
            .iter()
            .map(|f| match f {
                Filter::Shuffle { elementsize } => format!("shuffle({})", elementsize),
                Filter::Zlib { level } => format!("zlib({})", level),
            })
            .collect::<Vec<_>>()
            .join(", "),
    }
}
