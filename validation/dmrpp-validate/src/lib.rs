//! Inspection and batch validation of DMR++ documents.
//!
//! This crate provides tools to:
//! - Summarize one document (groups, dimensions, variables, chunk counts)
//! - Dump the chunk manifest of a single variable
//! - Parse many documents in parallel and report which ones fail

pub mod check;
pub mod config;
pub mod report;

pub use check::{check_files, inspect_file, CheckOutcome, CheckReport, FileCheck};
pub use config::{OutputFormat, ValidateConfig};
pub use report::{ManifestReport, SummaryReport};
