//! DMR++ metadata parser for virtual datasets
//!
//! A DMR++ document describes the layout of a remote HDF5 or netCDF4 file:
//! its groups, dimensions, variables and attributes, plus the byte offset and
//! length of every stored chunk. This crate turns one such document into a
//! [`Dataset`] whose variables carry array metadata and a [`ChunkManifest`],
//! enough for a reader to fetch chunks with byte-range requests without
//! opening the file itself.
//!
//! # Pipeline
//!
//! ```text
//! DMR++ XML
//!      │
//!      ▼
//! classify ──► HDF5 (flat, fullnamepath)  │  netCDF4 (nested <Group>)
//!      │
//!      ▼
//! split into group scopes ──► select group
//!      │
//!      ├─► resolve dimensions (phony_dim_<n>, unset sizes)
//!      ├─► build variables (shape, dtype, chunks, filters, fill value)
//!      ├─► cast attributes
//!      │
//!      └─► classify coordinates ──► Dataset
//! ```
//!
//! Parsing is synchronous and performs no I/O.
//!
//! # Example
//!
//! ```ignore
//! use dmrpp_parser::{parse_dmrpp, ParseOptions};
//!
//! let xml = std::fs::read_to_string("ATL03_20181014.h5.dmrpp")?;
//! let options = ParseOptions::new()
//!     .with_data_filepath("s3://bucket/ATL03_20181014.h5")
//!     .with_group("/gt1r/heights");
//! let parsed = parse_dmrpp(&xml, &options)?;
//!
//! for variable in parsed.dataset.variables() {
//!     println!("{} {:?} {:?}", variable.name, variable.shape(), variable.filters());
//! }
//! ```

pub mod attribute;
pub mod classify;
pub mod config;
pub mod dataset;
pub mod dimension;
pub mod dtype;
pub mod error;
pub mod filters;
pub mod links;
pub mod manifest;
pub mod parser;
pub mod variable;

mod hierarchy;
mod xml;

// Re-export commonly used types at crate root
pub use attribute::{AttrValue, Attributes, Scalar};
pub use classify::FileFormat;
pub use config::ParseOptions;
pub use dataset::Dataset;
pub use dimension::{Dimension, DimensionSizes, PHONY_DIM_PREFIX};
pub use dtype::{DapType, DataType};
pub use error::{DmrppError, DmrppResult};
pub use filters::{Filter, DEFAULT_DEFLATE_LEVEL};
pub use hierarchy::normalize_group_path;
pub use links::{data_link_for, dmrpp_link_for};
pub use manifest::{ChunkEntry, ChunkKey, ChunkManifest};
pub use parser::{parse_dmrpp, DmrParser, ParseNotice, ParsedDataset};
pub use variable::{ArrayMetadata, Order, Variable, ENCODING_KEYS};
pub use xml::{DAP_NAMESPACE, DMRPP_NAMESPACE};
