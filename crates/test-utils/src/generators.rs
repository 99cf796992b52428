//! Generators for synthetic DMR++ documents.
//!
//! Generated documents list every chunk of a variable's grid with a
//! predictable layout, so tests can check chunk coverage without fixtures.

/// One chunked variable of a synthetic document.
#[derive(Debug, Clone)]
pub struct SyntheticVariable {
    pub name: String,
    /// DAP4 type name, e.g. `"Float32"`.
    pub dap_type: String,
    pub shape: Vec<u64>,
    pub chunks: Vec<u64>,
    /// `compressionType` descriptor, omitted when `None`.
    pub compression: Option<String>,
}

impl SyntheticVariable {
    pub fn new(name: &str, dap_type: &str, shape: &[u64], chunks: &[u64]) -> Self {
        assert_eq!(shape.len(), chunks.len(), "shape and chunks must have the same rank");
        Self {
            name: name.to_string(),
            dap_type: dap_type.to_string(),
            shape: shape.to_vec(),
            chunks: chunks.to_vec(),
            compression: None,
        }
    }

    pub fn with_compression(mut self, descriptor: &str) -> Self {
        self.compression = Some(descriptor.to_string());
        self
    }

    /// Dimension names used for this variable: `<name>_dim<i>`.
    pub fn dim_names(&self) -> Vec<String> {
        (0..self.shape.len())
            .map(|i| format!("{}_dim{}", self.name, i))
            .collect()
    }

    /// Number of chunks along each dimension.
    pub fn grid_shape(&self) -> Vec<u64> {
        self.shape
            .iter()
            .zip(&self.chunks)
            .map(|(&size, &chunk)| size.div_ceil(chunk))
            .collect()
    }

    /// Every chunk index of the grid, in row-major order.
    pub fn chunk_indices(&self) -> Vec<Vec<u64>> {
        let grid = self.grid_shape();
        let mut indices = vec![Vec::new()];
        for &count in &grid {
            indices = indices
                .into_iter()
                .flat_map(|prefix| {
                    (0..count).map(move |i| {
                        let mut next = prefix.clone();
                        next.push(i);
                        next
                    })
                })
                .collect();
        }
        indices
    }

    /// Expected manifest keys (`"i.j.k"`), in row-major order.
    pub fn expected_chunk_keys(&self) -> Vec<String> {
        self.chunk_indices()
            .iter()
            .map(|index| {
                index
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(".")
            })
            .collect()
    }
}

/// Byte length written for each synthetic chunk.
pub const SYNTHETIC_CHUNK_BYTES: u64 = 64;

/// First chunk offset in a synthetic document.
pub const SYNTHETIC_FIRST_OFFSET: u64 = 4096;

/// Build a netCDF4-style DMR++ document named `file_name`.
///
/// Each variable gets its own root-level dimensions (see
/// [`SyntheticVariable::dim_names`]) and one `<dmrpp:chunk>` per grid cell.
/// Chunks are laid out back to back, [`SYNTHETIC_CHUNK_BYTES`] each,
/// starting at [`SYNTHETIC_FIRST_OFFSET`].
///
/// # Example
///
/// ```
/// use test_utils::{synthetic_dmrpp, SyntheticVariable};
///
/// let var = SyntheticVariable::new("sst", "Int16", &[10, 20], &[5, 10]);
/// let xml = synthetic_dmrpp("synthetic.nc", &[var]);
/// assert_eq!(xml.matches("<dmrpp:chunk ").count(), 4);
/// ```
pub fn synthetic_dmrpp(file_name: &str, variables: &[SyntheticVariable]) -> String {
    let mut lines = vec![
        r#"<?xml version="1.0" encoding="ISO-8859-1"?>"#.to_string(),
        format!(
            r#"<Dataset xmlns="http://xml.opendap.org/ns/DAP/4.0#" xmlns:dmrpp="http://xml.opendap.org/dap/dmrpp/1.0.0#" name="{}">"#,
            file_name
        ),
    ];

    for var in variables {
        for (dim, size) in var.dim_names().iter().zip(&var.shape) {
            lines.push(format!(r#"    <Dimension name="{}" size="{}"/>"#, dim, size));
        }
    }

    let mut offset = SYNTHETIC_FIRST_OFFSET;
    for var in variables {
        lines.push(format!(r#"    <{} name="{}">"#, var.dap_type, var.name));
        for dim in var.dim_names() {
            lines.push(format!(r#"        <Dim name="/{}"/>"#, dim));
        }
        lines.push(match &var.compression {
            Some(descriptor) => {
                format!(r#"        <dmrpp:chunks compressionType="{}">"#, descriptor)
            }
            None => "        <dmrpp:chunks>".to_string(),
        });
        let sizes: Vec<String> = var.chunks.iter().map(u64::to_string).collect();
        lines.push(format!(
            "            <dmrpp:chunkDimensionSizes>{}</dmrpp:chunkDimensionSizes>",
            sizes.join(" ")
        ));
        for index in var.chunk_indices() {
            let position: Vec<String> = index
                .iter()
                .zip(&var.chunks)
                .map(|(i, chunk)| (i * chunk).to_string())
                .collect();
            lines.push(format!(
                r#"            <dmrpp:chunk offset="{}" nBytes="{}" chunkPositionInArray="[{}]"/>"#,
                offset,
                SYNTHETIC_CHUNK_BYTES,
                position.join(",")
            ));
            offset += SYNTHETIC_CHUNK_BYTES;
        }
        lines.push("        </dmrpp:chunks>".to_string());
        lines.push(format!("    </{}>", var.dap_type));
    }

    lines.push("</Dataset>".to_string());
    let mut xml = lines.join("\n");
    xml.push('\n');
    xml
}

/// Build a document whose single variable `name` has only anonymous
/// dimensions of the given sizes.
pub fn anonymous_dims_dmrpp(name: &str, sizes: &[u64]) -> String {
    let dims: String = sizes
        .iter()
        .map(|size| format!(r#"<Dim size="{}"/>"#, size))
        .collect();
    format!(
        r#"<Dataset xmlns="http://xml.opendap.org/ns/DAP/4.0#" name="anonymous.nc"><Float32 name="{}">{}</Float32></Dataset>"#,
        name, dims
    )
}
