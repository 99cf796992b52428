//! DMR++ documents shared across the test suite.
//!
//! The larger documents live in `crates/dmrpp-parser/testdata/` so the CLI
//! tests can read them from disk; they are embedded here for library tests.

/// File names of the on-disk fixtures.
pub mod names {
    /// ICESat-2 ATL03 subset: HDF5-based, flattened names with `fullnamepath`.
    pub const ATL03: &str = "ATL03_subset.h5.dmrpp";

    /// GHRSST MUR subset: flat netCDF4.
    pub const MUR: &str = "MUR_subset.nc.dmrpp";

    /// TEMPO NO2 subset: netCDF4 with nested groups.
    pub const TEMPO: &str = "TEMPO_NO2_subset.nc.dmrpp";
}

/// HDF5-based document with groups `gt1r/heights` and `orbit_info`.
pub const ATL03_DMRPP: &str = include_str!("../../dmrpp-parser/testdata/ATL03_subset.h5.dmrpp");

/// Flat netCDF4 document with `time`, `lat`, `lon`, `analysed_sst` and `mask`.
pub const MUR_DMRPP: &str = include_str!("../../dmrpp-parser/testdata/MUR_subset.nc.dmrpp");

/// netCDF4 document with groups `geolocation`, `product` and `product/support_data`.
pub const TEMPO_DMRPP: &str =
    include_str!("../../dmrpp-parser/testdata/TEMPO_NO2_subset.nc.dmrpp");

/// Small inline documents for edge cases.
pub mod documents {
    /// HDF5 document whose group attributes sit in an `HDF5_GLOBAL` container.
    pub const HDF5_GLOBAL: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<Dataset xmlns="http://xml.opendap.org/ns/DAP/4.0#" xmlns:dmrpp="http://xml.opendap.org/dap/dmrpp/1.0.0#" name="OMI-Aura_L3.he5">
    <Dimension name="lat" size="180"/>
    <Float32 name="ColumnAmountO3">
        <Dim name="/lat"/>
        <Attribute name="fullnamepath" type="String"><Value>/ColumnAmountO3</Value></Attribute>
        <dmrpp:chunks compressionType="deflate" deflateLevel="5">
            <dmrpp:chunkDimensionSizes>90</dmrpp:chunkDimensionSizes>
            <dmrpp:chunk offset="100" nBytes="50" chunkPositionInArray="[0]"/>
            <dmrpp:chunk offset="150" nBytes="50" chunkPositionInArray="[90]"/>
        </dmrpp:chunks>
    </Float32>
    <Attribute name="HDF5_GLOBAL" type="Container">
        <Attribute name="OrbitNumber" type="Int32"><Value>1001</Value><Value>1002</Value></Attribute>
        <Attribute name="InstrumentName" type="String"><Value>OMI</Value></Attribute>
    </Attribute>
</Dataset>"#;

    /// HDF5 document in which no variable carries a `fullnamepath`.
    pub const HDF5_WITHOUT_GROUPS: &str = r#"<Dataset xmlns="http://xml.opendap.org/ns/DAP/4.0#" name="empty.h5">
    <Float32 name="v"><Dim size="2"/></Float32>
    <Attribute name="HDF5_GLOBAL" type="Container">
        <Attribute name="title" type="String"><Value>no groups</Value></Attribute>
    </Attribute>
</Dataset>"#;

    /// Neither HDF5-based nor a `.nc` file.
    pub const UNSUPPORTED: &str = r#"<Dataset xmlns="http://xml.opendap.org/ns/DAP/4.0#" name="gfs.t00z.pgrb2.0p25.f000">
    <Float32 name="TMP"><Dim size="721"/><Dim size="1440"/></Float32>
</Dataset>"#;

    /// Variable with only anonymous dimensions.
    pub const PHONY_DIMS: &str = r#"<Dataset xmlns="http://xml.opendap.org/ns/DAP/4.0#" name="phony.nc">
    <Float64 name="swath"><Dim size="3"/><Dim size="4"/><Dim size="5"/></Float64>
</Dataset>"#;

    /// Unlimited dimension: declared without a size.
    pub const UNLIMITED: &str = r#"<Dataset xmlns="http://xml.opendap.org/ns/DAP/4.0#" name="unlimited.nc">
    <Dimension name="lat" size="10"/>
    <Float32 name="obs"><Dim name="/time"/><Dim name="/lat"/></Float32>
</Dataset>"#;

    /// Variable element of a type outside the DAP4 table.
    pub const UNKNOWN_TYPE: &str = r#"<Dataset xmlns="http://xml.opendap.org/ns/DAP/4.0#" name="bad.nc">
    <Float16 name="half"><Dim size="2"/></Float16>
</Dataset>"#;

    /// Dimension with neither a name nor a size.
    pub const MALFORMED_DIM: &str = r#"<Dataset xmlns="http://xml.opendap.org/ns/DAP/4.0#" name="bad.nc">
    <Float32 name="v"><Dim/></Float32>
</Dataset>"#;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_documents_are_not_empty() {
        for doc in [ATL03_DMRPP, MUR_DMRPP, TEMPO_DMRPP] {
            assert!(doc.contains("<Dataset"));
            assert!(doc.trim_end().ends_with("</Dataset>"));
        }
    }
}
