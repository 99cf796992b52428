//! Granule link helpers.
//!
//! A DMR++ document is published next to its data file under the same
//! name with a `.dmrpp` suffix.

/// Suffix of DMR++ sidecar documents.
pub const DMRPP_SUFFIX: &str = ".dmrpp";

/// DMR++ link for a data file link.
pub fn dmrpp_link_for(data_link: &str) -> String {
    format!("{}{}", data_link, DMRPP_SUFFIX)
}

/// Data file link for a DMR++ link. Links without the suffix are returned as-is.
pub fn data_link_for(dmrpp_link: &str) -> &str {
    dmrpp_link.strip_suffix(DMRPP_SUFFIX).unwrap_or(dmrpp_link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links() {
        let data = "https://data.earthdata.nasa.gov/ATL03_20181014.h5";
        let dmrpp = dmrpp_link_for(data);
        assert_eq!(dmrpp, "https://data.earthdata.nasa.gov/ATL03_20181014.h5.dmrpp");
        assert_eq!(data_link_for(&dmrpp), data);
        assert_eq!(data_link_for("local/sst.nc"), "local/sst.nc");
    }
}
