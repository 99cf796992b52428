//! Locating DMR++ fixture files and scratch directories for CLI tests.

use std::path::{Path, PathBuf};

/// Environment variable naming an extra fixture directory, searched first.
pub const TEST_DATA_DIR_VAR: &str = "TEST_DATA_DIR";

/// Fixture directories relative to the workspace root, in search order.
const FIXTURE_DIRS: [&str; 2] = ["crates/dmrpp-parser/testdata", "testdata"];

/// Workspace root, two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// Directories searched by [`find_test_file`], in order.
pub fn fixture_dirs() -> Vec<PathBuf> {
    let root = workspace_root();
    std::env::var_os(TEST_DATA_DIR_VAR)
        .map(PathBuf::from)
        .into_iter()
        .chain(FIXTURE_DIRS.iter().map(|dir| root.join(dir)))
        .collect()
}

/// First existing `name` among [`fixture_dirs`].
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    fixture_dirs()
        .into_iter()
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
}

/// Scratch directory named with `prefix`, removed on drop.
pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("scratch directory")
}

/// Write `contents` to `dir/name` and return the path.
pub fn write_test_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("scratch file");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_dirs_end_with_workspace_testdata() {
        let dirs = fixture_dirs();
        assert_eq!(dirs.last(), Some(&workspace_root().join("testdata")));
        assert!(workspace_root().join("Cargo.toml").is_file());
    }

    #[test]
    fn test_subset_documents_are_found() {
        let mur = find_test_file("MUR_subset.nc.dmrpp").unwrap();
        assert!(mur.ends_with("crates/dmrpp-parser/testdata/MUR_subset.nc.dmrpp"));
        assert!(find_test_file("MUR_subset.h5.dmrpp").is_none());
    }

    #[test]
    fn test_scratch_file_round_trip() {
        let dir = temp_test_dir_with_prefix("dmrpp_write_");
        assert!(dir.path().to_string_lossy().contains("dmrpp_write_"));
        let path = write_test_file(&dir, "a.dmrpp", "<Dataset/>");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<Dataset/>");
    }
}
