//! Test support shared by the parser and the validation CLI.
//!
//! - [`fixtures`]: DMR++ subset documents embedded at compile time, plus
//!   small hand-written documents for edge cases
//! - [`generators`]: synthetic documents with a known chunk layout
//! - [`paths`]: locating fixture files on disk and scratch directories
//!
//! Parser tests read the embedded strings; CLI tests need real files and
//! go through [`require_test_file!`].

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Path of a fixture file, or return early from the test when it is missing.
///
/// Looks in `TEST_DATA_DIR` first, see [`find_test_file`].
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "skipping: fixture '{}' not found (set TEST_DATA_DIR)",
                    $name
                );
                return;
            }
        }
    }};
}

/// Assert two numbers differ by at most `epsilon`, compared as `f64`.
///
/// Fill values such as `3.4028235e38_f32` need a wide epsilon.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: |{:?} - {:?}| = {:?} exceeds {:?}",
                left, right, diff, epsilon
            );
        }
    }};
}
