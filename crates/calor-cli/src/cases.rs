//! Test-case discovery.
//!
//! A case is a pair of files in one directory:
//! `input<case>-<epsilon>.csv` holds the starting grid and
//! `output<case>-<epsilon>.csv` the expected settled grid, with the
//! convergence tolerance encoded in the file name (`input001-0.01.csv`
//! runs case `001` at epsilon `0.01`).

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::HarnessError;

/// One discovered input/expected pair.
#[derive(Clone, Debug, PartialEq)]
pub struct TestCase {
    /// Case identifier from the file name.
    pub name: String,
    /// Convergence tolerance from the file name.
    pub epsilon: f64,
    /// The starting grid.
    pub input: PathBuf,
    /// The expected settled grid.
    pub expected: PathBuf,
}

/// Split an input file name into its case identifier and epsilon.
///
/// Returns `None` for names that do not follow the
/// `input<case>-<epsilon>.csv` convention.
pub fn parse_case_file_name(file_name: &str) -> Option<(String, f64)> {
    let stem = file_name.strip_prefix("input")?.strip_suffix(".csv")?;
    let (name, epsilon) = stem.split_once('-')?;
    let epsilon: f64 = epsilon.parse().ok()?;
    (!name.is_empty() && epsilon.is_finite() && epsilon >= 0.0)
        .then(|| (name.to_string(), epsilon))
}

/// Discover every test case under `dir`, in file-name order, keyed by
/// the file stem (`<case>-<epsilon>`) so one case name may appear at
/// several tolerances.
///
/// The expected-output path is derived from the input file name
/// (`input` → `output`, epsilon text preserved verbatim); whether it
/// exists is checked when the case runs.
///
/// # Errors
///
/// [`HarnessError::Directory`] when `dir` cannot be listed.
pub fn discover_cases(dir: &Path) -> Result<IndexMap<String, TestCase>, HarnessError> {
    let entries = fs::read_dir(dir).map_err(|source| HarnessError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut file_names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    file_names.sort();

    let mut cases = IndexMap::new();
    for file_name in file_names {
        let Some((name, epsilon)) = parse_case_file_name(&file_name) else {
            continue;
        };
        let stem = file_name["input".len()..file_name.len() - ".csv".len()].to_string();
        let case = TestCase {
            name,
            epsilon,
            input: dir.join(&file_name),
            expected: dir.join(format!("output{stem}.csv")),
        };
        cases.insert(stem, case);
    }
    Ok(cases)
}
