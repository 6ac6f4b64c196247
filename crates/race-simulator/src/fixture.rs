//! Reading and writing result sets as JSON fixtures.

use crate::error::Result;
use race_domain::ResultSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// Load a result set from a `{records, drivers, constructors, races}` file.
pub fn read_results(path: &Path) -> Result<ResultSet> {
    let json = fs::read_to_string(path)?;
    let results: ResultSet = serde_json::from_str(&json)?;
    info!(path = %path.display(), records = results.len(), "Loaded results");
    Ok(results)
}

/// Write a result set in the fixture format.
pub fn write_results(results: &ResultSet, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    fs::write(path, json)?;
    info!(path = %path.display(), records = results.len(), "Wrote results");
    Ok(())
}
