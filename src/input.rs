// Tabular input contract: raw descriptions arrive in a CSV column
// literally named `name`. A missing column is a validation error raised
// before any record is processed, never a silent skip.

use anyhow::{anyhow, Context, Result};
use std::path::Path;

/// Read the `name` column of a CSV file, one entry per row, order
/// preserved. Empty cells stay in the batch so output rows keep lining up
/// with input rows.
pub fn read_name_column(path: &Path) -> Result<Vec<String>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;

    let headers = rdr
        .headers()
        .with_context(|| format!("Failed to read header row: {}", path.display()))?;
    let idx = headers
        .iter()
        .position(|h| h.trim() == "name")
        .ok_or_else(|| {
            anyhow!(
                "Input file {} must contain a column named `name`",
                path.display()
            )
        })?;

    let mut names = Vec::new();
    for row in rdr.records() {
        let row = row.with_context(|| format!("Failed to read input row: {}", path.display()))?;
        names.push(row.get(idx).unwrap_or("").to_string());
    }
    Ok(names)
}
