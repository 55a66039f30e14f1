use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;

use crate::history::{Fixture, TeamMatchRecord};

/// Read team-match history rows from a CSV file with a header row matching the
/// `TeamMatchRecord` field names.
pub fn read_history_csv(path: &Path) -> Result<Vec<TeamMatchRecord>> {
    read_csv(path)
}

/// Read fixtures from a CSV file with a header row matching the `Fixture` field names.
pub fn read_fixtures_csv(path: &Path) -> Result<Vec<Fixture>> {
    read_csv(path)
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("open csv {}", path.display()))?;
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    let mut out = Vec::new();
    for (idx, row) in reader.deserialize::<T>().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let row = row.with_context(|| format!("{} line {}", path.display(), idx + 2))?;
        out.push(row);
    }
    Ok(out)
}
