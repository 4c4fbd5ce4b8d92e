use anyhow::{Context, Result};
use std::path::Path;

use super::synthetic::generate_leads;
use super::Lead;

/// Default number of synthetic rows when the dataset file is absent.
pub const SYNTHETIC_ROWS: usize = 60;

/// Load leads from a CSV file with named columns.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a row fails to parse.
/// Missing-file handling lives in [`load_or_generate`]; this function is the
/// strict path for callers that require the file to exist.
pub fn load_leads(path: &Path) -> Result<Vec<Lead>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open dataset at {}", path.display()))?;

    let mut leads = Vec::new();
    for record in reader.deserialize() {
        let lead: Lead = record
            .with_context(|| format!("Malformed row in {}", path.display()))?;
        leads.push(lead);
    }
    Ok(leads)
}

/// Load leads from `path`, falling back to deterministic synthetic data when
/// the file does not exist. A missing dataset is a recoverable condition:
/// every downstream component must operate on the fallback without error.
pub fn load_or_generate(path: &Path, seed: u64, verbose: bool) -> Result<Vec<Lead>> {
    if path.exists() {
        let leads = load_leads(path)?;
        if verbose {
            eprintln!("Loaded {} leads from {}", leads.len(), path.display());
        }
        Ok(leads)
    } else {
        eprintln!(
            "Dataset not found at {}; generating {} synthetic leads",
            path.display(),
            SYNTHETIC_ROWS
        );
        Ok(generate_leads(SYNTHETIC_ROWS, seed))
    }
}
