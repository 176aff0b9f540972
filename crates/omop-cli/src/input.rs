use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use omop_model::Patient;

/// Reads a JSON array of harmonized patients.
pub fn load_patients(path: &Path) -> Result<Vec<Patient>> {
    let file = File::open(path).with_context(|| format!("open patients {}", path.display()))?;
    let patients: Vec<Patient> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parse patients {}", path.display()))?;
    tracing::info!(path = %path.display(), patients = patients.len(), "loaded patients");
    Ok(patients)
}
