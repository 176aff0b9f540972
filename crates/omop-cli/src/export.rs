//! CSV writers for built tables and lookup reports.
//!
//! Table files are named after the table and use the table schema's column
//! order. Null cells are written as empty fields.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use omop_concepts::LookupResult;
use omop_model::{OmopTables, TableRow, schema_for};
use omop_semantic::BatchQueryResult;

pub const SEMANTIC_MATCHES_FILE: &str = "semantic_matches.csv";
pub const SEMANTIC_MISSING_FILE: &str = "semantic_missing.csv";
pub const LOOKUP_MISSED_FILE: &str = "concept_lookup_missed.csv";
pub const LOOKUP_COVERAGE_FILE: &str = "concept_lookup_coverage.csv";

fn create_writer(path: &Path) -> Result<csv::Writer<fs::File>> {
    csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create output dir {}", dir.display()))
}

/// Writes one `{table}.csv` per table, including tables without rows.
pub fn write_tables(tables: &OmopTables, dir: &Path) -> Result<Vec<PathBuf>> {
    ensure_dir(dir)?;
    let mut written = Vec::new();
    for (table, rows) in tables.iter() {
        let schema = schema_for(table).ok_or_else(|| anyhow!("no schema for table {table}"))?;
        let path = dir.join(format!("{table}.csv"));
        let mut writer = create_writer(&path)?;
        writer.write_record(schema.column_names())?;
        for row in rows {
            let cells = row.cells();
            let record = schema.column_names().map(|column| {
                cells
                    .iter()
                    .find(|(name, _)| *name == column)
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_default()
            });
            writer.write_record(record)?;
        }
        writer
            .flush()
            .with_context(|| format!("write {}", path.display()))?;
        tracing::debug!(table, rows = rows.len(), path = %path.display(), "wrote table");
        written.push(path);
    }
    Ok(written)
}

/// One row per accepted candidate of every matched query.
pub fn write_semantic_matches(batch: &BatchQueryResult, dir: &Path) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(SEMANTIC_MATCHES_FILE);
    let mut writer = create_writer(&path)?;
    writer.write_record([
        "patient_id",
        "query_id",
        "field_path",
        "leaf_index",
        "raw_value",
        "query",
        "omop_concept_id",
        "omop_concept_code",
        "omop_name",
        "omop_domain",
        "omop_vocab",
        "omop_class",
    ])?;
    for result in batch.matches() {
        let query = &result.query;
        for row in &result.results {
            writer.write_record([
                query.patient_id.clone(),
                query.id.clone(),
                query.dotted_path(),
                leaf_text(query.leaf_index),
                query.raw_value.clone(),
                query.query.clone(),
                row.omop_concept_id.to_string(),
                row.omop_concept_code.clone(),
                row.omop_name.clone(),
                row.omop_domain.clone(),
                row.omop_vocab.clone(),
                row.omop_class.clone(),
            ])?;
        }
    }
    writer
        .flush()
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

pub fn write_semantic_missing(batch: &BatchQueryResult, dir: &Path) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(SEMANTIC_MISSING_FILE);
    let mut writer = create_writer(&path)?;
    writer.write_record([
        "patient_id",
        "query_id",
        "field_path",
        "leaf_index",
        "raw_value",
        "query",
    ])?;
    for query in batch.missing() {
        writer.write_record([
            query.patient_id.clone(),
            query.id.clone(),
            query.dotted_path(),
            leaf_text(query.leaf_index),
            query.raw_value.clone(),
            query.query.clone(),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Static and structural misses plus per-value-set coverage, as two files.
pub fn write_lookup_report(result: &LookupResult, dir: &Path) -> Result<[PathBuf; 2]> {
    ensure_dir(dir)?;

    let missed_path = dir.join(LOOKUP_MISSED_FILE);
    let mut writer = create_writer(&missed_path)?;
    writer.write_record(["lookup_type", "value_set", "local_value"])?;
    for missed in result.missed_list(None) {
        writer.write_record([
            missed.lookup_type.as_str(),
            missed.value_set.as_str(),
            missed.local_value.as_str(),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("write {}", missed_path.display()))?;

    let coverage_path = dir.join(LOOKUP_COVERAGE_FILE);
    let mut writer = create_writer(&coverage_path)?;
    writer.write_record([
        "lookup_type",
        "value_set",
        "matched",
        "missed",
        "total",
        "coverage_fraction",
    ])?;
    for coverage in result.all_coverage() {
        writer.write_record([
            coverage.lookup_type.as_str().to_string(),
            coverage.value_set.clone(),
            coverage.matched.to_string(),
            coverage.missed.to_string(),
            coverage.total.to_string(),
            coverage.coverage_fraction.to_string(),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("write {}", coverage_path.display()))?;

    Ok([missed_path, coverage_path])
}

fn leaf_text(leaf_index: Option<usize>) -> String {
    leaf_index.map(|idx| idx.to_string()).unwrap_or_default()
}
