//! Build and query runs over a patients file.
//!
//! Stages: load patients and vocabularies, resolve semantic queries, build
//! tables, then write CSV outputs. Any stage error aborts the run before
//! output is written.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use omop_build::OmopService;
use omop_concepts::{ConceptLookupService, LookupReport, LookupResult};
use omop_model::Patient;
use omop_semantic::{BatchQueryResult, SemanticIndex, SemanticPipeline};
use omop_vocab::VocabPaths;
use tracing::{debug, info, info_span, warn};

use crate::config::RunConfig;
use crate::export::{
    write_lookup_report, write_semantic_matches, write_semantic_missing, write_tables,
};
use crate::input::load_patients;
use crate::logging::redact_value;
use crate::types::{BuildResult, SemanticSummary, TableSummary};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub patients: PathBuf,
    pub vocab_dir: PathBuf,
    pub output_dir: PathBuf,
    pub config: RunConfig,
    /// Release date used where the config sets none.
    pub run_date: NaiveDate,
    pub write_outputs: bool,
}

/// Resolves semantic queries for `patients` with the configured field configs.
fn resolve_semantic(
    patients: &[Patient],
    vocab: &VocabPaths,
    config: &RunConfig,
) -> Result<BatchQueryResult> {
    let index = SemanticIndex::load(&vocab.semantic_corpus).context("load semantic corpus")?;
    info!(
        terms = index.corpus().term_count(),
        path = %vocab.semantic_corpus.display(),
        "loaded semantic corpus"
    );
    let mut pipeline = SemanticPipeline::new(index, &config.fields.overrides);
    let batch = pipeline
        .run(patients, &config.fields.selection())
        .context("resolve semantic queries")?;
    info!(
        queries = batch.len(),
        matched = batch.match_count(),
        missed = batch.miss_count(),
        "semantic lookup complete"
    );
    Ok(batch)
}

fn semantic_summary(
    batch: &BatchQueryResult,
    options: &RunOptions,
) -> Result<SemanticSummary> {
    let (matches_file, missing_file) = if options.write_outputs {
        (
            Some(write_semantic_matches(batch, &options.output_dir)?),
            Some(write_semantic_missing(batch, &options.output_dir)?),
        )
    } else {
        (None, None)
    };
    Ok(SemanticSummary {
        queries: batch.len(),
        matched: batch.match_count(),
        coverage: batch.coverage_by_field_path().into_values().collect(),
        matches_file,
        missing_file,
    })
}

fn log_missed_lookups(result: &LookupResult) {
    for missed in result.missed_list(None) {
        debug!(
            lookup_type = %missed.lookup_type,
            value_set = %missed.value_set,
            local_value = %redact_value(&missed.local_value),
            "unresolved concept lookup"
        );
    }
    if result.missed_count() > 0 {
        warn!(missed = result.missed_count(), "some concept lookups were not resolved");
    }
}

/// Full build: semantic resolution (unless `semantic` is false), table
/// construction and CSV output.
pub fn run_build(options: &RunOptions, semantic: bool) -> Result<BuildResult> {
    let span = info_span!("build", patients_file = %options.patients.display());
    let _guard = span.enter();
    let start = Instant::now();

    let patients = load_patients(&options.patients)?;
    let vocab = VocabPaths::in_dir(&options.vocab_dir);

    let batch = if semantic {
        Some(resolve_semantic(&patients, &vocab, &options.config)?)
    } else {
        info!("semantic tier disabled");
        None
    };

    let mut concepts = ConceptLookupService::from_paths(
        &vocab.static_concepts,
        &vocab.structural_concepts,
        batch.as_ref(),
    )
    .context("load concept tables")?;

    let settings = options.config.cdm_source.to_settings(options.run_date);
    let service = OmopService::new(settings);
    let tables = service
        .build(&patients, &mut concepts)
        .context("build OMOP tables")?;
    log_missed_lookups(concepts.result());

    let mut outputs = Vec::new();
    if options.write_outputs {
        outputs = write_tables(&tables, &options.output_dir)?;
        write_lookup_report(concepts.result(), &options.output_dir)?;
    }
    let table_summaries = tables
        .iter()
        .map(|(table, rows)| TableSummary {
            table: table.to_string(),
            rows: rows.len(),
            output: outputs
                .iter()
                .find(|path| path.file_stem().is_some_and(|stem| stem == table))
                .cloned(),
        })
        .collect();

    let semantic = batch
        .as_ref()
        .map(|batch| semantic_summary(batch, options))
        .transpose()?;

    info!(
        patients = patients.len(),
        rows = tables.total_rows(),
        duration_ms = start.elapsed().as_millis(),
        "build complete"
    );

    Ok(BuildResult {
        output_dir: options.output_dir.clone(),
        patients: patients.len(),
        tables: table_summaries,
        lookups: LookupReport::from_result(concepts.result()),
        semantic,
        dry_run: !options.write_outputs,
    })
}

/// Semantic resolution only.
pub fn run_queries(options: &RunOptions) -> Result<SemanticSummary> {
    let span = info_span!("queries", patients_file = %options.patients.display());
    let _guard = span.enter();

    let patients = load_patients(&options.patients)?;
    let vocab = VocabPaths::in_dir(&options.vocab_dir);
    let batch = resolve_semantic(&patients, &vocab, &options.config)?;
    for query in batch.missing() {
        debug!(
            patient_id = %query.patient_id,
            field_path = %query.dotted_path(),
            value = %redact_value(&query.raw_value),
            "no semantic match"
        );
    }
    semantic_summary(&batch, options)
}
