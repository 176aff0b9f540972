//! End-to-end runs against the bundled vocabulary tables.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use omop_cli::config::RunConfig;
use omop_cli::export::{LOOKUP_COVERAGE_FILE, LOOKUP_MISSED_FILE, SEMANTIC_MATCHES_FILE};
use omop_cli::pipeline::{RunOptions, run_build, run_queries};
use tempfile::TempDir;

const PATIENTS: &str = r#"[
    {
        "patient_id": "P002",
        "trial_id": "IMPRESS",
        "sex": "F",
        "date_of_birth": "1975-11-02",
        "treatment_start_date": "2023-01-10",
        "treatment_end_date": "2023-09-30",
        "medical_histories": [
            {"term": "AML", "start_date": "2019-02-01"}
        ],
        "adverse_events": [
            {"term": "Nausea", "start_date": "2023-02-03"},
            {"term": "Hiccups", "start_date": "2023-02-04"}
        ],
        "tumor_assessments": [
            {"event_id": "V1", "date": "2023-03-01"}
        ]
    },
    {
        "patient_id": "P001",
        "trial_id": "IMPRESS",
        "sex": "M",
        "date_of_birth": "1980-05-15"
    }
]"#;

fn vocab_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../vocab")
}

fn options(dir: &Path, patients: &str, write_outputs: bool) -> RunOptions {
    let patients_path = dir.join("patients.json");
    fs::write(&patients_path, patients).expect("write patients");
    RunOptions {
        patients: patients_path,
        vocab_dir: vocab_dir(),
        output_dir: dir.join("out"),
        config: RunConfig::default(),
        run_date: NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"),
        write_outputs,
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("read csv")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn build_writes_tables_and_reports() {
    let dir = TempDir::new().expect("tempdir");
    let result = run_build(&options(dir.path(), PATIENTS, true), true).expect("build");

    assert_eq!(result.patients, 2);
    let rows = |table: &str| {
        result
            .tables
            .iter()
            .find(|t| t.table == table)
            .map(|t| t.rows)
    };
    assert_eq!(rows("person"), Some(2));
    assert_eq!(rows("observation_period"), Some(1));
    assert_eq!(rows("visit_occurrence"), Some(1));
    assert_eq!(rows("condition_occurrence"), Some(2));
    assert_eq!(rows("cdm_source"), Some(1));

    let out = dir.path().join("out");
    let person = read_lines(&out.join("person.csv"));
    assert_eq!(person.len(), 3);
    assert!(person[0].starts_with("person_id,gender_concept_id,year_of_birth"));
    assert!(person[1].starts_with("1,8507,1980,5,15,"));
    assert!(person[2].starts_with("2,8532,1975,11,2,"));

    let cdm = read_lines(&out.join("cdm_source.csv"));
    assert!(cdm[1].contains("2024-06-01"));
    assert!(cdm[1].contains("756265"));

    let matches = read_lines(&out.join(SEMANTIC_MATCHES_FILE));
    assert_eq!(matches.len(), 3);
    assert!(matches.iter().any(|line| line.contains("140352")));

    let semantic = result.semantic.expect("semantic summary");
    assert_eq!(semantic.queries, 3);
    assert_eq!(semantic.matched, 2);

    assert!(out.join(LOOKUP_MISSED_FILE).exists());
    let coverage = read_lines(&out.join(LOOKUP_COVERAGE_FILE));
    assert!(coverage.iter().any(|line| line.starts_with("static,sex,2,0,2,1")));
    assert!(!result.lookups.has_misses());
}

#[test]
fn dry_run_writes_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let result = run_build(&options(dir.path(), PATIENTS, false), true).expect("build");
    assert!(result.dry_run);
    assert!(result.tables.iter().all(|t| t.output.is_none()));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn without_semantic_tier_conditions_are_empty() {
    let dir = TempDir::new().expect("tempdir");
    let result = run_build(&options(dir.path(), PATIENTS, false), false).expect("build");
    let conditions = result
        .tables
        .iter()
        .find(|t| t.table == "condition_occurrence")
        .expect("table registered");
    assert_eq!(conditions.rows, 0);
    assert!(result.semantic.is_none());
}

#[test]
fn unmapped_sex_aborts_the_build() {
    let dir = TempDir::new().expect("tempdir");
    let patients = r#"[{"patient_id": "P009", "trial_id": "T", "sex": "U", "date_of_birth": "1990-01-01"}]"#;
    let err = run_build(&options(dir.path(), patients, true), true).expect_err("unmapped sex");
    let message = format!("{err:#}");
    assert!(message.contains("P009"), "{message}");
    assert!(!dir.path().join("out").join("person.csv").exists());
}

#[test]
fn queries_report_missing_terms() {
    let dir = TempDir::new().expect("tempdir");
    let summary = run_queries(&options(dir.path(), PATIENTS, true)).expect("queries");
    assert_eq!(summary.queries - summary.matched, 1);
    let missing = summary.missing_file.expect("missing file");
    let lines = read_lines(&missing);
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("hiccups"));
}
