//! Tests for omop-model types.

use chrono::NaiveDate;
use omop_model::{
    CdmSourceRow, CellValue, Field, MedicalHistory, OmopRow, OmopTables, Patient, PersonRow,
    Record, TableRow, C30,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn patient_deserializes_from_json() {
    let json = r#"{
        "patient_id": "P001",
        "trial_id": "IMPRESS",
        "sex": "M",
        "date_of_birth": "1980-05-15",
        "medical_histories": [
            {"term": "AML", "start_date": "2019-02-01"}
        ],
        "tumor_type": {"main_tumor_type": "Colorectal cancer"}
    }"#;
    let patient: Patient = serde_json::from_str(json).expect("deserialize patient");
    assert_eq!(patient.patient_id, "P001");
    assert_eq!(patient.date_of_birth, Some(date(1980, 5, 15)));
    assert_eq!(patient.medical_histories.len(), 1);
    assert!(patient.adverse_events.is_empty());
    assert!(patient.c30.is_empty());
}

#[test]
fn record_access_distinguishes_missing_and_null() {
    let mut patient = Patient::new("P001", "T1");
    patient.medical_histories.push(MedicalHistory {
        term: Some("AML".to_string()),
        ..MedicalHistory::default()
    });

    assert!(patient.field("no_such_attribute").is_none());
    assert!(matches!(patient.field("sex"), Some(Field::Null)));
    assert!(matches!(patient.field("tumor_type"), Some(Field::Null)));

    let Some(Field::Collection(items)) = patient.field("medical_histories") else {
        panic!("expected collection");
    };
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].record_name(), "MedicalHistory");
    assert_eq!(
        items[0].field("term").and_then(|f| f.as_text()),
        Some("AML")
    );
}

#[test]
fn c30_answers_round_trip_through_serde() {
    let mut c30 = C30::new(Some(date(2023, 3, 1)), Some("Screening".to_string()));
    c30.set_code(30, Some(6)).expect("valid code");
    c30.set_answer(30, Some("6")).expect("valid answer");

    let json = serde_json::to_string(&c30).expect("serialize c30");
    let back: C30 = serde_json::from_str(&json).expect("deserialize c30");
    assert_eq!(back.code(30).expect("in range"), Some(6));
    assert_eq!(back.answer(30).expect("in range"), Some("6"));
}

#[test]
fn c30_deserialization_rejects_out_of_range_codes() {
    let mut codes = vec![serde_json::Value::Null; 30];
    codes[0] = serde_json::json!(99);
    let json = serde_json::json!({ "date": "2023-03-01", "codes": codes });

    let err = serde_json::from_value::<C30>(json).expect_err("code 99 for question 1");
    assert!(err.to_string().contains("invalid C30 answer code 99 for question 1"));
}

#[test]
fn c30_deserialization_trims_blank_answers() {
    let mut answers = vec![serde_json::Value::Null; 30];
    answers[2] = serde_json::json!("  ");
    answers[3] = serde_json::json!(" Not at all ");
    let json = serde_json::json!({ "answers": answers });

    let c30: C30 = serde_json::from_value(json).expect("valid c30");
    assert_eq!(c30.answer(3).expect("in range"), None);
    assert_eq!(c30.answer(4).expect("in range"), Some("Not at all"));
    assert_eq!(c30.answered_count(), 0);
}

#[test]
fn person_row_cells_follow_schema_order() {
    let row = PersonRow {
        person_id: 1,
        gender_concept_id: 8507,
        year_of_birth: 1980,
        month_of_birth: Some(5),
        day_of_birth: Some(15),
        birth_datetime: None,
        race_concept_id: 0,
        ethnicity_concept_id: 0,
        person_source_value: "P001".to_string(),
        gender_source_value: Some("M".to_string()),
        gender_source_concept_id: 0,
        race_source_value: None,
        race_source_concept_id: 0,
        ethnicity_source_value: None,
        ethnicity_source_concept_id: 0,
    };
    let names: Vec<&str> = row.cells().iter().map(|(name, _)| *name).collect();
    let schema_names: Vec<&str> = PersonRow::SCHEMA.column_names().collect();
    assert_eq!(names, schema_names);
    assert_eq!(row.row_id(), Some(1));
    assert_eq!(row.cells()[5].1, CellValue::Null);
}

#[test]
fn cdm_source_has_no_row_id_and_renders_dates() {
    let row = CdmSourceRow {
        cdm_source_name: "Trial".to_string(),
        cdm_source_abbreviation: "TR".to_string(),
        cdm_holder: "Holder".to_string(),
        source_description: None,
        source_documentation_reference: None,
        cdm_etl_reference: None,
        source_release_date: date(2024, 1, 2),
        cdm_release_date: date(2024, 1, 3),
        cdm_version: Some("v5.4".to_string()),
        cdm_version_concept_id: Some(756265),
        vocabulary_version: Some("123".to_string()),
    };
    assert_eq!(row.row_id(), None);
    let cells = row.cells();
    let release = cells
        .iter()
        .find(|(name, _)| *name == "source_release_date")
        .map(|(_, value)| value.to_string());
    assert_eq!(release.as_deref(), Some("2024-01-02"));

    let mut tables = OmopTables::new();
    tables.add(OmopRow::from(row));
    assert_eq!(tables.len("cdm_source"), 1);
    assert_eq!(tables.table_names().collect::<Vec<_>>(), vec!["cdm_source"]);
}

#[test]
fn extend_registers_empty_tables() {
    let mut tables = OmopTables::new();
    tables.extend("visit_occurrence", Vec::new());
    assert_eq!(tables.table_names().count(), 1);
    assert!(tables.rows("visit_occurrence").is_empty());
    assert!(tables.is_empty());
}
