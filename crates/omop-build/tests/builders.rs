//! Builder and service tests against in-memory vocabularies.

use chrono::NaiveDate;
use omop_build::{
    BuildError, CdmSourceBuilder, CdmSourceSettings, ConditionOccurrenceBuilder,
    ObservationPeriodBuilder, OmopBuilder, OmopService, PersonBuilder, TableBuilder,
    VisitOccurrenceBuilder, hash_to_int63,
};
use omop_concepts::{ConceptLookupService, LookupType};
use omop_model::{
    AdverseEvent, MedicalHistory, OmopRow, Patient, SemanticRow, StaticConcept,
    StructuralConcept, TableRow, TumorAssessment, TumorAssessmentBaseline,
};
use omop_semantic::{DEFAULT_FIELD_CONFIGS, SemanticIndex, SemanticResultIndex, extract_all};
use omop_vocab::{SemanticCorpus, StaticConceptIndex, StructuralConceptIndex};
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn sex(local_value: &str, concept_id: i64) -> StaticConcept {
    StaticConcept {
        value_set: "sex".to_string(),
        local_value: local_value.to_string(),
        concept_id,
        concept_code: local_value.to_string(),
        concept_name: local_value.to_string(),
        concept_class: "Gender".to_string(),
        concept_category: "Standard".to_string(),
        valid_flag: "Valid".to_string(),
        domain_id: "Gender".to_string(),
        vocabulary_id: "Gender".to_string(),
    }
}

fn structural(value_set: &str, concept_id: i64) -> StructuralConcept {
    StructuralConcept {
        value_set: value_set.to_string(),
        concept_id,
        concept_code: concept_id.to_string(),
        concept_name: value_set.to_string(),
        concept_class: "Type Concept".to_string(),
        concept_category: "Standard".to_string(),
        valid_flag: "Valid".to_string(),
        domain_id: "Type Concept".to_string(),
        vocabulary_id: "Type Concept".to_string(),
    }
}

fn corpus_row(term: &str, concept_id: i64, domain: &str) -> SemanticRow {
    SemanticRow {
        term_id: concept_id.to_string(),
        source_col: "term".to_string(),
        source_term: term.to_string(),
        frequency: 1,
        omop_concept_id: concept_id,
        omop_concept_code: concept_id.to_string(),
        omop_name: term.to_string(),
        omop_class: "clinical finding".to_string(),
        omop_concept: "s".to_string(),
        omop_validity: "valid".to_string(),
        omop_domain: domain.to_string(),
        omop_vocab: "snomed".to_string(),
    }
}

fn concepts() -> ConceptLookupService {
    ConceptLookupService::new(
        StaticConceptIndex::from_rows([sex("M", 8507), sex("F", 8532)]),
        StructuralConceptIndex::from_rows([
            structural("ecrf", 32817),
            structural("outpatient_visit", 9202),
            structural("cdm", 756265),
            structural("vocab", 20240830),
        ]),
        None,
    )
}

fn concepts_with_semantic(patients: &[Patient]) -> ConceptLookupService {
    let index = SemanticIndex::new(SemanticCorpus::from_rows([
        corpus_row("aml", 140352, "condition"),
        corpus_row("nausea", 31967, "condition"),
        corpus_row("nausea", 4000001, "measurement"),
    ]));
    let batch = index.lookup_exact(extract_all(patients, &DEFAULT_FIELD_CONFIGS));
    ConceptLookupService::new(
        StaticConceptIndex::from_rows([sex("M", 8507), sex("F", 8532)]),
        StructuralConceptIndex::from_rows([structural("ecrf", 32817)]),
        Some(SemanticResultIndex::from_batch(&batch)),
    )
}

fn settings() -> CdmSourceSettings {
    CdmSourceSettings::new("IMPRESS trial", "IMPRESS", "Trial sponsor", date(2024, 6, 1))
}

fn patient(id: &str) -> Patient {
    let mut patient = Patient::new(id, "IMPRESS");
    patient.sex = Some("M".to_string());
    patient.date_of_birth = Some(date(1980, 5, 15));
    patient
}

#[test]
fn person_row_for_mapped_sex() {
    let mut concepts = concepts();
    let rows = PersonBuilder
        .build(&patient("P001"), 1, &mut concepts)
        .expect("person row");

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.person_id, 1);
    assert_eq!(row.gender_concept_id, 8507);
    assert_eq!(row.year_of_birth, 1980);
    assert_eq!(row.month_of_birth, Some(5));
    assert_eq!(row.day_of_birth, Some(15));
    assert_eq!(row.person_source_value, "P001");
    assert_eq!(row.gender_source_value.as_deref(), Some("M"));
    assert_eq!(concepts.result().matched(LookupType::Static).len(), 1);
}

#[test]
fn person_without_date_of_birth_yields_no_rows() {
    let mut patient = patient("P002");
    patient.date_of_birth = None;
    let mut concepts = concepts();

    let rows = PersonBuilder.build(&patient, 1, &mut concepts).expect("no error");
    assert!(rows.is_empty());
    assert_eq!(concepts.result().matched_count(), 0);
}

#[test]
fn unmapped_sex_names_patient_and_value() {
    let mut patient = patient("P003");
    patient.sex = Some("UNKNOWN".to_string());
    let mut concepts = concepts();

    let err = PersonBuilder
        .build(&patient, 1, &mut concepts)
        .expect_err("unmapped sex");
    assert_eq!(
        err,
        BuildError::UnmappedValue {
            table: "person",
            patient_id: "P003".to_string(),
            value_set: "sex".to_string(),
            value: "UNKNOWN".to_string(),
        }
    );
    let message = err.to_string();
    assert!(message.contains("P003"));
    assert!(message.contains("\"UNKNOWN\""));
    assert_eq!(concepts.result().missed(LookupType::Static).len(), 1);
}

#[test]
fn absent_sex_maps_to_zero() {
    let mut patient = patient("P004");
    patient.sex = None;
    let rows = PersonBuilder
        .build(&patient, 1, &mut concepts())
        .expect("person row");
    assert_eq!(rows[0].gender_concept_id, 0);
    assert_eq!(rows[0].gender_source_value, None);
}

#[test]
fn blank_sex_is_unmapped_not_defaulted() {
    let mut patient = patient("P005");
    patient.sex = Some("  ".to_string());
    let mut concepts = concepts();

    let err = PersonBuilder
        .build(&patient, 1, &mut concepts)
        .expect_err("blank sex");
    assert!(matches!(
        err,
        BuildError::UnmappedValue { ref patient_id, ref value, .. }
            if patient_id == "P005" && value == "  "
    ));
    assert_eq!(concepts.result().missed(LookupType::Static).len(), 1);
}

#[test]
fn gender_source_value_keeps_raw_string() {
    let mut patient = patient("P006");
    patient.sex = Some(" F ".to_string());
    let rows = PersonBuilder
        .build(&patient, 1, &mut concepts())
        .expect("person row");
    assert_eq!(rows[0].gender_concept_id, 8532);
    assert_eq!(rows[0].gender_source_value.as_deref(), Some(" F "));
}

#[test]
fn observation_period_needs_both_dates() {
    let builder = ObservationPeriodBuilder::new();
    let mut concepts = concepts();

    let mut patient = patient("P001");
    patient.treatment_start_date = Some(date(2023, 1, 10));
    assert!(builder.build(&patient, 1, &mut concepts).expect("ok").is_empty());

    patient.treatment_end_date = Some(date(2023, 9, 30));
    let rows = builder.build(&patient, 1, &mut concepts).expect("ok");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].period_type_concept_id, Some(32817));
    assert_eq!(
        rows[0].observation_period_id,
        hash_to_int63("observation_period", "P001")
    );
}

#[test]
fn missing_type_concept_fails_validation() {
    let mut patient = patient("P001");
    patient.treatment_start_date = Some(date(2023, 1, 10));
    patient.treatment_end_date = Some(date(2023, 9, 30));
    let mut concepts = ConceptLookupService::new(
        StaticConceptIndex::default(),
        StructuralConceptIndex::default(),
        None,
    );

    let err = ObservationPeriodBuilder::new()
        .build_rows(&patient, 1, &mut concepts)
        .expect_err("no ecrf concept");
    assert!(matches!(
        err,
        BuildError::RequiredFieldViolation {
            table: "observation_period",
            column: "period_type_concept_id",
            ..
        }
    ));
    assert_eq!(concepts.result().missed(LookupType::Structural).len(), 1);
}

#[test]
fn visits_from_baseline_and_distinct_events() {
    let mut patient = patient("P001");
    patient.tumor_assessment_baseline = Some(TumorAssessmentBaseline {
        assessment_type: Some("RECIST".to_string()),
        target_lesion_measurement_date: Some(date(2023, 1, 5)),
        ..TumorAssessmentBaseline::default()
    });
    let assessment = |event: Option<&str>, day: Option<u32>| TumorAssessment {
        event_id: event.map(str::to_string),
        date: day.map(|d| date(2023, 3, d)),
        ..TumorAssessment::default()
    };
    patient.tumor_assessments = vec![
        assessment(Some("V1"), Some(1)),
        assessment(Some("V1"), Some(2)),
        assessment(Some("V2"), None),
        assessment(None, Some(4)),
        assessment(Some("V3"), Some(9)),
    ];

    let rows = VisitOccurrenceBuilder::new()
        .build(&patient, 1, &mut concepts())
        .expect("visits");
    let starts: Vec<NaiveDate> = rows.iter().map(|r| r.visit_start_date).collect();
    assert_eq!(starts, vec![date(2023, 1, 5), date(2023, 3, 1), date(2023, 3, 9)]);
    assert!(rows.iter().all(|r| r.visit_concept_id == Some(9202)));
    assert_eq!(
        rows[1].visit_occurrence_id,
        hash_to_int63("visit_occurrence", "P001:V1")
    );
    assert_eq!(rows[0].visit_source_value.as_deref(), Some("RECIST"));
}

#[test]
fn visits_skip_structural_lookups_without_assessments() {
    let mut concepts = concepts();
    let rows = VisitOccurrenceBuilder::new()
        .build(&patient("P001"), 1, &mut concepts)
        .expect("ok");
    assert!(rows.is_empty());
    assert_eq!(concepts.result().matched_count(), 0);
}

#[test]
fn conditions_from_dated_terms_in_condition_domain() {
    let mut patient = patient("P001");
    patient.medical_histories = vec![
        MedicalHistory {
            term: Some("AML".to_string()),
            start_date: Some(date(2019, 2, 1)),
            ..MedicalHistory::default()
        },
        MedicalHistory {
            term: Some("AML".to_string()),
            ..MedicalHistory::default()
        },
    ];
    patient.adverse_events = vec![
        AdverseEvent {
            term: Some("Unknown term".to_string()),
            start_date: Some(date(2023, 2, 1)),
            ..AdverseEvent::default()
        },
        AdverseEvent {
            term: Some("Nausea".to_string()),
            start_date: Some(date(2023, 2, 3)),
            end_date: Some(date(2023, 2, 6)),
            ..AdverseEvent::default()
        },
    ];
    let patients = vec![patient];
    let mut concepts = concepts_with_semantic(&patients);

    let rows = ConditionOccurrenceBuilder::new()
        .build(&patients[0], 1, &mut concepts)
        .expect("conditions");

    let ids: Vec<i64> = rows.iter().map(|r| r.condition_concept_id).collect();
    assert_eq!(ids, vec![140352, 31967]);
    assert_eq!(rows[1].condition_end_date, Some(date(2023, 2, 6)));
    assert_eq!(rows[1].condition_source_value.as_deref(), Some("Nausea"));
    assert_eq!(rows[0].condition_type_concept_id, Some(32817));
    assert_eq!(
        rows[0].condition_occurrence_id,
        hash_to_int63("condition_occurrence", "P001:medical_histories:0:140352")
    );
    assert!(concepts.result().matched(LookupType::Semantic).is_empty());
}

#[test]
fn conditions_collapse_concepts_repeated_across_source_columns() {
    let mut patient = patient("P001");
    patient.adverse_events = vec![AdverseEvent {
        term: Some("Nausea".to_string()),
        start_date: Some(date(2023, 2, 3)),
        ..AdverseEvent::default()
    }];
    let patients = vec![patient];
    let mut from_history = corpus_row("nausea", 31967, "condition");
    from_history.source_col = "mhterm".to_string();
    let mut from_events = corpus_row("nausea", 31967, "condition");
    from_events.source_col = "aeterm".to_string();
    let index = SemanticIndex::new(SemanticCorpus::from_rows([from_history, from_events]));
    let batch = index.lookup_exact(extract_all(&patients, &DEFAULT_FIELD_CONFIGS));
    let mut concepts = ConceptLookupService::new(
        StaticConceptIndex::default(),
        StructuralConceptIndex::from_rows([structural("ecrf", 32817)]),
        Some(SemanticResultIndex::from_batch(&batch)),
    );

    let rows = ConditionOccurrenceBuilder::new()
        .build(&patients[0], 1, &mut concepts)
        .expect("conditions");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].condition_concept_id, 31967);
    assert_eq!(
        rows[0].condition_occurrence_id,
        hash_to_int63("condition_occurrence", "P001:adverse_events:0:31967")
    );
}

#[test]
fn cdm_source_uses_structural_concepts() {
    let mut concepts = concepts();
    let row = CdmSourceBuilder::new(settings())
        .build(&mut concepts)
        .expect("cdm source");
    assert_eq!(row.cdm_source_abbreviation, "IMPRESS");
    assert_eq!(row.cdm_version_concept_id, Some(756265));
    assert_eq!(row.vocabulary_version.as_deref(), Some("20240830"));
    assert_eq!(row.cdm_version.as_deref(), Some("v5.4"));
}

#[test]
fn cdm_source_without_vocab_concept_is_rejected() {
    let mut concepts = ConceptLookupService::new(
        StaticConceptIndex::default(),
        StructuralConceptIndex::from_rows([structural("cdm", 756265)]),
        None,
    );
    let err = CdmSourceBuilder::new(settings())
        .build(&mut concepts)
        .expect_err("no vocab concept");
    assert!(matches!(
        err,
        BuildError::RequiredFieldViolation {
            table: "cdm_source",
            column: "vocabulary_version",
            row_id: None,
        }
    ));
}

fn person_ids(tables: &omop_model::OmopTables) -> Vec<(String, i64)> {
    tables
        .rows("person")
        .iter()
        .filter_map(|row| match row {
            OmopRow::Person(person) => Some((person.person_source_value.clone(), person.person_id)),
            _ => None,
        })
        .collect()
}

#[test]
fn service_builds_every_table_deterministically() {
    let mut p2 = patient("P002");
    p2.treatment_start_date = Some(date(2023, 1, 10));
    p2.treatment_end_date = Some(date(2023, 9, 30));
    let patients = vec![p2, patient("P001"), patient("P003")];
    let service = OmopService::new(settings());

    let first = service.build(&patients, &mut concepts()).expect("build");
    let second = service.build(&patients, &mut concepts()).expect("build");
    assert_eq!(first, second);

    let names: Vec<&str> = first.table_names().collect();
    for table in service.table_names() {
        assert!(names.contains(&table), "missing table {table}");
    }
    assert!(first.rows("visit_occurrence").is_empty());
    assert_eq!(first.len("observation_period"), 1);
    assert_eq!(first.len("cdm_source"), 1);
    assert_eq!(
        person_ids(&first),
        vec![
            ("P001".to_string(), 1),
            ("P002".to_string(), 2),
            ("P003".to_string(), 3)
        ]
    );
    let period = &first.rows("observation_period")[0];
    assert_eq!(period.row_id(), Some(hash_to_int63("observation_period", "P002")));
}

#[test]
fn service_stops_on_first_unmapped_value() {
    let mut bad = patient("P002");
    bad.sex = Some("Q".to_string());
    let patients = vec![patient("P001"), bad];
    let err = OmopService::new(settings())
        .build(&patients, &mut concepts())
        .expect_err("unmapped");
    assert!(matches!(err, BuildError::UnmappedValue { ref patient_id, .. } if patient_id == "P002"));
}

#[test]
fn service_rejects_duplicate_patient_ids() {
    let patients = vec![patient("P001"), patient("P001")];
    let err = OmopService::new(settings())
        .build(&patients, &mut concepts())
        .expect_err("duplicate");
    assert_eq!(
        err,
        BuildError::DuplicatePatientId {
            patient_id: "P001".to_string()
        }
    );
}

proptest! {
    #[test]
    fn row_ids_are_non_negative_and_stable(namespace in "[a-z_]{1,20}", key in ".{0,40}") {
        let id = hash_to_int63(&namespace, &key);
        prop_assert!(id >= 0);
        prop_assert_eq!(id, hash_to_int63(&namespace, &key));
    }

    #[test]
    fn person_ids_are_dense_from_one(ids in proptest::collection::btree_set("[A-Z][0-9]{3}", 1..20)) {
        let assigned = omop_build::PersonIds::from_ids(ids.iter().map(String::as_str))
            .expect("unique ids");
        let values: Vec<i64> = ids.iter().filter_map(|id| assigned.get(id)).collect();
        let expected: Vec<i64> = (1..).take(ids.len()).collect();
        prop_assert_eq!(values, expected);
    }
}

#[test]
fn no_collisions_over_representative_keys() {
    let mut seen = std::collections::HashSet::new();
    for table in ["person", "observation_period", "visit_occurrence"] {
        for n in 0..2000 {
            assert!(seen.insert(hash_to_int63(table, &format!("P{n:04}"))));
        }
    }
}
