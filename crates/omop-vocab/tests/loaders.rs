use std::io::Write;
use std::path::PathBuf;

use omop_vocab::{
    SemanticCorpus, StaticConceptIndex, StructuralConceptIndex, VocabError, VocabPaths,
    load_semantic_rows, load_static_concepts,
};

const STATIC_CSV: &str = "\
value_set,local_value,omop_concept_id,omop_concept_code,omop_concept_name,omop_class,omop_concept_category,omop_valid_flag,omop_domain,omop_vocab
sex,M,8507,M,Male,Gender,Standard,Valid,Gender,Gender
sex,F,8532,F,Female,Gender,Standard,Valid,Gender,Gender
";

const STRUCTURAL_CSV: &str = "\
value_set,omop_concept_id,omop_concept_code,omop_concept_name,omop_class,omop_concept_category,omop_valid_flag,omop_domain,omop_vocab
ecrf,32817,OMOP4822053,EHR encounter record,Obs Type,Standard,Valid,Type Concept,Type Concept
";

const SEMANTIC_CSV: &str = "\
term_id,source_col,source_term,frequency,omop_concept_id,omop_concept_code,omop_name,omop_class,omop_concept,omop_validity,omop_domain,omop_vocab
a,x,something,1,10,100,something else,abc,S,Valid,condition,a
b,y, AML ,2,20,200,Acute Myeloid Leukemia,cde,S,Valid,CONDITION,b
c,y,aml,5,21,201,AML variant,cde,S,Valid,Drug,b
";

fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create file");
    file.write_all(content.as_bytes()).expect("write file");
    path
}

#[test]
fn loads_static_index_by_value_set_and_local_value() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_temp(&dir, "static_mapping.csv", STATIC_CSV);

    let index = StaticConceptIndex::load(&path).expect("load static");
    assert_eq!(index.len(), 2);
    let male = index.get("sex", "M").expect("male concept");
    assert_eq!(male.concept_id, 8507);
    assert_eq!(male.valid_flag, "Valid");
    assert!(index.get("sex", "X").is_none());
    assert!(index.get("gender", "M").is_none());
}

#[test]
fn loads_structural_index_by_value_set() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_temp(&dir, "structural_mapping.csv", STRUCTURAL_CSV);

    let index = StructuralConceptIndex::load(&path).expect("load structural");
    assert_eq!(index.get("ecrf").map(|c| c.concept_id), Some(32817));
    assert!(index.get("cdm").is_none());
}

#[test]
fn semantic_rows_are_normalized_and_grouped_by_term() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_temp(&dir, "semantic.csv", SEMANTIC_CSV);

    let rows = load_semantic_rows(&path).expect("load rows");
    assert_eq!(rows[1].source_term, "aml");
    assert_eq!(rows[1].omop_domain, "condition");
    assert_eq!(rows[1].omop_name, "acute myeloid leukemia");

    let corpus = SemanticCorpus::from_rows(rows);
    assert_eq!(corpus.term_count(), 2);
    let candidates = corpus.candidates("aml").expect("aml candidates");
    let ids: Vec<i64> = candidates.iter().map(|r| r.omop_concept_id).collect();
    assert_eq!(ids, vec![20, 21]);
    assert!(corpus.candidates("AML").is_none());
}

#[test]
fn missing_column_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_temp(
        &dir,
        "static_mapping.csv",
        "value_set,local_value\nsex,M\n",
    );

    let err = load_static_concepts(&path).expect_err("missing columns");
    match err {
        VocabError::MissingColumn { column, .. } => assert_eq!(column, "omop_concept_id"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn non_numeric_concept_id_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let content = STATIC_CSV.replace("8532", "eight");
    let path = write_temp(&dir, "static_mapping.csv", &content);

    let err = load_static_concepts(&path).expect_err("invalid number");
    assert!(matches!(
        err,
        VocabError::InvalidNumber { ref value, line: 3, .. } if value == "eight"
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = StaticConceptIndex::load(&dir.path().join("absent.csv")).expect_err("io error");
    assert!(matches!(err, VocabError::Io { .. }));
}

#[test]
fn loads_bundled_vocabulary() {
    let paths = VocabPaths::in_dir(&PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../vocab"));
    let statics = StaticConceptIndex::load(&paths.static_concepts).expect("static");
    let structural = StructuralConceptIndex::load(&paths.structural_concepts).expect("structural");
    let corpus = SemanticCorpus::load(&paths.semantic_corpus).expect("semantic");

    assert_eq!(statics.get("sex", "F").map(|c| c.concept_id), Some(8532));
    for value_set in ["ecrf", "outpatient_visit", "cdm", "vocab"] {
        assert!(structural.get(value_set).is_some(), "{value_set} missing");
    }
    assert!(corpus.candidates("aml").is_some());
}
