//! Standardized vocabulary concepts.
//!
//! Three vocabulary tables feed concept resolution:
//!
//! - **static**: one concept per `(value_set, local_value)`, e.g. `("sex", "M")`
//! - **structural**: one concept per `value_set`, e.g. the eCRF type concept
//! - **semantic corpus**: candidate concepts per normalized free-text term
//!
//! Whatever tier resolves a value, callers receive a [`MappedConcept`].

use serde::{Deserialize, Serialize};

/// A resolved OMOP concept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappedConcept {
    /// OMOP `concept_id`.
    pub concept_id: i64,
    /// Code within the source vocabulary.
    pub concept_code: String,
    pub concept_name: String,
    /// OMOP domain, e.g. `Condition` or `Type Concept`.
    pub domain_id: String,
    pub vocabulary_id: String,
    /// Validity flag carried over from the vocabulary row.
    pub standard_flag: String,
}

/// A row of the static concept table, keyed by `(value_set, local_value)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticConcept {
    /// Group of related local codes, e.g. `sex`.
    pub value_set: String,
    /// Code as it appears in patient data.
    pub local_value: String,
    pub concept_id: i64,
    pub concept_code: String,
    pub concept_name: String,
    pub concept_class: String,
    pub concept_category: String,
    pub valid_flag: String,
    pub domain_id: String,
    pub vocabulary_id: String,
}

/// A row of the structural concept table, keyed by `value_set`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralConcept {
    /// Name of the fixed concept, e.g. `ecrf` or `outpatient_visit`.
    pub value_set: String,
    pub concept_id: i64,
    pub concept_code: String,
    pub concept_name: String,
    pub concept_class: String,
    pub concept_category: String,
    pub valid_flag: String,
    pub domain_id: String,
    pub vocabulary_id: String,
}

/// A candidate concept for one term of the semantic corpus.
///
/// Text columns are stored lowercased and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticRow {
    pub term_id: String,
    /// Source column the term was harvested from, e.g. `aeterm`.
    pub source_col: String,
    /// Normalized term; the lookup key.
    pub source_term: String,
    /// Occurrences of the term in the harvested data.
    pub frequency: i64,
    pub omop_concept_id: i64,
    pub omop_concept_code: String,
    pub omop_name: String,
    pub omop_class: String,
    /// Standard concept flag.
    pub omop_concept: String,
    pub omop_validity: String,
    pub omop_domain: String,
    pub omop_vocab: String,
}

impl From<&StaticConcept> for MappedConcept {
    fn from(concept: &StaticConcept) -> Self {
        Self {
            concept_id: concept.concept_id,
            concept_code: concept.concept_code.clone(),
            concept_name: concept.concept_name.clone(),
            domain_id: concept.domain_id.clone(),
            vocabulary_id: concept.vocabulary_id.clone(),
            standard_flag: concept.valid_flag.clone(),
        }
    }
}

impl From<&StructuralConcept> for MappedConcept {
    fn from(concept: &StructuralConcept) -> Self {
        Self {
            concept_id: concept.concept_id,
            concept_code: concept.concept_code.clone(),
            concept_name: concept.concept_name.clone(),
            domain_id: concept.domain_id.clone(),
            vocabulary_id: concept.vocabulary_id.clone(),
            standard_flag: concept.valid_flag.clone(),
        }
    }
}

impl From<&SemanticRow> for MappedConcept {
    fn from(row: &SemanticRow) -> Self {
        Self {
            concept_id: row.omop_concept_id,
            concept_code: row.omop_concept_code.clone(),
            concept_name: row.omop_name.clone(),
            domain_id: row.omop_domain.clone(),
            vocabulary_id: row.omop_vocab.clone(),
            standard_flag: row.omop_validity.clone(),
        }
    }
}
