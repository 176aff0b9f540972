use std::path::Path;

use omop_model::MappedConcept;
use omop_semantic::{BatchQueryResult, SemanticResultIndex};
use omop_vocab::{StaticConceptIndex, StructuralConceptIndex, VocabError};

use crate::lookup::{LookupResult, LookupType};

/// Concept lookup across the three resolution tiers.
///
/// Callers pick one tier per call; tiers are never chained. Static and
/// structural calls record their outcome in the service's [`LookupResult`].
/// A miss is never an error.
#[derive(Debug, Clone, Default)]
pub struct ConceptLookupService {
    static_index: StaticConceptIndex,
    structural_index: StructuralConceptIndex,
    semantic_index: Option<SemanticResultIndex>,
    result: LookupResult,
}

impl ConceptLookupService {
    pub fn new(
        static_index: StaticConceptIndex,
        structural_index: StructuralConceptIndex,
        semantic_index: Option<SemanticResultIndex>,
    ) -> Self {
        Self {
            static_index,
            structural_index,
            semantic_index,
            result: LookupResult::default(),
        }
    }

    /// Loads the static and structural tables and indexes an optional semantic batch.
    pub fn from_paths(
        static_path: &Path,
        structural_path: &Path,
        semantic_batch: Option<&BatchQueryResult>,
    ) -> Result<Self, VocabError> {
        let static_index = StaticConceptIndex::load(static_path)?;
        let structural_index = StructuralConceptIndex::load(structural_path)?;
        let semantic_index = semantic_batch.map(SemanticResultIndex::from_batch);
        Ok(Self::new(static_index, structural_index, semantic_index))
    }

    pub fn lookup_static(&mut self, value_set: &str, local_value: &str) -> Option<MappedConcept> {
        match self.static_index.get(value_set, local_value) {
            Some(concept) => {
                let mapped = MappedConcept::from(concept);
                self.result
                    .record_match(LookupType::Static, value_set, local_value, mapped.clone());
                Some(mapped)
            }
            None => {
                tracing::trace!(value_set, local_value, "static lookup miss");
                self.result
                    .record_miss(LookupType::Static, value_set, local_value);
                None
            }
        }
    }

    pub fn lookup_structural(&mut self, value_set: &str) -> Option<MappedConcept> {
        match self.structural_index.get(value_set) {
            Some(concept) => {
                let mapped = MappedConcept::from(concept);
                self.result
                    .record_match(LookupType::Structural, value_set, "", mapped.clone());
                Some(mapped)
            }
            None => {
                tracing::trace!(value_set, "structural lookup miss");
                self.result.record_miss(LookupType::Structural, value_set, "");
                None
            }
        }
    }

    /// Concepts resolved for the query made at a patient field location.
    ///
    /// Empty when no semantic index is attached or the location had no match.
    pub fn lookup_semantic(
        &self,
        patient_id: &str,
        field_path: &[&str],
        leaf_index: Option<usize>,
    ) -> Vec<MappedConcept> {
        self.semantic_index
            .as_ref()
            .and_then(|index| index.lookup_at(patient_id, field_path, leaf_index))
            .map(|result| result.results.iter().map(MappedConcept::from).collect())
            .unwrap_or_default()
    }

    pub fn has_semantic_index(&self) -> bool {
        self.semantic_index.is_some()
    }

    pub fn result(&self) -> &LookupResult {
        &self.result
    }

    /// Clears accumulated outcomes for a new run.
    pub fn reset(&mut self) {
        self.result = LookupResult::default();
    }

    pub fn into_result(self) -> LookupResult {
        self.result
    }
}
