use std::collections::BTreeSet;

use omop_model::Patient;

use crate::config::{DEFAULT_FIELD_CONFIGS, FieldConfigSelection, merge_field_configs};
use crate::error::Result;
use crate::extract::{extract_all, validate_field_paths};
use crate::index::SemanticIndex;
use crate::model::{BatchQueryResult, FieldConfig};

/// Patients sampled when validating field paths.
const VALIDATION_SAMPLE: usize = 10;

/// Semantic index plus the field configs to extract with.
#[derive(Debug, Clone)]
pub struct SemanticPipeline {
    index: SemanticIndex,
    field_configs: Vec<FieldConfig>,
    /// Names of configs whose paths have been checked.
    validated: BTreeSet<String>,
}

impl SemanticPipeline {
    /// Uses the default field configs merged with `overrides`.
    pub fn new(index: SemanticIndex, overrides: &[FieldConfig]) -> Self {
        Self::with_field_configs(index, merge_field_configs(&DEFAULT_FIELD_CONFIGS, overrides))
    }

    pub fn with_field_configs(index: SemanticIndex, field_configs: Vec<FieldConfig>) -> Self {
        Self {
            index,
            field_configs,
            validated: BTreeSet::new(),
        }
    }

    pub fn field_configs(&self) -> &[FieldConfig] {
        &self.field_configs
    }

    pub fn index(&self) -> &SemanticIndex {
        &self.index
    }

    /// Selects configs, extracts queries from every patient and resolves them.
    ///
    /// Each selected config has its field path validated against the first
    /// patients the first time it is used.
    pub fn run(
        &mut self,
        patients: &[Patient],
        selection: &FieldConfigSelection,
    ) -> Result<BatchQueryResult> {
        let configs = selection.apply(&self.field_configs);

        if !patients.is_empty() {
            let pending: Vec<FieldConfig> = configs
                .iter()
                .filter(|config| !self.validated.contains(&config.name))
                .cloned()
                .collect();
            if !pending.is_empty() {
                let sample = &patients[..patients.len().min(VALIDATION_SAMPLE)];
                validate_field_paths(sample, &pending)?;
                self.validated
                    .extend(pending.into_iter().map(|config| config.name));
            }
        }

        let queries = extract_all(patients, &configs);
        tracing::info!(
            patients = patients.len(),
            configs = configs.len(),
            queries = queries.len(),
            "extracted semantic queries"
        );
        Ok(self.index.lookup_exact(queries))
    }
}
