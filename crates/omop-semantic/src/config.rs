//! Default field configs and config selection.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::model::{FieldConfig, OmopDomain, QueryTarget};

/// Free-text patient attributes resolved through the semantic corpus.
pub static DEFAULT_FIELD_CONFIGS: LazyLock<Vec<FieldConfig>> = LazyLock::new(|| {
    use OmopDomain::{Condition, Device, Drug, Measurement, Procedure};

    vec![
        FieldConfig::new("adverse_event.term", &["adverse_events", "term"])
            .with_target(QueryTarget::domains([Condition, Measurement]))
            .with_tags(&["adverse_event", "term"]),
        FieldConfig::new(
            "concomitant_medication.medication_name",
            &["concomitant_medications", "medication_name"],
        )
        .with_target(QueryTarget::domains([Drug]))
        .with_tags(&["concomitant_medication", "medication", "drug"]),
        FieldConfig::new("previous_treatments.treatment", &["previous_treatments", "treatment"])
            .with_target(QueryTarget::domains([Procedure]))
            .with_tags(&["previous_treatments", "term"]),
        FieldConfig::new(
            "previous_treatments.additional_treatment",
            &["previous_treatments", "additional_treatment"],
        )
        .with_target(QueryTarget::domains([Procedure]))
        .with_tags(&["previous_treatments", "additional_term"]),
        FieldConfig::new("medical_history.term", &["medical_histories", "term"])
            .with_target(QueryTarget::domains([Condition, Measurement]))
            .with_tags(&["medical_history", "term"]),
        FieldConfig::new("biomarkers.gene_and_mutation", &["biomarkers", "gene_and_mutation"])
            .with_target(QueryTarget::domains([Condition, Measurement]))
            .with_tags(&["biomarker", "gene and mutation"]),
        FieldConfig::new("study_drugs.primary", &["study_drugs", "primary_treatment_drug"])
            .with_target(QueryTarget::domains([Drug, Device]))
            .with_tags(&["study_drug", "primary"]),
        FieldConfig::new("study_drugs.secondary", &["study_drugs", "secondary_treatment_drug"])
            .with_target(QueryTarget::domains([Drug, Device]))
            .with_tags(&["study_drug", "secondary"]),
        FieldConfig::new("tumor.main", &["tumor_type", "main_tumor_type"])
            .with_target(QueryTarget::domains([Condition]))
            .with_tags(&["tumor", "main"]),
        FieldConfig::new("tumor.other", &["tumor_type", "other_tumor_type"])
            .with_target(QueryTarget::domains([Condition]))
            .with_tags(&["tumor", "other"]),
        FieldConfig::new("tumor.cohort", &["tumor_type", "cohort_tumor_type"])
            .with_target(QueryTarget::domains([Condition]))
            .with_tags(&["tumor", "cohort"]),
        FieldConfig::new("tumor.icd10", &["tumor_type", "icd10_code"])
            .with_target(QueryTarget::domains([Condition]))
            .with_tags(&["tumor", "icd10"]),
        FieldConfig::new("tumor.icd10_description", &["tumor_type", "icd10_description"])
            .with_target(QueryTarget::domains([Condition]))
            .with_tags(&["tumor", "icd10_description"]),
    ]
});

/// Filters applied to field configs before extraction.
///
/// Every filter that is set must pass. `required_domains` keeps configs whose
/// target names at least one of the domains; configs without a domain target
/// are dropped by it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfigSelection {
    pub enable_names: Option<BTreeSet<String>>,
    pub required_domains: Option<BTreeSet<OmopDomain>>,
    pub required_tags: Option<BTreeSet<String>>,
}

impl FieldConfigSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn selects(&self, config: &FieldConfig) -> bool {
        let name_ok = self
            .enable_names
            .as_ref()
            .is_none_or(|names| names.contains(&config.name));
        let domain_ok = self.required_domains.as_ref().is_none_or(|required| {
            config
                .target
                .as_ref()
                .and_then(|target| target.domains.as_ref())
                .is_some_and(|domains| domains.iter().any(|d| required.contains(d)))
        });
        let tag_ok = self
            .required_tags
            .as_ref()
            .is_none_or(|required| config.tags.iter().any(|tag| required.contains(tag)));
        name_ok && domain_ok && tag_ok
    }

    pub fn apply(&self, configs: &[FieldConfig]) -> Vec<FieldConfig> {
        configs
            .iter()
            .filter(|config| self.selects(config))
            .cloned()
            .collect()
    }
}

/// Replaces defaults by name and appends configs with new names.
///
/// Replaced configs keep their default position.
pub fn merge_field_configs(defaults: &[FieldConfig], overrides: &[FieldConfig]) -> Vec<FieldConfig> {
    let mut merged = defaults.to_vec();
    for config in overrides {
        match merged.iter_mut().find(|existing| existing.name == config.name) {
            Some(existing) => *existing = config.clone(),
            None => merged.push(config.clone()),
        }
    }
    merged
}
