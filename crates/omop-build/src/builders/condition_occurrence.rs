use std::collections::BTreeSet;

use chrono::NaiveDate;
use omop_concepts::ConceptLookupService;
use omop_model::{ConditionOccurrenceRow, MappedConcept, Patient};

use crate::builder::OmopBuilder;
use crate::builders::observation_period::ECRF_VALUE_SET;
use crate::error::Result;
use crate::ids::RowIdGenerator;

const CONDITION_DOMAIN: &str = "condition";

/// A dated free-text term and where it sits on the patient.
struct Term<'a> {
    collection: &'static str,
    leaf_index: usize,
    text: Option<&'a str>,
    start: NaiveDate,
    end: Option<NaiveDate>,
}

/// Conditions from medical history and adverse event terms.
///
/// Each dated term contributes one row per distinct semantic concept in the
/// condition domain resolved for it. Terms without a resolved condition concept are
/// skipped; their misses are reported by the semantic batch.
#[derive(Debug, Clone)]
pub struct ConditionOccurrenceBuilder {
    ids: RowIdGenerator,
}

impl ConditionOccurrenceBuilder {
    pub const TABLE_NAME: &'static str = "condition_occurrence";

    pub fn new() -> Self {
        Self {
            ids: RowIdGenerator::new(Self::TABLE_NAME),
        }
    }

    fn terms(patient: &Patient) -> Vec<Term<'_>> {
        let histories = patient
            .medical_histories
            .iter()
            .enumerate()
            .filter_map(|(idx, mh)| {
                Some(Term {
                    collection: "medical_histories",
                    leaf_index: idx,
                    text: mh.term.as_deref(),
                    start: mh.start_date?,
                    end: mh.end_date,
                })
            });
        let adverse_events = patient
            .adverse_events
            .iter()
            .enumerate()
            .filter_map(|(idx, ae)| {
                Some(Term {
                    collection: "adverse_events",
                    leaf_index: idx,
                    text: ae.term.as_deref(),
                    start: ae.start_date?,
                    end: ae.end_date,
                })
            });
        histories.chain(adverse_events).collect()
    }
}

impl Default for ConditionOccurrenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn is_condition(concept: &MappedConcept) -> bool {
    concept.domain_id.trim().eq_ignore_ascii_case(CONDITION_DOMAIN)
}

impl OmopBuilder for ConditionOccurrenceBuilder {
    type Row = ConditionOccurrenceRow;

    fn table_name(&self) -> &'static str {
        Self::TABLE_NAME
    }

    fn build(
        &self,
        patient: &Patient,
        person_id: i64,
        concepts: &mut ConceptLookupService,
    ) -> Result<Vec<ConditionOccurrenceRow>> {
        let resolved: Vec<(Term<'_>, Vec<MappedConcept>)> = Self::terms(patient)
            .into_iter()
            .map(|term| {
                let mut found = concepts
                    .lookup_semantic(
                        &patient.patient_id,
                        &[term.collection, "term"],
                        Some(term.leaf_index),
                    )
                    .into_iter()
                    .filter(is_condition)
                    .collect::<Vec<_>>();
                // The corpus can list one concept under several source columns.
                let mut seen = BTreeSet::new();
                found.retain(|concept| seen.insert(concept.concept_id));
                (term, found)
            })
            .filter(|(_, found)| !found.is_empty())
            .collect();

        if resolved.is_empty() {
            tracing::debug!(
                patient_id = %patient.patient_id,
                table = Self::TABLE_NAME,
                "no dated terms with condition concepts"
            );
            return Ok(Vec::new());
        }

        let condition_type_concept_id =
            concepts.lookup_structural(ECRF_VALUE_SET).map(|c| c.concept_id);

        let mut rows = Vec::new();
        for (term, found) in resolved {
            let leaf = term.leaf_index.to_string();
            for concept in found {
                let concept_id = concept.concept_id.to_string();
                rows.push(ConditionOccurrenceRow {
                    condition_occurrence_id: self.ids.row_id(&[
                        &patient.patient_id,
                        term.collection,
                        &leaf,
                        &concept_id,
                    ]),
                    person_id,
                    condition_concept_id: concept.concept_id,
                    condition_start_date: term.start,
                    condition_end_date: term.end,
                    condition_type_concept_id,
                    condition_status_concept_id: None,
                    stop_reason: None,
                    visit_occurrence_id: None,
                    condition_source_value: term.text.map(str::to_string),
                    condition_source_concept_id: None,
                });
            }
        }
        Ok(rows)
    }
}
