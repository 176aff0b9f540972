use std::collections::BTreeSet;

use chrono::NaiveDate;
use omop_concepts::ConceptLookupService;
use omop_model::{Patient, VisitOccurrenceRow};

use crate::builder::OmopBuilder;
use crate::builders::observation_period::ECRF_VALUE_SET;
use crate::error::Result;
use crate::ids::RowIdGenerator;

const OUTPATIENT_VALUE_SET: &str = "outpatient_visit";

/// A visit source before concepts are attached.
struct Visit<'a> {
    key: Vec<&'a str>,
    date: NaiveDate,
    source_value: Option<&'a str>,
}

/// Outpatient visits for the baseline and each tumor assessment event.
///
/// The baseline visit is dated by the first of its assessment, target lesion
/// and off-target lesion dates. Follow-up assessments produce one visit per
/// distinct `event_id`; the first dated assessment of an event wins.
#[derive(Debug, Clone)]
pub struct VisitOccurrenceBuilder {
    ids: RowIdGenerator,
}

impl VisitOccurrenceBuilder {
    pub const TABLE_NAME: &'static str = "visit_occurrence";

    pub fn new() -> Self {
        Self {
            ids: RowIdGenerator::new(Self::TABLE_NAME),
        }
    }

    fn visits<'a>(patient: &'a Patient) -> Vec<Visit<'a>> {
        let mut visits = Vec::new();

        if let Some(baseline) = &patient.tumor_assessment_baseline
            && let Some(date) = baseline.start_date()
        {
            visits.push(Visit {
                key: vec![patient.patient_id.as_str()],
                date,
                source_value: baseline.assessment_type.as_deref(),
            });
        }

        let mut seen_events = BTreeSet::new();
        for assessment in &patient.tumor_assessments {
            let (Some(date), Some(event_id)) = (assessment.date, assessment.event_id.as_deref())
            else {
                continue;
            };
            if !seen_events.insert(event_id) {
                continue;
            }
            visits.push(Visit {
                key: vec![patient.patient_id.as_str(), event_id],
                date,
                source_value: assessment.assessment_type.as_deref(),
            });
        }

        visits
    }
}

impl Default for VisitOccurrenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OmopBuilder for VisitOccurrenceBuilder {
    type Row = VisitOccurrenceRow;

    fn table_name(&self) -> &'static str {
        Self::TABLE_NAME
    }

    fn build(
        &self,
        patient: &Patient,
        person_id: i64,
        concepts: &mut ConceptLookupService,
    ) -> Result<Vec<VisitOccurrenceRow>> {
        let visits = Self::visits(patient);
        if visits.is_empty() {
            tracing::debug!(
                patient_id = %patient.patient_id,
                table = Self::TABLE_NAME,
                "skipping patient without dated tumor assessments"
            );
            return Ok(Vec::new());
        }

        let visit_concept_id = concepts
            .lookup_structural(OUTPATIENT_VALUE_SET)
            .map(|c| c.concept_id);
        let visit_type_concept_id = concepts.lookup_structural(ECRF_VALUE_SET).map(|c| c.concept_id);

        Ok(visits
            .into_iter()
            .map(|visit| VisitOccurrenceRow {
                visit_occurrence_id: self.ids.row_id(&visit.key),
                person_id,
                visit_concept_id,
                visit_start_date: visit.date,
                visit_end_date: visit.date,
                visit_type_concept_id,
                visit_source_value: visit.source_value.map(str::to_string),
                visit_source_concept_id: None,
            })
            .collect())
    }
}
