use omop_concepts::ConceptLookupService;
use omop_model::{ObservationPeriodRow, Patient};

use crate::builder::OmopBuilder;
use crate::error::Result;
use crate::ids::RowIdGenerator;

/// Structural value set for eCRF-derived record types.
pub(crate) const ECRF_VALUE_SET: &str = "ecrf";

/// The treatment window as one observation period.
#[derive(Debug, Clone)]
pub struct ObservationPeriodBuilder {
    ids: RowIdGenerator,
}

impl ObservationPeriodBuilder {
    pub const TABLE_NAME: &'static str = "observation_period";

    pub fn new() -> Self {
        Self {
            ids: RowIdGenerator::new(Self::TABLE_NAME),
        }
    }
}

impl Default for ObservationPeriodBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OmopBuilder for ObservationPeriodBuilder {
    type Row = ObservationPeriodRow;

    fn table_name(&self) -> &'static str {
        Self::TABLE_NAME
    }

    fn build(
        &self,
        patient: &Patient,
        person_id: i64,
        concepts: &mut ConceptLookupService,
    ) -> Result<Vec<ObservationPeriodRow>> {
        let (Some(start), Some(end)) = (patient.treatment_start_date, patient.treatment_end_date)
        else {
            tracing::debug!(
                patient_id = %patient.patient_id,
                table = Self::TABLE_NAME,
                "skipping patient without treatment start and end dates"
            );
            return Ok(Vec::new());
        };

        let period_type = concepts.lookup_structural(ECRF_VALUE_SET);

        Ok(vec![ObservationPeriodRow {
            observation_period_id: self.ids.row_id(&[&patient.patient_id]),
            person_id,
            observation_period_start_date: start,
            observation_period_end_date: end,
            period_type_concept_id: period_type.map(|c| c.concept_id),
        }])
    }
}
