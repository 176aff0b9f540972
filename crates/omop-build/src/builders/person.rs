use chrono::Datelike;
use omop_concepts::ConceptLookupService;
use omop_model::{Patient, PersonRow};

use crate::builder::OmopBuilder;
use crate::error::{BuildError, Result};

/// Value set of the patient's sex in the static table.
const SEX_VALUE_SET: &str = "sex";

/// One `person` row per patient with a date of birth.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonBuilder;

impl PersonBuilder {
    pub const TABLE_NAME: &'static str = "person";
}

impl OmopBuilder for PersonBuilder {
    type Row = PersonRow;

    fn table_name(&self) -> &'static str {
        Self::TABLE_NAME
    }

    fn build(
        &self,
        patient: &Patient,
        person_id: i64,
        concepts: &mut ConceptLookupService,
    ) -> Result<Vec<PersonRow>> {
        let Some(dob) = patient.date_of_birth else {
            tracing::debug!(
                patient_id = %patient.patient_id,
                table = Self::TABLE_NAME,
                "skipping patient without date_of_birth"
            );
            return Ok(Vec::new());
        };

        // Only an absent sex defaults to 0; a present value, blank included,
        // must map.
        let gender_concept_id = match patient.sex.as_deref() {
            Some(value) => concepts
                .lookup_static(SEX_VALUE_SET, value.trim())
                .map(|concept| concept.concept_id)
                .ok_or_else(|| BuildError::UnmappedValue {
                    table: Self::TABLE_NAME,
                    patient_id: patient.patient_id.clone(),
                    value_set: SEX_VALUE_SET.to_string(),
                    value: value.to_string(),
                })?,
            None => 0,
        };

        Ok(vec![PersonRow {
            person_id,
            gender_concept_id,
            year_of_birth: dob.year(),
            month_of_birth: Some(dob.month()),
            day_of_birth: Some(dob.day()),
            birth_datetime: None,
            race_concept_id: 0,
            ethnicity_concept_id: 0,
            person_source_value: patient.patient_id.clone(),
            gender_source_value: patient.sex.clone(),
            gender_source_concept_id: 0,
            race_source_value: None,
            race_source_concept_id: 0,
            ethnicity_source_value: None,
            ethnicity_source_concept_id: 0,
        }])
    }
}
