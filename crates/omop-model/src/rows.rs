//! OMOP CDM v5.4 row types.
//!
//! Each row type pairs with a static [`TableSchema`] describing which columns
//! are `NOT NULL`. Builders fill the structs; the schema is checked
//! separately after construction, so a concept that failed to resolve (held
//! as `None` in a required column) is caught before the row is accepted.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::table::{CellValue, ColumnSpec, TableRow, TableSchema};

/// One row per patient with a known date of birth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonRow {
    /// Sequential id in sorted `patient_id` order, starting at 1.
    pub person_id: i64,
    /// Static `sex` concept; 0 when the patient has no sex recorded.
    pub gender_concept_id: i64,
    pub year_of_birth: i32,
    pub month_of_birth: Option<u32>,
    pub day_of_birth: Option<u32>,
    pub birth_datetime: Option<NaiveDateTime>,
    pub race_concept_id: i64,
    pub ethnicity_concept_id: i64,
    /// The patient's trial-local id.
    pub person_source_value: String,
    /// Sex exactly as recorded on the patient.
    pub gender_source_value: Option<String>,
    pub gender_source_concept_id: i64,
    pub race_source_value: Option<String>,
    pub race_source_concept_id: i64,
    pub ethnicity_source_value: Option<String>,
    pub ethnicity_source_concept_id: i64,
}

impl PersonRow {
    pub const SCHEMA: TableSchema = TableSchema {
        table_name: "person",
        columns: &[
            ColumnSpec::required("person_id"),
            ColumnSpec::required("gender_concept_id"),
            ColumnSpec::required("year_of_birth"),
            ColumnSpec::optional("month_of_birth"),
            ColumnSpec::optional("day_of_birth"),
            ColumnSpec::optional("birth_datetime"),
            ColumnSpec::required("race_concept_id"),
            ColumnSpec::required("ethnicity_concept_id"),
            ColumnSpec::required("person_source_value"),
            ColumnSpec::optional("gender_source_value"),
            ColumnSpec::required("gender_source_concept_id"),
            ColumnSpec::optional("race_source_value"),
            ColumnSpec::required("race_source_concept_id"),
            ColumnSpec::optional("ethnicity_source_value"),
            ColumnSpec::required("ethnicity_source_concept_id"),
        ],
    };
}

impl TableRow for PersonRow {
    fn schema(&self) -> &'static TableSchema {
        &Self::SCHEMA
    }

    fn cells(&self) -> Vec<(&'static str, CellValue)> {
        vec![
            ("person_id", self.person_id.into()),
            ("gender_concept_id", self.gender_concept_id.into()),
            ("year_of_birth", self.year_of_birth.into()),
            ("month_of_birth", self.month_of_birth.into()),
            ("day_of_birth", self.day_of_birth.into()),
            ("birth_datetime", self.birth_datetime.into()),
            ("race_concept_id", self.race_concept_id.into()),
            ("ethnicity_concept_id", self.ethnicity_concept_id.into()),
            ("person_source_value", self.person_source_value.as_str().into()),
            ("gender_source_value", self.gender_source_value.clone().into()),
            ("gender_source_concept_id", self.gender_source_concept_id.into()),
            ("race_source_value", self.race_source_value.clone().into()),
            ("race_source_concept_id", self.race_source_concept_id.into()),
            ("ethnicity_source_value", self.ethnicity_source_value.clone().into()),
            ("ethnicity_source_concept_id", self.ethnicity_source_concept_id.into()),
        ]
    }

    fn row_id(&self) -> Option<i64> {
        Some(self.person_id)
    }
}

/// The treatment window of a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservationPeriodRow {
    /// Hashed from the patient id.
    pub observation_period_id: i64,
    pub person_id: i64,
    pub observation_period_start_date: NaiveDate,
    pub observation_period_end_date: NaiveDate,
    /// Structural eCRF type concept; required once validated.
    pub period_type_concept_id: Option<i64>,
}

impl ObservationPeriodRow {
    pub const SCHEMA: TableSchema = TableSchema {
        table_name: "observation_period",
        columns: &[
            ColumnSpec::required("observation_period_id"),
            ColumnSpec::required("person_id"),
            ColumnSpec::required("observation_period_start_date"),
            ColumnSpec::required("observation_period_end_date"),
            ColumnSpec::required("period_type_concept_id"),
        ],
    };
}

impl TableRow for ObservationPeriodRow {
    fn schema(&self) -> &'static TableSchema {
        &Self::SCHEMA
    }

    fn cells(&self) -> Vec<(&'static str, CellValue)> {
        vec![
            ("observation_period_id", self.observation_period_id.into()),
            ("person_id", self.person_id.into()),
            (
                "observation_period_start_date",
                self.observation_period_start_date.into(),
            ),
            (
                "observation_period_end_date",
                self.observation_period_end_date.into(),
            ),
            ("period_type_concept_id", self.period_type_concept_id.into()),
        ]
    }

    fn row_id(&self) -> Option<i64> {
        Some(self.observation_period_id)
    }
}

/// A baseline or follow-up outpatient visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitOccurrenceRow {
    /// Hashed from the patient id and the visit key.
    pub visit_occurrence_id: i64,
    pub person_id: i64,
    /// Structural outpatient visit concept.
    pub visit_concept_id: Option<i64>,
    pub visit_start_date: NaiveDate,
    pub visit_end_date: NaiveDate,
    pub visit_type_concept_id: Option<i64>,
    /// Event id of follow-up visits.
    pub visit_source_value: Option<String>,
    pub visit_source_concept_id: Option<i64>,
}

impl VisitOccurrenceRow {
    pub const SCHEMA: TableSchema = TableSchema {
        table_name: "visit_occurrence",
        columns: &[
            ColumnSpec::required("visit_occurrence_id"),
            ColumnSpec::required("person_id"),
            ColumnSpec::required("visit_concept_id"),
            ColumnSpec::required("visit_start_date"),
            ColumnSpec::required("visit_end_date"),
            ColumnSpec::required("visit_type_concept_id"),
            ColumnSpec::optional("visit_source_value"),
            ColumnSpec::optional("visit_source_concept_id"),
        ],
    };
}

impl TableRow for VisitOccurrenceRow {
    fn schema(&self) -> &'static TableSchema {
        &Self::SCHEMA
    }

    fn cells(&self) -> Vec<(&'static str, CellValue)> {
        vec![
            ("visit_occurrence_id", self.visit_occurrence_id.into()),
            ("person_id", self.person_id.into()),
            ("visit_concept_id", self.visit_concept_id.into()),
            ("visit_start_date", self.visit_start_date.into()),
            ("visit_end_date", self.visit_end_date.into()),
            ("visit_type_concept_id", self.visit_type_concept_id.into()),
            ("visit_source_value", self.visit_source_value.clone().into()),
            ("visit_source_concept_id", self.visit_source_concept_id.into()),
        ]
    }

    fn row_id(&self) -> Option<i64> {
        Some(self.visit_occurrence_id)
    }
}

/// A condition resolved from a dated medical history or adverse event term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionOccurrenceRow {
    /// Hashed from patient, collection, item position and concept.
    pub condition_occurrence_id: i64,
    pub person_id: i64,
    /// Semantic concept in the condition domain.
    pub condition_concept_id: i64,
    pub condition_start_date: NaiveDate,
    pub condition_end_date: Option<NaiveDate>,
    pub condition_type_concept_id: Option<i64>,
    pub condition_status_concept_id: Option<i64>,
    pub stop_reason: Option<String>,
    pub visit_occurrence_id: Option<i64>,
    /// The free-text term as entered.
    pub condition_source_value: Option<String>,
    pub condition_source_concept_id: Option<i64>,
}

impl ConditionOccurrenceRow {
    pub const SCHEMA: TableSchema = TableSchema {
        table_name: "condition_occurrence",
        columns: &[
            ColumnSpec::required("condition_occurrence_id"),
            ColumnSpec::required("person_id"),
            ColumnSpec::required("condition_concept_id"),
            ColumnSpec::required("condition_start_date"),
            ColumnSpec::optional("condition_end_date"),
            ColumnSpec::required("condition_type_concept_id"),
            ColumnSpec::optional("condition_status_concept_id"),
            ColumnSpec::optional("stop_reason"),
            ColumnSpec::optional("visit_occurrence_id"),
            ColumnSpec::optional("condition_source_value"),
            ColumnSpec::optional("condition_source_concept_id"),
        ],
    };
}

impl TableRow for ConditionOccurrenceRow {
    fn schema(&self) -> &'static TableSchema {
        &Self::SCHEMA
    }

    fn cells(&self) -> Vec<(&'static str, CellValue)> {
        vec![
            ("condition_occurrence_id", self.condition_occurrence_id.into()),
            ("person_id", self.person_id.into()),
            ("condition_concept_id", self.condition_concept_id.into()),
            ("condition_start_date", self.condition_start_date.into()),
            ("condition_end_date", self.condition_end_date.into()),
            ("condition_type_concept_id", self.condition_type_concept_id.into()),
            (
                "condition_status_concept_id",
                self.condition_status_concept_id.into(),
            ),
            ("stop_reason", self.stop_reason.clone().into()),
            ("visit_occurrence_id", self.visit_occurrence_id.into()),
            ("condition_source_value", self.condition_source_value.clone().into()),
            (
                "condition_source_concept_id",
                self.condition_source_concept_id.into(),
            ),
        ]
    }

    fn row_id(&self) -> Option<i64> {
        Some(self.condition_occurrence_id)
    }
}

/// Run metadata; one row per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CdmSourceRow {
    /// Full name of the source dataset.
    pub cdm_source_name: String,
    pub cdm_source_abbreviation: String,
    pub cdm_holder: String,
    pub source_description: Option<String>,
    pub source_documentation_reference: Option<String>,
    pub cdm_etl_reference: Option<String>,
    pub source_release_date: NaiveDate,
    pub cdm_release_date: NaiveDate,
    pub cdm_version: Option<String>,
    /// Structural `cdm` concept.
    pub cdm_version_concept_id: Option<i64>,
    /// Concept id of the structural `vocab` concept, as text.
    pub vocabulary_version: Option<String>,
}

impl CdmSourceRow {
    pub const SCHEMA: TableSchema = TableSchema {
        table_name: "cdm_source",
        columns: &[
            ColumnSpec::required("cdm_source_name"),
            ColumnSpec::required("cdm_source_abbreviation"),
            ColumnSpec::required("cdm_holder"),
            ColumnSpec::optional("source_description"),
            ColumnSpec::optional("source_documentation_reference"),
            ColumnSpec::optional("cdm_etl_reference"),
            ColumnSpec::required("source_release_date"),
            ColumnSpec::required("cdm_release_date"),
            ColumnSpec::optional("cdm_version"),
            ColumnSpec::required("cdm_version_concept_id"),
            ColumnSpec::required("vocabulary_version"),
        ],
    };
}

impl TableRow for CdmSourceRow {
    fn schema(&self) -> &'static TableSchema {
        &Self::SCHEMA
    }

    fn cells(&self) -> Vec<(&'static str, CellValue)> {
        vec![
            ("cdm_source_name", self.cdm_source_name.as_str().into()),
            (
                "cdm_source_abbreviation",
                self.cdm_source_abbreviation.as_str().into(),
            ),
            ("cdm_holder", self.cdm_holder.as_str().into()),
            ("source_description", self.source_description.clone().into()),
            (
                "source_documentation_reference",
                self.source_documentation_reference.clone().into(),
            ),
            ("cdm_etl_reference", self.cdm_etl_reference.clone().into()),
            ("source_release_date", self.source_release_date.into()),
            ("cdm_release_date", self.cdm_release_date.into()),
            ("cdm_version", self.cdm_version.clone().into()),
            ("cdm_version_concept_id", self.cdm_version_concept_id.into()),
            ("vocabulary_version", self.vocabulary_version.clone().into()),
        ]
    }
}
