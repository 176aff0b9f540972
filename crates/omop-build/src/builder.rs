//! Builder traits.
//!
//! Each destination table has one [`OmopBuilder`]. The object-safe
//! [`TableBuilder`] wraps any `OmopBuilder`, validating and converting its
//! rows so the service can run a heterogeneous list of builders.

use omop_concepts::ConceptLookupService;
use omop_model::{OmopRow, Patient, TableRow};

use crate::error::Result;
use crate::validate::validate_required_fields;

/// Builds rows for one OMOP table from a single patient.
///
/// Builders hold no per-run state. Concept lookups go through the service
/// passed to [`build`](OmopBuilder::build), which records their outcomes.
///
/// A patient missing the data a table needs yields an empty row list. A
/// value that is present but cannot be mapped is an error.
pub trait OmopBuilder {
    type Row: TableRow + Into<OmopRow>;

    fn table_name(&self) -> &'static str;

    fn build(
        &self,
        patient: &Patient,
        person_id: i64,
        concepts: &mut ConceptLookupService,
    ) -> Result<Vec<Self::Row>>;
}

/// Object-safe view of an [`OmopBuilder`].
pub trait TableBuilder {
    fn table_name(&self) -> &'static str;

    /// Builds, validates and converts the patient's rows.
    fn build_rows(
        &self,
        patient: &Patient,
        person_id: i64,
        concepts: &mut ConceptLookupService,
    ) -> Result<Vec<OmopRow>>;
}

impl<B: OmopBuilder> TableBuilder for B {
    fn table_name(&self) -> &'static str {
        OmopBuilder::table_name(self)
    }

    fn build_rows(
        &self,
        patient: &Patient,
        person_id: i64,
        concepts: &mut ConceptLookupService,
    ) -> Result<Vec<OmopRow>> {
        self.build(patient, person_id, concepts)?
            .into_iter()
            .map(|row| {
                validate_required_fields(&row)?;
                Ok(row.into())
            })
            .collect()
    }
}
