//! Table accumulation over a patient set.

use omop_concepts::ConceptLookupService;
use omop_model::{OmopRow, OmopTables, Patient};
use tracing::info_span;

use crate::builder::TableBuilder;
use crate::builders::{
    CdmSourceBuilder, CdmSourceSettings, ConditionOccurrenceBuilder, ObservationPeriodBuilder,
    PersonBuilder, VisitOccurrenceBuilder,
};
use crate::error::{BuildError, Result};
use crate::ids::PersonIds;

/// Runs every registered builder over a patient set.
pub struct OmopService {
    builders: Vec<Box<dyn TableBuilder>>,
    cdm_source: CdmSourceBuilder,
}

impl OmopService {
    /// Service with the person, observation period, visit and condition
    /// builders registered in that order.
    pub fn new(settings: CdmSourceSettings) -> Self {
        let mut service = Self::empty(settings);
        service.register(PersonBuilder);
        service.register(ObservationPeriodBuilder::new());
        service.register(VisitOccurrenceBuilder::new());
        service.register(ConditionOccurrenceBuilder::new());
        service
    }

    /// Service that only produces `cdm_source`.
    pub fn empty(settings: CdmSourceSettings) -> Self {
        Self {
            builders: Vec::new(),
            cdm_source: CdmSourceBuilder::new(settings),
        }
    }

    pub fn register(&mut self, builder: impl TableBuilder + 'static) {
        self.builders.push(Box::new(builder));
    }

    /// Per-patient tables in run order, then `cdm_source`.
    pub fn table_names(&self) -> Vec<&'static str> {
        self.builders
            .iter()
            .map(|builder| builder.table_name())
            .chain(std::iter::once(CdmSourceBuilder::TABLE_NAME))
            .collect()
    }

    /// Builds every table for `patients`.
    ///
    /// Patients are processed in ascending patient id order. Every registered
    /// table is present in the result, even when it has no rows. The first
    /// builder error stops the run.
    pub fn build(
        &self,
        patients: &[Patient],
        concepts: &mut ConceptLookupService,
    ) -> Result<OmopTables> {
        let span = info_span!("omop_build", patients = patients.len());
        let _guard = span.enter();

        let person_ids = PersonIds::assign(patients)?;
        let mut ordered: Vec<&Patient> = patients.iter().collect();
        ordered.sort_by(|a, b| a.patient_id.cmp(&b.patient_id));

        let mut tables = OmopTables::new();
        for builder in &self.builders {
            tables.extend(builder.table_name(), Vec::new());
        }

        for patient in ordered {
            let person_id = person_ids.get(&patient.patient_id).ok_or_else(|| {
                BuildError::DuplicatePatientId {
                    patient_id: patient.patient_id.clone(),
                }
            })?;
            for builder in &self.builders {
                let rows = builder.build_rows(patient, person_id, concepts)?;
                tracing::trace!(
                    patient_id = %patient.patient_id,
                    table = builder.table_name(),
                    rows = rows.len(),
                    "built rows"
                );
                tables.extend(builder.table_name(), rows);
            }
        }

        let cdm_source = self.cdm_source.build(concepts)?;
        tables.add(OmopRow::from(cdm_source));

        for name in tables.table_names() {
            tracing::debug!(table = name, rows = tables.len(name), "table built");
        }
        tracing::info!(
            tables = tables.table_names().count(),
            rows = tables.total_rows(),
            lookups_matched = concepts.result().matched_count(),
            lookups_missed = concepts.result().missed_count(),
            "OMOP build complete"
        );
        Ok(tables)
    }
}

impl std::fmt::Debug for OmopService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OmopService")
            .field("tables", &self.table_names())
            .finish()
    }
}
