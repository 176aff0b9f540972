use chrono::NaiveDate;
use omop_concepts::ConceptLookupService;
use omop_model::CdmSourceRow;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::validate::validate_required_fields;

const CDM_VALUE_SET: &str = "cdm";
const VOCAB_VALUE_SET: &str = "vocab";

/// Run metadata written to `cdm_source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdmSourceSettings {
    pub cdm_source_name: String,
    pub cdm_source_abbreviation: String,
    pub cdm_holder: String,
    pub source_description: Option<String>,
    pub source_documentation_reference: Option<String>,
    pub cdm_etl_reference: Option<String>,
    pub source_release_date: NaiveDate,
    pub cdm_release_date: NaiveDate,
    pub cdm_version: Option<String>,
}

impl CdmSourceSettings {
    pub const DEFAULT_CDM_VERSION: &'static str = "v5.4";

    /// Settings with both release dates set to `release_date`.
    pub fn new(
        name: impl Into<String>,
        abbreviation: impl Into<String>,
        holder: impl Into<String>,
        release_date: NaiveDate,
    ) -> Self {
        Self {
            cdm_source_name: name.into(),
            cdm_source_abbreviation: abbreviation.into(),
            cdm_holder: holder.into(),
            source_description: None,
            source_documentation_reference: None,
            cdm_etl_reference: None,
            source_release_date: release_date,
            cdm_release_date: release_date,
            cdm_version: Some(Self::DEFAULT_CDM_VERSION.to_string()),
        }
    }
}

/// The singleton `cdm_source` row.
#[derive(Debug, Clone)]
pub struct CdmSourceBuilder {
    settings: CdmSourceSettings,
}

impl CdmSourceBuilder {
    pub const TABLE_NAME: &'static str = "cdm_source";

    pub fn new(settings: CdmSourceSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CdmSourceSettings {
        &self.settings
    }

    /// The CDM version concept comes from structural `cdm`; the vocabulary
    /// version is the concept id of structural `vocab`.
    pub fn build(&self, concepts: &mut ConceptLookupService) -> Result<CdmSourceRow> {
        let cdm_version_concept_id = concepts.lookup_structural(CDM_VALUE_SET).map(|c| c.concept_id);
        let vocabulary_version = concepts
            .lookup_structural(VOCAB_VALUE_SET)
            .map(|c| c.concept_id.to_string());

        let settings = &self.settings;
        let row = CdmSourceRow {
            cdm_source_name: settings.cdm_source_name.clone(),
            cdm_source_abbreviation: settings.cdm_source_abbreviation.clone(),
            cdm_holder: settings.cdm_holder.clone(),
            source_description: settings.source_description.clone(),
            source_documentation_reference: settings.source_documentation_reference.clone(),
            cdm_etl_reference: settings.cdm_etl_reference.clone(),
            source_release_date: settings.source_release_date,
            cdm_release_date: settings.cdm_release_date,
            cdm_version: settings.cdm_version.clone(),
            cdm_version_concept_id,
            vocabulary_version,
        };
        validate_required_fields(&row)?;
        Ok(row)
    }
}
