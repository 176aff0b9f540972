//! Run configuration file.
//!
//! ```toml
//! [cdm_source]
//! cdm_source_name = "IMPRESS trial"
//! cdm_source_abbreviation = "IMPRESS"
//! cdm_holder = "Sponsor"
//! source_release_date = "2024-06-01"
//!
//! [fields]
//! required_domains = ["condition"]
//!
//! [[fields.override]]
//! name = "tumor.main"
//! field_path = ["tumor_type", "main_tumor_type"]
//! target = { domains = ["condition"] }
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use omop_build::CdmSourceSettings;
use omop_semantic::{FieldConfig, FieldConfigSelection, OmopDomain};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub cdm_source: CdmSourceConfig,
    pub fields: FieldsConfig,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Config file at `path`, or defaults when none is given.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

/// `cdm_source` metadata; unset release dates fall back to the run date.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CdmSourceConfig {
    pub cdm_source_name: String,
    pub cdm_source_abbreviation: String,
    pub cdm_holder: String,
    pub source_description: Option<String>,
    pub source_documentation_reference: Option<String>,
    pub cdm_etl_reference: Option<String>,
    pub source_release_date: Option<NaiveDate>,
    pub cdm_release_date: Option<NaiveDate>,
    pub cdm_version: Option<String>,
}

impl Default for CdmSourceConfig {
    fn default() -> Self {
        Self {
            cdm_source_name: "OMOP ETL".to_string(),
            cdm_source_abbreviation: "OMOP".to_string(),
            cdm_holder: "unknown".to_string(),
            source_description: None,
            source_documentation_reference: None,
            cdm_etl_reference: None,
            source_release_date: None,
            cdm_release_date: None,
            cdm_version: None,
        }
    }
}

impl CdmSourceConfig {
    pub fn to_settings(&self, run_date: NaiveDate) -> CdmSourceSettings {
        CdmSourceSettings {
            cdm_source_name: self.cdm_source_name.clone(),
            cdm_source_abbreviation: self.cdm_source_abbreviation.clone(),
            cdm_holder: self.cdm_holder.clone(),
            source_description: self.source_description.clone(),
            source_documentation_reference: self.source_documentation_reference.clone(),
            cdm_etl_reference: self.cdm_etl_reference.clone(),
            source_release_date: self.source_release_date.unwrap_or(run_date),
            cdm_release_date: self.cdm_release_date.unwrap_or(run_date),
            cdm_version: self
                .cdm_version
                .clone()
                .or_else(|| Some(CdmSourceSettings::DEFAULT_CDM_VERSION.to_string())),
        }
    }
}

/// Field config selection filters and overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldsConfig {
    pub enable_names: Option<BTreeSet<String>>,
    pub required_domains: Option<BTreeSet<OmopDomain>>,
    pub required_tags: Option<BTreeSet<String>>,
    #[serde(rename = "override")]
    pub overrides: Vec<FieldConfig>,
}

impl FieldsConfig {
    pub fn selection(&self) -> FieldConfigSelection {
        FieldConfigSelection {
            enable_names: self.enable_names.clone(),
            required_domains: self.required_domains.clone(),
            required_tags: self.required_tags.clone(),
        }
    }
}
