#![deny(unsafe_code)]

//! OMOP CDM row construction.
//!
//! Builders turn one patient into rows for one table, resolving concepts
//! through an [`omop_concepts::ConceptLookupService`]. [`OmopService`] runs
//! them over a patient set and collects the tables.

pub mod builder;
pub mod builders;
pub mod error;
pub mod ids;
pub mod service;
pub mod validate;

pub use builder::{OmopBuilder, TableBuilder};
pub use builders::{
    CdmSourceBuilder, CdmSourceSettings, ConditionOccurrenceBuilder, ObservationPeriodBuilder,
    PersonBuilder, VisitOccurrenceBuilder,
};
pub use error::{BuildError, Result};
pub use ids::{PersonIds, RowIdGenerator, hash_to_int63};
pub use service::OmopService;
pub use validate::validate_required_fields;
