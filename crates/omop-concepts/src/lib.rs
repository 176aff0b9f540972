//! Concept resolution for row builders.
//!
//! [`ConceptLookupService`] answers static `(value_set, local_value)`,
//! structural `value_set` and semantic field-location lookups, and keeps a
//! [`LookupResult`] of every static and structural hit and miss for the
//! end-of-run coverage report.

#![deny(unsafe_code)]

pub mod lookup;
pub mod report;
pub mod service;

pub use lookup::{FieldCoverage, LookupResult, LookupType, MatchedLookup, MissedLookup};
pub use report::LookupReport;
pub use service::ConceptLookupService;
