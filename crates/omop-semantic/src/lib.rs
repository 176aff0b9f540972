//! Semantic concept resolution for free-text patient attributes.
//!
//! Field configs name the attributes to read. The extractor turns each
//! non-blank leaf value into a [`Query`], and the [`SemanticIndex`] resolves
//! queries against the semantic corpus by exact normalized text.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod extract;
pub mod index;
pub mod model;
pub mod pipeline;

pub use config::{DEFAULT_FIELD_CONFIGS, FieldConfigSelection, merge_field_configs};
pub use error::{Result, SemanticError};
pub use extract::{extract_all, extract_queries, make_query_id, validate_field_paths};
pub use index::{SemanticIndex, SemanticResultIndex};
pub use model::{
    BatchQueryResult, FieldConfig, FieldPathCoverage, OmopDomain, Query, QueryResult, QueryTarget,
};
pub use pipeline::SemanticPipeline;
