#![deny(unsafe_code)]

mod csv_table;
pub mod error;
pub mod paths;
pub mod semantic;
pub mod static_concepts;
pub mod structural;

pub use error::{Result, VocabError};
pub use paths::{VOCAB_ENV_VAR, VocabPaths, vocab_root};
pub use semantic::{SemanticCorpus, load_semantic_rows, normalize_term};
pub use static_concepts::{StaticConceptIndex, load_static_concepts};
pub use structural::{StructuralConceptIndex, load_structural_concepts};
