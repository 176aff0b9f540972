//! Vocabulary directory path resolution.

use std::path::{Path, PathBuf};

/// Environment variable for overriding the vocabulary directory.
pub const VOCAB_ENV_VAR: &str = "OMOP_VOCAB_DIR";

pub const STATIC_FILE: &str = "static_mapping.csv";
pub const STRUCTURAL_FILE: &str = "structural_mapping.csv";
pub const SEMANTIC_FILE: &str = "semantic_mapping.csv";

/// Get the vocabulary root directory.
///
/// Resolution order:
/// 1. `OMOP_VOCAB_DIR` environment variable
/// 2. `vocab/` directory relative to workspace root
pub fn vocab_root() -> PathBuf {
    if let Ok(root) = std::env::var(VOCAB_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../vocab")
}

/// Locations of the three vocabulary tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabPaths {
    pub static_concepts: PathBuf,
    pub structural_concepts: PathBuf,
    pub semantic_corpus: PathBuf,
}

impl VocabPaths {
    /// Standard file names under `root`.
    pub fn in_dir(root: &Path) -> Self {
        Self {
            static_concepts: root.join(STATIC_FILE),
            structural_concepts: root.join(STRUCTURAL_FILE),
            semantic_corpus: root.join(SEMANTIC_FILE),
        }
    }
}

impl Default for VocabPaths {
    fn default() -> Self {
        Self::in_dir(&vocab_root())
    }
}
