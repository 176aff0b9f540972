//! The semantic corpus: candidate concepts for free-text source terms.

use std::collections::BTreeMap;
use std::path::Path;

use omop_model::SemanticRow;

use crate::csv_table::{CsvRow, CsvTable};
use crate::error::Result;

const COLUMNS: &[&str] = &[
    "term_id",
    "source_col",
    "source_term",
    "frequency",
    "omop_concept_id",
    "omop_concept_code",
    "omop_name",
    "omop_class",
    "omop_concept",
    "omop_validity",
    "omop_domain",
    "omop_vocab",
];

/// Lowercased, trimmed form used for corpus keys and query text.
pub fn normalize_term(value: &str) -> String {
    value.trim().to_lowercase()
}

fn lower(row: &CsvRow<'_>, column: &str) -> String {
    normalize_term(&row.text(column))
}

/// Reads every row of a semantic corpus file, normalizing text columns.
pub fn load_semantic_rows(path: &Path) -> Result<Vec<SemanticRow>> {
    let table = CsvTable::read(path, COLUMNS)?;
    table
        .rows()
        .map(|row| {
            Ok(SemanticRow {
                term_id: lower(&row, "term_id"),
                source_col: lower(&row, "source_col"),
                source_term: lower(&row, "source_term"),
                frequency: row.number("frequency")?,
                omop_concept_id: row.number("omop_concept_id")?,
                omop_concept_code: lower(&row, "omop_concept_code"),
                omop_name: lower(&row, "omop_name"),
                omop_class: lower(&row, "omop_class"),
                omop_concept: lower(&row, "omop_concept"),
                omop_validity: lower(&row, "omop_validity"),
                omop_domain: lower(&row, "omop_domain"),
                omop_vocab: lower(&row, "omop_vocab"),
            })
        })
        .collect()
}

/// Corpus rows grouped by normalized `source_term`, in file order per term.
#[derive(Debug, Clone, Default)]
pub struct SemanticCorpus {
    by_term: BTreeMap<String, Vec<SemanticRow>>,
}

impl SemanticCorpus {
    pub fn from_rows(rows: impl IntoIterator<Item = SemanticRow>) -> Self {
        let mut by_term: BTreeMap<String, Vec<SemanticRow>> = BTreeMap::new();
        for row in rows {
            by_term
                .entry(normalize_term(&row.source_term))
                .or_default()
                .push(row);
        }
        Self { by_term }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let corpus = Self::from_rows(load_semantic_rows(path)?);
        tracing::debug!(
            path = %path.display(),
            terms = corpus.term_count(),
            "loaded semantic corpus"
        );
        Ok(corpus)
    }

    /// Candidates for an already normalized term.
    pub fn candidates(&self, term: &str) -> Option<&[SemanticRow]> {
        self.by_term.get(term).map(Vec::as_slice)
    }

    pub fn term_count(&self) -> usize {
        self.by_term.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_term.is_empty()
    }
}
