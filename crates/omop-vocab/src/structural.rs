use std::collections::HashMap;
use std::path::Path;

use omop_model::StructuralConcept;

use crate::csv_table::CsvTable;
use crate::error::Result;

const COLUMNS: &[&str] = &[
    "value_set",
    "omop_concept_id",
    "omop_concept_code",
    "omop_concept_name",
    "omop_class",
    "omop_concept_category",
    "omop_valid_flag",
    "omop_domain",
    "omop_vocab",
];

/// Reads every row of a structural concept table.
pub fn load_structural_concepts(path: &Path) -> Result<Vec<StructuralConcept>> {
    let table = CsvTable::read(path, COLUMNS)?;
    table
        .rows()
        .map(|row| {
            Ok(StructuralConcept {
                value_set: row.text("value_set"),
                concept_id: row.number("omop_concept_id")?,
                concept_code: row.text("omop_concept_code"),
                concept_name: row.text("omop_concept_name"),
                concept_class: row.text("omop_class"),
                concept_category: row.text("omop_concept_category"),
                valid_flag: row.text("omop_valid_flag"),
                domain_id: row.text("omop_domain"),
                vocabulary_id: row.text("omop_vocab"),
            })
        })
        .collect()
}

/// Structural concepts keyed by `value_set`.
#[derive(Debug, Clone, Default)]
pub struct StructuralConceptIndex {
    by_value_set: HashMap<String, StructuralConcept>,
}

impl StructuralConceptIndex {
    pub fn from_rows(rows: impl IntoIterator<Item = StructuralConcept>) -> Self {
        let by_value_set = rows
            .into_iter()
            .map(|row| (row.value_set.clone(), row))
            .collect();
        Self { by_value_set }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let index = Self::from_rows(load_structural_concepts(path)?);
        tracing::debug!(path = %path.display(), entries = index.len(), "loaded structural concepts");
        Ok(index)
    }

    pub fn get(&self, value_set: &str) -> Option<&StructuralConcept> {
        self.by_value_set.get(value_set)
    }

    pub fn len(&self) -> usize {
        self.by_value_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_value_set.is_empty()
    }
}
