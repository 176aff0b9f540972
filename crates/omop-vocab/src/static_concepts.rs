use std::collections::HashMap;
use std::path::Path;

use omop_model::StaticConcept;

use crate::csv_table::CsvTable;
use crate::error::Result;

const COLUMNS: &[&str] = &[
    "value_set",
    "local_value",
    "omop_concept_id",
    "omop_concept_code",
    "omop_concept_name",
    "omop_class",
    "omop_concept_category",
    "omop_valid_flag",
    "omop_domain",
    "omop_vocab",
];

/// Reads every row of a static concept table.
pub fn load_static_concepts(path: &Path) -> Result<Vec<StaticConcept>> {
    let table = CsvTable::read(path, COLUMNS)?;
    table
        .rows()
        .map(|row| {
            Ok(StaticConcept {
                value_set: row.text("value_set"),
                local_value: row.text("local_value"),
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

/// Static concepts keyed by `(value_set, local_value)`.
///
/// Later rows replace earlier rows with the same key.
#[derive(Debug, Clone, Default)]
pub struct StaticConceptIndex {
    by_key: HashMap<(String, String), StaticConcept>,
}

impl StaticConceptIndex {
    pub fn from_rows(rows: impl IntoIterator<Item = StaticConcept>) -> Self {
        let by_key = rows
            .into_iter()
            .map(|row| ((row.value_set.clone(), row.local_value.clone()), row))
            .collect();
        Self { by_key }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let rows = load_static_concepts(path)?;
        let index = Self::from_rows(rows);
        tracing::debug!(path = %path.display(), entries = index.len(), "loaded static concepts");
        Ok(index)
    }

    pub fn get(&self, value_set: &str, local_value: &str) -> Option<&StaticConcept> {
        self.by_key
            .get(&(value_set.to_string(), local_value.to_string()))
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
