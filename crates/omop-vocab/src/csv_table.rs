//! Header-indexed CSV reading shared by the vocabulary loaders.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, VocabError};

fn header_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim_matches('\u{feff}').trim() == name)
}

/// A fully read CSV file whose required columns are known to exist.
pub(crate) struct CsvTable {
    path: PathBuf,
    columns: BTreeMap<&'static str, usize>,
    records: Vec<csv::StringRecord>,
}

impl CsvTable {
    pub(crate) fn read(path: &Path, required: &[&'static str]) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| VocabError::io(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes.as_slice());
        let headers = reader
            .headers()
            .map_err(|e| VocabError::csv(path, &e))?
            .clone();

        let mut columns = BTreeMap::new();
        for &column in required {
            let idx = header_index(&headers, column).ok_or_else(|| VocabError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            })?;
            columns.insert(column, idx);
        }

        let records = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| VocabError::csv(path, &e))?;

        Ok(Self {
            path: path.to_path_buf(),
            columns,
            records,
        })
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = CsvRow<'_>> {
        self.records
            .iter()
            .map(move |record| CsvRow { table: self, record })
    }
}

pub(crate) struct CsvRow<'a> {
    table: &'a CsvTable,
    record: &'a csv::StringRecord,
}

impl CsvRow<'_> {
    /// Trimmed cell text; empty when the cell is absent.
    pub(crate) fn text(&self, column: &str) -> String {
        self.table
            .columns
            .get(column)
            .and_then(|&idx| self.record.get(idx))
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    }

    pub(crate) fn number(&self, column: &str) -> Result<i64> {
        let value = self.text(column);
        value.parse().map_err(|_| VocabError::InvalidNumber {
            path: self.table.path.clone(),
            column: column.to_string(),
            value: value.clone(),
            line: self.record.position().map_or(0, csv::Position::line),
        })
    }
}
