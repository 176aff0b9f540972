use std::collections::BTreeMap;

use crate::rows::{
    CdmSourceRow, ConditionOccurrenceRow, ObservationPeriodRow, PersonRow, VisitOccurrenceRow,
};
use crate::table::{CellValue, TableRow, TableSchema};

/// A built row for any supported OMOP table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OmopRow {
    Person(PersonRow),
    ObservationPeriod(ObservationPeriodRow),
    VisitOccurrence(VisitOccurrenceRow),
    ConditionOccurrence(ConditionOccurrenceRow),
    CdmSource(CdmSourceRow),
}

/// Schemas of every supported table.
pub const TABLE_SCHEMAS: [&TableSchema; 5] = [
    &PersonRow::SCHEMA,
    &ObservationPeriodRow::SCHEMA,
    &VisitOccurrenceRow::SCHEMA,
    &ConditionOccurrenceRow::SCHEMA,
    &CdmSourceRow::SCHEMA,
];

/// Looks up a table's schema by name.
pub fn schema_for(table_name: &str) -> Option<&'static TableSchema> {
    TABLE_SCHEMAS
        .into_iter()
        .find(|schema| schema.table_name == table_name)
}

impl OmopRow {
    pub fn table_name(&self) -> &'static str {
        self.schema().table_name
    }

    fn as_table_row(&self) -> &dyn TableRow {
        match self {
            OmopRow::Person(row) => row,
            OmopRow::ObservationPeriod(row) => row,
            OmopRow::VisitOccurrence(row) => row,
            OmopRow::ConditionOccurrence(row) => row,
            OmopRow::CdmSource(row) => row,
        }
    }
}

impl TableRow for OmopRow {
    fn schema(&self) -> &'static TableSchema {
        self.as_table_row().schema()
    }

    fn cells(&self) -> Vec<(&'static str, CellValue)> {
        self.as_table_row().cells()
    }

    fn row_id(&self) -> Option<i64> {
        self.as_table_row().row_id()
    }
}

macro_rules! impl_from_row {
    ($($row:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$row> for OmopRow {
                fn from(row: $row) -> Self {
                    OmopRow::$variant(row)
                }
            }
        )*
    };
}

impl_from_row! {
    PersonRow => Person,
    ObservationPeriodRow => ObservationPeriod,
    VisitOccurrenceRow => VisitOccurrence,
    ConditionOccurrenceRow => ConditionOccurrence,
    CdmSourceRow => CdmSource,
}

/// Rows accumulated during a run, keyed by destination table.
///
/// Append-only; rows within a table keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OmopTables {
    tables: BTreeMap<String, Vec<OmopRow>>,
}

impl OmopTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one row under its own table.
    pub fn add(&mut self, row: OmopRow) {
        self.tables
            .entry(row.table_name().to_string())
            .or_default()
            .push(row);
    }

    /// Appends rows under `table`, registering the table even when `rows` is empty.
    pub fn extend(&mut self, table: &str, rows: impl IntoIterator<Item = OmopRow>) {
        self.tables.entry(table.to_string()).or_default().extend(rows);
    }

    pub fn rows(&self, table: &str) -> &[OmopRow] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[OmopRow])> {
        self.tables
            .iter()
            .map(|(name, rows)| (name.as_str(), rows.as_slice()))
    }

    pub fn len(&self, table: &str) -> usize {
        self.rows(table).len()
    }

    pub fn total_rows(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }
}
