use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// A single cell of an output row.
///
/// Displays the way it is written to CSV: ISO dates, empty for null.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Int(i64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

impl CellValue {
    /// Whether the cell violates a `NOT NULL` column.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(value) => write!(f, "{value}"),
            CellValue::Text(value) => f.write_str(value),
            CellValue::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            CellValue::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(i64::from(value))
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Int(i64::from(value))
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Null, Into::into)
    }
}

/// One column of a destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    /// Whether the column is declared `NOT NULL`.
    pub required: bool,
}

impl ColumnSpec {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
        }
    }
}

/// Column layout of one destination table.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub table_name: &'static str,
    /// Columns in output order.
    pub columns: &'static [ColumnSpec],
}

impl TableSchema {
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    pub fn required_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().filter(|c| c.required).map(|c| c.name)
    }
}

/// A row destined for one OMOP table.
pub trait TableRow {
    fn schema(&self) -> &'static TableSchema;

    /// Cell values keyed by column name.
    fn cells(&self) -> Vec<(&'static str, CellValue)>;

    /// The row's primary key, for tables that have one.
    fn row_id(&self) -> Option<i64> {
        None
    }
}
