//! Attribute access over patient records.
//!
//! Harmonized patient data is a tree: scalar attributes, singleton
//! sub-records and ordered collections of sub-records. Field configs address
//! values in that tree by attribute name (`("medical_histories", "term")`),
//! so every record type exposes its attributes through [`Record::field`].
//!
//! `field` distinguishes two kinds of absence:
//!
//! - `None`: the record has no attribute with that name (a bad path)
//! - `Some(Field::Null)`: the attribute exists but carries no value

use chrono::NaiveDate;

/// A record whose attributes can be looked up by name.
pub trait Record {
    /// Type name used in diagnostics (e.g. `"MedicalHistory"`).
    fn record_name(&self) -> &'static str;

    /// Returns the named attribute, or `None` if the record has no such attribute.
    fn field(&self, name: &str) -> Option<Field<'_>>;
}

/// The value of one record attribute.
#[derive(Clone)]
pub enum Field<'a> {
    Null,
    Text(&'a str),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Record(&'a dyn Record),
    Collection(Vec<&'a dyn Record>),
}

impl<'a> Field<'a> {
    pub fn text(value: &'a Option<String>) -> Self {
        value.as_deref().map_or(Field::Null, Field::Text)
    }

    pub fn int(value: Option<i64>) -> Self {
        value.map_or(Field::Null, Field::Int)
    }

    pub fn float(value: Option<f64>) -> Self {
        value.map_or(Field::Null, Field::Float)
    }

    pub fn bool(value: Option<bool>) -> Self {
        value.map_or(Field::Null, Field::Bool)
    }

    pub fn date(value: Option<NaiveDate>) -> Self {
        value.map_or(Field::Null, Field::Date)
    }

    pub fn record<T: Record>(value: &'a Option<T>) -> Self {
        match value {
            Some(record) => Field::Record(record),
            None => Field::Null,
        }
    }

    pub fn collection<T: Record>(items: &'a [T]) -> Self {
        Field::Collection(items.iter().map(|item| item as &dyn Record).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// Returns the string payload, if this is a text attribute.
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            Field::Text(value) => Some(*value),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Field::Null => "null",
            Field::Text(_) => "text",
            Field::Int(_) => "int",
            Field::Float(_) => "float",
            Field::Bool(_) => "bool",
            Field::Date(_) => "date",
            Field::Record(_) => "record",
            Field::Collection(_) => "collection",
        }
    }
}

impl std::fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Null => f.write_str("Null"),
            Field::Text(value) => f.debug_tuple("Text").field(value).finish(),
            Field::Int(value) => f.debug_tuple("Int").field(value).finish(),
            Field::Float(value) => f.debug_tuple("Float").field(value).finish(),
            Field::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Field::Date(value) => f.debug_tuple("Date").field(value).finish(),
            Field::Record(record) => write!(f, "Record({})", record.record_name()),
            Field::Collection(items) => write!(f, "Collection(len={})", items.len()),
        }
    }
}
