//! Query extraction from patient records.
//!
//! A field path names an attribute on the patient, then attributes on
//! whatever that resolves to. When the head attribute is a collection the
//! rest of the path is applied to each element and the element's position
//! becomes the query's `leaf_index`.

use omop_model::{Field, Patient, Record};
use omop_vocab::normalize_term;
use sha1::{Digest, Sha1};

use crate::error::{Result, SemanticError};
use crate::model::{FieldConfig, Query};

/// Hex characters kept from the query digest.
const QUERY_ID_LEN: usize = 16;

/// Deterministic id for a query location and value.
pub fn make_query_id(
    patient_id: &str,
    field_path: &[String],
    leaf_index: Option<usize>,
    raw_value: &str,
) -> String {
    let leaf = leaf_index.map(|idx| idx.to_string()).unwrap_or_default();
    let key = format!(
        "{patient_id}|{}|{leaf}|{}",
        field_path.join("."),
        normalize_term(raw_value)
    );
    let digest = Sha1::digest(key.as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(QUERY_ID_LEN);
    id
}

/// Applies `tail` to `value`, returning the leaf text if it is non-blank.
fn resolve_text<'a>(value: Field<'a>, tail: &[String]) -> Option<&'a str> {
    let mut current = value;
    for name in tail {
        current = match current {
            Field::Record(record) => record.field(name)?,
            _ => return None,
        };
    }
    current.as_text().filter(|text| !text.trim().is_empty())
}

fn build_query(
    patient: &Patient,
    config: &FieldConfig,
    leaf_index: Option<usize>,
    raw_value: &str,
) -> Query {
    Query {
        id: make_query_id(&patient.patient_id, &config.field_path, leaf_index, raw_value),
        patient_id: patient.patient_id.clone(),
        query: normalize_term(raw_value),
        field_path: config.field_path.clone(),
        leaf_index,
        target: config.target.clone(),
        raw_value: raw_value.to_string(),
    }
}

/// Extracts one query per non-blank text leaf addressed by `configs`.
///
/// Missing attributes, null values and non-text leaves yield no query.
pub fn extract_queries(patient: &Patient, configs: &[FieldConfig]) -> Vec<Query> {
    let mut queries = Vec::new();

    for config in configs {
        let Some((head, tail)) = config.field_path.split_first() else {
            continue;
        };
        let Some(value) = patient.field(head) else {
            continue;
        };

        match value {
            Field::Collection(items) => {
                for (idx, item) in items.into_iter().enumerate() {
                    if let Some(text) = resolve_text(Field::Record(item), tail) {
                        queries.push(build_query(patient, config, Some(idx), text));
                    }
                }
            }
            other => {
                if let Some(text) = resolve_text(other, tail) {
                    queries.push(build_query(patient, config, None, text));
                }
            }
        }
    }

    queries
}

/// Queries for every patient, in patient order.
pub fn extract_all(patients: &[Patient], configs: &[FieldConfig]) -> Vec<Query> {
    patients
        .iter()
        .flat_map(|patient| extract_queries(patient, configs))
        .collect()
}

/// Checks that every config's path exists on the patient model.
///
/// The head attribute is checked on the first patient. The tail is checked
/// on the first value found for the head across `patients`; configs with no
/// populated sample are accepted.
pub fn validate_field_paths(patients: &[Patient], configs: &[FieldConfig]) -> Result<()> {
    let Some(first) = patients.first() else {
        return Ok(());
    };
    let mut errors = Vec::new();

    for config in configs {
        let Some((head, tail)) = config.field_path.split_first() else {
            errors.push(format!("{}: empty field_path", config.name));
            continue;
        };
        if first.field(head).is_none() {
            errors.push(format!(
                "{}: {} has no attribute: {head}",
                config.name,
                first.record_name()
            ));
            continue;
        }

        let sample = patients.iter().find_map(|patient| match patient.field(head) {
            Some(Field::Null) | None => None,
            Some(Field::Collection(items)) => items.first().map(|item| Field::Record(*item)),
            Some(other) => Some(other),
        });
        let Some(sample) = sample else {
            continue;
        };

        if let Some(error) = check_tail(sample, tail) {
            errors.push(format!(
                "{}: invalid field_path {:?}: {error}",
                config.name, config.field_path
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SemanticError::InvalidFieldPaths { errors })
    }
}

fn check_tail(sample: Field<'_>, tail: &[String]) -> Option<String> {
    let mut current = sample;
    for name in tail {
        current = match current {
            Field::Record(record) => match record.field(name) {
                Some(value) => value,
                None => {
                    return Some(format!(
                        "'{name}' is not an attribute of {}",
                        record.record_name()
                    ));
                }
            },
            Field::Null => return None,
            other => {
                return Some(format!("'{name}' cannot be read from a {} value", other.kind()));
            }
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_id_is_sixteen_hex_chars() {
        let path = vec!["medical_histories".to_string(), "term".to_string()];
        let id = make_query_id("P001", &path, Some(0), "AML");
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn query_id_ignores_case_and_surrounding_whitespace() {
        let path = vec!["tumor_type".to_string(), "main_tumor_type".to_string()];
        assert_eq!(
            make_query_id("P001", &path, None, "  Colorectal Cancer "),
            make_query_id("P001", &path, None, "colorectal cancer")
        );
    }

    #[test]
    fn query_id_depends_on_leaf_index() {
        let path = vec!["adverse_events".to_string(), "term".to_string()];
        assert_ne!(
            make_query_id("P001", &path, Some(0), "nausea"),
            make_query_id("P001", &path, Some(1), "nausea")
        );
        assert_ne!(
            make_query_id("P001", &path, None, "nausea"),
            make_query_id("P001", &path, Some(0), "nausea")
        );
    }
}
