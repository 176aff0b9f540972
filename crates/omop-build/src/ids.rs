//! Deterministic identifiers.
//!
//! Row ids are hashes of a namespace and a composite key, so rebuilding the
//! same input always yields the same ids. Person ids are sequential over the
//! sorted patient ids of the whole run.

use std::collections::BTreeMap;

use omop_model::Patient;
use sha1::{Digest, Sha1};

use crate::error::{BuildError, Result};

const SIGN_BIT_MASK: u64 = (1 << 63) - 1;

/// Maps `"{namespace}:{key}"` to a non-negative 63-bit integer.
///
/// SHA-1 digest, first eight bytes read big-endian, top bit cleared.
pub fn hash_to_int63(namespace: &str, key: &str) -> i64 {
    let digest = Sha1::digest(format!("{namespace}:{key}").as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(bytes) & SIGN_BIT_MASK) as i64
}

/// Row id generation for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIdGenerator {
    namespace: &'static str,
}

impl RowIdGenerator {
    pub const fn new(namespace: &'static str) -> Self {
        Self { namespace }
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Id for the colon-joined key parts.
    pub fn row_id(&self, parts: &[&str]) -> i64 {
        hash_to_int63(self.namespace, &parts.join(":"))
    }
}

/// Person ids for every patient of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonIds {
    by_patient: BTreeMap<String, i64>,
}

impl PersonIds {
    /// Numbers patients from 1 in ascending patient id order.
    pub fn assign(patients: &[Patient]) -> Result<Self> {
        Self::from_ids(patients.iter().map(|p| p.patient_id.as_str()))
    }

    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut sorted: Vec<&str> = ids.into_iter().collect();
        sorted.sort_unstable();
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(BuildError::DuplicatePatientId {
                patient_id: pair[0].to_string(),
            });
        }
        let by_patient = sorted
            .into_iter()
            .zip(1_i64..)
            .map(|(id, person_id)| (id.to_string(), person_id))
            .collect();
        Ok(Self { by_patient })
    }

    pub fn get(&self, patient_id: &str) -> Option<i64> {
        self.by_patient.get(patient_id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_patient.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_patient.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_and_non_negative() {
        let a = hash_to_int63("person", "P001");
        assert_eq!(a, hash_to_int63("person", "P001"));
        assert!(a >= 0);
        assert_ne!(a, hash_to_int63("visit_occurrence", "P001"));
    }

    #[test]
    fn row_id_joins_parts_with_colons() {
        let ids = RowIdGenerator::new("visit_occurrence");
        assert_eq!(
            ids.row_id(&["P001", "V1"]),
            hash_to_int63("visit_occurrence", "P001:V1")
        );
    }

    #[test]
    fn person_ids_follow_sorted_patient_ids() {
        let ids = PersonIds::from_ids(["P003", "P001", "P002"]).expect("unique ids");
        assert_eq!(ids.get("P001"), Some(1));
        assert_eq!(ids.get("P002"), Some(2));
        assert_eq!(ids.get("P003"), Some(3));
        assert_eq!(ids.get("P004"), None);
    }

    #[test]
    fn duplicate_patient_ids_are_rejected() {
        let err = PersonIds::from_ids(["B", "A", "B"]).expect_err("duplicate");
        assert_eq!(
            err,
            BuildError::DuplicatePatientId {
                patient_id: "B".to_string()
            }
        );
    }
}
