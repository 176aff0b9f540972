//! Hit/miss accounting for concept lookups.

use std::collections::BTreeMap;
use std::fmt;

use omop_model::{MappedConcept, coverage_fraction};
use serde::{Deserialize, Serialize};

/// The resolution tier a lookup went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupType {
    Static,
    Structural,
    Semantic,
}

impl LookupType {
    pub fn as_str(self) -> &'static str {
        match self {
            LookupType::Static => "static",
            LookupType::Structural => "structural",
            LookupType::Semantic => "semantic",
        }
    }
}

impl fmt::Display for LookupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedLookup {
    pub value_set: String,
    pub local_value: String,
    pub concept: MappedConcept,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissedLookup {
    pub lookup_type: LookupType,
    pub value_set: String,
    pub local_value: String,
}

/// Coverage statistics for one value set under one lookup type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCoverage {
    pub value_set: String,
    pub lookup_type: LookupType,
    pub matched: usize,
    pub missed: usize,
    pub total: usize,
    pub coverage_fraction: f64,
}

/// Lookup outcomes accumulated during a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupResult {
    matched: BTreeMap<LookupType, Vec<MatchedLookup>>,
    missed: BTreeMap<LookupType, Vec<MissedLookup>>,
}

impl LookupResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_match(
        &mut self,
        lookup_type: LookupType,
        value_set: &str,
        local_value: &str,
        concept: MappedConcept,
    ) {
        self.matched.entry(lookup_type).or_default().push(MatchedLookup {
            value_set: value_set.to_string(),
            local_value: local_value.to_string(),
            concept,
        });
    }

    pub fn record_miss(&mut self, lookup_type: LookupType, value_set: &str, local_value: &str) {
        self.missed.entry(lookup_type).or_default().push(MissedLookup {
            lookup_type,
            value_set: value_set.to_string(),
            local_value: local_value.to_string(),
        });
    }

    pub fn matched(&self, lookup_type: LookupType) -> &[MatchedLookup] {
        self.matched.get(&lookup_type).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn missed(&self, lookup_type: LookupType) -> &[MissedLookup] {
        self.missed.get(&lookup_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Coverage per value set for one lookup type, keyed by value set.
    pub fn coverage_by_field(&self, lookup_type: LookupType) -> BTreeMap<String, FieldCoverage> {
        let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for hit in self.matched(lookup_type) {
            counts.entry(&hit.value_set).or_default().0 += 1;
        }
        for miss in self.missed(lookup_type) {
            counts.entry(&miss.value_set).or_default().1 += 1;
        }

        counts
            .into_iter()
            .map(|(value_set, (matched, missed))| {
                let coverage = FieldCoverage {
                    value_set: value_set.to_string(),
                    lookup_type,
                    matched,
                    missed,
                    total: matched + missed,
                    coverage_fraction: coverage_fraction(matched, missed),
                };
                (value_set.to_string(), coverage)
            })
            .collect()
    }

    /// Static then structural coverage, each sorted by value set.
    pub fn all_coverage(&self) -> Vec<FieldCoverage> {
        [LookupType::Static, LookupType::Structural]
            .into_iter()
            .flat_map(|lookup_type| self.coverage_by_field(lookup_type).into_values())
            .collect()
    }

    /// Missed lookups of one type, or of every type in tier order.
    pub fn missed_list(&self, lookup_type: Option<LookupType>) -> Vec<&MissedLookup> {
        match lookup_type {
            Some(lookup_type) => self.missed(lookup_type).iter().collect(),
            None => self.missed.values().flatten().collect(),
        }
    }

    pub fn matched_count(&self) -> usize {
        self.matched.values().map(Vec::len).sum()
    }

    pub fn missed_count(&self) -> usize {
        self.missed.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concept(id: i64) -> MappedConcept {
        MappedConcept {
            concept_id: id,
            concept_code: id.to_string(),
            concept_name: "c".to_string(),
            domain_id: "d".to_string(),
            vocabulary_id: "v".to_string(),
            standard_flag: "Valid".to_string(),
        }
    }

    #[test]
    fn coverage_counts_per_value_set() {
        let mut result = LookupResult::new();
        result.record_match(LookupType::Static, "sex", "M", concept(8507));
        result.record_match(LookupType::Static, "sex", "F", concept(8532));
        result.record_miss(LookupType::Static, "sex", "X");
        result.record_match(LookupType::Structural, "ecrf", "", concept(32817));

        let coverage = result.coverage_by_field(LookupType::Static);
        let sex = &coverage["sex"];
        assert_eq!((sex.matched, sex.missed, sex.total), (2, 1, 3));
        assert_eq!(sex.coverage_fraction, 0.66667);

        let all = result.all_coverage();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].value_set, "ecrf");
        assert_eq!(all[1].coverage_fraction, 1.0);
    }

    #[test]
    fn missed_list_filters_by_type() {
        let mut result = LookupResult::new();
        result.record_miss(LookupType::Structural, "cdm", "");
        result.record_miss(LookupType::Static, "sex", "X");

        assert_eq!(result.missed_list(Some(LookupType::Static)).len(), 1);
        let all: Vec<LookupType> = result
            .missed_list(None)
            .into_iter()
            .map(|m| m.lookup_type)
            .collect();
        assert_eq!(all, vec![LookupType::Static, LookupType::Structural]);
        assert_eq!(result.missed_count(), 2);
        assert_eq!(result.matched_count(), 0);
    }
}
