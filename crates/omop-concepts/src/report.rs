use serde::Serialize;

use crate::lookup::{FieldCoverage, LookupResult, LookupType, MissedLookup};

/// End-of-run view of concept lookup outcomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupReport {
    /// Sorted by lookup type, then value set.
    pub coverage: Vec<FieldCoverage>,
    pub missed: Vec<MissedLookup>,
    pub matched_total: usize,
    pub missed_total: usize,
}

impl LookupReport {
    pub fn from_result(result: &LookupResult) -> Self {
        let coverage = [LookupType::Static, LookupType::Structural, LookupType::Semantic]
            .into_iter()
            .flat_map(|lookup_type| result.coverage_by_field(lookup_type).into_values())
            .collect();
        Self {
            coverage,
            missed: result.missed_list(None).into_iter().cloned().collect(),
            matched_total: result.matched_count(),
            missed_total: result.missed_count(),
        }
    }

    pub fn has_misses(&self) -> bool {
        self.missed_total > 0
    }

    /// Coverage rows for value sets with at least one miss.
    pub fn incomplete(&self) -> impl Iterator<Item = &FieldCoverage> {
        self.coverage.iter().filter(|c| c.missed > 0)
    }
}
