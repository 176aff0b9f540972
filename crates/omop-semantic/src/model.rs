//! Query and result types for semantic lookup.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use omop_model::{SemanticRow, coverage_fraction};
use serde::{Deserialize, Serialize};

/// OMOP domains a semantic query may be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OmopDomain {
    Condition,
    Drug,
    Measurement,
    Procedure,
    Observation,
    Device,
}

impl OmopDomain {
    pub const ALL: [OmopDomain; 6] = [
        OmopDomain::Condition,
        OmopDomain::Drug,
        OmopDomain::Measurement,
        OmopDomain::Procedure,
        OmopDomain::Observation,
        OmopDomain::Device,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OmopDomain::Condition => "condition",
            OmopDomain::Drug => "drug",
            OmopDomain::Measurement => "measurement",
            OmopDomain::Procedure => "procedure",
            OmopDomain::Observation => "observation",
            OmopDomain::Device => "device",
        }
    }
}

impl fmt::Display for OmopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OmopDomain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        OmopDomain::ALL
            .into_iter()
            .find(|domain| domain.as_str() == normalized)
            .ok_or_else(|| format!("unknown OMOP domain: {s}"))
    }
}

/// Restricts which corpus candidates a query accepts.
///
/// Each set is optional; `None` places no restriction on that column.
/// Comparisons ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryTarget {
    pub domains: Option<BTreeSet<OmopDomain>>,
    pub vocabularies: Option<BTreeSet<String>>,
    pub concept_classes: Option<BTreeSet<String>>,
    pub standard_flags: Option<BTreeSet<String>>,
    pub validity: Option<BTreeSet<String>>,
}

impl QueryTarget {
    pub fn domains(domains: impl IntoIterator<Item = OmopDomain>) -> Self {
        Self {
            domains: Some(domains.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn accepts(&self, row: &SemanticRow) -> bool {
        let domain_ok = self.domains.as_ref().is_none_or(|domains| {
            domains
                .iter()
                .any(|d| d.as_str().eq_ignore_ascii_case(row.omop_domain.trim()))
        });
        domain_ok
            && allows(self.vocabularies.as_ref(), &row.omop_vocab)
            && allows(self.concept_classes.as_ref(), &row.omop_class)
            && allows(self.standard_flags.as_ref(), &row.omop_concept)
            && allows(self.validity.as_ref(), &row.omop_validity)
    }
}

fn allows(set: Option<&BTreeSet<String>>, value: &str) -> bool {
    set.is_none_or(|set| {
        set.iter()
            .any(|allowed| allowed.trim().eq_ignore_ascii_case(value.trim()))
    })
}

/// Names a patient attribute path to extract queries from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub field_path: Vec<String>,
    #[serde(default)]
    pub target: Option<QueryTarget>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, field_path: &[&str]) -> Self {
        Self {
            name: name.into(),
            field_path: field_path.iter().map(ToString::to_string).collect(),
            target: None,
            tags: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: QueryTarget) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(ToString::to_string).collect();
        self
    }

    /// `field_path` joined with `.`.
    pub fn dotted_path(&self) -> String {
        self.field_path.join(".")
    }
}

/// One resolvable leaf value extracted from a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub id: String,
    pub patient_id: String,
    /// Lowercased, trimmed text matched against the corpus.
    pub query: String,
    pub field_path: Vec<String>,
    /// Position within a collection attribute; `None` for singletons.
    pub leaf_index: Option<usize>,
    pub target: Option<QueryTarget>,
    pub raw_value: String,
}

impl Query {
    pub fn dotted_path(&self) -> String {
        self.field_path.join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub patient_id: String,
    pub query: Query,
    pub results: Vec<SemanticRow>,
}

impl QueryResult {
    pub fn is_match(&self) -> bool {
        !self.results.is_empty()
    }
}

/// Lookup outcome for one field path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldPathCoverage {
    pub field_path: String,
    pub matched: usize,
    pub missed: usize,
    pub total: usize,
    pub coverage_fraction: f64,
}

/// Results of one batch lookup, in query order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchQueryResult {
    pub results: Vec<QueryResult>,
}

impl BatchQueryResult {
    pub fn matches(&self) -> impl Iterator<Item = &QueryResult> {
        self.results.iter().filter(|r| r.is_match())
    }

    /// Queries that found no accepted candidate.
    pub fn missing(&self) -> impl Iterator<Item = &Query> {
        self.results
            .iter()
            .filter(|r| !r.is_match())
            .map(|r| &r.query)
    }

    pub fn match_count(&self) -> usize {
        self.matches().count()
    }

    pub fn miss_count(&self) -> usize {
        self.results.len() - self.match_count()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn coverage_by_field_path(&self) -> BTreeMap<String, FieldPathCoverage> {
        let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for result in &self.results {
            let entry = counts.entry(result.query.dotted_path()).or_default();
            if result.is_match() {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
        counts
            .into_iter()
            .map(|(field_path, (matched, missed))| {
                let coverage = FieldPathCoverage {
                    field_path: field_path.clone(),
                    matched,
                    missed,
                    total: matched + missed,
                    coverage_fraction: coverage_fraction(matched, missed),
                };
                (field_path, coverage)
            })
            .collect()
    }
}
