use std::collections::HashMap;
use std::path::Path;

use omop_model::SemanticRow;
use omop_vocab::{SemanticCorpus, VocabError};

use crate::model::{BatchQueryResult, Query, QueryResult};

/// Exact-match lookup over the semantic corpus.
///
/// Query text must equal a corpus term byte for byte (both sides are
/// normalized on the way in). There is no fuzzy or prefix matching.
#[derive(Debug, Clone, Default)]
pub struct SemanticIndex {
    corpus: SemanticCorpus,
}

impl SemanticIndex {
    pub fn new(corpus: SemanticCorpus) -> Self {
        Self { corpus }
    }

    pub fn load(path: &Path) -> Result<Self, VocabError> {
        SemanticCorpus::load(path).map(Self::new)
    }

    /// Accepted candidates for one query, filtered by its target.
    pub fn candidates(&self, query: &Query) -> Vec<SemanticRow> {
        let Some(rows) = self.corpus.candidates(&query.query) else {
            return Vec::new();
        };
        match &query.target {
            Some(target) => rows.iter().filter(|row| target.accepts(row)).cloned().collect(),
            None => rows.to_vec(),
        }
    }

    /// Resolves a batch of queries, keeping query order.
    pub fn lookup_exact(&self, queries: impl IntoIterator<Item = Query>) -> BatchQueryResult {
        let results: Vec<QueryResult> = queries
            .into_iter()
            .map(|query| QueryResult {
                patient_id: query.patient_id.clone(),
                results: self.candidates(&query),
                query,
            })
            .collect();
        let batch = BatchQueryResult { results };
        tracing::debug!(
            queries = batch.len(),
            matched = batch.match_count(),
            missed = batch.miss_count(),
            "semantic lookup finished"
        );
        batch
    }

    pub fn corpus(&self) -> &SemanticCorpus {
        &self.corpus
    }
}

type Location = (String, String, Option<usize>);

/// Resolved batch results keyed by where each query came from.
#[derive(Debug, Clone, Default)]
pub struct SemanticResultIndex {
    by_location: HashMap<Location, QueryResult>,
}

impl SemanticResultIndex {
    pub fn from_batch(batch: &BatchQueryResult) -> Self {
        let by_location = batch
            .results
            .iter()
            .map(|result| {
                let key = (
                    result.patient_id.clone(),
                    result.query.dotted_path(),
                    result.query.leaf_index,
                );
                (key, result.clone())
            })
            .collect();
        Self { by_location }
    }

    /// The result for `(patient_id, field_path, leaf_index)`, if a query was made there.
    pub fn lookup_at(
        &self,
        patient_id: &str,
        field_path: &[&str],
        leaf_index: Option<usize>,
    ) -> Option<&QueryResult> {
        let key = (patient_id.to_string(), field_path.join("."), leaf_index);
        self.by_location.get(&key)
    }

    pub fn len(&self) -> usize {
        self.by_location.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_location.is_empty()
    }
}
