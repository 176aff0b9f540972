use std::path::PathBuf;

use omop_concepts::LookupReport;
use omop_semantic::FieldPathCoverage;

#[derive(Debug)]
pub struct BuildResult {
    pub output_dir: PathBuf,
    pub patients: usize,
    pub tables: Vec<TableSummary>,
    pub lookups: LookupReport,
    pub semantic: Option<SemanticSummary>,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct TableSummary {
    pub table: String,
    pub rows: usize,
    pub output: Option<PathBuf>,
}

#[derive(Debug)]
pub struct SemanticSummary {
    pub queries: usize,
    pub matched: usize,
    pub coverage: Vec<FieldPathCoverage>,
    pub matches_file: Option<PathBuf>,
    pub missing_file: Option<PathBuf>,
}
