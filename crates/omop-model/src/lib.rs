#![deny(unsafe_code)]

pub mod c30;
pub mod concept;
pub mod coverage;
pub mod error;
pub mod patient;
pub mod record;
pub mod rows;
pub mod table;
pub mod tables;

pub use c30::C30;
pub use concept::{MappedConcept, SemanticRow, StaticConcept, StructuralConcept};
pub use coverage::coverage_fraction;
pub use error::{ModelError, Result};
pub use patient::{
    AdverseEvent, BestOverallResponse, Biomarkers, ConcomitantMedication, EcogBaseline,
    MedicalHistory, Patient, PreviousTreatment, StudyDrugs, TumorAssessment,
    TumorAssessmentBaseline, TumorType,
};
pub use record::{Field, Record};
pub use rows::{
    CdmSourceRow, ConditionOccurrenceRow, ObservationPeriodRow, PersonRow, VisitOccurrenceRow,
};
pub use table::{CellValue, ColumnSpec, TableRow, TableSchema};
pub use tables::{OmopRow, OmopTables, TABLE_SCHEMAS, schema_for};
