#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("{table}: unmapped {value_set} value {value:?} for patient {patient_id}")]
    UnmappedValue {
        table: &'static str,
        patient_id: String,
        value_set: String,
        value: String,
    },

    #[error("{table}.{column}: required field is null (row id {})", display_row_id(.row_id))]
    RequiredFieldViolation {
        table: &'static str,
        column: &'static str,
        row_id: Option<i64>,
    },

    #[error("duplicate patient id: {patient_id}")]
    DuplicatePatientId { patient_id: String },
}

fn display_row_id(row_id: &Option<i64>) -> String {
    row_id.map_or_else(|| "none".to_string(), |id| id.to_string())
}

pub type Result<T> = std::result::Result<T, BuildError>;
