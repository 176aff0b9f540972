use thiserror::Error;

/// Errors raised while constructing model values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A questionnaire item number outside `1..=30`.
    #[error("invalid C30 question number {question} (expected 1..={max})")]
    InvalidQuestion { question: usize, max: usize },
    /// An answer code outside the item's scale.
    #[error("invalid C30 answer code {code} for question {question} (expected 1..={max})")]
    InvalidAnswerCode { question: usize, code: i64, max: i64 },
}

pub type Result<T> = std::result::Result<T, ModelError>;
