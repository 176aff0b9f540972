use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum VocabError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("missing required column `{column}` in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("invalid number `{value}` in column `{column}` of {path} (line {line})")]
    InvalidNumber {
        path: PathBuf,
        column: String,
        value: String,
        line: u64,
    },
}

impl VocabError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, error: &csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VocabError>;
