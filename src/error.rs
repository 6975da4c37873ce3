use thiserror::Error;

/// Errors raised while loading inputs or preparing a filtering run.
///
/// Everything here is detected before the cascade starts; once filtering
/// begins no error is produced, so a query without an error has a complete
/// candidate set.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A graph record violates the transaction format.
    #[error("malformed graph input at line {line} (record {record}): {reason}")]
    Malformed {
        line: usize,
        record: String,
        reason: String,
    },

    /// A feature matrix file violates the dense binary matrix format.
    #[error("malformed feature matrix at line {line}: {reason}")]
    MalformedMatrix { line: usize, reason: String },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("schema JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A feature vector was produced with a different schema.
    #[error("{source_name} vector {row} has width {actual}, schema expects {expected}")]
    SchemaMismatch {
        source_name: &'static str,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{what}: {graphs} graphs but {vectors} feature vectors")]
    CountMismatch {
        what: &'static str,
        graphs: usize,
        vectors: usize,
    },
}

impl FilterError {
    pub(crate) fn malformed(line: usize, record: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            record: record.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_matrix(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedMatrix {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
