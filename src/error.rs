use std::fmt;

/// Which half of the two-request search protocol raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Count,
    Data,
}

impl fmt::Display for QueryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryPhase::Count => f.write_str("count"),
            QueryPhase::Data => f.write_str("data"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TedError {
    #[error("{phase} query failed: {status} {reason}")]
    QueryExecution {
        phase: QueryPhase,
        status: u16,
        reason: String,
    },

    #[error("{phase} query transport error: {message}")]
    Transport { phase: QueryPhase, message: String },

    #[error("{phase} query timed out: {message}")]
    Timeout { phase: QueryPhase, message: String },

    #[error("{phase} query returned an unreadable response: {message}")]
    InvalidResponse { phase: QueryPhase, message: String },

    #[error("Tender {ted_id} is already saved for {owner}")]
    DuplicateRecord { owner: String, ted_id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A background task panicked or left the shared explorer poisoned.
    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl TedError {
    /// The search phase this error belongs to, if it came from the endpoint.
    pub fn phase(&self) -> Option<QueryPhase> {
        match self {
            TedError::QueryExecution { phase, .. }
            | TedError::Transport { phase, .. }
            | TedError::Timeout { phase, .. }
            | TedError::InvalidResponse { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TedError>;
