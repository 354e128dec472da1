//! Unified core error handling
//!
//! Provides the error taxonomy shared by the estimation pipeline and its
//! collaborator clients.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The free-text query was missing or blank. Fails the request.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A catalog record could not be normalized. Skip-and-continue at
    /// ingestion; never aborts a batch.
    #[error("Malformed catalog record: {0}")]
    Parse(String),

    /// No documents were available to index.
    #[error("Catalog is empty, nothing to index")]
    EmptyCatalog,

    /// The retrieval index was queried before build, or during a rebuild.
    #[error("Retrieval index is not ready")]
    IndexNotReady,

    /// The AI advisor failed or returned unusable output. Callers fall
    /// back to the deterministic path; never fatal on its own.
    #[error("AI advisor unavailable: {0}")]
    AdvisorUnavailable(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl CoreError {
    /// Stable machine-readable code, used by the HTTP layer for responses
    /// and by log aggregation.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::Parse(_) => "MALFORMED_RECORD",
            Self::EmptyCatalog => "EMPTY_CATALOG",
            Self::IndexNotReady => "INDEX_NOT_READY",
            Self::AdvisorUnavailable(_) => "ADVISOR_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::InvalidQuery(msg) => msg.clone(),
            Self::Parse(msg) => msg.clone(),
            Self::EmptyCatalog => "No catalog documents are available".to_string(),
            Self::IndexNotReady => "The catalog index is still being prepared".to_string(),
            Self::AdvisorUnavailable(_) => "The estimation advisor is unavailable".to_string(),
            // Don't leak internal error details
            Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }

    /// Message safe to surface to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, "Internal core error");
                self.public_message()
            }
            _ => {
                tracing::warn!(error = %self, "Core error");
                self.public_message()
            }
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
