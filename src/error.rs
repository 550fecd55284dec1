//! Error types for the quiz runner

use thiserror::Error;

/// Errors surfaced by question sources and the shared quiz state.
///
/// Commands issued outside their valid lifecycle are not errors: the store
/// ignores them. Only loading and state access can fail.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The question source could not produce a question list
    #[error("question source unavailable: {0}")]
    SourceUnavailable(String),

    /// The source produced a question that breaks the question rules
    #[error("invalid question {id}: {reason}")]
    InvalidQuestion {
        /// Id of the offending question
        id: u32,
        /// What is wrong with it
        reason: String,
    },

    /// The shared state lock is poisoned
    #[error("quiz state unavailable: {0}")]
    StateUnavailable(String),
}

impl From<reqwest::Error> for QuizError {
    fn from(e: reqwest::Error) -> Self {
        Self::SourceUnavailable(e.to_string())
    }
}

impl From<std::io::Error> for QuizError {
    fn from(e: std::io::Error) -> Self {
        Self::SourceUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for QuizError {
    fn from(e: serde_json::Error) -> Self {
        Self::SourceUnavailable(format!("malformed question data: {}", e))
    }
}
