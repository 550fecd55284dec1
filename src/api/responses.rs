//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{QuizSnapshot, Transition};

/// API response structure for command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub quiz: QuizSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, quiz: QuizSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            quiz,
        }
    }

    /// Create a response for a command that changed the quiz
    pub fn applied(message: String, quiz: QuizSnapshot) -> Self {
        Self::new("applied".to_string(), message, quiz)
    }

    /// Create a response for a command the quiz ignored in its current state
    pub fn ignored(message: String, quiz: QuizSnapshot) -> Self {
        Self::new("ignored".to_string(), message, quiz)
    }

    /// Create an error response
    pub fn error(message: String, quiz: QuizSnapshot) -> Self {
        Self::new("error".to_string(), message, quiz)
    }

    /// Pick `applied` or `ignored` from a transition
    pub fn from_transition(transition: Transition, message: String, quiz: QuizSnapshot) -> Self {
        match transition {
            Transition::Applied => Self::applied(message, quiz),
            Transition::Ignored => Self::ignored(message, quiz),
        }
    }
}

/// Body of POST /answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub option: String,
}

/// Status response with countdown information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub quiz: QuizSnapshot,
    pub timer_active: bool,
    pub timer_remaining_seconds: Option<u64>,
    pub question_time_limit: u64,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
