//! Quiz Runner - A state-managed HTTP server running a timed trivia quiz
//!
//! This library provides the quiz state machine, the per-question countdown
//! that advances the quiz when time runs out, the question sources, and the
//! HTTP API used to play.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::QuizError;
pub use state::{AppState, Command, Lifecycle, QuizSnapshot, QuizState};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
