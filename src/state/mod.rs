//! State management module
//!
//! This module contains the quiz state machine, the countdown state, and the
//! shared application state that serializes commands and notifies observers.

pub mod app_state;
pub mod question;
pub mod quiz_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use question::{validate_questions, Question};
pub use quiz_state::{Command, Lifecycle, QuestionKey, QuizSnapshot, QuizState, QuestionView, Transition};
pub use timer_state::TimerState;
