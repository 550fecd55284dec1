//! Question source module
//!
//! This module contains the sources a quiz session can draw its questions
//! from: the built-in list, a JSON file, or a remote trivia server.

pub mod source;
pub mod trivia;

// Re-export main types
pub use source::{builtin_questions, BuiltinSource, FileSource, QuestionSource};
pub use trivia::{TriviaSource, DEFAULT_TRIVIA_URL};
