//! Question value type and its validation rules

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Smallest number of options a question may offer
pub const MIN_OPTIONS: usize = 2;
/// Largest number of options a question may offer
pub const MAX_OPTIONS: usize = 4;

/// A single multiple choice question. Never mutated once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    #[serde(alias = "question")]
    pub text: String,
    pub options: Vec<String>,
    #[serde(alias = "answer")]
    pub correct_option: String,
}

impl Question {
    /// Create a new question
    pub fn new(id: u32, text: impl Into<String>, options: Vec<String>, correct_option: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            options,
            correct_option: correct_option.into(),
        }
    }

    /// Check whether `option` is one of this question's options
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// Check whether `option` is the correct answer
    pub fn is_correct(&self, option: &str) -> bool {
        self.correct_option == option
    }

    /// Validate option count, uniqueness and presence of the correct option
    pub fn validate(&self) -> Result<(), QuizError> {
        let invalid = |reason: String| QuizError::InvalidQuestion { id: self.id, reason };

        if self.options.len() < MIN_OPTIONS || self.options.len() > MAX_OPTIONS {
            return Err(invalid(format!(
                "expected {}-{} options, found {}",
                MIN_OPTIONS,
                MAX_OPTIONS,
                self.options.len()
            )));
        }

        let mut seen = HashSet::new();
        for option in &self.options {
            if !seen.insert(option.as_str()) {
                return Err(invalid(format!("duplicate option '{}'", option)));
            }
        }

        if !self.has_option(&self.correct_option) {
            return Err(invalid(format!(
                "correct option '{}' is not among the options",
                self.correct_option
            )));
        }

        Ok(())
    }
}

/// Validate a whole question list, including id uniqueness
pub fn validate_questions(questions: &[Question]) -> Result<(), QuizError> {
    let mut ids = HashSet::new();
    for question in questions {
        question.validate()?;
        if !ids.insert(question.id) {
            return Err(QuizError::InvalidQuestion {
                id: question.id,
                reason: "duplicate question id".to_string(),
            });
        }
    }
    Ok(())
}
