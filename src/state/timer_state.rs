//! Countdown state as published to observers

use serde::{Deserialize, Serialize};

use super::QuestionKey;

/// Timer state for the per-question countdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub active: bool,
    pub remaining_seconds: Option<u64>,
    /// The question the countdown is running for
    pub question: Option<QuestionKey>,
}

impl TimerState {
    /// Create a new inactive timer state
    pub fn new() -> Self {
        Self::inactive()
    }

    /// Create a running timer state for a question
    pub fn running(question: QuestionKey, remaining_seconds: u64) -> Self {
        Self {
            active: true,
            remaining_seconds: Some(remaining_seconds),
            question: Some(question),
        }
    }

    /// Create a suspended timer state
    pub fn inactive() -> Self {
        Self {
            active: false,
            remaining_seconds: None,
            question: None,
        }
    }

    /// Get remaining seconds if timer is active
    pub fn remaining_seconds(&self) -> Option<u64> {
        if self.active {
            self.remaining_seconds
        } else {
            None
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}
