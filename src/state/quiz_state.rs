//! Quiz state machine
//!
//! `QuizState` is the single aggregate holding questions, position, score and
//! lifecycle. It only changes through [`QuizState::apply`], which handles one
//! [`Command`] at a time. Commands whose preconditions do not hold leave the
//! state untouched and report [`Transition::Ignored`]; out-of-order events
//! such as a stale timer expiry are expected and must be harmless.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Question;

/// Coarse lifecycle of a quiz session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum Lifecycle {
    #[default]
    Idle,
    Loading,
    Active,
    Completed,
    Failed(String),
}

impl Lifecycle {
    pub fn name(&self) -> &'static str {
        match self {
            Lifecycle::Idle => "idle",
            Lifecycle::Loading => "loading",
            Lifecycle::Active => "active",
            Lifecycle::Completed => "completed",
            Lifecycle::Failed(_) => "failed",
        }
    }
}

/// Commands understood by the quiz state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A question fetch has started
    BeginLoad,
    /// Questions arrived, start a new session
    Load(Vec<Question>),
    /// The question source reported an error
    LoadFailed(String),
    /// Record the user's choice for the current question
    SelectAnswer(String),
    /// Score the current selection (once per index) and move on
    Advance,
    GoToPrevious,
    GoTo(usize),
    Restart,
}

impl Command {
    /// Short name used for logging and last-action tracking
    pub fn name(&self) -> &'static str {
        match self {
            Command::BeginLoad => "begin-load",
            Command::Load(_) => "load",
            Command::LoadFailed(_) => "load-failed",
            Command::SelectAnswer(_) => "answer",
            Command::Advance => "next",
            Command::GoToPrevious => "previous",
            Command::GoTo(_) => "goto",
            Command::Restart => "restart",
        }
    }
}

/// Result of applying a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

impl Transition {
    pub fn is_applied(self) -> bool {
        self == Transition::Applied
    }
}

/// Identity of the question currently being asked.
///
/// The session counter changes on every load and restart, so the same index
/// in a new session is a different question as far as the countdown cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionKey {
    pub session: u64,
    pub index: usize,
}

/// The quiz aggregate
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizState {
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub selected_answer: Option<String>,
    pub answered_indices: BTreeSet<usize>,
    pub score: u32,
    pub lifecycle: Lifecycle,
    pub session: u64,
}

impl QuizState {
    /// Create an idle quiz with no questions
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a command, returning whether it changed anything
    pub fn apply(&mut self, command: Command) -> Transition {
        match command {
            Command::BeginLoad => self.begin_load(),
            Command::Load(questions) => self.load(questions),
            Command::LoadFailed(reason) => self.load_failed(reason),
            Command::SelectAnswer(option) => self.select_answer(option),
            Command::Advance => self.advance(),
            Command::GoToPrevious => self.go_to_previous(),
            Command::GoTo(index) => self.go_to(index),
            Command::Restart => self.restart(),
        }
    }

    fn begin_load(&mut self) -> Transition {
        match self.lifecycle {
            Lifecycle::Idle | Lifecycle::Failed(_) => {
                self.lifecycle = Lifecycle::Loading;
                Transition::Applied
            }
            _ => Transition::Ignored,
        }
    }

    fn load(&mut self, questions: Vec<Question>) -> Transition {
        match self.lifecycle {
            Lifecycle::Idle | Lifecycle::Loading | Lifecycle::Failed(_) => {
                self.questions = questions;
                self.current_index = 0;
                self.selected_answer = None;
                self.answered_indices.clear();
                self.score = 0;
                self.lifecycle = Lifecycle::Active;
                self.session += 1;
                Transition::Applied
            }
            _ => Transition::Ignored,
        }
    }

    fn load_failed(&mut self, reason: String) -> Transition {
        match self.lifecycle {
            Lifecycle::Idle | Lifecycle::Loading => {
                self.lifecycle = Lifecycle::Failed(reason);
                Transition::Applied
            }
            _ => Transition::Ignored,
        }
    }

    fn select_answer(&mut self, option: String) -> Transition {
        if !self.is_active() {
            return Transition::Ignored;
        }
        match self.current_question() {
            Some(question) if question.has_option(&option) => {
                self.selected_answer = Some(option);
                Transition::Applied
            }
            _ => Transition::Ignored,
        }
    }

    fn advance(&mut self) -> Transition {
        if !self.is_active() {
            return Transition::Ignored;
        }

        let index = self.current_index;
        if let Some(selected) = self.selected_answer.take() {
            // insert() is false on revisits, so an index is scored at most once
            if self.answered_indices.insert(index)
                && self.questions.get(index).is_some_and(|q| q.is_correct(&selected))
            {
                self.score += 1;
            }
        }

        if index + 1 < self.questions.len() {
            self.current_index += 1;
        } else {
            // Reaching the end closes the final question even when it timed out unanswered
            if !self.questions.is_empty() {
                self.answered_indices.insert(index);
            }
            self.lifecycle = Lifecycle::Completed;
        }
        Transition::Applied
    }

    fn go_to_previous(&mut self) -> Transition {
        if !self.is_active() || self.current_index == 0 {
            return Transition::Ignored;
        }
        self.current_index -= 1;
        self.selected_answer = None;
        Transition::Applied
    }

    fn go_to(&mut self, index: usize) -> Transition {
        if !self.is_active() || index >= self.questions.len() {
            return Transition::Ignored;
        }
        self.current_index = index;
        self.selected_answer = None;
        Transition::Applied
    }

    fn restart(&mut self) -> Transition {
        let session = self.session + 1;
        *self = Self {
            session,
            ..Self::default()
        };
        Transition::Applied
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// The question at the current index, if any are loaded
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Identity of the question being asked, only while the quiz is active
    pub fn question_key(&self) -> Option<QuestionKey> {
        self.is_active().then_some(QuestionKey {
            session: self.session,
            index: self.current_index,
        })
    }

    /// Read-only view for observers
    pub fn snapshot(&self) -> QuizSnapshot {
        let shows_question = matches!(self.lifecycle, Lifecycle::Active | Lifecycle::Completed);
        let current_question = if shows_question {
            self.current_question().map(QuestionView::from)
        } else {
            None
        };

        QuizSnapshot {
            lifecycle: self.lifecycle.clone(),
            session: self.session,
            current_index: current_question.as_ref().map(|_| self.current_index),
            total: self.questions.len(),
            current_answered: self.answered_indices.contains(&self.current_index),
            current_question,
            selected_answer: self.selected_answer.clone(),
            score: self.score,
            answered_indices: self.answered_indices.iter().copied().collect(),
        }
    }
}

/// A question as shown to the player, without its answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: u32,
    pub text: String,
    pub options: Vec<String>,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            text: q.text.clone(),
            options: q.options.clone(),
        }
    }
}

/// Snapshot of the quiz published after every command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSnapshot {
    pub lifecycle: Lifecycle,
    pub session: u64,
    pub current_index: Option<usize>,
    pub total: usize,
    pub current_question: Option<QuestionView>,
    pub current_answered: bool,
    pub selected_answer: Option<String>,
    pub score: u32,
    pub answered_indices: Vec<usize>,
}

impl QuizSnapshot {
    /// Identity of the question being asked, only while the quiz is active
    pub fn question_key(&self) -> Option<QuestionKey> {
        match (&self.lifecycle, self.current_index) {
            (Lifecycle::Active, Some(index)) => Some(QuestionKey {
                session: self.session,
                index,
            }),
            // An active quiz with no questions still needs one expiry to complete
            (Lifecycle::Active, None) => Some(QuestionKey {
                session: self.session,
                index: 0,
            }),
            _ => None,
        }
    }
}
