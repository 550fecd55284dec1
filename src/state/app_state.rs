//! Shared application state
//!
//! Owns the quiz behind a single lock so commands from HTTP handlers and the
//! countdown task are applied one at a time, and broadcasts a snapshot after
//! every command that changed something. Snapshots are sent while the lock is
//! still held, so observers see them in the order commands were applied.

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{validate_questions, Command, Lifecycle, QuestionKey, QuizSnapshot, QuizState, TimerState, Transition};
use crate::{error::QuizError, services::QuestionSource};

/// Main application state that owns the quiz and the countdown state
pub struct AppState {
    /// The quiz aggregate, only mutated through `dispatch_if`
    pub quiz: Arc<Mutex<QuizState>>,
    /// Where questions come from on every start
    pub source: Arc<dyn QuestionSource>,
    /// Seconds allowed per question
    pub question_time_limit: u64,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for quiz snapshots after each applied command
    pub state_change_tx: broadcast::Sender<QuizSnapshot>,
    /// Latest countdown state, written by the countdown task only
    pub timer_update_tx: watch::Sender<TimerState>,
}

impl AppState {
    /// Create a new AppState with an idle quiz
    pub fn new(port: u16, host: String, question_time_limit: u64, source: Arc<dyn QuestionSource>) -> Self {
        let (state_change_tx, _) = broadcast::channel(100);
        let (timer_update_tx, _) = watch::channel(TimerState::new());

        Self {
            quiz: Arc::new(Mutex::new(QuizState::new())),
            source,
            question_time_limit,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            state_change_tx,
            timer_update_tx,
        }
    }

    /// Apply a command to the quiz
    pub fn dispatch(&self, command: Command) -> Result<(Transition, QuizSnapshot), QuizError> {
        self.dispatch_if(|_| true, command)
    }

    /// Apply a command only if `guard` holds for the state it would be applied to.
    ///
    /// Guard and command run under the same lock, so nothing can slip in between.
    pub fn dispatch_if<G>(&self, guard: G, command: Command) -> Result<(Transition, QuizSnapshot), QuizError>
    where
        G: FnOnce(&QuizState) -> bool,
    {
        let action = command.name();
        let mut quiz = self.quiz.lock()
            .map_err(|e| QuizError::StateUnavailable(format!("Failed to lock quiz state: {}", e)))?;

        let transition = if guard(&*quiz) {
            quiz.apply(command)
        } else {
            Transition::Ignored
        };
        let snapshot = quiz.snapshot();

        if !transition.is_applied() {
            drop(quiz);
            debug!("Ignored '{}' command in {} state", action, snapshot.lifecycle.name());
            return Ok((transition, snapshot));
        }

        // Notify observers before releasing the lock (this drives the countdown)
        if let Err(e) = self.state_change_tx.send(snapshot.clone()) {
            debug!("No observers for quiz state change: {}", e);
        }
        drop(quiz);

        debug!("Applied '{}': lifecycle={}, index={:?}, score={}",
               action, snapshot.lifecycle.name(), snapshot.current_index, snapshot.score);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok((transition, snapshot))
    }

    /// Start a quiz session: mark loading, fetch questions, then load or fail.
    ///
    /// The fetch runs in its own task, so a caller that goes away mid-fetch
    /// (a disconnected HTTP client) cannot leave the quiz stuck in loading.
    /// A fetch that finishes after the quiz was restarted, or after another
    /// start already loaded questions, is discarded.
    pub async fn start_quiz(self: &Arc<Self>) -> Result<(Transition, QuizSnapshot), QuizError> {
        let (transition, snapshot) = self.dispatch(Command::BeginLoad)?;
        if !transition.is_applied() {
            return Ok((transition, snapshot));
        }

        let state = Arc::clone(self);
        let session = snapshot.session;
        tokio::spawn(async move { state.finish_load(session).await })
            .await
            .map_err(|e| QuizError::StateUnavailable(format!("Question loading task failed: {}", e)))?
    }

    async fn finish_load(&self, session: u64) -> Result<(Transition, QuizSnapshot), QuizError> {
        let still_loading = move |quiz: &QuizState| {
            quiz.session == session && quiz.lifecycle == Lifecycle::Loading
        };

        info!("Fetching questions from {}", self.source.describe());
        let fetched = match self.source.fetch_questions().await {
            Ok(questions) => validate_questions(&questions).map(|_| questions),
            Err(e) => Err(e),
        };

        match fetched {
            Ok(questions) => {
                info!("Loaded {} questions", questions.len());
                self.dispatch_if(still_loading, Command::Load(questions))
            }
            Err(e) => {
                warn!("Failed to load questions: {}", e);
                self.dispatch_if(still_loading, Command::LoadFailed(e.to_string()))
            }
        }
    }

    /// Force an advance for a question whose countdown expired.
    ///
    /// No-op unless `question` is still the one being asked.
    pub fn expire_question(&self, question: QuestionKey) -> Result<(Transition, QuizSnapshot), QuizError> {
        self.dispatch_if(|quiz| quiz.question_key() == Some(question), Command::Advance)
    }

    /// Subscribe to quiz snapshots
    pub fn subscribe(&self) -> broadcast::Receiver<QuizSnapshot> {
        self.state_change_tx.subscribe()
    }

    /// Get current quiz snapshot
    pub fn get_snapshot(&self) -> Result<QuizSnapshot, QuizError> {
        self.quiz.lock()
            .map(|quiz| quiz.snapshot())
            .map_err(|e| QuizError::StateUnavailable(format!("Failed to lock quiz state: {}", e)))
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> TimerState {
        self.timer_update_tx.borrow().clone()
    }

    /// Watch countdown updates
    pub fn subscribe_timer(&self) -> watch::Receiver<TimerState> {
        self.timer_update_tx.subscribe()
    }

    /// Publish timer state, waking watchers only when it changed
    pub fn update_timer_state(&self, new_state: TimerState) {
        self.timer_update_tx.send_if_modified(|current| {
            if *current == new_state {
                return false;
            }
            *current = new_state;
            true
        });
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{BuiltinSource, QuestionSource};
    use crate::state::Question;
    use async_trait::async_trait;

    struct FailingSource;

    #[async_trait]
    impl QuestionSource for FailingSource {
        async fn fetch_questions(&self) -> Result<Vec<Question>, QuizError> {
            Err(QuizError::SourceUnavailable("connection refused".to_string()))
        }

        fn describe(&self) -> String {
            "failing source".to_string()
        }
    }

    struct BrokenQuestionSource;

    #[async_trait]
    impl QuestionSource for BrokenQuestionSource {
        async fn fetch_questions(&self) -> Result<Vec<Question>, QuizError> {
            Ok(vec![Question::new(1, "q", vec!["a".to_string()], "a")])
        }

        fn describe(&self) -> String {
            "broken source".to_string()
        }
    }

    /// Takes five seconds to answer
    struct SlowSource;

    #[async_trait]
    impl QuestionSource for SlowSource {
        async fn fetch_questions(&self) -> Result<Vec<Question>, QuizError> {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Ok(crate::services::builtin_questions())
        }

        fn describe(&self) -> String {
            "slow source".to_string()
        }
    }

    fn app_with(source: Arc<dyn QuestionSource>) -> Arc<AppState> {
        Arc::new(AppState::new(0, "127.0.0.1".to_string(), 10, source))
    }

    #[tokio::test]
    async fn start_quiz_loads_builtin_questions() {
        let state = app_with(Arc::new(BuiltinSource));
        let (transition, snapshot) = state.start_quiz().await.unwrap();
        assert!(transition.is_applied());
        assert_eq!(snapshot.lifecycle, Lifecycle::Active);
        assert_eq!(snapshot.total, 3);
        assert_eq!(state.get_last_action().0.as_deref(), Some("load"));
    }

    #[tokio::test]
    async fn start_quiz_maps_source_errors_to_failed() {
        let state = app_with(Arc::new(FailingSource));
        let (_, snapshot) = state.start_quiz().await.unwrap();
        match snapshot.lifecycle {
            Lifecycle::Failed(reason) => assert!(reason.contains("connection refused")),
            other => panic!("expected failed lifecycle, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn start_quiz_rejects_invalid_questions() {
        let state = app_with(Arc::new(BrokenQuestionSource));
        let (_, snapshot) = state.start_quiz().await.unwrap();
        assert!(matches!(snapshot.lifecycle, Lifecycle::Failed(_)));
    }

    #[tokio::test]
    async fn start_is_ignored_while_active() {
        let state = app_with(Arc::new(BuiltinSource));
        state.start_quiz().await.unwrap();
        let (transition, snapshot) = state.start_quiz().await.unwrap();
        assert_eq!(transition, Transition::Ignored);
        assert_eq!(snapshot.session, 1);
    }

    #[tokio::test]
    async fn stale_expiry_is_a_no_op() {
        let state = app_with(Arc::new(BuiltinSource));
        let (_, snapshot) = state.start_quiz().await.unwrap();
        let first = snapshot.question_key().unwrap();

        state.dispatch(Command::Advance).unwrap();
        let (transition, snapshot) = state.expire_question(first).unwrap();
        assert_eq!(transition, Transition::Ignored);
        assert_eq!(snapshot.current_index, Some(1));

        let current = snapshot.question_key().unwrap();
        let (transition, snapshot) = state.expire_question(current).unwrap();
        assert!(transition.is_applied());
        assert_eq!(snapshot.current_index, Some(2));
    }

    #[tokio::test]
    async fn applied_commands_are_broadcast() {
        let state = app_with(Arc::new(BuiltinSource));
        let mut rx = state.subscribe();
        state.start_quiz().await.unwrap();

        assert_eq!(rx.recv().await.unwrap().lifecycle, Lifecycle::Loading);
        assert_eq!(rx.recv().await.unwrap().lifecycle, Lifecycle::Active);

        // ignored commands are not broadcast
        state.dispatch(Command::GoToPrevious).unwrap();
        state.dispatch(Command::Restart).unwrap();
        assert_eq!(rx.recv().await.unwrap().lifecycle, Lifecycle::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_start_still_finishes_loading() {
        let state = app_with(Arc::new(SlowSource));

        let abandoned = tokio::time::timeout(std::time::Duration::from_secs(1), state.start_quiz()).await;
        assert!(abandoned.is_err());
        assert_eq!(state.get_snapshot().unwrap().lifecycle, Lifecycle::Loading);

        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        let snapshot = state.get_snapshot().unwrap();
        assert_eq!(snapshot.lifecycle, Lifecycle::Active);
        assert_eq!(snapshot.total, 3);
    }

    #[test]
    fn timer_updates_reach_watchers_only_on_change() {
        let state = app_with(Arc::new(BuiltinSource));
        let mut rx = state.subscribe_timer();
        let running = TimerState::running(QuestionKey { session: 1, index: 0 }, 10);

        state.update_timer_state(running.clone());
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), running);

        state.update_timer_state(running.clone());
        assert!(!rx.has_changed().unwrap());
        assert_eq!(state.get_timer_state(), running);
    }
}
