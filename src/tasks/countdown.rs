//! Per-question countdown background task

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::broadcast::error::RecvError,
    time::{interval_at, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::state::{AppState, QuestionKey, TimerState};

const TICK: Duration = Duration::from_secs(1);

/// Countdown bound to one question at a time.
///
/// It never decides what the current question is: it is told via
/// [`Countdown::observe`] and restarts whenever the identity changes.
#[derive(Debug, Clone)]
pub struct Countdown {
    limit: Duration,
    question: Option<QuestionKey>,
    deadline: Option<Instant>,
}

impl Countdown {
    /// Create a suspended countdown with the given time per question
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            question: None,
            deadline: None,
        }
    }

    /// Follow the question being asked. Returns true if the countdown restarted
    /// or suspended because the question identity changed.
    pub fn observe(&mut self, question: Option<QuestionKey>, now: Instant) -> bool {
        if self.question == question {
            return false;
        }
        self.question = question;
        self.deadline = question.map(|_| now + self.limit);
        true
    }

    pub fn is_running(&self) -> bool {
        self.question.is_some()
    }

    /// Check the deadline. Returns the question to expire once its time is
    /// up, then starts over so a single expiry is issued per deadline.
    pub fn tick(&mut self, now: Instant) -> Option<QuestionKey> {
        let question = self.question?;
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = Some(now + self.limit);
        Some(question)
    }

    /// Whole seconds left, rounded up
    pub fn remaining_seconds(&self, now: Instant) -> Option<u64> {
        let remaining = self.deadline?.saturating_duration_since(now);
        Some(remaining.as_millis().div_ceil(1000) as u64)
    }

    /// Timer state for observers
    pub fn timer_state(&self, now: Instant) -> TimerState {
        match (self.question, self.remaining_seconds(now)) {
            (Some(question), Some(remaining)) => TimerState::running(question, remaining),
            _ => TimerState::inactive(),
        }
    }
}

fn new_ticker() -> Interval {
    let mut ticker = interval_at(Instant::now() + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

fn publish(state: &AppState, countdown: &Countdown) {
    state.update_timer_state(countdown.timer_state(Instant::now()));
}

/// Follow `question`, restarting the ticker if the countdown was reset
fn follow(countdown: &mut Countdown, ticker: &mut Interval, question: Option<QuestionKey>) -> bool {
    if !countdown.observe(question, Instant::now()) {
        return false;
    }
    match question {
        Some(q) => debug!("Countdown restarted for question {} of session {}", q.index + 1, q.session),
        None => debug!("Quiz not active, countdown suspended"),
    }
    *ticker = new_ticker();
    true
}

/// Background task that advances the quiz when a question's time runs out.
///
/// It only reacts to quiz snapshots; manual advances reset it because they
/// change the question identity, not because anyone tells it to.
pub async fn countdown_task(state: Arc<AppState>) {
    info!("Starting countdown task ({}s per question)", state.question_time_limit);

    let mut state_rx = state.subscribe();
    let mut countdown = Countdown::new(Duration::from_secs(state.question_time_limit));

    match state.get_snapshot() {
        Ok(snapshot) => {
            countdown.observe(snapshot.question_key(), Instant::now());
        }
        Err(e) => error!("Failed to read initial quiz state: {}", e),
    }
    // Ticker starts with the initial deadline so the first expiry is on time
    let mut ticker = new_ticker();
    publish(&state, &countdown);

    loop {
        tokio::select! {
            // Tick - check the deadline
            _ = ticker.tick(), if countdown.is_running() => {
                if let Some(question) = countdown.tick(Instant::now()) {
                    info!("Time is up for question {} of session {}, advancing",
                          question.index + 1, question.session);

                    match state.expire_question(question) {
                        Ok((transition, snapshot)) if !transition.is_applied() => {
                            debug!("Expiry for stale question ignored, resynchronizing");
                            follow(&mut countdown, &mut ticker, snapshot.question_key());
                        }
                        Ok(_) => {}
                        Err(e) => error!("Failed to advance timed out question: {}", e),
                    }
                }
                publish(&state, &countdown);
            }

            // State change - restart or suspend if the question changed
            received = state_rx.recv() => {
                let question = match received {
                    Ok(snapshot) => snapshot.question_key(),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Countdown missed {} quiz updates, resynchronizing", skipped);
                        match state.get_snapshot() {
                            Ok(snapshot) => snapshot.question_key(),
                            Err(e) => {
                                error!("Failed to read quiz state: {}", e);
                                continue;
                            }
                        }
                    }
                    Err(RecvError::Closed) => {
                        info!("Quiz state channel closed, stopping countdown task");
                        break;
                    }
                };

                if follow(&mut countdown, &mut ticker, question) {
                    publish(&state, &countdown);
                }
            }
        }
    }
}
