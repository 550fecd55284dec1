//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::state::{AppState, Command, Lifecycle, QuizSnapshot, Transition};
use super::responses::{AnswerRequest, ApiResponse, HealthResponse, StatusResponse};

/// Apply a command and wrap the outcome in an API response
fn run_command<F>(state: &AppState, command: Command, describe: F) -> Result<Json<ApiResponse>, StatusCode>
where
    F: FnOnce(Transition, &QuizSnapshot) -> String,
{
    let action = command.name();
    match state.dispatch(command) {
        Ok((transition, quiz)) => {
            let message = describe(transition, &quiz);
            Ok(Json(ApiResponse::from_transition(transition, message, quiz)))
        }
        Err(e) => {
            error!("Failed to apply '{}' command: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn not_active(quiz: &QuizSnapshot) -> String {
    format!("Quiz is {}", quiz.lifecycle.name())
}

/// Handle POST /start - Fetch questions and begin a session
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.start_quiz().await {
        Ok((transition, quiz)) => {
            let response = match (&quiz.lifecycle, transition) {
                (Lifecycle::Failed(reason), _) => ApiResponse::error(format!("Failed to load questions: {}", reason), quiz.clone()),
                (Lifecycle::Active, Transition::Applied) => {
                    info!("Quiz started with {} questions", quiz.total);
                    ApiResponse::applied(format!("Quiz started with {} questions", quiz.total), quiz.clone())
                }
                _ => ApiResponse::ignored(format!("Cannot start: {}", not_active(&quiz).to_lowercase()), quiz.clone()),
            };
            Ok(Json(response))
        }
        Err(e) => {
            error!("Failed to start quiz: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /answer - Select an option for the current question
pub async fn answer_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let option = request.option.clone();
    run_command(&state, Command::SelectAnswer(request.option), |transition, quiz| match transition {
        Transition::Applied => format!("Selected '{}'", option),
        Transition::Ignored if quiz.lifecycle == Lifecycle::Active => {
            format!("'{}' is not an option for this question", option)
        }
        Transition::Ignored => not_active(quiz),
    })
}

/// Handle POST /next - Score the selection and move on
pub async fn next_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_command(&state, Command::Advance, |transition, quiz| match (transition, &quiz.lifecycle) {
        (Transition::Applied, Lifecycle::Completed) => {
            info!("Quiz completed with score {}/{}", quiz.score, quiz.total);
            format!("Quiz completed with score {}/{}", quiz.score, quiz.total)
        }
        (Transition::Applied, _) => format!("Moved to question {} of {}", quiz.current_index.map_or(0, |i| i + 1), quiz.total),
        (Transition::Ignored, _) => not_active(quiz),
    })
}

/// Handle POST /previous - Go back one question
pub async fn previous_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_command(&state, Command::GoToPrevious, |transition, quiz| match transition {
        Transition::Applied => format!("Moved back to question {}", quiz.current_index.map_or(0, |i| i + 1)),
        Transition::Ignored if quiz.lifecycle == Lifecycle::Active => "Already at the first question".to_string(),
        Transition::Ignored => not_active(quiz),
    })
}

/// Handle POST /goto/:index - Jump to a question by zero-based index
pub async fn goto_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<ApiResponse>, StatusCode> {
    run_command(&state, Command::GoTo(index), |transition, quiz| match transition {
        Transition::Applied => format!("Moved to question {} of {}", index + 1, quiz.total),
        Transition::Ignored if quiz.lifecycle == Lifecycle::Active => {
            format!("No question at index {} (quiz has {})", index, quiz.total)
        }
        Transition::Ignored => not_active(quiz),
    })
}

/// Handle POST /restart - Reset to the start screen
pub async fn restart_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    info!("Restart endpoint called");
    run_command(&state, Command::Restart, |_, _| "Quiz reset".to_string())
}

/// Handle GET /status - Return the quiz snapshot and countdown
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let quiz = match state.get_snapshot() {
        Ok(q) => q,
        Err(e) => {
            error!("Failed to get quiz state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let timer_state = state.get_timer_state();

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        quiz,
        timer_active: timer_state.active,
        timer_remaining_seconds: timer_state.remaining_seconds(),
        question_time_limit: state.question_time_limit,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
