//! Quiz Runner - A state-managed HTTP server running a timed trivia quiz
//!
//! This is the main entry point for the quiz-runner application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use quiz_runner::{
    config::Config,
    state::AppState,
    api::create_router,
    tasks::countdown_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("quiz_runner={},tower_http=info", config.log_level()))
        .init();

    info!("Starting quiz-runner server v{}", env!("CARGO_PKG_VERSION"));

    let source = config.question_source()?;
    info!("Configuration: host={}, port={}, time_limit={}s, source={}",
          config.host, config.port, config.question_time_limit(), source.describe());

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.question_time_limit(),
        source,
    ));

    // Start the countdown background task
    let countdown_state = Arc::clone(&state);
    tokio::spawn(async move {
        countdown_task(countdown_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start         - Load questions and begin the quiz");
    info!("  POST /answer        - Select an option ({{\"option\": \"...\"}})");
    info!("  POST /next          - Score the selection and move on");
    info!("  POST /previous      - Go back one question");
    info!("  POST /goto/:index   - Jump to a question");
    info!("  POST /restart       - Reset the quiz");
    info!("  GET  /status        - Current quiz state and countdown");
    info!("  GET  /health        - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
