//! Configuration and CLI argument handling

use std::{path::PathBuf, sync::Arc};

use clap::Parser;

use crate::{
    error::QuizError,
    services::{BuiltinSource, FileSource, QuestionSource, TriviaSource, DEFAULT_TRIVIA_URL},
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "quiz-runner")]
#[command(about = "A state-managed HTTP server running a timed trivia quiz")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Seconds allowed per question before it advances on its own
    #[arg(short, long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub time_limit: u64,

    /// Load questions from a JSON file instead of the built-in list
    #[arg(short, long, conflicts_with = "remote_url")]
    pub questions: Option<PathBuf>,

    /// Fetch questions from an Open Trivia DB compatible endpoint
    /// (opentdb.com when given without a value)
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_TRIVIA_URL)]
    pub remote_url: Option<String>,

    /// Number of questions to request from the remote endpoint
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=50))]
    pub amount: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Seconds allowed per question
    pub fn question_time_limit(&self) -> u64 {
        self.time_limit
    }

    /// Build the question source selected on the command line
    pub fn question_source(&self) -> Result<Arc<dyn QuestionSource>, QuizError> {
        if let Some(path) = &self.questions {
            return Ok(Arc::new(FileSource::new(path.clone())));
        }
        if let Some(url) = &self.remote_url {
            return Ok(Arc::new(TriviaSource::new(url.clone(), self.amount)?));
        }
        Ok(Arc::new(BuiltinSource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("quiz-runner").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.question_time_limit(), 10);
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.question_source().unwrap().describe(), "built-in questions");
    }

    #[test]
    fn verbose_and_time_limit() {
        let config = parse(&["-v", "--time-limit", "30"]).unwrap();
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.question_time_limit(), 30);
    }

    #[test]
    fn zero_time_limit_rejected() {
        assert!(parse(&["--time-limit", "0"]).is_err());
    }

    #[test]
    fn file_and_remote_sources_conflict() {
        assert!(parse(&["--questions", "q.json", "--remote-url", "http://localhost/api"]).is_err());
    }

    #[test]
    fn selects_file_source() {
        let config = parse(&["--questions", "quiz.json"]).unwrap();
        assert_eq!(config.question_source().unwrap().describe(), "file quiz.json");
    }

    #[test]
    fn bare_remote_flag_uses_default_endpoint() {
        let config = parse(&["--remote-url"]).unwrap();
        assert_eq!(config.remote_url.as_deref(), Some(DEFAULT_TRIVIA_URL));
        assert_eq!(config.amount, 10);
    }

    #[test]
    fn selects_remote_source() {
        let config = parse(&["--remote-url", "http://localhost:9000/api.php", "--amount", "5"]).unwrap();
        assert_eq!(
            config.question_source().unwrap().describe(),
            "http://localhost:9000/api.php (5 questions)"
        );
    }
}
