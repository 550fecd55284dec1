//! Question sources: the built-in list and JSON files on disk

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{error::QuizError, state::Question};

/// Anything that can supply the question list for a quiz session
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the questions for one session. Called once per start.
    async fn fetch_questions(&self) -> Result<Vec<Question>, QuizError>;

    /// Human readable description for logs
    fn describe(&self) -> String;
}

/// The fixed three-question quiz
pub fn builtin_questions() -> Vec<Question> {
    let options = |items: [&str; 3]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
    vec![
        Question::new(1, "1. What is React?", options(["Library", "Framework", "Language"]), "Library"),
        Question::new(2, "2. Redux is used for?", options(["Styling", "State Management", "Animations"]), "State Management"),
        Question::new(3, "3. JSX stands for?", options(["Java Syntax Extension", "JavaScript XML", "JSON Syntax"]), "JavaScript XML"),
    ]
}

/// Supplies the built-in questions
#[derive(Debug, Clone, Default)]
pub struct BuiltinSource;

#[async_trait]
impl QuestionSource for BuiltinSource {
    async fn fetch_questions(&self) -> Result<Vec<Question>, QuizError> {
        Ok(builtin_questions())
    }

    fn describe(&self) -> String {
        "built-in questions".to_string()
    }
}

/// Reads a JSON array of questions from a file on every fetch
#[derive(Debug, Clone)]
pub struct FileSource {
    pub path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuestionSource for FileSource {
    async fn fetch_questions(&self) -> Result<Vec<Question>, QuizError> {
        debug!("Reading questions from {}", self.path.display());

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| QuizError::SourceUnavailable(format!("Failed to read {}: {}", self.path.display(), e)))?;
        let questions: Vec<Question> = serde_json::from_str(&contents)?;

        info!("Read {} questions from {}", questions.len(), self.path.display());
        Ok(questions)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::validate_questions;
    use std::io::Write;

    #[test]
    fn builtin_questions_are_valid() {
        let questions = builtin_questions();
        assert_eq!(questions.len(), 3);
        assert!(validate_questions(&questions).is_ok());
        let answers: Vec<&str> = questions.iter().map(|q| q.correct_option.as_str()).collect();
        assert_eq!(answers, vec!["Library", "State Management", "JavaScript XML"]);
    }

    #[tokio::test]
    async fn file_source_reads_questions() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 1, "text": "Capital of France?", "options": ["Paris", "Lyon"], "correct_option": "Paris"}}]"#
        )
        .unwrap();

        let source = FileSource::new(file.path());
        let questions = source.fetch_questions().await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_option, "Paris");
        assert!(source.describe().starts_with("file "));
    }

    #[tokio::test]
    async fn file_source_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("missing.json"));
        let err = source.fetch_questions().await.unwrap_err();
        assert!(matches!(err, QuizError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn file_source_reports_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = FileSource::new(file.path()).fetch_questions().await.unwrap_err();
        assert!(err.to_string().contains("malformed question data"));
    }
}
