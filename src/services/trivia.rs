//! Remote trivia source speaking the Open Trivia DB response format

use std::time::Duration;

use async_trait::async_trait;
use rand::{seq::SliceRandom, Rng};
use serde::Deserialize;
use tracing::{debug, info};

use super::QuestionSource;
use crate::{error::QuizError, state::Question};

/// Default endpoint for remote questions
pub const DEFAULT_TRIVIA_URL: &str = "https://opentdb.com/api.php";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct TriviaResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<TriviaResult>,
}

#[derive(Debug, Deserialize)]
struct TriviaResult {
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

/// Fetches questions over HTTP
#[derive(Debug, Clone)]
pub struct TriviaSource {
    client: reqwest::Client,
    pub url: String,
    pub amount: u32,
}

impl TriviaSource {
    /// Create a source for `amount` questions from `url`
    pub fn new(url: impl Into<String>, amount: u32) -> Result<Self, QuizError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            amount,
        })
    }
}

#[async_trait]
impl QuestionSource for TriviaSource {
    async fn fetch_questions(&self) -> Result<Vec<Question>, QuizError> {
        debug!("Requesting {} questions from {}", self.amount, self.url);

        let response = self.client
            .get(&self.url)
            .query(&[("amount", self.amount)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuizError::SourceUnavailable(format!("trivia server answered {}", status)));
        }

        let body = response.text().await?;
        let questions = parse_trivia_response(&body, &mut rand::thread_rng())?;
        info!("Fetched {} questions from {}", questions.len(), self.url);
        Ok(questions)
    }

    fn describe(&self) -> String {
        format!("{} ({} questions)", self.url, self.amount)
    }
}

/// Turn a trivia response body into questions, decoding entities and
/// shuffling each question's options.
pub fn parse_trivia_response<R: Rng + ?Sized>(body: &str, rng: &mut R) -> Result<Vec<Question>, QuizError> {
    let response: TriviaResponse = serde_json::from_str(body)?;

    if response.response_code != 0 {
        return Err(QuizError::SourceUnavailable(describe_response_code(response.response_code)));
    }

    let questions = response
        .results
        .into_iter()
        .zip(1u32..)
        .map(|(result, id)| {
            let correct = decode_html_entities(&result.correct_answer);
            let mut options: Vec<String> = result
                .incorrect_answers
                .iter()
                .map(|answer| decode_html_entities(answer))
                .collect();
            options.push(correct.clone());
            options.shuffle(rng);

            Question::new(id, decode_html_entities(&result.question), options, correct)
        })
        .collect();

    Ok(questions)
}

fn describe_response_code(code: u8) -> String {
    match code {
        1 => "not enough questions available for the query".to_string(),
        2 => "invalid query parameter".to_string(),
        3 | 4 => "session token missing or exhausted".to_string(),
        5 => "rate limited, try again in a few seconds".to_string(),
        other => format!("unexpected response code {}", other),
    }
}

/// Decode the HTML entities trivia servers embed in question text
fn decode_html_entities(input: &str) -> String {
    html_escape::decode_html_entities(input).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const BODY: &str = r#"{
        "response_code": 0,
        "results": [
            {
                "type": "multiple",
                "difficulty": "easy",
                "category": "Science: Computers",
                "question": "What does &quot;HTML&quot; stand for?",
                "correct_answer": "Hypertext Markup Language",
                "incorrect_answers": ["Hyperlink Text Mode", "Home Tool Markup Language", "Hyper Trainer Marking Language"]
            },
            {
                "type": "boolean",
                "difficulty": "easy",
                "category": "Science: Computers",
                "question": "Linux was first created as an alternative to Windows XP.",
                "correct_answer": "False",
                "incorrect_answers": ["True"]
            }
        ]
    }"#;

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode_html_entities("Rock &amp; Roll"), "Rock & Roll");
        assert_eq!(decode_html_entities("It&#039;s &quot;fine&quot;"), "It's \"fine\"");
        assert_eq!(decode_html_entities("Caf&eacute; &#x263A;"), "Café ☺");
        assert_eq!(decode_html_entities("Schr&ouml;dinger&rsquo;s &Uuml;ber&hellip;"), "Schrödinger\u{2019}s Über\u{2026}");
        assert_eq!(decode_html_entities("&Omega; &ccedil;"), "Ω ç");
    }

    #[test]
    fn leaves_unknown_entities_and_bare_ampersands() {
        assert_eq!(decode_html_entities("AT&T"), "AT&T");
        assert_eq!(decode_html_entities("&bogus; & more"), "&bogus; & more");
        assert_eq!(decode_html_entities("trailing &"), "trailing &");
    }

    #[test]
    fn parses_and_shuffles_questions() {
        let mut rng = StdRng::seed_from_u64(7);
        let questions = parse_trivia_response(BODY, &mut rng).unwrap();
        assert_eq!(questions.len(), 2);

        let first = &questions[0];
        assert_eq!(first.id, 1);
        assert_eq!(first.text, "What does \"HTML\" stand for?");
        assert_eq!(first.options.len(), 4);
        assert!(first.has_option("Hypertext Markup Language"));
        assert!(first.is_correct("Hypertext Markup Language"));
        assert!(first.validate().is_ok());

        let second = &questions[1];
        assert_eq!(second.id, 2);
        let mut options = second.options.clone();
        options.sort();
        assert_eq!(options, vec!["False".to_string(), "True".to_string()]);
        assert_eq!(second.correct_option, "False");
    }

    #[test]
    fn non_zero_response_code_is_source_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = parse_trivia_response(r#"{"response_code": 5, "results": []}"#, &mut rng).unwrap_err();
        assert!(matches!(err, QuizError::SourceUnavailable(ref msg) if msg.contains("rate limited")));
    }

    #[test]
    fn malformed_body_is_source_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = parse_trivia_response("<html>", &mut rng).unwrap_err();
        assert!(matches!(err, QuizError::SourceUnavailable(_)));
    }
}
