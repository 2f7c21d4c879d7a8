//! Client for the LLM feedback collaborator.
//!
//! Stateless request/response: given the student's code and the
//! judging results, ask a generative-text API for a hint. Every
//! failure mode (missing credential, network fault, non-200 status,
//! unparseable body) degrades to a descriptive string so the judging
//! path never inherits a fault from here.

pub mod types;

use thiserror::Error;
use tracing::{debug, warn};

use types::{GenerateContentRequest, GenerateContentResponse};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-pro";

#[derive(Debug, Error)]
enum FeedbackError {
    #[error("GOOGLE_API_KEY is not set")]
    MissingApiKey,
    #[error("network failure talking to the feedback API: {0}")]
    Network(#[from] reqwest::Error),
    #[error("feedback API returned status {status}")]
    Status { status: u16, body: String },
    #[error("feedback API response carried no text candidate")]
    EmptyResponse,
}

impl FeedbackError {
    /// User-facing degradation string, never a crash of the caller.
    fn user_message(&self) -> String {
        match self {
            FeedbackError::MissingApiKey => {
                "Server error: the coach API key is not configured.".to_string()
            }
            FeedbackError::Network(_) => {
                "Error: could not reach the Code Coach service.".to_string()
            }
            FeedbackError::Status { status, .. } => {
                format!("Error: the Code Coach service answered with status {status}.")
            }
            FeedbackError::EmptyResponse => {
                "Error: the Code Coach service returned an unusable answer.".to_string()
            }
        }
    }
}

/// Client for hint generation against a Gemini-style endpoint.
#[derive(Debug, Clone)]
pub struct FeedbackClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl FeedbackClient {
    pub fn new(api_key: Option<String>, model: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    /// Build from the environment: `GOOGLE_API_KEY` for the
    /// credential, `COACH_FEEDBACK_MODEL` / `COACH_FEEDBACK_URL` as
    /// optional overrides.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty()),
            std::env::var("COACH_FEEDBACK_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            std::env::var("COACH_FEEDBACK_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        )
    }

    /// Ask for a hint about `code` given `evaluation_summary`.
    ///
    /// Always returns a string: the hint on success, an explanatory
    /// message on any collaborator fault.
    pub async fn get_feedback(&self, code: &str, evaluation_summary: &str) -> String {
        match self.request_hint(code, evaluation_summary).await {
            Ok(hint) => hint,
            Err(e) => {
                warn!(error = %e, "feedback generation degraded");
                e.user_message()
            }
        }
    }

    async fn request_hint(
        &self,
        code: &str,
        evaluation_summary: &str,
    ) -> Result<String, FeedbackError> {
        let api_key = self.api_key.as_deref().ok_or(FeedbackError::MissingApiKey)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );
        let request = GenerateContentRequest::from_prompt(build_prompt(code, evaluation_summary));

        debug!(model = %self.model, "requesting feedback");

        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "feedback API rejected request");
            return Err(FeedbackError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed
            .first_text()
            .map(str::to_string)
            .ok_or(FeedbackError::EmptyResponse)
    }
}

/// Coach persona plus the student's material. The persona asks for a
/// hint, never the full solution.
fn build_prompt(code: &str, evaluation_summary: &str) -> String {
    format!(
        "You are a Code Coach for a programming student. The student \
         sends you their code and the results of the automated tests. \
         Your job is to give a hint or explain the mistake, but NEVER \
         hand over the complete solution. Keep the challenge alive. Be \
         brief and friendly.\n\n\
         My code:\n```cpp\n{code}\n```\n\n\
         Test results:\n{evaluation_summary}\n\n\
         Please give me a hint."
    )
}
