use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Failure kinds of the text-generation collaborator. The pipeline
/// never retries; callers map these to a generic processing failure.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("transient generation failure: {0}")]
    Transient(String),
    #[error("content policy rejection: {0}")]
    ContentPolicy(String),
    #[error("generation api error: {message} (type: {error_type})")]
    Api { error_type: String, message: String },
}

impl GenerationError {
    pub fn api(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api { error_type: error_type.into(), message: message.into() }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transient(error.to_string())
    }
}

/// Text-generation collaborator: one system instruction, one user
/// utterance, one completion. Dyn-safe so tests can substitute fakes.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_text: &str)
        -> Result<String, GenerationError>;
}

/// Chat Completions client for OpenAI and API-compatible providers.
pub struct OpenAiChatClient {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    temperature: f64,
}

impl OpenAiChatClient {
    pub fn new(
        api_key: Option<SecretString>,
        base_url: Option<String>,
        model: impl Into<String>,
        timeout_secs: u64,
        temperature: f64,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|error| GenerationError::Transient(error.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            model: model.into(),
            temperature,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_text: &str,
    ) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system", content: system_prompt.to_string() },
                ChatMessage { role: "user", content: user_text.to_string() },
            ],
            temperature: self.temperature,
        };

        let mut builder = self.client.post(self.completions_url()).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Ok(error_body) = serde_json::from_str::<ChatErrorBody>(&body) {
                let error_type = error_body.error.error_type.unwrap_or_default();
                if error_type.contains("content_policy") || error_type.contains("content_filter") {
                    return Err(GenerationError::ContentPolicy(error_body.error.message));
                }
                if status.as_u16() == 429 || status.is_server_error() {
                    return Err(GenerationError::Transient(error_body.error.message));
                }
                return Err(GenerationError::api(error_type, error_body.error.message));
            }
            if status.as_u16() == 429 || status.is_server_error() {
                return Err(GenerationError::Transient(format!("status {status}")));
            }
            return Err(GenerationError::api(status.to_string(), body));
        }

        let completion: ChatResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                GenerationError::api("empty_response", "completion contained no choices")
            })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatErrorBody {
    error: ChatErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ChatErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{GenerationError, OpenAiChatClient};

    #[test]
    fn completions_url_joins_base_without_double_slash() {
        let client = OpenAiChatClient::new(
            None,
            Some("http://localhost:11434/v1/".to_string()),
            "llama3.1",
            30,
            0.7,
        )
        .expect("client should build");

        assert_eq!(client.completions_url(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn default_base_url_targets_openai() {
        let client =
            OpenAiChatClient::new(None, None, "gpt-4", 30, 0.7).expect("client should build");
        assert_eq!(client.completions_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn transient_errors_are_flagged() {
        assert!(GenerationError::Transient("timeout".to_string()).is_transient());
        assert!(!GenerationError::ContentPolicy("refused".to_string()).is_transient());
        assert!(!GenerationError::api("invalid_request_error", "bad prompt").is_transient());
    }
}
