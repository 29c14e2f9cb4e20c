use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ErrorEnvelope, Message};
use crate::config::ApiKey;

const API_BASE: &str = "https://api.openai.com/v1";
pub const MODEL: &str = "gpt-3.5-turbo";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("invalid OpenAI API key: {0}")]
    Unauthorized(String),

    #[error("API rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("completion returned no message content")]
    EmptyReply,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Single-prompt text completion.
/// Implemented by `OpenAiClient` for production; mock implementations used in tests.
pub trait CompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Clone, Debug)]
pub struct OpenAiClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(http: Client, api_key: ApiKey) -> Self {
        Self {
            http,
            api_key,
            base_url: API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey::new("test-key"),
            base_url: base_url.to_string(),
        }
    }
}

impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatCompletionRequest {
            model: MODEL,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let classified = classify_status(status.as_u16(), &text);
            warn!(error = %classified, "OpenAI API error");
            return Err(classified);
        }

        let body: ChatCompletionResponse = response.json().await?;
        let text = body.first_text().ok_or(CompletionError::EmptyReply)?;

        debug!(model = MODEL, chars = text.len(), "completion received");
        Ok(text.to_string())
    }
}

fn classify_status(code: u16, body: &str) -> CompletionError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let msg = envelope
                .error
                .message
                .unwrap_or_else(|| "Unknown error".to_string());
            match envelope.error.kind {
                Some(kind) => format!("{msg} ({kind})"),
                None => msg,
            }
        }
        Err(_) => {
            let end = body.floor_char_boundary(200);
            format!("HTTP {code}: {}", &body[..end])
        }
    };

    match code {
        401 => CompletionError::Unauthorized(message),
        429 => CompletionError::RateLimited(message),
        _ => CompletionError::Api { code, message },
    }
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn complete_sends_model_and_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "list questions"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "- Q1\n- Q2"},
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url(Client::new(), &server.uri());
        let text = client.complete("list questions").await.unwrap();

        assert_eq!(text, "- Q1\n- Q2");
    }

    #[tokio::test]
    async fn complete_without_choices_is_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": []
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url(Client::new(), &server.uri());
        let result = client.complete("prompt").await;
        assert!(matches!(result, Err(CompletionError::EmptyReply)));
    }

    #[tokio::test]
    async fn complete_null_content_is_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": null}}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url(Client::new(), &server.uri());
        let result = client.complete("prompt").await;
        assert!(matches!(result, Err(CompletionError::EmptyReply)));
    }

    #[tokio::test]
    async fn complete_empty_content_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": ""}}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url(Client::new(), &server.uri());
        assert_eq!(client.complete("prompt").await.unwrap(), "");
    }

    #[tokio::test]
    async fn complete_401_returns_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url(Client::new(), &server.uri());
        let result = client.complete("prompt").await;
        assert!(matches!(result, Err(CompletionError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn complete_500_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url(Client::new(), &server.uri());
        match client.complete("prompt").await {
            Err(CompletionError::Api { code: 500, message }) => {
                assert!(message.contains("upstream failure"), "got: {message}");
            }
            other => panic!("expected Api(500), got: {other:?}"),
        }
    }
}
