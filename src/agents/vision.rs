use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

pub const DEFAULT_VISION_MODEL: &str = "gpt-4o-mini";
pub const VISION_MAX_TOKENS: u32 = 300;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("vision request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("vision service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("vision response malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionRequest {
    pub persona: String,
    pub image_url: String,
    pub user_intent: String,
}

impl VisionRequest {
    pub fn instruction_text(&self) -> String {
        format!(
            concat!(
                "Analyze this image and provide enhancement suggestions. User wants: {}\n\n",
                "Respond in this exact format:\n",
                "OBSERVATIONS: [comma-separated list]\n",
                "DIRECTIVE: [single enhancement instruction]\n",
                "PRIORITIES: [comma-separated adjustments]\n",
                "CONFIDENCE: [0.0-1.0]"
            ),
            self.user_intent
        )
    }
}

/// A vision-capable completion backend. Returns the raw assistant text.
#[async_trait]
pub trait VisionClient: Send + Sync + 'static {
    async fn complete(&self, request: &VisionRequest) -> Result<String, VisionError>;
}

pub type SharedVisionClient = Arc<dyn VisionClient>;

#[derive(Debug, Clone)]
pub struct OpenAiVisionClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiVisionClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, VisionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(VisionError::Request)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: String::from(DEFAULT_VISION_MODEL),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn request_body(&self, request: &VisionRequest) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": request.persona,
                },
                {
                    "role": "user",
                    "content": [
                        {"type": "text", "text": request.instruction_text()},
                        {
                            "type": "image_url",
                            "image_url": {"url": request.image_url, "detail": "low"},
                        },
                    ],
                },
            ],
            "max_tokens": VISION_MAX_TOKENS,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl VisionClient for OpenAiVisionClient {
    async fn complete(&self, request: &VisionRequest) -> Result<String, VisionError> {
        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(self.api_key.as_str())
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(VisionError::Request)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VisionError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let payload: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| VisionError::Malformed(format!("JSON decode failed: {e}")))?;
        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| VisionError::Malformed(String::from("response has no message content")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> VisionRequest {
        VisionRequest {
            persona: String::from("You are a test persona."),
            image_url: String::from("https://img/a.png"),
            user_intent: String::from("make it vibrant"),
        }
    }

    #[test]
    fn instruction_text_names_all_four_fields() {
        let text = request().instruction_text();
        assert!(text.contains("User wants: make it vibrant"));
        for field in ["OBSERVATIONS:", "DIRECTIVE:", "PRIORITIES:", "CONFIDENCE:"] {
            assert!(text.contains(field), "missing {field}");
        }
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "DIRECTIVE: lift shadows"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiVisionClient::new(server.uri(), "sk-test", Duration::from_secs(5))
            .expect("client should build");
        let text = client.complete(&request()).await.expect("complete should succeed");
        assert_eq!(text, "DIRECTIVE: lift shadows");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = OpenAiVisionClient::new(server.uri(), "sk-test", Duration::from_secs(5))
            .expect("client should build");
        let err = client.complete(&request()).await.expect_err("500 should fail");
        assert!(matches!(err, VisionError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn empty_choices_are_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = OpenAiVisionClient::new(server.uri(), "sk-test", Duration::from_secs(5))
            .expect("client should build");
        let err = client.complete(&request()).await.expect_err("no choices should fail");
        assert!(matches!(err, VisionError::Malformed(_)));
    }
}
