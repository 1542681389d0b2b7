use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::GenerationError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl PredictionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

/// The service reports either one URL or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutput {
    Single(String),
    Many(Vec<String>),
}

impl PredictionOutput {
    pub fn first_url(&self) -> Option<&str> {
        let url = match self {
            Self::Single(url) => Some(url.as_str()),
            Self::Many(urls) => urls.first().map(String::as_str),
        };
        url.filter(|u| !u.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<PredictionOutput>,
    #[serde(default)]
    pub error: Option<String>,
}

/// What to run: a model version plus its free-form input object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobInput {
    pub version: String,
    pub input: Value,
}

#[async_trait]
pub trait PredictionBackend: Send + Sync + 'static {
    async fn create(&self, job: &JobInput) -> Result<Prediction, GenerationError>;
    async fn fetch(&self, id: &str) -> Result<Prediction, GenerationError>;
}

pub type SharedPredictionBackend = Arc<dyn PredictionBackend>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

/// Create, then poll until terminal or out of attempts.
pub async fn run_job(
    backend: &dyn PredictionBackend,
    job: &JobInput,
    poll: PollSettings,
) -> Result<String, GenerationError> {
    let created = backend.create(job).await?;
    info!(prediction_id = %created.id, "prediction created");

    for attempt in 1..=poll.max_attempts {
        tokio::time::sleep(poll.interval).await;
        let prediction = backend.fetch(created.id.as_str()).await?;
        debug!(
            prediction_id = %prediction.id,
            attempt,
            status = ?prediction.status,
            "prediction polled"
        );
        match prediction.status {
            PredictionStatus::Succeeded => {
                let url = prediction
                    .output
                    .as_ref()
                    .and_then(PredictionOutput::first_url)
                    .ok_or_else(|| GenerationError::EmptyOutput {
                        id: prediction.id.clone(),
                    })?;
                info!(prediction_id = %prediction.id, attempt, "prediction succeeded");
                return Ok(url.to_string());
            }
            PredictionStatus::Failed | PredictionStatus::Canceled => {
                let reason = prediction
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("prediction {:?}", prediction.status));
                warn!(prediction_id = %prediction.id, reason = %reason, "prediction failed");
                return Err(GenerationError::JobFailed(reason));
            }
            PredictionStatus::Starting | PredictionStatus::Processing => {}
        }
    }

    warn!(
        prediction_id = %created.id,
        attempts = poll.max_attempts,
        "prediction polling budget exhausted"
    );
    Err(GenerationError::Timeout {
        attempts: poll.max_attempts,
    })
}

/// Replicate-compatible predictions API.
#[derive(Debug, Clone)]
pub struct ReplicateBackend {
    client: Client,
    base_url: String,
    token: String,
}

impl ReplicateBackend {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Service(format!("http client init failed: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }
}

#[async_trait]
impl PredictionBackend for ReplicateBackend {
    async fn create(&self, job: &JobInput) -> Result<Prediction, GenerationError> {
        let resp = self
            .client
            .post(format!("{}/v1/predictions", self.base_url))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(job)
            .send()
            .await
            .map_err(|e| GenerationError::Service(format!("create request failed: {e}")))?;
        let status = resp.status();
        if status != StatusCode::CREATED {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::CreateRejected {
                status: status.as_u16(),
                body,
            });
        }
        resp.json::<Prediction>()
            .await
            .map_err(|e| GenerationError::Service(format!("create response decode failed: {e}")))
    }

    async fn fetch(&self, id: &str) -> Result<Prediction, GenerationError> {
        let resp = self
            .client
            .get(format!("{}/v1/predictions/{}", self.base_url, id))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|e| GenerationError::Service(format!("poll request failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Service(format!(
                "poll returned HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }
        resp.json::<Prediction>()
            .await
            .map_err(|e| GenerationError::Service(format!("poll response decode failed: {e}")))
    }
}
