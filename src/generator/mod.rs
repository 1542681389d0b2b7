//! Remote image generation and upscaling over a create-then-poll job protocol.

pub mod jobs;

use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

pub use jobs::{
    run_job, JobInput, PollSettings, Prediction, PredictionBackend, PredictionOutput,
    PredictionStatus, ReplicateBackend, SharedPredictionBackend,
};

pub const ENHANCE_MODEL_VERSION: &str =
    "9451bfbf652b21a9bccc741e5c7f5ef41a45b86061e5ba3286ec600dfd49a483";
pub const UPSCALE_MODEL_VERSION: &str =
    "42fed1c4974146d4d2414e2be2c5277c7fcf05fcc3a73abf41610695738c1d7b";
pub const NUM_INFERENCE_STEPS: u32 = 20;
pub const GUIDANCE_SCALE: f64 = 7.5;
pub const IMAGE_STRENGTH: f64 = 0.35;
pub const MIN_UPSCALE: u32 = 1;
pub const MAX_UPSCALE: u32 = 4;

/// Prompt phrases per style key; the first entry is the fallback.
pub static STYLE_PROMPTS: [(&str, &str); 8] = [
    (
        "cinematic",
        "cinematic color grading, film look, dramatic lighting, movie poster quality",
    ),
    (
        "vibrant",
        "vibrant colors, high saturation, vivid, eye-catching, colorful",
    ),
    (
        "minimal",
        "clean, minimal, bright, airy, white space, modern aesthetic",
    ),
    (
        "vintage",
        "vintage film, retro, warm tones, nostalgic, 70s photography",
    ),
    (
        "moody",
        "moody, dark, atmospheric, dramatic shadows, mysterious",
    ),
    ("warm", "warm golden hour, sunset tones, cozy, inviting lighting"),
    ("cool", "cool blue tones, crisp, professional, tech aesthetic"),
    ("bright", "bright, well-lit, fresh, clean, high key lighting"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    Configuration,
    Validation,
    Generation,
    Timeout,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation credential is not configured")]
    MissingCredential,
    #[error("upscale factor must be between {MIN_UPSCALE} and {MAX_UPSCALE}, got {0}")]
    InvalidScale(u32),
    #[error("prediction create rejected with HTTP {status}: {body}")]
    CreateRejected { status: u16, body: String },
    #[error("generation service error: {0}")]
    Service(String),
    #[error("prediction failed: {0}")]
    JobFailed(String),
    #[error("prediction {id} succeeded without output")]
    EmptyOutput { id: String },
    #[error("prediction did not finish after {attempts} polls")]
    Timeout { attempts: u32 },
}

impl GenerationError {
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            Self::MissingCredential => GenerationErrorKind::Configuration,
            Self::InvalidScale(_) => GenerationErrorKind::Validation,
            Self::Timeout { .. } => GenerationErrorKind::Timeout,
            Self::CreateRejected { .. }
            | Self::Service(_)
            | Self::JobFailed(_)
            | Self::EmptyOutput { .. } => GenerationErrorKind::Generation,
        }
    }
}

pub fn style_prompt(style_key: &str) -> &'static str {
    let key = style_key.trim().to_ascii_lowercase();
    STYLE_PROMPTS
        .iter()
        .find(|(name, _)| *name == key)
        .unwrap_or(&STYLE_PROMPTS[0])
        .1
}

pub fn build_prompt(style_key: &str, prompt_modifier: &str) -> String {
    format!(
        "enhance this image with {}. {}",
        style_prompt(style_key),
        prompt_modifier
    )
    .trim()
    .to_string()
}

#[derive(Clone)]
pub struct RemoteImageGenerator {
    backend: Option<SharedPredictionBackend>,
    poll: PollSettings,
}

impl RemoteImageGenerator {
    /// `None` means no credential: every call fails before touching the network.
    pub fn new(backend: Option<SharedPredictionBackend>) -> Self {
        Self {
            backend,
            poll: PollSettings::default(),
        }
    }

    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn generate(
        &self,
        image_url: &str,
        style_key: &str,
        prompt_modifier: &str,
    ) -> Result<String, GenerationError> {
        let backend = self.backend()?;
        let prompt = build_prompt(style_key, prompt_modifier);
        info!(style = style_key, prompt_chars = prompt.len(), "starting remote enhancement");
        let job = JobInput {
            version: String::from(ENHANCE_MODEL_VERSION),
            input: json!({
                "image": image_url,
                "prompt": prompt,
                "num_inference_steps": NUM_INFERENCE_STEPS,
                "guidance_scale": GUIDANCE_SCALE,
                "strength": IMAGE_STRENGTH,
            }),
        };
        run_job(backend, &job, self.poll).await
    }

    pub async fn upscale(&self, image_url: &str, scale: u32) -> Result<String, GenerationError> {
        if !(MIN_UPSCALE..=MAX_UPSCALE).contains(&scale) {
            return Err(GenerationError::InvalidScale(scale));
        }
        let backend = self.backend()?;
        info!(scale, "starting remote upscale");
        let job = JobInput {
            version: String::from(UPSCALE_MODEL_VERSION),
            input: json!({
                "image": image_url,
                "scale": scale,
                "face_enhance": true,
            }),
        };
        run_job(backend, &job, self.poll).await
    }

    fn backend(&self) -> Result<&dyn PredictionBackend, GenerationError> {
        match self.backend.as_deref() {
            Some(backend) => Ok(backend),
            None => {
                error!("generation requested without a configured credential");
                Err(GenerationError::MissingCredential)
            }
        }
    }
}
