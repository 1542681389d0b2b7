use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};
use url::Url;

use crate::api::error::ErrorKind;
use crate::generator::{GenerationError, GenerationErrorKind};
use crate::style::source::ImageFetchError;
use crate::style::{find_style_preset, EnhanceError};

pub type ApiObject<T> = (StatusCode, Json<T>);

pub const MIN_INTENSITY: f32 = 0.0;
pub const MAX_INTENSITY: f32 = 1.0;

#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<String>,
}

pub fn error_response(
    status: StatusCode,
    kind: ErrorKind,
    code: impl Into<String>,
    message: impl Into<String>,
) -> ApiObject<Value> {
    (
        status,
        into_json(ErrorResponse {
            ok: false,
            error: message.into(),
            error_kind: Some(kind),
            error_code: Some(code.into()),
        }),
    )
}

pub fn validation_error(message: impl Into<String>) -> ApiObject<Value> {
    error_response(
        StatusCode::BAD_REQUEST,
        ErrorKind::Validation,
        "validation_error",
        message,
    )
}

pub fn internal_error(message: impl Into<String>) -> ApiObject<Value> {
    let detail = message.into();
    error!(detail = %detail, "internal api error");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Infra,
        "internal_error",
        "Internal server error",
    )
}

/// Upstream image problems are the caller's to fix; everything else is ours.
pub fn map_enhance_error(error: EnhanceError) -> ApiObject<Value> {
    match error {
        EnhanceError::Fetch(fetch) => {
            warn!(error = %fetch, "source image unavailable");
            let message = match &fetch {
                ImageFetchError::Decode(_) => "Source image could not be decoded",
                ImageFetchError::Status { .. } => "Source image request was rejected",
                ImageFetchError::Request(_) | ImageFetchError::Other(_) => {
                    "Source image could not be fetched"
                }
            };
            error_response(
                StatusCode::BAD_GATEWAY,
                ErrorKind::Provider,
                "image_fetch_failed",
                message,
            )
        }
        EnhanceError::Encode(source) => internal_error(format!("image encode failed: {source}")),
        EnhanceError::Join(message) => {
            internal_error(format!("enhancement task failed: {message}"))
        }
    }
}

pub fn map_generation_error(error: GenerationError) -> ApiObject<Value> {
    let kind = ErrorKind::from(&error);
    match error.kind() {
        GenerationErrorKind::Validation => validation_error(error.to_string()),
        GenerationErrorKind::Configuration => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            kind,
            "generation_not_configured",
            "Image generation is not configured",
        ),
        GenerationErrorKind::Timeout => {
            warn!(error = %error, "generation timed out");
            error_response(
                StatusCode::GATEWAY_TIMEOUT,
                kind,
                "generation_timeout",
                "Image generation timed out",
            )
        }
        GenerationErrorKind::Generation => {
            warn!(error = %error, "generation failed");
            error_response(
                StatusCode::BAD_GATEWAY,
                kind,
                "generation_failed",
                "Image generation failed",
            )
        }
    }
}

pub fn into_json(payload: impl Serialize) -> Json<Value> {
    Json(serde_json::to_value(payload).expect("api payload should serialize"))
}

/// Malformed or incomplete bodies get the same envelope as field validation.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiObject<Value>> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| validation_error(rejection.body_text()))
}

pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiObject<Value>> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| validation_error(rejection.body_text()))
}

/// Only absolute http(s) URLs are accepted as image references.
pub fn validate_image_url(raw: &str) -> Result<String, ApiObject<Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(validation_error("Field 'image_url' is required"));
    }
    let parsed = Url::parse(trimmed)
        .map_err(|_| validation_error(format!("Invalid image_url '{trimmed}'")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(validation_error("Field 'image_url' must use http or https"));
    }
    Ok(trimmed.to_string())
}

/// Style fields must name one of the built-in presets.
pub fn validate_style(raw: &str) -> Result<&'static str, ApiObject<Value>> {
    find_style_preset(raw)
        .map(|preset| preset.name)
        .ok_or_else(|| validation_error(format!("Unknown style '{}'", raw.trim())))
}

pub fn validate_intensity(value: f32) -> Result<f32, ApiObject<Value>> {
    if !value.is_finite() || !(MIN_INTENSITY..=MAX_INTENSITY).contains(&value) {
        return Err(validation_error(format!(
            "Field 'intensity' must be between {MIN_INTENSITY} and {MAX_INTENSITY}"
        )));
    }
    Ok(value)
}

pub fn require_non_empty(field: &str, raw: &str) -> Result<String, ApiObject<Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(validation_error(format!("Field '{field}' is required")));
    }
    Ok(trimmed.to_string())
}
