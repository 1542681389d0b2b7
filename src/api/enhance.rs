use std::time::Instant;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::handler_utils::{
    internal_error, into_json, json_body, map_enhance_error, query_params, validate_image_url,
    validate_intensity, validate_style, validation_error, ApiObject,
};
use crate::api::server::AppState;
use crate::style::engine::EnhancedImage;
use crate::style::source::{encode_jpeg, jpeg_data_url, DEFAULT_JPEG_QUALITY};
use crate::style::{resolve_style_preset, DEFAULT_STYLE};

pub const DEFAULT_INTENSITY: f32 = 0.8;
pub const MAX_BATCH_IMAGES: usize = 30;
pub const DOWNLOAD_JPEG_QUALITY: u8 = 95;

fn default_style() -> String {
    String::from(DEFAULT_STYLE)
}

fn default_intensity() -> f32 {
    DEFAULT_INTENSITY
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnhanceRequest {
    pub image_url: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewRequest {
    pub image_url: String,
    pub style: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchEnhanceRequest {
    pub image_urls: Vec<String>,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadQuery {
    pub image_url: String,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
}

#[derive(Debug, Clone, Serialize)]
struct EnhanceResponse {
    ok: bool,
    original_url: String,
    enhanced_url: String,
    style_applied: &'static str,
    processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
struct PreviewResponse {
    ok: bool,
    preview_url: String,
    style: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct BatchEnhanceResponse {
    ok: bool,
    success: bool,
    total_images: usize,
    enhanced_images: Vec<EnhancedImage>,
    failed_images: Vec<String>,
    total_processing_time_ms: u64,
}

pub async fn enhance_handler(
    State(state): State<AppState>,
    payload: Result<Json<EnhanceRequest>, JsonRejection>,
) -> ApiObject<Value> {
    let payload = match json_body(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let started = Instant::now();
    let image_url = match validate_image_url(payload.image_url.as_str()) {
        Ok(url) => url,
        Err(response) => return response,
    };
    let style = match validate_style(payload.style.as_str()) {
        Ok(style) => style,
        Err(response) => return response,
    };
    let intensity = match validate_intensity(payload.intensity) {
        Ok(intensity) => intensity,
        Err(response) => return response,
    };

    let styled = match state
        .enhancer
        .enhance_from_url(image_url.as_str(), style, intensity)
        .await
    {
        Ok(styled) => styled,
        Err(error) => return map_enhance_error(error),
    };
    let encoded =
        tokio::task::spawn_blocking(move || jpeg_data_url(&styled, DEFAULT_JPEG_QUALITY)).await;

    match encoded {
        Ok(Ok(enhanced_url)) => (
            StatusCode::OK,
            into_json(EnhanceResponse {
                ok: true,
                original_url: image_url,
                enhanced_url,
                style_applied: style,
                processing_time_ms: started.elapsed().as_millis() as u64,
            }),
        ),
        Ok(Err(error)) => internal_error(format!("image encode failed: {error}")),
        Err(join_error) => internal_error(format!("image encode task failed: {join_error}")),
    }
}

pub async fn preview_handler(
    State(state): State<AppState>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> ApiObject<Value> {
    let payload = match json_body(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let image_url = match validate_image_url(payload.image_url.as_str()) {
        Ok(url) => url,
        Err(response) => return response,
    };
    let style = match validate_style(payload.style.as_str()) {
        Ok(style) => style,
        Err(response) => return response,
    };

    match state.enhancer.preview(image_url.as_str(), style).await {
        Ok(preview_url) => (
            StatusCode::OK,
            into_json(PreviewResponse {
                ok: true,
                preview_url,
                style,
            }),
        ),
        Err(error) => map_enhance_error(error),
    }
}

pub async fn batch_enhance_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchEnhanceRequest>, JsonRejection>,
) -> ApiObject<Value> {
    let payload = match json_body(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let started = Instant::now();
    if payload.image_urls.is_empty() || payload.image_urls.len() > MAX_BATCH_IMAGES {
        return validation_error(format!(
            "Field 'image_urls' must contain between 1 and {MAX_BATCH_IMAGES} entries"
        ));
    }
    let style = match validate_style(payload.style.as_str()) {
        Ok(style) => style,
        Err(response) => return response,
    };
    let intensity = match validate_intensity(payload.intensity) {
        Ok(intensity) => intensity,
        Err(response) => return response,
    };

    let outcome = state
        .enhancer
        .enhance_batch(payload.image_urls.as_slice(), style, intensity)
        .await;
    info!(
        total = outcome.total(),
        failed = outcome.failed.len(),
        style,
        "batch request finished"
    );

    (
        StatusCode::OK,
        into_json(BatchEnhanceResponse {
            ok: true,
            success: outcome.all_succeeded(),
            total_images: payload.image_urls.len(),
            enhanced_images: outcome.enhanced,
            failed_images: outcome.failed,
            total_processing_time_ms: started.elapsed().as_millis() as u64,
        }),
    )
}

/// Full-quality JPEG attachment. Unknown style names fall back like the core does.
pub async fn download_handler(
    State(state): State<AppState>,
    Path(style): Path<String>,
    query: Result<Query<DownloadQuery>, QueryRejection>,
) -> Response {
    let query = match query_params(query) {
        Ok(query) => query,
        Err(response) => return response.into_response(),
    };
    let image_url = match validate_image_url(query.image_url.as_str()) {
        Ok(url) => url,
        Err(response) => return response.into_response(),
    };
    let intensity = match validate_intensity(query.intensity) {
        Ok(intensity) => intensity,
        Err(response) => return response.into_response(),
    };
    let preset = resolve_style_preset(style.as_str());

    let styled = match state
        .enhancer
        .enhance_from_url(image_url.as_str(), preset.name, intensity)
        .await
    {
        Ok(styled) => styled,
        Err(error) => return map_enhance_error(error).into_response(),
    };
    let encoded =
        tokio::task::spawn_blocking(move || encode_jpeg(&styled, DOWNLOAD_JPEG_QUALITY)).await;

    match encoded {
        Ok(Ok(bytes)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, String::from("image/jpeg")),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=enhanced_{}.jpg", preset.name),
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(Err(error)) => internal_error(format!("image encode failed: {error}")).into_response(),
        Err(join_error) => {
            internal_error(format!("image encode task failed: {join_error}")).into_response()
        }
    }
}
