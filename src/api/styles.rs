use axum::extract::Path;
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::api::handler_utils::{into_json, ApiObject};
use crate::style::{
    resolve_style_preset, style_description, style_label, StyleConfig, STYLE_PRESETS,
};

#[derive(Debug, Clone, Serialize)]
struct StyleSummary {
    id: String,
    label: String,
    description: &'static str,
    settings: StyleConfig,
}

#[derive(Debug, Clone, Serialize)]
struct ListStylesResponse {
    ok: bool,
    count: usize,
    styles: Vec<StyleSummary>,
}

#[derive(Debug, Clone, Serialize)]
struct StyleResponse {
    ok: bool,
    #[serde(flatten)]
    style: StyleSummary,
}

#[derive(Debug, Clone, Serialize)]
struct StyleDescriptionResponse {
    ok: bool,
    style: String,
    description: &'static str,
}

pub async fn list_styles_handler() -> ApiObject<Value> {
    let styles: Vec<StyleSummary> = STYLE_PRESETS
        .iter()
        .map(|preset| StyleSummary {
            id: preset.name.to_string(),
            label: style_label(preset.name),
            description: preset.description,
            settings: preset.config,
        })
        .collect();
    (
        StatusCode::OK,
        into_json(ListStylesResponse {
            ok: true,
            count: styles.len(),
            styles,
        }),
    )
}

/// Unknown names echo back with the fallback preset's settings.
pub async fn get_style_handler(Path(name): Path<String>) -> ApiObject<Value> {
    let preset = resolve_style_preset(name.as_str());
    (
        StatusCode::OK,
        into_json(StyleResponse {
            ok: true,
            style: StyleSummary {
                label: style_label(name.as_str()),
                id: name,
                description: preset.description,
                settings: preset.config,
            },
        }),
    )
}

pub async fn get_style_description_handler(Path(name): Path<String>) -> ApiObject<Value> {
    let description = style_description(name.as_str());
    (
        StatusCode::OK,
        into_json(StyleDescriptionResponse {
            ok: true,
            style: name,
            description,
        }),
    )
}
