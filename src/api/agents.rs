use std::collections::BTreeMap;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::agents::{combine, summarize, AgentAnalysis, AgentDigest};
use crate::api::handler_utils::{
    into_json, json_body, map_generation_error, require_non_empty, validate_image_url, ApiObject,
};
use crate::api::server::AppState;
use crate::generator::GenerationError;
use crate::style::DEFAULT_STYLE;

#[derive(Debug, Clone, Deserialize)]
pub struct AgentEnhanceRequest {
    pub image_url: String,
    pub user_prompt: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct AgentAnalysisView {
    agent_name: String,
    confidence: f32,
    observations: Vec<String>,
    directive: String,
}

impl From<AgentAnalysis> for AgentAnalysisView {
    fn from(analysis: AgentAnalysis) -> Self {
        Self {
            agent_name: analysis.agent_name,
            confidence: analysis.confidence,
            observations: analysis.observations,
            directive: analysis.enhancement_directive,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct AgentSummaryView {
    #[serde(flatten)]
    digest: AgentDigest,
    focus: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
struct AnalyzeOnlyResponse {
    ok: bool,
    super_prompt: String,
    agent_summary: BTreeMap<&'static str, AgentSummaryView>,
}

#[derive(Debug, Clone, Serialize)]
struct AgentEnhanceResponse {
    ok: bool,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<String>,
    original_url: String,
    enhanced_url: String,
    super_prompt: String,
    agent_analyses: Vec<AgentAnalysisView>,
    processing_time_ms: u64,
}

pub async fn analyze_only_handler(
    State(state): State<AppState>,
    payload: Result<Json<AgentEnhanceRequest>, JsonRejection>,
) -> ApiObject<Value> {
    let payload = match json_body(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let (image_url, user_prompt) = match validate_request(&payload) {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    let analyses = state
        .panel
        .analyze_all(image_url.as_str(), user_prompt.as_str())
        .await;
    let super_prompt = combine(user_prompt.as_str(), analyses.as_slice());

    // analyses come back in panel order, so profiles line up with digests
    let agent_summary = state
        .panel
        .profiles()
        .into_iter()
        .zip(summarize(analyses.as_slice()))
        .map(|(profile, digest)| {
            (
                profile.key,
                AgentSummaryView {
                    digest,
                    focus: profile.focus,
                },
            )
        })
        .collect();

    (
        StatusCode::OK,
        into_json(AnalyzeOnlyResponse {
            ok: true,
            super_prompt,
            agent_summary,
        }),
    )
}

/// Panel analysis, prompt synthesis, then remote generation with the synthesized prompt.
pub async fn agent_enhance_handler(
    State(state): State<AppState>,
    payload: Result<Json<AgentEnhanceRequest>, JsonRejection>,
) -> ApiObject<Value> {
    let payload = match json_body(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let started = Instant::now();
    let (image_url, user_prompt) = match validate_request(&payload) {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    if !state.generator.is_configured() {
        return map_generation_error(GenerationError::MissingCredential);
    }

    let analyses = state
        .panel
        .analyze_all(image_url.as_str(), user_prompt.as_str())
        .await;
    let super_prompt = combine(user_prompt.as_str(), analyses.as_slice());

    let enhanced_url = match state
        .generator
        .generate(image_url.as_str(), DEFAULT_STYLE, super_prompt.as_str())
        .await
    {
        Ok(url) => url,
        Err(error) => return map_generation_error(error),
    };

    let processing_time_ms = started.elapsed().as_millis() as u64;
    info!(processing_time_ms, "agent enhancement complete");
    (
        StatusCode::OK,
        into_json(AgentEnhanceResponse {
            ok: true,
            success: true,
            conversation_id: payload.conversation_id,
            original_url: image_url,
            enhanced_url,
            super_prompt,
            agent_analyses: analyses.into_iter().map(AgentAnalysisView::from).collect(),
            processing_time_ms,
        }),
    )
}

fn validate_request(payload: &AgentEnhanceRequest) -> Result<(String, String), ApiObject<Value>> {
    let image_url = validate_image_url(payload.image_url.as_str())?;
    let user_prompt = require_non_empty("user_prompt", payload.user_prompt.as_str())?;
    Ok((image_url, user_prompt))
}
