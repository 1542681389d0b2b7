use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::api::handler_utils::{
    into_json, json_body, query_params, require_non_empty, validation_error, ApiObject,
};
use crate::insights::{best_posting_time, Insights, InsightsGenerator, DEFAULT_HASHTAG_COUNT};

pub const MAX_RECENT_POSTS: u32 = 30;
pub const MAX_HASHTAGS: usize = 30;

fn default_recent_posts() -> u32 {
    9
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsightsRequest {
    pub profile_username: String,
    #[serde(default = "default_recent_posts")]
    pub recent_posts_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptionQuery {
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HashtagsQuery {
    #[serde(default)]
    pub count: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
struct InsightsResponse {
    ok: bool,
    #[serde(flatten)]
    insights: Insights,
}

pub async fn insights_handler(
    payload: Result<Json<InsightsRequest>, JsonRejection>,
) -> ApiObject<Value> {
    let payload = match json_body(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let profile = match require_non_empty("profile_username", payload.profile_username.as_str()) {
        Ok(profile) => profile,
        Err(response) => return response,
    };
    if !(1..=MAX_RECENT_POSTS).contains(&payload.recent_posts_count) {
        return validation_error(format!(
            "Field 'recent_posts_count' must be between 1 and {MAX_RECENT_POSTS}"
        ));
    }
    debug!(
        profile = %profile,
        recent_posts = payload.recent_posts_count,
        "generating insights"
    );
    let insights = InsightsGenerator::from_entropy().generate(None);
    (
        StatusCode::OK,
        into_json(InsightsResponse { ok: true, insights }),
    )
}

pub async fn posting_time_handler() -> ApiObject<Value> {
    (
        StatusCode::OK,
        into_json(serde_json::json!({
            "ok": true,
            "best_time": best_posting_time(),
        })),
    )
}

pub async fn caption_handler(
    query: Result<Query<CaptionQuery>, QueryRejection>,
) -> ApiObject<Value> {
    let query = match query_params(query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    let caption = InsightsGenerator::from_entropy().caption(query.context.as_deref());
    (
        StatusCode::OK,
        into_json(serde_json::json!({
            "ok": true,
            "caption": caption,
        })),
    )
}

pub async fn hashtags_handler(
    query: Result<Query<HashtagsQuery>, QueryRejection>,
) -> ApiObject<Value> {
    let query = match query_params(query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    let count = query.count.unwrap_or(DEFAULT_HASHTAG_COUNT);
    if count > MAX_HASHTAGS {
        return validation_error(format!("Query 'count' must be at most {MAX_HASHTAGS}"));
    }
    let hashtags = InsightsGenerator::from_entropy().hashtags(count);
    (
        StatusCode::OK,
        into_json(serde_json::json!({
            "ok": true,
            "hashtags": hashtags,
        })),
    )
}

pub async fn tip_handler() -> ApiObject<Value> {
    let tip = InsightsGenerator::from_entropy().engagement_tip();
    (
        StatusCode::OK,
        into_json(serde_json::json!({
            "ok": true,
            "tip": tip,
        })),
    )
}
