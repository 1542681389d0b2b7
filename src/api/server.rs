use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::agents::{AgentPanel, OpenAiVisionClient, SharedVisionClient, VisionError};
use crate::api::handler_utils::ApiObject;
use crate::api::routes::{route_catalog, ServiceRoute};
use crate::config::ServiceConfig;
use crate::generator::{
    GenerationError, PollSettings, RemoteImageGenerator, ReplicateBackend,
    SharedPredictionBackend,
};
use crate::style::source::{HttpImageSource, ImageFetchError};
use crate::style::StyleEnhancer;

#[derive(Debug, Error)]
pub enum ServerInitError {
    #[error("image source init failed: {0}")]
    ImageSource(#[from] ImageFetchError),
    #[error("vision client init failed: {0}")]
    Vision(#[from] VisionError),
    #[error("generation backend init failed: {0}")]
    Generation(#[from] GenerationError),
}

#[derive(Clone)]
pub struct AppState {
    pub service_name: &'static str,
    pub service_version: &'static str,
    pub started_unix_ms: u128,
    pub route_count: usize,
    pub vision_configured: bool,
    pub enhancer: StyleEnhancer,
    pub panel: AgentPanel,
    pub generator: RemoteImageGenerator,
}

impl AppState {
    pub fn new(
        route_count: usize,
        enhancer: StyleEnhancer,
        panel: AgentPanel,
        generator: RemoteImageGenerator,
    ) -> Self {
        Self {
            service_name: "enhance-backend-core",
            service_version: env!("CARGO_PKG_VERSION"),
            started_unix_ms: now_unix_ms(),
            route_count,
            vision_configured: false,
            enhancer,
            panel,
            generator,
        }
    }

    /// Wires real HTTP-backed components. Missing credentials leave the matching client unset.
    pub fn from_config(
        route_count: usize,
        config: &ServiceConfig,
    ) -> Result<Self, ServerInitError> {
        let source = HttpImageSource::new(config.image_fetch_timeout)?;
        let enhancer = StyleEnhancer::new(Arc::new(source));

        let vision: Option<SharedVisionClient> = match config.openai_api_key.as_deref() {
            Some(key) => Some(Arc::new(
                OpenAiVisionClient::new(
                    config.openai_base_url.as_str(),
                    key,
                    config.vision_timeout,
                )?
                .with_model(config.vision_model.as_str()),
            )),
            None => None,
        };
        let vision_configured = vision.is_some();
        let panel = AgentPanel::with_default_profiles(vision);

        let backend: Option<SharedPredictionBackend> = match config.replicate_api_token.as_deref()
        {
            Some(token) => Some(Arc::new(ReplicateBackend::new(
                config.replicate_base_url.as_str(),
                token,
                config.generation_timeout,
            )?)),
            None => None,
        };
        let generator = RemoteImageGenerator::new(backend).with_poll_settings(PollSettings {
            interval: config.poll_interval,
            max_attempts: config.max_poll_attempts,
        });

        info!(
            vision_configured,
            generation_configured = generator.is_configured(),
            "service components initialized"
        );
        let mut state = Self::new(route_count, enhancer, panel, generator);
        state.vision_configured = vision_configured;
        Ok(state)
    }
}

pub fn build_router(config: &ServiceConfig) -> Result<Router, ServerInitError> {
    let catalog = route_catalog();
    let state = AppState::from_config(catalog.len(), config)?;
    Ok(build_router_with_catalog(catalog, state))
}

pub fn build_router_with_components(
    enhancer: StyleEnhancer,
    panel: AgentPanel,
    generator: RemoteImageGenerator,
) -> Router {
    let catalog = route_catalog();
    let state = AppState::new(catalog.len(), enhancer, panel, generator);
    build_router_with_catalog(catalog, state)
}

pub fn build_router_with_state(state: AppState) -> Router {
    build_router_with_catalog(route_catalog(), state)
}

fn build_router_with_catalog(catalog: Vec<ServiceRoute>, state: AppState) -> Router {
    let mut router = Router::new();
    for route in catalog {
        router = router.route(route.spec().path, method_router_for(route));
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    config: ServiceConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let app = build_router(&config)?;
    info!(bind = %addr, "starting enhance-backend-core HTTP surface");
    axum::serve(listener, app).await?;
    Ok(())
}

fn method_router_for(route: ServiceRoute) -> MethodRouter<AppState> {
    match route {
        ServiceRoute::Health | ServiceRoute::ApiHealth => get(health_handler),
        ServiceRoute::ListStyles => get(crate::api::styles::list_styles_handler),
        ServiceRoute::GetStyle => get(crate::api::styles::get_style_handler),
        ServiceRoute::StyleDescription => get(crate::api::styles::get_style_description_handler),
        ServiceRoute::Enhance => post(crate::api::enhance::enhance_handler),
        ServiceRoute::Preview => post(crate::api::enhance::preview_handler),
        ServiceRoute::BatchEnhance => post(crate::api::enhance::batch_enhance_handler),
        ServiceRoute::Download => get(crate::api::enhance::download_handler),
        ServiceRoute::AnalyzeOnly => post(crate::api::agents::analyze_only_handler),
        ServiceRoute::AgentEnhance => post(crate::api::agents::agent_enhance_handler),
        ServiceRoute::Insights => post(crate::api::insights::insights_handler),
        ServiceRoute::PostingTime => get(crate::api::insights::posting_time_handler),
        ServiceRoute::Caption => get(crate::api::insights::caption_handler),
        ServiceRoute::Hashtags => get(crate::api::insights::hashtags_handler),
        ServiceRoute::Tip => get(crate::api::insights::tip_handler),
    }
}

async fn health_handler(State(state): State<AppState>) -> ApiObject<Value> {
    (
        StatusCode::OK,
        Json(json!({
            "ok": true,
            "status": "ok",
            "service": state.service_name,
            "version": state.service_version,
            "started_unix_ms": state.started_unix_ms,
            "route_count": state.route_count,
            "vision_configured": state.vision_configured,
            "generation_configured": state.generator.is_configured(),
        })),
    )
}

fn now_unix_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis())
}
