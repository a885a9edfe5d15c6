// Web server — Axum HTTP surface for the stem-extraction service.
//
// Three routes: /health (liveness, always ok), /status (readiness
// snapshot), /extract (the actual work, gated on readiness).
//
// Model loading runs in a background task started alongside the server, so
// /health and /status answer immediately while the multi-hundred-MB SBERT
// model is still loading.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::keywords::KeyphraseExtractor;
use crate::readiness::ReadinessTracker;
use crate::stem::RussianStemmer;

pub mod handlers;
pub mod init_job;

/// The loaded model bundle, published by the init job once everything is up.
pub struct ReadyModels {
    pub extractor: Box<dyn KeyphraseExtractor>,
    pub stemmer: RussianStemmer,
}

/// Slot the init job publishes the model bundle into. Empty until the
/// loading sequence completes.
pub type ModelSlot = Arc<RwLock<Option<Arc<ReadyModels>>>>;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub readiness: ReadinessTracker,
    pub models: ModelSlot,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            readiness: ReadinessTracker::new(),
            models: Arc::new(RwLock::new(None)),
        }
    }
}

/// Start the web server and block until it exits.
///
/// The model-loading job is launched first and runs in the background;
/// extraction requests return 503 until it finishes.
pub async fn run_server(config: Config, port: u16, bind: &str) -> Result<()> {
    let state = AppState::new(config);

    init_job::launch_init(
        state.config.clone(),
        state.readiness.clone(),
        state.models.clone(),
    );

    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("Stemka listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(handlers::status::get_status))
        .route("/extract", post(handlers::extract::extract))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check — always returns 200 OK while the process is up,
/// regardless of model readiness.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Readiness gate for the extraction route.
///
/// Returns the loaded model bundle, or a ready-to-send 503 if loading is
/// still in progress or ended in error. The bundle is published before the
/// tracker flips to ready, so a ready state always has models behind it.
pub async fn require_ready(state: &AppState) -> Result<Arc<ReadyModels>, Response> {
    if !state.readiness.is_ready().await {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Models are loading, please try again later.",
        ));
    }

    match state.models.read().await.as_ref() {
        Some(models) => Ok(Arc::clone(models)),
        None => Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Models are loading, please try again later.",
        )),
    }
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}
