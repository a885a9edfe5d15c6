// POST /extract — rank keyphrases, stem, deduplicate, return the top-N.
//
// Validation happens before the readiness gate: a request that is wrong
// regardless of load state gets a 400 even while models are loading.
//
// The extractor is asked for top_n * 2 candidates — stemming collapses
// inflected variants onto one stem, and the oversampling compensates for
// those collisions. If dedup still exhausts the pool below top_n, the
// shorter list is returned as-is.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::error;

use crate::stem::dedup_by_stem;
use crate::web::{api_error, require_ready, AppState};

/// Extraction request body.
#[derive(Debug, Deserialize)]
pub struct StemRequest {
    /// Text to extract stems from.
    pub doc: String,
    /// Number of unique stems to return (1..=TOP_N_MAX).
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Minimum n-gram size.
    #[serde(default = "default_ngram")]
    pub min_ngram: usize,
    /// Maximum n-gram size.
    #[serde(default = "default_ngram")]
    pub max_ngram: usize,
}

fn default_top_n() -> usize {
    10
}

fn default_ngram() -> usize {
    1
}

pub async fn extract(State(state): State<AppState>, Json(req): Json<StemRequest>) -> Response {
    if req.top_n < 1 || req.top_n > state.config.top_n_max {
        return api_error(
            StatusCode::BAD_REQUEST,
            &format!("top_n must be between 1 and {}", state.config.top_n_max),
        );
    }
    if req.min_ngram < 1 || req.max_ngram < 1 {
        return api_error(StatusCode::BAD_REQUEST, "ngram sizes must be at least 1");
    }
    if req.min_ngram > req.max_ngram {
        return api_error(StatusCode::BAD_REQUEST, "min_ngram must be <= max_ngram");
    }

    let models = match require_ready(&state).await {
        Ok(models) => models,
        Err(resp) => return resp,
    };

    let raw = match models
        .extractor
        .extract(&req.doc, (req.min_ngram, req.max_ngram), req.top_n * 2)
        .await
    {
        Ok(raw) => raw,
        Err(e) => {
            error!(error = %e, "Keyphrase extraction failed");
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Keyphrase extraction failed",
            );
        }
    };

    let stems = dedup_by_stem(&raw, &models.stemmer, req.top_n);

    Json(serde_json::json!({ "stems": stems })).into_response()
}
