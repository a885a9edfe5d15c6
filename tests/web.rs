// HTTP surface tests — exercising the router with a stub extractor.
//
// Loading the real SBERT model is not reasonable in tests, so these use a
// stub KeyphraseExtractor behind the same trait the production extractor
// implements. The readiness gate, validation, dedup-by-stem, and response
// shapes are all exercised exactly as a live client would see them.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use stemka::config::Config;
use stemka::keywords::{KeyphraseExtractor, ScoredPhrase};
use stemka::readiness::Phase;
use stemka::stem::RussianStemmer;
use stemka::web::{build_router, AppState, ReadyModels};

/// Stub extractor returning a fixed candidate list (truncated to the
/// requested top_n). Records the last requested top_n so tests can verify
/// the handler's oversampling.
struct StubExtractor {
    candidates: Vec<(String, f32)>,
    last_top_n: Arc<Mutex<Option<usize>>>,
}

impl StubExtractor {
    fn new(candidates: &[(&str, f32)]) -> Self {
        Self {
            candidates: candidates
                .iter()
                .map(|(p, s)| (p.to_string(), *s))
                .collect(),
            last_top_n: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl KeyphraseExtractor for StubExtractor {
    async fn extract(
        &self,
        _doc: &str,
        _ngram_range: (usize, usize),
        top_n: usize,
    ) -> Result<Vec<ScoredPhrase>> {
        *self.last_top_n.lock().unwrap() = Some(top_n);
        Ok(self
            .candidates
            .iter()
            .take(top_n)
            .map(|(phrase, score)| ScoredPhrase {
                phrase: phrase.clone(),
                score: *score,
            })
            .collect())
    }
}

/// Extractor that always fails, for the in-flight error path.
struct FailingExtractor;

#[async_trait]
impl KeyphraseExtractor for FailingExtractor {
    async fn extract(
        &self,
        _doc: &str,
        _ngram_range: (usize, usize),
        _top_n: usize,
    ) -> Result<Vec<ScoredPhrase>> {
        anyhow::bail!("inference backend exploded")
    }
}

fn test_config() -> Config {
    Config {
        model_name: "sberbank-ai/sbert_large_nlu_ru".to_string(),
        top_n_max: 100,
        model_dir: PathBuf::from("/tmp/stemka-test-models"),
    }
}

fn fresh_state() -> AppState {
    AppState::new(test_config())
}

/// State with the readiness tracker at ready and the given extractor
/// published, mirroring what the init job does on success.
async fn ready_state(extractor: Box<dyn KeyphraseExtractor>) -> AppState {
    let state = fresh_state();
    *state.models.write().await = Some(Arc::new(ReadyModels {
        extractor,
        stemmer: RussianStemmer::new(),
    }));
    state.readiness.advance(Phase::Ready, 100).await;
    state
}

async fn get(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_extract(router: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/extract")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ============================================================
// Liveness vs readiness
// ============================================================

#[tokio::test]
async fn health_is_ok_before_models_load() {
    let router = build_router(fresh_state());
    let (status, body) = get(router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn extract_returns_503_before_models_load() {
    let router = build_router(fresh_state());
    let (status, body) = post_extract(router, serde_json::json!({ "doc": "краб" })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("loading"));
}

#[tokio::test]
async fn extract_returns_503_forever_after_init_error() {
    let state = fresh_state();
    state.readiness.advance(Phase::LoadingEmbedder, 10).await;
    state.readiness.fail("model file corrupt".to_string()).await;

    let (status, _) = post_extract(
        build_router(state),
        serde_json::json!({ "doc": "краб" }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================
// Status endpoint
// ============================================================

#[tokio::test]
async fn status_reports_loading_phase_and_percent() {
    let state = fresh_state();
    state.readiness.advance(Phase::LoadingEmbedder, 10).await;
    state.readiness.advance(Phase::LoadingKwModel, 50).await;

    let (status, body) = get(build_router(state), "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "loading_kw_model");
    assert_eq!(body["percent"], 50);
    assert_eq!(body["details"]["model"], "sberbank-ai/sbert_large_nlu_ru");
}

#[tokio::test]
async fn status_reports_terminal_error_with_details() {
    let state = fresh_state();
    state.readiness.advance(Phase::LoadingEmbedder, 10).await;
    state.readiness.fail("download incomplete".to_string()).await;

    let (status, body) = get(build_router(state), "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert_eq!(body["percent"], 0);
    assert_eq!(body["details"]["error"], "download incomplete");
}

#[tokio::test]
async fn status_reports_ready_at_one_hundred() {
    let state = ready_state(Box::new(StubExtractor::new(&[]))).await;
    let (_, body) = get(build_router(state), "/status").await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["percent"], 100);
}

// ============================================================
// Validation
// ============================================================

#[tokio::test]
async fn min_ngram_greater_than_max_ngram_is_400() {
    let state = ready_state(Box::new(StubExtractor::new(&[("краб", 0.9)]))).await;
    let (status, body) = post_extract(
        build_router(state),
        serde_json::json!({ "doc": "краб", "min_ngram": 3, "max_ngram": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("min_ngram"));
}

#[tokio::test]
async fn validation_applies_even_while_not_ready() {
    // A request that is invalid regardless of load state gets the 400,
    // not the 503.
    let (status, _) = post_extract(
        build_router(fresh_state()),
        serde_json::json!({ "doc": "краб", "min_ngram": 3, "max_ngram": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn top_n_above_configured_max_is_400() {
    let state = ready_state(Box::new(StubExtractor::new(&[("краб", 0.9)]))).await;
    let (status, body) = post_extract(
        build_router(state),
        serde_json::json!({ "doc": "краб", "top_n": 101 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("top_n"));
}

#[tokio::test]
async fn top_n_zero_is_400() {
    let state = ready_state(Box::new(StubExtractor::new(&[("краб", 0.9)]))).await;
    let (status, _) = post_extract(
        build_router(state),
        serde_json::json!({ "doc": "краб", "top_n": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn zero_ngram_is_400() {
    let state = ready_state(Box::new(StubExtractor::new(&[("краб", 0.9)]))).await;
    let (status, _) = post_extract(
        build_router(state),
        serde_json::json!({ "doc": "краб", "min_ngram": 0, "max_ngram": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================
// Extraction
// ============================================================

#[tokio::test]
async fn extract_dedups_by_stem_and_keeps_descending_order() {
    // "панцире" and "панциря" share the stem "панцир" — only the
    // higher-scored one survives.
    let state = ready_state(Box::new(StubExtractor::new(&[
        ("панцире", 0.95),
        ("панциря", 0.90),
        ("ракообразные", 0.85),
        ("море", 0.40),
    ])))
    .await;

    let (status, body) = post_extract(
        build_router(state),
        serde_json::json!({ "doc": "Ракообразные в панцире или без панциря.", "top_n": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let stems = body["stems"].as_array().unwrap();
    assert_eq!(stems.len(), 3, "collided stem dropped: {stems:?}");

    let stemmer = RussianStemmer::new();
    assert_eq!(stems[0][0], serde_json::json!(stemmer.stem("панцире")));
    assert!((stems[0][1].as_f64().unwrap() - 0.95).abs() < 1e-6);

    // Unique stems, non-increasing scores
    let mut seen = std::collections::HashSet::new();
    let mut last = f64::INFINITY;
    for pair in stems {
        let stem = pair[0].as_str().unwrap().to_string();
        let score = pair[1].as_f64().unwrap();
        assert!(seen.insert(stem));
        assert!(score <= last);
        last = score;
    }
}

#[tokio::test]
async fn extract_requests_double_top_n_from_extractor() {
    let extractor = StubExtractor::new(&[("краб", 0.9), ("море", 0.8)]);
    let last_top_n = extractor.last_top_n.clone();
    let state = ready_state(Box::new(extractor)).await;

    let (status, _) = post_extract(
        build_router(state),
        serde_json::json!({ "doc": "краб", "top_n": 7 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(*last_top_n.lock().unwrap(), Some(14));
}

#[tokio::test]
async fn extract_truncates_to_top_n_unique_stems() {
    let state = ready_state(Box::new(StubExtractor::new(&[
        ("краб", 0.9),
        ("море", 0.8),
        ("вода", 0.7),
        ("песок", 0.6),
    ])))
    .await;

    let (_, body) = post_extract(
        build_router(state),
        serde_json::json!({ "doc": "краб море вода песок", "top_n": 2 }),
    )
    .await;
    assert_eq!(body["stems"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn extract_is_idempotent_for_identical_input() {
    let state = ready_state(Box::new(StubExtractor::new(&[
        ("панцире", 0.95),
        ("ракообразные", 0.85),
    ])))
    .await;
    let router = build_router(state);

    let req = serde_json::json!({ "doc": "Ракообразные в панцире.", "top_n": 5 });
    let (_, first) = post_extract(router.clone(), req.clone()).await;
    let (_, second) = post_extract(router, req).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn extract_empty_candidate_pool_returns_empty_list() {
    let state = ready_state(Box::new(StubExtractor::new(&[]))).await;
    let (status, body) = post_extract(
        build_router(state),
        serde_json::json!({ "doc": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stems"], serde_json::json!([]));
}

#[tokio::test]
async fn extractor_failure_surfaces_as_structured_500() {
    let state = ready_state(Box::new(FailingExtractor)).await;
    let (status, body) = post_extract(
        build_router(state),
        serde_json::json!({ "doc": "краб" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}
