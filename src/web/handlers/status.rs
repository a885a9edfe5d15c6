// GET /status — returns the current readiness snapshot.
//
// A direct read with no side effects. Always 200: clients poll this while
// /extract returns 503 to watch the load sequence progress, and to see the
// terminal error message when initialization failed.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::web::AppState;

pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let snap = state.readiness.snapshot().await;

    let mut details = serde_json::Map::new();
    details.insert(
        "model".to_string(),
        serde_json::Value::String(state.config.model_name.clone()),
    );
    if let Some(started_at) = snap.started_at {
        details.insert("started_at".to_string(), serde_json::Value::String(started_at));
    }
    if let Some(error) = snap.error {
        details.insert("error".to_string(), serde_json::Value::String(error));
    }

    Json(serde_json::json!({
        "status": snap.phase,
        "percent": snap.percent,
        "details": details,
    }))
}
