// Readiness tracking for the model-loading lifecycle.
//
// One record, one writer (the init job), many readers (the extract guard
// and GET /status). The whole record sits behind a tokio RwLock so readers
// always observe a fully updated snapshot, never a half-written one.
//
// Phases only move forward: not_started → loading_embedder → loading_kw_model
// → loading_stemmer → ready, or a jump to error from any non-terminal phase.
// ready and error are terminal — updates after either are ignored, and a
// process restart is the only way out of error.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::warn;

/// Load progress phases, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    LoadingEmbedder,
    LoadingKwModel,
    LoadingStemmer,
    Ready,
    Error,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::NotStarted => "not_started",
            Phase::LoadingEmbedder => "loading_embedder",
            Phase::LoadingKwModel => "loading_kw_model",
            Phase::LoadingStemmer => "loading_stemmer",
            Phase::Ready => "ready",
            Phase::Error => "error",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Phase::Ready | Phase::Error)
    }

    /// Position in the forward-only sequence. Error sits outside it.
    fn order(&self) -> u8 {
        match self {
            Phase::NotStarted => 0,
            Phase::LoadingEmbedder => 1,
            Phase::LoadingKwModel => 2,
            Phase::LoadingStemmer => 3,
            Phase::Ready => 4,
            Phase::Error => u8::MAX,
        }
    }
}

/// A consistent snapshot of load progress, exposed via GET /status.
#[derive(Debug, Clone, Serialize)]
pub struct Readiness {
    pub phase: Phase,
    pub percent: u8,
    /// ISO 8601 timestamp of when loading started.
    pub started_at: Option<String>,
    /// Error message when phase is Error.
    pub error: Option<String>,
}

impl Default for Readiness {
    fn default() -> Self {
        Self {
            phase: Phase::NotStarted,
            percent: 0,
            started_at: None,
            error: None,
        }
    }
}

/// Shared handle to the readiness record. Clone freely — all clones point
/// at the same state.
#[derive(Clone, Default)]
pub struct ReadinessTracker {
    inner: Arc<RwLock<Readiness>>,
}

impl ReadinessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking read of the current state.
    pub async fn snapshot(&self) -> Readiness {
        self.inner.read().await.clone()
    }

    pub async fn is_ready(&self) -> bool {
        self.inner.read().await.phase == Phase::Ready
    }

    /// Move to the next load phase. Writer-only (the init job).
    ///
    /// Backward or repeated transitions and any update after a terminal
    /// phase are ignored with a warning — the sequence is forward-only.
    pub async fn advance(&self, phase: Phase, percent: u8) {
        let mut state = self.inner.write().await;

        if state.phase.is_terminal() || phase.order() <= state.phase.order() {
            warn!(
                from = state.phase.as_str(),
                to = phase.as_str(),
                "Ignoring non-forward readiness transition"
            );
            return;
        }

        if state.started_at.is_none() {
            state.started_at = Some(Utc::now().to_rfc3339());
        }
        state.phase = phase;
        state.percent = percent;
    }

    /// Record a terminal load failure. Ignored if already terminal.
    pub async fn fail(&self, message: String) {
        let mut state = self.inner.write().await;

        if state.phase.is_terminal() {
            warn!(
                phase = state.phase.as_str(),
                "Ignoring failure report after terminal phase"
            );
            return;
        }

        state.phase = Phase::Error;
        state.percent = 0;
        state.error = Some(message);
    }
}
