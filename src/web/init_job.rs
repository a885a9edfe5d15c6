// Background model initialization — runs once at server start.
//
// Loading the SBERT model can take seconds to minutes, so it happens off
// the request-accepting path: the server answers /health and /status
// immediately while this job walks the load sequence and updates the
// readiness tracker at each milestone.
//
// Any failure is terminal: the error lands in the readiness state, the
// process stays reachable, and /extract returns 503 until a restart.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::config::Config;
use crate::embedding::SentenceEmbedder;
use crate::keywords::EmbeddingKeyphraseExtractor;
use crate::readiness::{Phase, ReadinessTracker};
use crate::stem::RussianStemmer;
use crate::web::{ModelSlot, ReadyModels};

/// Launch the load sequence in a background tokio task.
/// Returns immediately. Callers poll the readiness tracker for progress.
pub fn launch_init(config: Arc<Config>, readiness: ReadinessTracker, models: ModelSlot) {
    tokio::spawn(async move {
        if let Err(e) = run_init(config, readiness.clone(), models).await {
            error!(error = %e, "Model initialization failed");
            readiness.fail(e.to_string()).await;
        }
    });
}

async fn run_init(
    config: Arc<Config>,
    readiness: ReadinessTracker,
    models: ModelSlot,
) -> Result<()> {
    info!(model = %config.model_name, "Initializing models...");

    readiness.advance(Phase::LoadingEmbedder, 10).await;
    config.require_model()?;
    let model_dir = config.model_files_dir();
    let embedder = tokio::task::spawn_blocking(move || SentenceEmbedder::load(&model_dir))
        .await
        .context("spawn_blocking panicked")??;
    info!("Embedding model loaded");

    readiness.advance(Phase::LoadingKwModel, 50).await;
    let extractor = EmbeddingKeyphraseExtractor::new(Arc::new(embedder));
    info!("Keyphrase extractor ready");

    readiness.advance(Phase::LoadingStemmer, 80).await;
    let stemmer = RussianStemmer::new();
    info!("Stemmer initialized");

    // Publish the bundle before flipping to ready, so the extract guard
    // can never observe a ready state with an empty model slot.
    *models.write().await = Some(Arc::new(ReadyModels {
        extractor: Box::new(extractor),
        stemmer,
    }));
    readiness.advance(Phase::Ready, 100).await;
    info!("Service is ready");

    Ok(())
}
