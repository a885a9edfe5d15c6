use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Default HuggingFace id of the Russian sentence-embedding model.
pub const DEFAULT_MODEL_NAME: &str = "sberbank-ai/sbert_large_nlu_ru";

/// Default upper bound accepted for `top_n` in extraction requests.
pub const DEFAULT_TOP_N_MAX: usize = 100;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
pub struct Config {
    /// HuggingFace model id used for sentence embeddings (MODEL_NAME env var).
    pub model_name: String,
    /// Upper bound accepted for `top_n` (TOP_N_MAX env var).
    pub top_n_max: usize,
    /// Base directory containing downloaded model files (STEMKA_MODEL_DIR env var).
    pub model_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default; the only hard failure is an unparseable
    /// TOP_N_MAX, which is reported at startup rather than per request.
    pub fn load() -> Result<Self> {
        let model_name =
            env::var("MODEL_NAME").unwrap_or_else(|_| DEFAULT_MODEL_NAME.to_string());

        let top_n_max = match env::var("TOP_N_MAX") {
            Ok(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("TOP_N_MAX must be a positive integer, got {raw:?}"))?,
            Err(_) => DEFAULT_TOP_N_MAX,
        };
        if top_n_max == 0 {
            anyhow::bail!("TOP_N_MAX must be at least 1");
        }

        let model_dir = env::var("STEMKA_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::download::default_model_dir());

        Ok(Self {
            model_name,
            top_n_max,
            model_dir,
        })
    }

    /// Directory holding the files for the configured model.
    pub fn model_files_dir(&self) -> PathBuf {
        crate::download::model_subdir(&self.model_dir, &self.model_name)
    }

    /// Check that the configured model's files are on disk.
    /// Call this before any operation that loads the embedder.
    pub fn require_model(&self) -> Result<()> {
        if !crate::download::model_files_present(&self.model_files_dir()) {
            anyhow::bail!(
                "Model files for {} not found in {}\n\
                 Run `stemka download-model` to download them.",
                self.model_name,
                self.model_files_dir().display()
            );
        }
        Ok(())
    }
}
