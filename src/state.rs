use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::ServerConfig;
use crate::core::orchestrator::CloneOrchestrator;
use crate::core::tts::{SpeechSynthesizer, create_synthesizer};
use crate::storage::{AudioStore, create_audio_store};

/// Application state shared by all handlers.
///
/// Built once at start-up and never mutated afterwards.
pub struct AppState {
    pub config: ServerConfig,
    pub store: Arc<dyn AudioStore>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub orchestrator: CloneOrchestrator,
}

impl AppState {
    /// Build the storage backend and synthesizer from `config` and prepare the
    /// staging directory.
    pub async fn new(config: ServerConfig) -> anyhow::Result<Arc<Self>> {
        let store = create_audio_store(&config).context("Failed to initialize audio storage")?;
        let synthesizer =
            create_synthesizer(&config).context("Failed to initialize speech synthesizer")?;

        let state = Self::with_components(config, store, synthesizer);
        state
            .orchestrator
            .staging()
            .ensure_dir()
            .await
            .context("Failed to prepare staging directory")?;

        info!(
            backend = %state.config.storage_backend,
            bucket = state.store.bucket(),
            provider = state.synthesizer.provider_name(),
            voice_strategy = %state.config.voice_strategy,
            staging_dir = %state.orchestrator.staging().dir().display(),
            "Application state initialized"
        );

        Ok(state)
    }

    /// Assemble state from already-built components.
    pub fn with_components(
        config: ServerConfig,
        store: Arc<dyn AudioStore>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Arc<Self> {
        let orchestrator =
            CloneOrchestrator::from_config(&config, store.clone(), synthesizer.clone());
        Arc::new(Self {
            config,
            store,
            synthesizer,
            orchestrator,
        })
    }
}
