//! Upload → synthesize → upload pipeline behind `POST /upload`.
//!
//! [`CloneOrchestrator::process`] runs the steps strictly in order and stops at
//! the first failure:
//!
//! 1. upload the original sample as `audio/{id}_{filename}`
//! 2. resolve the voice (fixed id, or an instant clone of the uploaded sample)
//! 3. stream the synthesized speech into a staged file
//! 4. upload the staged file as `cloned-audio/{id}_{staged file name}`
//! 5. remove the staged file (on every exit path)
//!
//! Nothing is retried. With compensation enabled, a failure after step 1
//! deletes the stored original; otherwise it stays in the bucket.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::StreamExt;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::{ServerConfig, VoiceStrategyKind};
use crate::core::staging::StagingArea;
use crate::core::tts::SpeechSynthesizer;
use crate::errors::{AppError, AppResult};
use crate::storage::{AudioStore, StoredObject};

/// Message for a request without an audio file or text.
pub const MISSING_INPUT_MESSAGE: &str = "Audio file and text are required.";

pub const DEFAULT_VOICE_NAME: &str = "cloned-voice";
pub const DEFAULT_GENDER: &str = "male";

/// Content type assumed for uploads that do not declare one.
pub const DEFAULT_AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

const ORIGINAL_PREFIX: &str = "audio";
const GENERATED_PREFIX: &str = "cloned-audio";

/// The uploaded audio sample.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A validated upload request.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub audio: AudioUpload,
    pub text: String,
    /// Voice name for instant cloning
    pub voice_name: String,
    /// Gender tag for instant cloning
    pub gender: String,
}

impl UploadRequest {
    /// Build a request from the raw form fields.
    ///
    /// Fails with a validation error if the audio is missing or the text is
    /// missing or blank. Optional fields fall back to their defaults.
    pub fn from_parts(
        audio: Option<AudioUpload>,
        text: Option<String>,
        voice_name: Option<String>,
        gender: Option<String>,
    ) -> AppResult<Self> {
        let text = text.filter(|t| !t.trim().is_empty());
        let (Some(audio), Some(text)) = (audio, text) else {
            return Err(AppError::Validation(MISSING_INPUT_MESSAGE.to_string()));
        };

        Ok(Self {
            audio,
            text,
            voice_name: non_blank(voice_name).unwrap_or_else(|| DEFAULT_VOICE_NAME.to_string()),
            gender: non_blank(gender).unwrap_or_else(|| DEFAULT_GENDER.to_string()),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedAudio {
    pub original: StoredObject,
    pub generated: StoredObject,
    /// Voice the speech was synthesized with
    pub voice_id: String,
}

/// How the voice for synthesis is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceStrategy {
    /// Use one pre-registered voice for every request
    Fixed { voice_id: String },
    /// Clone a voice from each uploaded sample
    ClonePerRequest,
}

impl VoiceStrategy {
    pub fn from_config(config: &ServerConfig) -> Self {
        match config.voice_strategy {
            VoiceStrategyKind::Fixed => Self::Fixed {
                voice_id: config.playht_voice_id.clone().unwrap_or_default(),
            },
            VoiceStrategyKind::Clone => Self::ClonePerRequest,
        }
    }
}

/// Source of the unique component of storage keys.
pub trait KeyIdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random UUID v4 key ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidKeys;

impl KeyIdSource for UuidKeys {
    fn next_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Reduce a client-supplied file name to a safe object key component.
///
/// Directory components are dropped, characters other than ASCII letters,
/// digits, `.`, `-` and `_` become `_`, and leading dots are removed.
pub fn sanitize_filename(file_name: &str) -> String {
    const MAX_FILENAME_LENGTH: usize = 200;

    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let sanitized: String = base
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_start_matches('.');

    if sanitized.trim_matches('_').is_empty() {
        "audio".to_string()
    } else {
        sanitized.to_string()
    }
}

/// Runs the upload pipeline against a store and a synthesizer.
pub struct CloneOrchestrator {
    store: Arc<dyn AudioStore>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    staging: StagingArea,
    strategy: VoiceStrategy,
    keys: Arc<dyn KeyIdSource>,
    storage_timeout: Duration,
    synthesis_timeout: Duration,
    compensate_on_failure: bool,
}

impl CloneOrchestrator {
    pub fn new(
        store: Arc<dyn AudioStore>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        staging: StagingArea,
        strategy: VoiceStrategy,
    ) -> Self {
        Self {
            store,
            synthesizer,
            staging,
            strategy,
            keys: Arc::new(UuidKeys),
            storage_timeout: Duration::from_secs(30),
            synthesis_timeout: Duration::from_secs(120),
            compensate_on_failure: false,
        }
    }

    /// Build an orchestrator with strategy, timeouts and staging taken from `config`.
    pub fn from_config(
        config: &ServerConfig,
        store: Arc<dyn AudioStore>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self::new(
            store,
            synthesizer,
            StagingArea::new(config.staging_dir.clone()),
            VoiceStrategy::from_config(config),
        )
        .with_timeouts(
            Duration::from_secs(config.storage_timeout_seconds),
            Duration::from_secs(config.synthesis_timeout_seconds),
        )
        .with_compensation(config.compensate_on_failure)
    }

    pub fn with_key_source(mut self, keys: Arc<dyn KeyIdSource>) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_timeouts(mut self, storage: Duration, synthesis: Duration) -> Self {
        self.storage_timeout = storage;
        self.synthesis_timeout = synthesis;
        self
    }

    pub fn with_compensation(mut self, enabled: bool) -> Self {
        self.compensate_on_failure = enabled;
        self
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn strategy(&self) -> &VoiceStrategy {
        &self.strategy
    }

    /// Run the pipeline for one request.
    pub async fn process(&self, request: UploadRequest) -> AppResult<ProcessedAudio> {
        let started = Instant::now();

        let original = self.upload_original(&request.audio).await?;

        match self.synthesize_and_store(&request, &original).await {
            Ok((generated, voice_id)) => {
                info!(
                    original_key = %original.key,
                    generated_key = %generated.key,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Processed upload"
                );
                Ok(ProcessedAudio {
                    original,
                    generated,
                    voice_id,
                })
            }
            Err(err) => {
                if self.compensate_on_failure {
                    self.remove_original(&original).await;
                }
                Err(err)
            }
        }
    }

    async fn upload_original(&self, audio: &AudioUpload) -> AppResult<StoredObject> {
        let key = format!(
            "{}/{}_{}",
            ORIGINAL_PREFIX,
            self.keys.next_id(),
            sanitize_filename(&audio.file_name)
        );
        let content_type = audio
            .content_type
            .as_deref()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(DEFAULT_AUDIO_CONTENT_TYPE);

        debug!(key = %key, size_bytes = audio.data.len(), "Uploading original audio");
        self.upload(&key, audio.data.clone(), content_type).await
    }

    async fn synthesize_and_store(
        &self,
        request: &UploadRequest,
        original: &StoredObject,
    ) -> AppResult<(StoredObject, String)> {
        let voice_id = self.resolve_voice(request, original).await?;

        // Removed when dropped, whichever way this function returns.
        let mut staged = self
            .staging
            .create_file(self.synthesizer.output_file_extension())
            .await?;

        let synthesis = async {
            let mut stream = self
                .synthesizer
                .synthesize(&request.text, &voice_id)
                .await?;
            while let Some(chunk) = stream.next().await {
                staged.write_chunk(&chunk?).await?;
            }
            Ok::<(), AppError>(())
        };
        timeout(self.synthesis_timeout, synthesis)
            .await
            .map_err(|_| {
                AppError::Synthesis(format!(
                    "Speech synthesis timed out after {}s",
                    self.synthesis_timeout.as_secs()
                ))
            })??;

        let data = staged.read_all().await?;
        info!(
            provider = self.synthesizer.provider_name(),
            size_bytes = data.len(),
            "Synthesized audio staged"
        );

        let key = format!(
            "{}/{}_{}",
            GENERATED_PREFIX,
            self.keys.next_id(),
            staged.file_name()
        );
        let generated = self
            .upload(&key, data, self.synthesizer.output_content_type())
            .await?;

        Ok((generated, voice_id))
    }

    async fn resolve_voice(
        &self,
        request: &UploadRequest,
        original: &StoredObject,
    ) -> AppResult<String> {
        match &self.strategy {
            VoiceStrategy::Fixed { voice_id } => Ok(voice_id.clone()),
            VoiceStrategy::ClonePerRequest => {
                let clone = self.synthesizer.clone_voice(
                    &request.voice_name,
                    &original.public_url,
                    &request.gender,
                );
                timeout(self.synthesis_timeout, clone)
                    .await
                    .map_err(|_| {
                        AppError::Synthesis(format!(
                            "Voice cloning timed out after {}s",
                            self.synthesis_timeout.as_secs()
                        ))
                    })?
                    .map_err(AppError::from)
            }
        }
    }

    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<StoredObject> {
        let stored = timeout(
            self.storage_timeout,
            self.store.upload(key, data, content_type),
        )
        .await
        .map_err(|_| {
            AppError::Storage(format!(
                "Upload of {key} timed out after {}s",
                self.storage_timeout.as_secs()
            ))
        })??;
        Ok(stored)
    }

    async fn remove_original(&self, original: &StoredObject) {
        match timeout(self.storage_timeout, self.store.delete(&original.key)).await {
            Ok(Ok(())) => info!(key = %original.key, "Removed original after failed request"),
            Ok(Err(e)) => error!(key = %original.key, error = %e, "Failed to remove original"),
            Err(_) => warn!(key = %original.key, "Timed out removing original"),
        }
    }
}
