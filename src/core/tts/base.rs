//! Base traits and types for speech synthesis providers.
//!
//! A synthesizer turns text into a stream of encoded audio chunks for a given
//! voice, and can register a new voice from a publicly reachable audio sample.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during synthesis or voice cloning.
#[derive(Debug, Error)]
pub enum TTSError {
    /// The provider could not be reached
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Transport error while sending the request or reading the response stream
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Invalid provider or request configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The provider answered with an error
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Operation timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type for synthesis operations.
pub type TTSResult<T> = Result<T, TTSError>;

/// Encoded audio chunks as they arrive from the provider.
pub type AudioStream = Pin<Box<dyn Stream<Item = TTSResult<Bytes>> + Send>>;

// =============================================================================
// Configuration
// =============================================================================

/// Provider-independent synthesis settings.
#[derive(Debug, Clone)]
pub struct TTSConfig {
    /// API key used to authenticate against the provider
    pub api_key: String,
    /// Model / voice engine name
    pub model: String,
    /// Requested output encoding (mp3, wav, ...)
    pub audio_format: Option<String>,
    /// Output sample rate in Hz
    pub sample_rate: Option<u32>,
    /// Speed multiplier
    pub speaking_rate: Option<f32>,
    /// TCP connect timeout for provider requests
    pub connection_timeout: Option<u64>,
}

impl Default for TTSConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: String::new(),
            audio_format: Some("mp3".to_string()),
            sample_rate: None,
            speaking_rate: None,
            connection_timeout: Some(10),
        }
    }
}

// =============================================================================
// Synthesizer Trait
// =============================================================================

/// Speech synthesis backend used by the upload pipeline.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Start synthesizing `text` with `voice_id`.
    ///
    /// Returns once the provider has accepted the request; the audio is then
    /// read from the returned stream. Any item of the stream may be an error.
    async fn synthesize(&self, text: &str, voice_id: &str) -> TTSResult<AudioStream>;

    /// Register a new voice from the audio sample at `sample_url` and return its id.
    async fn clone_voice(&self, name: &str, sample_url: &str, gender: &str) -> TTSResult<String>;

    /// MIME type of the audio produced by [`SpeechSynthesizer::synthesize`].
    fn output_content_type(&self) -> &'static str;

    /// File extension matching [`SpeechSynthesizer::output_content_type`], without the dot.
    fn output_file_extension(&self) -> &'static str;

    /// Provider name, used in logs.
    fn provider_name(&self) -> &'static str;
}
