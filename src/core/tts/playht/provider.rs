//! Play.ht streaming synthesis and instant voice cloning.
//!
//! # Request Format
//!
//! **Synthesis**: `POST {base_url}/tts/stream` with a JSON body; the response
//! body is the encoded audio, delivered as a chunked stream.
//!
//! **Clone**: `POST {base_url}/cloned-voices/instant` with a multipart form
//! (`sample_file_url`, `voice_name`, `gender`); the response is a JSON voice
//! object whose `id` is used as the `voice` of later synthesis requests.
//!
//! Both requests carry the `X-USER-ID` and `AUTHORIZATION` headers.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::Form;
use tracing::{debug, info, warn};

use super::config::PlayHtTtsConfig;
use super::messages::{PlayHtApiError, PlayHtTtsRequest, PlayHtVoiceCloneResponse};
use super::{DEFAULT_SPEED, MAX_TEXT_LENGTH};
use crate::core::tts::base::{AudioStream, SpeechSynthesizer, TTSError, TTSResult};

/// Play.ht TTS provider.
///
/// Holds a pooled `reqwest::Client`; cloning the provider shares the pool.
#[derive(Clone)]
pub struct PlayHtTts {
    client: reqwest::Client,
    config: PlayHtTtsConfig,
}

impl PlayHtTts {
    /// Creates a new Play.ht TTS provider with custom configuration.
    ///
    /// # Errors
    /// * `TTSError::InvalidConfiguration` - If the configuration does not validate
    /// * `TTSError::InternalError` - If the HTTP client cannot be built
    pub fn with_config(config: PlayHtTtsConfig) -> TTSResult<Self> {
        config.validate().map_err(TTSError::InvalidConfiguration)?;

        let mut builder = reqwest::Client::builder().pool_idle_timeout(Duration::from_secs(90));
        if let Some(secs) = config.base.connection_timeout {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| TTSError::InternalError(format!("Failed to build HTTP client: {e}")))?;

        info!(
            "Created PlayHtTts provider: base_url={}, voice_engine={}, format={}",
            config.base_url, config.voice_engine, config.output_format
        );

        Ok(Self { client, config })
    }

    /// Returns the Play.ht-specific configuration.
    pub fn playht_config(&self) -> &PlayHtTtsConfig {
        &self.config
    }

    /// Builds the JSON request body for a synthesis call.
    fn build_request(&self, text: &str, voice_id: &str) -> PlayHtTtsRequest {
        let cfg = &self.config;
        let mut request = PlayHtTtsRequest::new(
            voice_id,
            text,
            cfg.voice_engine.as_str(),
            cfg.output_format.as_str(),
        )
        .with_sample_rate(cfg.sample_rate);

        if (cfg.speed - DEFAULT_SPEED).abs() > 0.001 {
            request = request.with_speed(cfg.speed);
        }
        request
    }

    /// Validates text length before synthesis.
    ///
    /// Uses character count (not byte length) to properly handle Unicode text.
    fn validate_text(text: &str) -> TTSResult<()> {
        if text.trim().is_empty() {
            return Err(TTSError::InvalidConfiguration(
                "Text to synthesize must not be empty".to_string(),
            ));
        }
        let char_count = text.chars().count();
        if char_count > MAX_TEXT_LENGTH {
            return Err(TTSError::InvalidConfiguration(format!(
                "Text exceeds maximum length of {} characters (got {})",
                MAX_TEXT_LENGTH, char_count
            )));
        }
        Ok(())
    }

    /// Parses a Play.ht API error response body into a structured error.
    ///
    /// Returns `None` when the body is not JSON or carries neither a message nor a code.
    pub fn parse_api_error(response_body: &[u8]) -> Option<PlayHtApiError> {
        match serde_json::from_slice::<PlayHtApiError>(response_body) {
            Ok(error) if error.message.is_some() || error.code.is_some() => Some(error),
            _ => None,
        }
    }

    /// Converts an HTTP status code and response body into a descriptive error.
    pub fn error_from_response(status: u16, response_body: Option<&[u8]>) -> TTSError {
        let api_error = response_body.and_then(Self::parse_api_error);

        let message = match (status, &api_error) {
            (401, Some(err)) => format!(
                "Play.ht authentication failed: {}. Verify your API key and user ID.",
                err
            ),
            (401, None) => {
                "Play.ht authentication failed. Verify your API key (AUTHORIZATION header) and user ID (X-USER-ID header).".to_string()
            }

            (403, Some(err)) => format!(
                "Play.ht access denied: {}. Check your subscription and voice permissions.",
                err
            ),
            (403, None) => {
                "Play.ht access denied. Check your subscription tier and voice permissions."
                    .to_string()
            }

            (404, Some(err)) => format!("Play.ht resource not found: {}", err),
            (404, None) => "Play.ht voice not found. Verify the voice ID is correct.".to_string(),

            (429, Some(err)) => format!("Play.ht rate limit exceeded: {}", err),
            (429, None) => "Play.ht rate limit exceeded.".to_string(),

            (500..=599, Some(err)) => format!("Play.ht server error ({}): {}", status, err),
            (500..=599, None) => format!("Play.ht server error ({})", status),

            (_, Some(err)) => format!("Play.ht API error ({}): {}", status, err),
            (_, None) => format!("Play.ht API request failed with status {}", status),
        };

        if let Some(err) = &api_error {
            warn!(
                status = status,
                error_message = ?err.message,
                error_code = ?err.code,
                "Play.ht API error"
            );
        }

        TTSError::ProviderError(message)
    }

    /// Turns a non-success response into a `TTSError`, consuming its body.
    async fn error_for_status(response: reqwest::Response) -> TTSError {
        let status = response.status().as_u16();
        let body = response.bytes().await.ok();
        Self::error_from_response(status, body.as_deref())
    }

    fn send_error(err: reqwest::Error) -> TTSError {
        if err.is_connect() {
            TTSError::ConnectionFailed(format!("Failed to connect to Play.ht: {err}"))
        } else if err.is_timeout() {
            TTSError::Timeout(format!("Play.ht request timed out: {err}"))
        } else {
            TTSError::NetworkError(format!("Play.ht request failed: {err}"))
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for PlayHtTts {
    async fn synthesize(&self, text: &str, voice_id: &str) -> TTSResult<AudioStream> {
        Self::validate_text(text)?;
        if voice_id.trim().is_empty() {
            return Err(TTSError::InvalidConfiguration(
                "voice_id is required for Play.ht synthesis".to_string(),
            ));
        }

        let request = self.build_request(text, voice_id);
        debug!(
            voice = voice_id,
            voice_engine = %self.config.voice_engine,
            text_chars = text.chars().count(),
            "Sending Play.ht synthesis request"
        );

        let response = self
            .client
            .post(self.config.tts_url())
            .header("X-USER-ID", &self.config.user_id)
            .header("AUTHORIZATION", &self.config.base.api_key)
            .header("Accept", self.config.output_format.content_type())
            .json(&request)
            .send()
            .await
            .map_err(Self::send_error)?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TTSError::NetworkError(format!("Play.ht stream error: {e}"))));

        Ok(Box::pin(stream))
    }

    async fn clone_voice(&self, name: &str, sample_url: &str, gender: &str) -> TTSResult<String> {
        info!(voice_name = name, gender = gender, "Creating Play.ht instant voice clone");

        let form = Form::new()
            .text("sample_file_url", sample_url.to_string())
            .text("voice_name", name.to_string())
            .text("gender", gender.to_string());

        let response = self
            .client
            .post(self.config.clone_url())
            .header("X-USER-ID", &self.config.user_id)
            .header("AUTHORIZATION", &self.config.base.api_key)
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(Self::send_error)?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let voice: PlayHtVoiceCloneResponse = response.json().await.map_err(|e| {
            TTSError::ProviderError(format!("Failed to parse Play.ht clone response: {e}"))
        })?;

        info!(voice_id = %voice.id, voice_name = %voice.name, "Play.ht voice cloned");
        Ok(voice.id)
    }

    fn output_content_type(&self) -> &'static str {
        self.config.output_format.content_type()
    }

    fn output_file_extension(&self) -> &'static str {
        self.config.output_format.file_extension()
    }

    fn provider_name(&self) -> &'static str {
        "playht"
    }
}

// =============================================================================
// Tests
// =============================================================================
