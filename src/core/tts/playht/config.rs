//! Play.ht TTS configuration types.
//!
//! This module defines the configuration structures for the Play.ht TTS provider,
//! including audio format mappings, model selection, and provider-specific settings.

use serde::{Deserialize, Serialize};

use crate::core::tts::base::TTSConfig;

use super::{
    DEFAULT_MODEL, DEFAULT_SAMPLE_RATE, DEFAULT_SPEED, MAX_SPEED, MIN_SPEED, PLAYHT_API_BASE_URL,
};

// =============================================================================
// Voice Engine / Model
// =============================================================================

/// Play.ht voice engine (model).
///
/// Maps to Play.ht's `voice_engine` parameter in the API request.
///
/// # Available Models
///
/// - `PlayHt20` - PlayHT 2.0, works with instant clones (default)
/// - `PlayHt20Turbo` - English only, lower latency variant of 2.0
/// - `Play30Mini` - Fast, multilingual
/// - `PlayDialog` - Expressive, dialogue support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlayHtModel {
    /// PlayHT 2.0 (default)
    #[default]
    #[serde(rename = "PlayHT2.0")]
    PlayHt20,
    /// PlayHT 2.0 Turbo - English only
    #[serde(rename = "PlayHT2.0-turbo")]
    PlayHt20Turbo,
    /// Play 3.0 mini - fast, multilingual
    #[serde(rename = "Play3.0-mini")]
    Play30Mini,
    /// PlayDialog - expressive, dialogue support
    #[serde(rename = "PlayDialog")]
    PlayDialog,
}

impl PlayHtModel {
    /// Returns the Play.ht API string for this model.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PlayHt20 => "PlayHT2.0",
            Self::PlayHt20Turbo => "PlayHT2.0-turbo",
            Self::Play30Mini => "Play3.0-mini",
            Self::PlayDialog => "PlayDialog",
        }
    }

    /// Returns all available models.
    pub const fn all() -> &'static [Self] {
        &[
            Self::PlayHt20,
            Self::PlayHt20Turbo,
            Self::Play30Mini,
            Self::PlayDialog,
        ]
    }

    /// Creates a model from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "playht2.0" | "playht20" | "2.0" => Some(Self::PlayHt20),
            "playht2.0-turbo" | "playht20turbo" | "turbo" => Some(Self::PlayHt20Turbo),
            "play3.0-mini" | "play30mini" | "play3" | "mini" => Some(Self::Play30Mini),
            "playdialog" | "dialog" => Some(Self::PlayDialog),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlayHtModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Audio Format
// =============================================================================

/// Play.ht audio output format.
///
/// Maps to Play.ht's `output_format` parameter in the API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayHtAudioFormat {
    /// MP3 format (default)
    #[default]
    Mp3,
    /// WAV container
    Wav,
    /// G.711 mu-law
    Mulaw,
    /// FLAC lossless
    Flac,
    /// OGG container (Vorbis)
    Ogg,
}

impl PlayHtAudioFormat {
    /// Returns the Play.ht API format string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Mulaw => "mulaw",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
        }
    }

    /// Returns the MIME content type, used for the Accept header and for
    /// storing the generated audio.
    #[inline]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Mulaw => "audio/basic",
            Self::Flac => "audio/flac",
            Self::Ogg => "audio/ogg",
        }
    }

    /// Returns the file extension for staged and stored audio.
    #[inline]
    pub const fn file_extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Mulaw => "ulaw",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
        }
    }

    /// Parses a format name, returning `None` for unknown formats.
    pub fn parse(format: &str) -> Option<Self> {
        match format.trim().to_lowercase().as_str() {
            "mp3" | "mpeg" => Some(Self::Mp3),
            "mulaw" | "ulaw" | "g711" => Some(Self::Mulaw),
            "wav" | "wave" => Some(Self::Wav),
            "flac" => Some(Self::Flac),
            "ogg" | "vorbis" => Some(Self::Ogg),
            _ => None,
        }
    }

    /// Creates a `PlayHtAudioFormat` from a generic format string.
    ///
    /// Unknown formats fall back to MP3.
    pub fn from_base_format(format: &str) -> Self {
        Self::parse(format).unwrap_or_default()
    }
}

impl std::fmt::Display for PlayHtAudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Play.ht TTS Configuration
// =============================================================================

/// Play.ht-specific TTS configuration.
///
/// # Parameters
///
/// - **user_id**: Play.ht user ID for authentication (required)
/// - **base_url**: API base URL, overridable for testing
/// - **voice_engine**: The model to use (default: PlayHT2.0)
/// - **output_format**: Audio format for the response
/// - **sample_rate**: Output sample rate (8000, 16000, 24000, 44100, 48000 Hz)
/// - **speed**: Playback speed (0.5-2.0, default 1.0)
#[derive(Debug, Clone)]
pub struct PlayHtTtsConfig {
    /// Base TTS configuration (api_key, model, format, sample rate, speed)
    pub base: TTSConfig,

    /// Play.ht user ID for authentication
    pub user_id: String,

    /// API base URL without trailing slash
    pub base_url: String,

    /// Voice engine / model to use
    pub voice_engine: PlayHtModel,

    /// Output audio format
    pub output_format: PlayHtAudioFormat,

    /// Sample rate in Hz (8000, 16000, 24000, 44100, 48000)
    pub sample_rate: u32,

    /// Playback speed (0.5-2.0, default 1.0)
    pub speed: f32,
}

impl PlayHtTtsConfig {
    /// Creates a new Play.ht TTS config from base TTS config.
    ///
    /// Play.ht-specific settings are extracted from the base config and
    /// defaults are applied for unspecified values.
    pub fn from_base(base: TTSConfig, user_id: String) -> Self {
        let output_format = base
            .audio_format
            .as_ref()
            .map(|f| PlayHtAudioFormat::from_base_format(f))
            .unwrap_or_default();

        let sample_rate = base.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE);
        let speed = base.speaking_rate.unwrap_or(DEFAULT_SPEED);

        let voice_engine = if base.model.is_empty() {
            DEFAULT_MODEL
        } else {
            PlayHtModel::parse(&base.model).unwrap_or(DEFAULT_MODEL)
        };

        Self {
            base,
            user_id,
            base_url: PLAYHT_API_BASE_URL.to_string(),
            voice_engine,
            output_format,
            sample_rate,
            speed,
        }
    }

    /// Sets the API base URL. A trailing slash is removed.
    #[inline]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the voice engine / model.
    #[inline]
    pub fn with_model(mut self, model: PlayHtModel) -> Self {
        self.voice_engine = model;
        self
    }

    /// Full URL of the streaming synthesis endpoint.
    pub fn tts_url(&self) -> String {
        format!("{}{}", self.base_url, super::PLAYHT_TTS_PATH)
    }

    /// Full URL of the instant voice clone endpoint.
    pub fn clone_url(&self) -> String {
        format!("{}{}", self.base_url, super::PLAYHT_CLONE_PATH)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `api_key` or `user_id` is empty
    /// - `base_url` is not an absolute http(s) URL
    /// - `speed` is outside [0.5, 2.0]
    /// - `sample_rate` is not 8000, 16000, 24000, 44100, or 48000
    pub fn validate(&self) -> Result<(), String> {
        if self.base.api_key.is_empty() {
            return Err("api_key is required for Play.ht authentication".to_string());
        }
        if self.user_id.is_empty() {
            return Err("user_id is required for Play.ht authentication".to_string());
        }

        match url::Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(format!("invalid Play.ht base URL: {}", self.base_url)),
        }

        if self.speed < MIN_SPEED || self.speed > MAX_SPEED {
            return Err(format!(
                "speed must be between {} and {}, got {}",
                MIN_SPEED, MAX_SPEED, self.speed
            ));
        }

        if !matches!(self.sample_rate, 8000 | 16000 | 24000 | 44100 | 48000) {
            return Err(format!(
                "sample_rate must be 8000, 16000, 24000, 44100, or 48000, got {}",
                self.sample_rate
            ));
        }

        Ok(())
    }
}

impl Default for PlayHtTtsConfig {
    fn default() -> Self {
        Self::from_base(TTSConfig::default(), String::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
