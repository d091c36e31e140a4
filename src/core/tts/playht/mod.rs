//! Play.ht TTS provider implementation.
//!
//! This module provides integration with the Play.ht v2 REST API: streaming
//! speech synthesis and instant voice cloning from a sample URL.
//!
//! # Example
//!
//! ```rust,ignore
//! use voxclone_gateway::core::tts::playht::{PlayHtTts, PlayHtTtsConfig, PlayHtModel};
//! use voxclone_gateway::core::tts::{SpeechSynthesizer, TTSConfig};
//!
//! let base = TTSConfig {
//!     api_key: "your-playht-api-key".to_string(),
//!     ..Default::default()
//! };
//! let config = PlayHtTtsConfig::from_base(base, "your-user-id".to_string())
//!     .with_model(PlayHtModel::PlayHt20);
//!
//! let tts = PlayHtTts::with_config(config)?;
//! let stream = tts
//!     .synthesize("Hello, world!", "s3://voice-cloning-zero-shot/.../manifest.json")
//!     .await?;
//! ```
//!
//! # API Reference
//!
//! - HTTP Streaming: `POST {base_url}/tts/stream`
//! - Voice Clone: `POST {base_url}/cloned-voices/instant`
//!
//! # Authentication
//!
//! Play.ht uses dual-header authentication:
//! - `X-USER-ID`: Your Play.ht user ID
//! - `AUTHORIZATION`: Your Play.ht API key

pub mod config;
pub mod messages;
pub mod provider;

pub use config::{PlayHtAudioFormat, PlayHtModel, PlayHtTtsConfig};
pub use messages::{PlayHtApiError, PlayHtTtsRequest, PlayHtVoiceCloneResponse};
pub use provider::PlayHtTts;

// =============================================================================
// API Constants
// =============================================================================

/// Play.ht v2 API base URL.
pub const PLAYHT_API_BASE_URL: &str = "https://api.play.ht/api/v2";

/// Streaming synthesis path, relative to the API base URL.
pub const PLAYHT_TTS_PATH: &str = "/tts/stream";

/// Instant voice clone path, relative to the API base URL.
///
/// Accepts a multipart form with `sample_file_url`, `voice_name` and `gender`.
pub const PLAYHT_CLONE_PATH: &str = "/cloned-voices/instant";

// =============================================================================
// Limits and Defaults
// =============================================================================

/// Maximum characters per TTS request.
pub const MAX_TEXT_LENGTH: usize = 20000;

/// Default model (voice engine).
pub const DEFAULT_MODEL: PlayHtModel = PlayHtModel::PlayHt20;

/// Default sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

/// Minimum speed value.
pub const MIN_SPEED: f32 = 0.5;

/// Maximum speed value.
pub const MAX_SPEED: f32 = 2.0;

/// Default speed value.
pub const DEFAULT_SPEED: f32 = 1.0;
