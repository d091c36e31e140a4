//! Play.ht API message types.
//!
//! Request and response structures for the streaming synthesis and instant
//! voice clone endpoints.

use serde::{Deserialize, Serialize};

// =============================================================================
// Voice Cloning
// =============================================================================

/// Response from the instant voice clone endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayHtVoiceCloneResponse {
    /// The ID of the created voice (an S3 manifest URI)
    pub id: String,

    /// The name of the created voice
    pub name: String,

    /// The voice engine
    #[serde(default)]
    pub voice_engine: Option<String>,

    /// Gender tag echoed back by the API
    #[serde(default)]
    pub gender: Option<String>,
}

// =============================================================================
// TTS Request
// =============================================================================

/// TTS synthesis request body.
///
/// This structure is sent as JSON to the streaming synthesis endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PlayHtTtsRequest {
    /// Voice ID to use for synthesis (typically S3 manifest URL)
    pub voice: String,

    /// Text to synthesize (max 20,000 characters)
    pub text: String,

    /// Voice engine/model to use
    pub voice_engine: String,

    /// Output audio format
    pub output_format: String,

    /// Sample rate in Hz
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,

    /// Playback speed (0.5-2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

impl PlayHtTtsRequest {
    /// Creates a new TTS request with required fields.
    pub fn new(
        voice: impl Into<String>,
        text: impl Into<String>,
        voice_engine: impl Into<String>,
        output_format: impl Into<String>,
    ) -> Self {
        Self {
            voice: voice.into(),
            text: text.into(),
            voice_engine: voice_engine.into(),
            output_format: output_format.into(),
            sample_rate: None,
            speed: None,
        }
    }

    /// Sets the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Sets the speed.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }
}

// =============================================================================
// API Error Response
// =============================================================================

/// Play.ht API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayHtApiError {
    /// Error message
    #[serde(alias = "error_message")]
    pub message: Option<String>,

    /// Error code
    #[serde(alias = "error_code")]
    pub code: Option<String>,

    /// HTTP status code
    pub status: Option<u16>,

    /// Additional error details
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl std::fmt::Display for PlayHtApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(msg) = &self.message {
            write!(f, "{}", msg)
        } else if let Some(code) = &self.code {
            write!(f, "Error code: {}", code)
        } else {
            write!(f, "Unknown Play.ht API error")
        }
    }
}

impl std::error::Error for PlayHtApiError {}

// =============================================================================
// Tests
// =============================================================================
