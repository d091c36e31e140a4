//! Configuration module for the voice cloning gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use voxclone_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

/// Pre-registered PlayHT cloned voice used by the fixed-voice strategy.
pub const DEFAULT_VOICE_ID: &str =
    "s3://voice-cloning-zero-shot/c1942f6e-db5a-44e4-8b46-4ddb0d89069f/cloned-voice/manifest.json";

/// Voice engine used for synthesis unless configured otherwise.
pub const DEFAULT_VOICE_ENGINE: &str = "PlayHT2.0";

pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3";

pub const DEFAULT_PLAYHT_BASE_URL: &str = "https://api.play.ht/api/v2";

pub const DEFAULT_BUCKET: &str = "audio-bucket";

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// TLS configuration for HTTPS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Which object store backend receives the uploaded and generated audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackendKind {
    /// Supabase Storage REST API
    #[default]
    Supabase,
    /// S3 or S3-compatible (MinIO, R2, ...) via `object_store`
    S3,
    /// Process-local in-memory store, contents are lost on restart
    Memory,
}

impl FromStr for StorageBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "supabase" => Ok(Self::Supabase),
            "s3" | "aws" | "minio" => Ok(Self::S3),
            "memory" | "in-memory" | "inmemory" => Ok(Self::Memory),
            other => Err(format!(
                "Unsupported storage backend: {other}. Supported backends: supabase, s3, memory"
            )),
        }
    }
}

impl fmt::Display for StorageBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Supabase => write!(f, "supabase"),
            Self::S3 => write!(f, "s3"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// How the voice used for synthesis is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceStrategyKind {
    /// Always synthesize with the configured, pre-registered voice
    #[default]
    Fixed,
    /// Clone a voice from each uploaded sample, then synthesize with it
    Clone,
}

impl FromStr for VoiceStrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" | "fixed-voice" => Ok(Self::Fixed),
            "clone" | "clone-per-request" => Ok(Self::Clone),
            other => Err(format!(
                "Unsupported voice strategy: {other}. Supported strategies: fixed, clone"
            )),
        }
    }
}

impl fmt::Display for VoiceStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Clone => write!(f, "clone"),
        }
    }
}

/// Server configuration
///
/// Contains all configuration needed to run the gateway, including:
/// - Server settings (host, port, TLS)
/// - Play.ht credentials and voice selection
/// - Object storage settings (Supabase or S3)
/// - Local staging of synthesized audio
/// - Security settings (CORS, rate limiting, upload size)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // Synthesis settings
    /// Play.ht API key (AUTHORIZATION header)
    pub playht_api_key: Option<String>,
    /// Play.ht user ID (X-USER-ID header)
    pub playht_user_id: Option<String>,
    /// Base URL of the Play.ht v2 API
    pub playht_base_url: String,
    pub voice_strategy: VoiceStrategyKind,
    /// Voice manifest URI used by the fixed-voice strategy
    pub playht_voice_id: Option<String>,
    pub playht_voice_engine: String,
    /// Output encoding requested from Play.ht (mp3, wav, mulaw, flac, ogg)
    pub playht_output_format: String,
    /// Output sample rate in Hz, Play.ht default when unset
    pub playht_sample_rate: Option<u32>,
    /// Speed multiplier (0.5-2.0), Play.ht default when unset
    pub playht_speed: Option<f32>,
    /// Upper bound for one synthesis call, including draining the stream
    pub synthesis_timeout_seconds: u64,

    // Storage settings
    pub storage_backend: StorageBackendKind,
    pub storage_bucket: String,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub s3_access_key: Option<String>,
    pub s3_secret_key: Option<String>,
    /// Base for public object URLs: `{storage_public_url}/{bucket}/{key}`
    pub storage_public_url: Option<String>,
    pub storage_timeout_seconds: u64,

    // Staging settings
    /// Directory for synthesized audio before it is uploaded
    pub staging_dir: PathBuf,
    /// Delete the stored original when a later step fails
    pub compensate_on_failure: bool,

    // Security configuration
    pub max_upload_bytes: usize,
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: Option<String>,

    // Rate limiting configuration
    /// Maximum requests per second per IP address
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 10
    pub rate_limit_burst_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            tls: None,
            playht_api_key: None,
            playht_user_id: None,
            playht_base_url: DEFAULT_PLAYHT_BASE_URL.to_string(),
            voice_strategy: VoiceStrategyKind::Fixed,
            playht_voice_id: Some(DEFAULT_VOICE_ID.to_string()),
            playht_voice_engine: DEFAULT_VOICE_ENGINE.to_string(),
            playht_output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            playht_sample_rate: None,
            playht_speed: None,
            synthesis_timeout_seconds: 120,
            storage_backend: StorageBackendKind::Supabase,
            storage_bucket: DEFAULT_BUCKET.to_string(),
            supabase_url: None,
            supabase_key: None,
            s3_region: None,
            s3_endpoint: None,
            s3_access_key: None,
            s3_secret_key: None,
            storage_public_url: None,
            storage_timeout_seconds: 30,
            staging_dir: PathBuf::from("temp"),
            compensate_on_failure: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_allowed_origins: Some("*".to_string()),
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
        }
    }
}

/// Implement Drop to zeroize all secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.playht_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.supabase_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.s3_access_key {
            key.zeroize();
        }
        if let Some(ref mut secret) = self.s3_secret_key {
            secret.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// After loading and merging, performs validation on the final configuration.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        // .env is loaded in main.rs before this runs, so it only ever acts as env vars.
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get Play.ht credentials (API key and user ID)
    ///
    /// Play.ht uses dual-header authentication requiring both API key and user ID.
    pub fn get_playht_credentials(&self) -> Result<(String, String), String> {
        let api_key = self
            .playht_api_key
            .as_ref()
            .cloned()
            .ok_or_else(|| "Play.ht API key not configured".to_string())?;
        let user_id = self
            .playht_user_id
            .as_ref()
            .cloned()
            .ok_or_else(|| "Play.ht user ID not configured".to_string())?;
        Ok((api_key, user_id))
    }

    /// Get Supabase project URL and service key
    pub fn get_supabase_credentials(&self) -> Result<(String, String), String> {
        let url = self
            .supabase_url
            .as_ref()
            .cloned()
            .ok_or_else(|| "Supabase URL not configured".to_string())?;
        let key = self
            .supabase_key
            .as_ref()
            .cloned()
            .ok_or_else(|| "Supabase key not configured".to_string())?;
        Ok((url, key))
    }

    /// Get the S3 region, defaulting to "us-east-1"
    pub fn get_s3_region(&self) -> String {
        self.s3_region
            .clone()
            .unwrap_or_else(|| "us-east-1".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    const ENV_KEYS: &[&str] = &[
        "HOST",
        "PORT",
        "PLAYHT_API_KEY",
        "PLAYHT_USER_ID",
        "PLAYHT_VOICE_ID",
        "PLAYHT_OUTPUT_FORMAT",
        "PLAYHT_SAMPLE_RATE",
        "PLAYHT_SPEED",
        "VOICE_STRATEGY",
        "STORAGE_BACKEND",
        "STORAGE_BUCKET",
        "SUPABASE_URL",
        "SUPABASE_KEY",
        "STAGING_DIR",
        "COMPENSATE_ON_FAILURE",
        "SYNTHESIS_TIMEOUT_SECONDS",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            // SAFETY: tests touching the environment are #[serial]
            unsafe { std::env::remove_var(key) };
        }
    }

    fn set_env(key: &str, value: &str) {
        // SAFETY: tests touching the environment are #[serial]
        unsafe { std::env::set_var(key, value) };
    }

    fn set_required_env() {
        set_env("PLAYHT_API_KEY", "playht-key");
        set_env("PLAYHT_USER_ID", "playht-user");
        set_env("SUPABASE_URL", "https://proj.supabase.co");
        set_env("SUPABASE_KEY", "supabase-key");
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.address(), "0.0.0.0:3001");
        assert_eq!(config.storage_bucket, "audio-bucket");
        assert_eq!(config.voice_strategy, VoiceStrategyKind::Fixed);
        assert_eq!(config.playht_voice_id.as_deref(), Some(DEFAULT_VOICE_ID));
        assert!(!config.compensate_on_failure);
        assert!(config.tls.is_none());
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(
            "Supabase".parse::<StorageBackendKind>(),
            Ok(StorageBackendKind::Supabase)
        );
        assert_eq!("minio".parse::<StorageBackendKind>(), Ok(StorageBackendKind::S3));
        assert_eq!(
            "memory".parse::<StorageBackendKind>(),
            Ok(StorageBackendKind::Memory)
        );
        assert!("ftp".parse::<StorageBackendKind>().is_err());
    }

    #[test]
    fn test_voice_strategy_parse() {
        assert_eq!("fixed".parse::<VoiceStrategyKind>(), Ok(VoiceStrategyKind::Fixed));
        assert_eq!(
            "clone-per-request".parse::<VoiceStrategyKind>(),
            Ok(VoiceStrategyKind::Clone)
        );
        let err = "dynamic".parse::<VoiceStrategyKind>().unwrap_err();
        assert!(err.contains("fixed, clone"));
    }

    #[test]
    fn test_get_playht_credentials() {
        let mut config = ServerConfig::default();
        assert!(config.get_playht_credentials().is_err());

        config.playht_api_key = Some("key".to_string());
        config.playht_user_id = Some("user".to_string());
        assert_eq!(
            config.get_playht_credentials().unwrap(),
            ("key".to_string(), "user".to_string())
        );
    }

    #[test]
    fn test_get_supabase_credentials_missing_key() {
        let mut config = ServerConfig::default();
        config.supabase_url = Some("https://proj.supabase.co".to_string());
        let err = config.get_supabase_credentials().unwrap_err();
        assert!(err.contains("key"));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_variables() {
        clear_env();
        set_required_env();
        set_env("PORT", "8080");
        set_env("VOICE_STRATEGY", "clone");
        set_env("STAGING_DIR", "/tmp/voxclone-staging");
        set_env("COMPENSATE_ON_FAILURE", "true");
        set_env("PLAYHT_OUTPUT_FORMAT", "wav");
        set_env("PLAYHT_SAMPLE_RATE", "24000");
        set_env("PLAYHT_SPEED", "1.5");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.playht_output_format, "wav");
        assert_eq!(config.playht_sample_rate, Some(24000));
        assert_eq!(config.playht_speed, Some(1.5));
        assert_eq!(config.port, 8080);
        assert_eq!(config.voice_strategy, VoiceStrategyKind::Clone);
        assert_eq!(config.staging_dir, PathBuf::from("/tmp/voxclone-staging"));
        assert!(config.compensate_on_failure);
        assert_eq!(config.playht_api_key.as_deref(), Some("playht-key"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_invalid_port() {
        clear_env();
        set_required_env();
        set_env("PORT", "not-a-port");

        assert!(ServerConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_requires_playht_credentials() {
        clear_env();
        set_env("SUPABASE_URL", "https://proj.supabase.co");
        set_env("SUPABASE_KEY", "supabase-key");

        let err = ServerConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("Play.ht"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_overrides_env() {
        clear_env();
        set_required_env();
        set_env("PORT", "8080");

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(
            &config_path,
            r#"
server:
  port: 9090
storage:
  bucket: "voice-samples"
synthesis:
  voice_engine: "Play3.0-mini"
  timeout_seconds: 45
"#,
        )
        .unwrap();

        let config = ServerConfig::from_file(&config_path).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.storage_bucket, "voice-samples");
        assert_eq!(config.playht_voice_engine, "Play3.0-mini");
        assert_eq!(config.synthesis_timeout_seconds, 45);
        // Untouched values still come from the environment
        assert_eq!(config.supabase_key.as_deref(), Some("supabase-key"));

        clear_env();
    }

    #[test]
    fn test_from_file_missing_file() {
        let result = ServerConfig::from_file(&PathBuf::from("/nonexistent/config.yaml"));
        assert!(result.is_err());
    }
}
