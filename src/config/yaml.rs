use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present here
/// override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3001
///   tls:
///     enabled: false
///
/// synthesis:
///   api_key: "your-playht-key"
///   user_id: "your-playht-user-id"
///   voice_strategy: "fixed"
///   voice_id: "s3://voice-cloning-zero-shot/.../manifest.json"
///   voice_engine: "PlayHT2.0"
///   output_format: "mp3"
///   timeout_seconds: 120
///
/// storage:
///   backend: "supabase"
///   bucket: "audio-bucket"
///   endpoint: "https://your-project.supabase.co"
///   access_key: "your-service-key"
///   timeout_seconds: 30
///
/// staging:
///   dir: "./temp"
///   compensate_on_failure: false
///
/// security:
///   max_upload_bytes: 52428800
///   cors_allowed_origins: "*"
///   rate_limit_requests_per_second: 60
///   rate_limit_burst_size: 10
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub synthesis: Option<SynthesisYaml>,
    pub storage: Option<StorageYaml>,
    pub staging: Option<StagingYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsYaml>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub enabled: Option<bool>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// Play.ht settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SynthesisYaml {
    pub api_key: Option<String>,
    pub user_id: Option<String>,
    pub base_url: Option<String>,
    pub voice_strategy: Option<String>,
    pub voice_id: Option<String>,
    pub voice_engine: Option<String>,
    pub output_format: Option<String>,
    pub sample_rate: Option<u32>,
    pub speed: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

/// Object storage settings from YAML
///
/// `endpoint`/`access_key` are the Supabase project URL and key for the
/// supabase backend. The `s3_*` fields apply to the s3 backend.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StorageYaml {
    pub backend: Option<String>,
    pub bucket: Option<String>,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub s3_access_key: Option<String>,
    pub s3_secret_key: Option<String>,
    pub public_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StagingYaml {
    pub dir: Option<String>,
    pub compensate_on_failure: Option<bool>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    pub max_upload_bytes: Option<usize>,
    pub cors_allowed_origins: Option<String>,
    pub rate_limit_requests_per_second: Option<u32>,
    pub rate_limit_burst_size: Option<u32>,
}

impl YamlConfig {
    /// Load YAML configuration from a file
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file {}: {e}", path.display()))?;
        Ok(config)
    }
}
