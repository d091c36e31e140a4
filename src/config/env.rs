use std::path::PathBuf;

use super::utils::{env_var, parse_bool, parse_env};
use super::{ServerConfig, StorageBackendKind, TlsConfig, VoiceStrategyKind, merge, validation};

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Values not present in the environment fall back to [`ServerConfig::default`].
    /// The .env file is loaded by main.rs before this is called.
    ///
    /// # Errors
    /// Returns an error if a variable has an invalid format or validation fails.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        validation::validate_config(&config)?;
        Ok(config)
    }
}

/// Build a configuration from defaults overlaid with environment variables.
pub(super) fn load_env_config() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = ServerConfig::default();

    // Server
    if let Some(host) = env_var("HOST") {
        config.host = host;
    }
    if let Some(port) = parse_env::<u16>("PORT")? {
        config.port = port;
    }
    config.tls = load_tls_from_env()?;

    // Synthesis
    config.playht_api_key = env_var("PLAYHT_API_KEY");
    config.playht_user_id = env_var("PLAYHT_USER_ID");
    if let Some(base_url) = env_var("PLAYHT_BASE_URL") {
        config.playht_base_url = base_url;
    }
    if let Some(strategy) = parse_env::<VoiceStrategyKind>("VOICE_STRATEGY")? {
        config.voice_strategy = strategy;
    }
    if let Some(voice_id) = env_var("PLAYHT_VOICE_ID") {
        config.playht_voice_id = Some(voice_id);
    }
    if let Some(engine) = env_var("PLAYHT_VOICE_ENGINE") {
        config.playht_voice_engine = engine;
    }
    if let Some(format) = env_var("PLAYHT_OUTPUT_FORMAT") {
        config.playht_output_format = format;
    }
    config.playht_sample_rate = parse_env::<u32>("PLAYHT_SAMPLE_RATE")?;
    config.playht_speed = parse_env::<f32>("PLAYHT_SPEED")?;
    if let Some(timeout) = parse_env::<u64>("SYNTHESIS_TIMEOUT_SECONDS")? {
        config.synthesis_timeout_seconds = timeout;
    }

    // Storage
    if let Some(backend) = parse_env::<StorageBackendKind>("STORAGE_BACKEND")? {
        config.storage_backend = backend;
    }
    if let Some(bucket) = env_var("STORAGE_BUCKET") {
        config.storage_bucket = bucket;
    }
    config.supabase_url = env_var("SUPABASE_URL");
    config.supabase_key = env_var("SUPABASE_KEY");
    config.s3_region = env_var("S3_REGION");
    config.s3_endpoint = env_var("S3_ENDPOINT");
    config.s3_access_key = env_var("S3_ACCESS_KEY");
    config.s3_secret_key = env_var("S3_SECRET_KEY");
    config.storage_public_url = env_var("STORAGE_PUBLIC_URL");
    if let Some(timeout) = parse_env::<u64>("STORAGE_TIMEOUT_SECONDS")? {
        config.storage_timeout_seconds = timeout;
    }

    // Staging
    if let Some(dir) = env_var("STAGING_DIR") {
        config.staging_dir = PathBuf::from(dir);
    }
    if let Some(raw) = env_var("COMPENSATE_ON_FAILURE") {
        config.compensate_on_failure = parse_bool(&raw)
            .ok_or_else(|| format!("Invalid value for COMPENSATE_ON_FAILURE: {raw}"))?;
    }

    // Security
    if let Some(limit) = parse_env::<usize>("MAX_UPLOAD_BYTES")? {
        config.max_upload_bytes = limit;
    }
    if let Some(origins) = env_var("CORS_ALLOWED_ORIGINS") {
        config.cors_allowed_origins = Some(origins);
    }
    if let Some(rps) = parse_env::<u32>("RATE_LIMIT_REQUESTS_PER_SECOND")? {
        config.rate_limit_requests_per_second = rps;
    }
    if let Some(burst) = parse_env::<u32>("RATE_LIMIT_BURST_SIZE")? {
        config.rate_limit_burst_size = burst;
    }

    Ok(config)
}

fn load_tls_from_env() -> Result<Option<TlsConfig>, Box<dyn std::error::Error>> {
    let enabled = match env_var("TLS_ENABLED") {
        Some(raw) => {
            parse_bool(&raw).ok_or_else(|| format!("Invalid value for TLS_ENABLED: {raw}"))?
        }
        None => false,
    };
    if !enabled {
        return Ok(None);
    }

    let cert_path = env_var("TLS_CERT_PATH")
        .ok_or("TLS_CERT_PATH is required when TLS_ENABLED=true")?;
    let key_path =
        env_var("TLS_KEY_PATH").ok_or("TLS_KEY_PATH is required when TLS_ENABLED=true")?;

    Ok(Some(TlsConfig {
        cert_path: PathBuf::from(cert_path),
        key_path: PathBuf::from(key_path),
    }))
}
