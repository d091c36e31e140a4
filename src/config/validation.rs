use super::{ServerConfig, StorageBackendKind, VoiceStrategyKind};
use crate::core::tts::PlayHtAudioFormat;

/// Validate a fully merged configuration
///
/// # Errors
/// Returns an error describing the first problem found.
pub(super) fn validate_config(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.get_playht_credentials()?;
    validate_url("PLAYHT_BASE_URL", &config.playht_base_url)?;

    if config.voice_strategy == VoiceStrategyKind::Fixed {
        let voice_id = config.playht_voice_id.as_deref().unwrap_or_default();
        if voice_id.trim().is_empty() {
            return Err("PLAYHT_VOICE_ID must be set when VOICE_STRATEGY=fixed".into());
        }
    }
    if config.playht_voice_engine.trim().is_empty() {
        return Err("PLAYHT_VOICE_ENGINE must not be empty".into());
    }
    if PlayHtAudioFormat::parse(&config.playht_output_format).is_none() {
        return Err(format!(
            "Unsupported PLAYHT_OUTPUT_FORMAT: {}",
            config.playht_output_format
        )
        .into());
    }

    if config.storage_bucket.trim().is_empty() {
        return Err("STORAGE_BUCKET must not be empty".into());
    }
    match config.storage_backend {
        StorageBackendKind::Supabase => {
            let (url, _) = config.get_supabase_credentials()?;
            validate_url("SUPABASE_URL", &url)?;
        }
        StorageBackendKind::S3 => {
            if let Some(endpoint) = &config.s3_endpoint {
                validate_url("S3_ENDPOINT", endpoint)?;
            }
            if config.s3_access_key.is_some() != config.s3_secret_key.is_some() {
                return Err("S3_ACCESS_KEY and S3_SECRET_KEY must be set together".into());
            }
        }
        StorageBackendKind::Memory => {}
    }
    if let Some(public_url) = &config.storage_public_url {
        validate_url("STORAGE_PUBLIC_URL", public_url)?;
    }

    if config.synthesis_timeout_seconds == 0 {
        return Err("SYNTHESIS_TIMEOUT_SECONDS must be greater than 0".into());
    }
    if config.storage_timeout_seconds == 0 {
        return Err("STORAGE_TIMEOUT_SECONDS must be greater than 0".into());
    }
    if config.max_upload_bytes == 0 {
        return Err("MAX_UPLOAD_BYTES must be greater than 0".into());
    }
    if config.rate_limit_requests_per_second == 0 || config.rate_limit_burst_size == 0 {
        return Err("Rate limit values must be greater than 0".into());
    }

    if let Some(tls) = &config.tls {
        if !tls.cert_path.exists() {
            return Err(format!(
                "TLS certificate file not found: {}",
                tls.cert_path.display()
            )
            .into());
        }
        if !tls.key_path.exists() {
            return Err(format!("TLS key file not found: {}", tls.key_path.display()).into());
        }
    }

    Ok(())
}

fn validate_url(name: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = url::Url::parse(value).map_err(|e| format!("Invalid {name} '{value}': {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!("Invalid {name} '{value}': unsupported scheme {scheme}").into()),
    }
}
