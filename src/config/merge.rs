use std::path::PathBuf;

use super::yaml::YamlConfig;
use super::{ServerConfig, StorageBackendKind, TlsConfig, VoiceStrategyKind, env};

/// Merge environment configuration with optional YAML overrides.
///
/// Environment variables (and defaults) form the base; any value present in
/// the YAML file replaces it.
pub(super) fn merge_config(
    yaml: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = env::load_env_config()?;

    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(tls) = server.tls {
            match tls.enabled {
                Some(false) => config.tls = None,
                Some(true) => {
                    let cert_path = tls
                        .cert_path
                        .ok_or("server.tls.cert_path is required when TLS is enabled")?;
                    let key_path = tls
                        .key_path
                        .ok_or("server.tls.key_path is required when TLS is enabled")?;
                    config.tls = Some(TlsConfig {
                        cert_path: PathBuf::from(cert_path),
                        key_path: PathBuf::from(key_path),
                    });
                }
                None => {}
            }
        }
    }

    if let Some(synthesis) = yaml.synthesis {
        if synthesis.api_key.is_some() {
            config.playht_api_key = synthesis.api_key;
        }
        if synthesis.user_id.is_some() {
            config.playht_user_id = synthesis.user_id;
        }
        if let Some(base_url) = synthesis.base_url {
            config.playht_base_url = base_url;
        }
        if let Some(strategy) = synthesis.voice_strategy {
            config.voice_strategy = strategy.parse::<VoiceStrategyKind>()?;
        }
        if synthesis.voice_id.is_some() {
            config.playht_voice_id = synthesis.voice_id;
        }
        if let Some(engine) = synthesis.voice_engine {
            config.playht_voice_engine = engine;
        }
        if let Some(format) = synthesis.output_format {
            config.playht_output_format = format;
        }
        if synthesis.sample_rate.is_some() {
            config.playht_sample_rate = synthesis.sample_rate;
        }
        if synthesis.speed.is_some() {
            config.playht_speed = synthesis.speed;
        }
        if let Some(timeout) = synthesis.timeout_seconds {
            config.synthesis_timeout_seconds = timeout;
        }
    }

    if let Some(storage) = yaml.storage {
        if let Some(backend) = storage.backend {
            config.storage_backend = backend.parse::<StorageBackendKind>()?;
        }
        if let Some(bucket) = storage.bucket {
            config.storage_bucket = bucket;
        }
        if storage.endpoint.is_some() {
            config.supabase_url = storage.endpoint;
        }
        if storage.access_key.is_some() {
            config.supabase_key = storage.access_key;
        }
        if storage.s3_region.is_some() {
            config.s3_region = storage.s3_region;
        }
        if storage.s3_endpoint.is_some() {
            config.s3_endpoint = storage.s3_endpoint;
        }
        if storage.s3_access_key.is_some() {
            config.s3_access_key = storage.s3_access_key;
        }
        if storage.s3_secret_key.is_some() {
            config.s3_secret_key = storage.s3_secret_key;
        }
        if storage.public_url.is_some() {
            config.storage_public_url = storage.public_url;
        }
        if let Some(timeout) = storage.timeout_seconds {
            config.storage_timeout_seconds = timeout;
        }
    }

    if let Some(staging) = yaml.staging {
        if let Some(dir) = staging.dir {
            config.staging_dir = PathBuf::from(dir);
        }
        if let Some(compensate) = staging.compensate_on_failure {
            config.compensate_on_failure = compensate;
        }
    }

    if let Some(security) = yaml.security {
        if let Some(limit) = security.max_upload_bytes {
            config.max_upload_bytes = limit;
        }
        if security.cors_allowed_origins.is_some() {
            config.cors_allowed_origins = security.cors_allowed_origins;
        }
        if let Some(rps) = security.rate_limit_requests_per_second {
            config.rate_limit_requests_per_second = rps;
        }
        if let Some(burst) = security.rate_limit_burst_size {
            config.rate_limit_burst_size = burst;
        }
    }

    Ok(config)
}
