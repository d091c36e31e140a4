mod base;
pub mod playht;

use std::sync::Arc;

pub use base::{AudioStream, SpeechSynthesizer, TTSConfig, TTSError, TTSResult};
pub use playht::{
    PLAYHT_TTS_PATH, PlayHtAudioFormat, PlayHtModel, PlayHtTts, PlayHtTtsConfig,
};

use crate::config::ServerConfig;

/// Factory function to create the configured speech synthesizer.
///
/// Play.ht is currently the only provider. Credentials, base URL, voice
/// engine and output settings come from the server configuration.
///
/// # Example
///
/// ```rust,ignore
/// use voxclone_gateway::core::tts::create_synthesizer;
///
/// let synthesizer = create_synthesizer(&config)?;
/// let stream = synthesizer.synthesize("Hello world", voice_id).await?;
/// ```
pub fn create_synthesizer(config: &ServerConfig) -> TTSResult<Arc<dyn SpeechSynthesizer>> {
    let (api_key, user_id) = config
        .get_playht_credentials()
        .map_err(TTSError::InvalidConfiguration)?;

    let format = PlayHtAudioFormat::parse(&config.playht_output_format).ok_or_else(|| {
        TTSError::InvalidConfiguration(format!(
            "Unsupported Play.ht output format: {}",
            config.playht_output_format
        ))
    })?;

    let base = TTSConfig {
        api_key,
        model: config.playht_voice_engine.clone(),
        audio_format: Some(format.as_str().to_string()),
        sample_rate: config.playht_sample_rate,
        speaking_rate: config.playht_speed,
        ..Default::default()
    };

    let model = PlayHtModel::parse(&config.playht_voice_engine).ok_or_else(|| {
        TTSError::InvalidConfiguration(format!(
            "Unsupported Play.ht voice engine: {}",
            config.playht_voice_engine
        ))
    })?;

    let playht_config = PlayHtTtsConfig::from_base(base, user_id)
        .with_model(model)
        .with_base_url(config.playht_base_url.clone());

    Ok(Arc::new(PlayHtTts::with_config(playht_config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_synthesizer_requires_credentials() {
        let config = ServerConfig::default();
        let result = create_synthesizer(&config);
        assert!(matches!(result, Err(TTSError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_create_synthesizer_rejects_unknown_engine() {
        let mut config = ServerConfig::default();
        config.playht_api_key = Some("key".to_string());
        config.playht_user_id = Some("user".to_string());
        config.playht_voice_engine = "PlayHT9000".to_string();

        match create_synthesizer(&config) {
            Err(TTSError::InvalidConfiguration(msg)) => assert!(msg.contains("PlayHT9000")),
            _ => panic!("expected InvalidConfiguration"),
        }
    }

    #[test]
    fn test_create_synthesizer_with_defaults() {
        let mut config = ServerConfig::default();
        config.playht_api_key = Some("key".to_string());
        config.playht_user_id = Some("user".to_string());

        let synthesizer = create_synthesizer(&config).unwrap();
        assert_eq!(synthesizer.provider_name(), "playht");
        assert_eq!(synthesizer.output_content_type(), "audio/mpeg");
        assert_eq!(synthesizer.output_file_extension(), "mp3");
    }

    #[test]
    fn test_create_synthesizer_applies_output_settings() {
        let mut config = ServerConfig::default();
        config.playht_api_key = Some("key".to_string());
        config.playht_user_id = Some("user".to_string());
        config.playht_output_format = "ogg".to_string();
        config.playht_sample_rate = Some(24000);

        let synthesizer = create_synthesizer(&config).unwrap();
        assert_eq!(synthesizer.output_content_type(), "audio/ogg");
        assert_eq!(synthesizer.output_file_extension(), "ogg");
    }

    #[test]
    fn test_create_synthesizer_rejects_out_of_range_speed() {
        let mut config = ServerConfig::default();
        config.playht_api_key = Some("key".to_string());
        config.playht_user_id = Some("user".to_string());
        config.playht_speed = Some(4.0);

        match create_synthesizer(&config) {
            Err(TTSError::InvalidConfiguration(msg)) => assert!(msg.contains("speed")),
            _ => panic!("expected InvalidConfiguration"),
        }
    }
}
