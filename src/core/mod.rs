pub mod orchestrator;
pub mod staging;
pub mod tts;

pub use orchestrator::{
    AudioUpload, CloneOrchestrator, KeyIdSource, ProcessedAudio, UploadRequest, UuidKeys,
    VoiceStrategy, sanitize_filename,
};
pub use staging::{StagedFile, StagingArea, StagingError};
pub use tts::{
    AudioStream, PlayHtTts, SpeechSynthesizer, TTSError, TTSResult, create_synthesizer,
};
