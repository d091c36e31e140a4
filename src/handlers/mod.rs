//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `upload` - Voice sample upload and speech synthesis

pub mod api;
pub mod upload;

pub use upload::upload_audio;
