//! Transcription module for Spol.
//!
//! Speech-to-text is consumed as a black-box capability: anything that can
//! turn an audio source into time-coded spans implements [`Transcriber`].

mod models;
mod whisper;

pub use models::{format_timestamp, Transcript, TranscriptSpan};
pub use whisper::WhisperTranscriber;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio source and return time-coded spans.
    ///
    /// The source is an opaque string (typically a local file path); the
    /// implementation decides how to resolve it and how to derive the
    /// video id.
    async fn transcribe(&self, source: &str) -> Result<Transcript>;
}
