//! OpenAI Whisper transcription implementation.

use super::{Transcriber, Transcript, TranscriptSpan};
use crate::error::{Result, SpolError};
use crate::openai::create_client;
use async_openai::types::{AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, instrument};

/// OpenAI Whisper-based transcriber.
///
/// Transcribes a prepared local audio file; media acquisition (downloading,
/// extracting the audio track) happens before this layer.
pub struct WhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    language: Option<String>,
}

impl WhisperTranscriber {
    /// Create a new Whisper transcriber with default settings.
    pub fn new() -> Self {
        Self::with_config("whisper-1", None)
    }

    /// Create a new Whisper transcriber with a custom model and language hint.
    pub fn with_config(model: &str, language: Option<String>) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            language,
        }
    }

    /// The video id is the audio file's stem.
    fn video_id_for(path: &Path) -> String {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string()
    }
}

impl Default for WhisperTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self), fields(source = %source))]
    async fn transcribe(&self, source: &str) -> Result<Transcript> {
        let audio_path = Path::new(source);
        if !audio_path.is_file() {
            return Err(SpolError::InvalidInput(format!(
                "Audio file not found: {}",
                source
            )));
        }

        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(async_openai::types::AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| SpolError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| SpolError::OpenAI(format!("Whisper API error: {}", e)))?;

        // Parse spans from the verbose JSON response; fall back to one span
        // covering the whole file when segment timing is absent.
        let spans: Vec<TranscriptSpan> = response
            .segments
            .map(|segs| {
                segs.iter()
                    .map(|s| {
                        TranscriptSpan::new(s.start as f64, s.end as f64, s.text.trim().to_string())
                    })
                    .collect()
            })
            .unwrap_or_else(|| {
                vec![TranscriptSpan::new(
                    0.0,
                    response.duration as f64,
                    response.text.trim().to_string(),
                )]
            });

        debug!("Transcribed {} spans", spans.len());

        Ok(Transcript::new(Self::video_id_for(audio_path), spans))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_from_file_stem() {
        assert_eq!(
            WhisperTranscriber::video_id_for(Path::new("/tmp/dQw4w9WgXcQ.mp3")),
            "dQw4w9WgXcQ"
        );
        assert_eq!(WhisperTranscriber::video_id_for(Path::new("talk.wav")), "talk");
    }

    #[tokio::test]
    async fn test_missing_file_is_invalid_input() {
        let transcriber = WhisperTranscriber::new();
        let err = transcriber
            .transcribe("/nonexistent/audio.mp3")
            .await
            .unwrap_err();
        assert!(matches!(err, SpolError::InvalidInput(_)));
    }
}
