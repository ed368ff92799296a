//! Pipeline coordination for Spol.
//!
//! Wires the capability objects together and exposes the three operations a
//! service layer builds on: process a video, answer a question about it, and
//! check whether its index exists. Each call is stateless with respect to
//! the caller beyond the durable per-video artifacts.

use crate::answer::{AnswerComposer, AnswerGenerator, OpenAIGenerator};
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::index::IndexStore;
use crate::retrieval::{RankedEvidence, Retriever};
use crate::scoring::{LexicalScorer, RelevanceScorer};
use crate::segmenter::{RuleSentenceSplitter, Segment, Segmenter, SentenceSplitter};
use crate::transcription::{Transcriber, WhisperTranscriber};
use std::sync::Arc;
use tracing::{info, instrument};

/// Answer shown when retrieval legitimately finds nothing.
const NO_EVIDENCE_ANSWER: &str =
    "I couldn't find any relevant segments in this video for your question.";

/// The main pipeline: transcribe, segment, index, retrieve, compose.
pub struct Pipeline {
    settings: Settings,
    transcriber: Arc<dyn Transcriber>,
    segmenter: Segmenter,
    index: Arc<IndexStore>,
    retriever: Retriever,
    composer: AnswerComposer,
}

impl Pipeline {
    /// Create a pipeline with the default OpenAI-backed capabilities.
    pub fn new(settings: Settings) -> Result<Self> {
        let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperTranscriber::with_config(
            &settings.transcription.model,
            settings.transcription.language.clone(),
        ));
        let splitter: Arc<dyn SentenceSplitter> = Arc::new(RuleSentenceSplitter);
        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        let scorer: Arc<dyn RelevanceScorer> = Arc::new(LexicalScorer::new());
        let generator = Arc::new(OpenAIGenerator::new(&settings.generation.model));

        std::fs::create_dir_all(settings.index_dir())?;

        Ok(Self::with_components(
            settings,
            transcriber,
            splitter,
            embedder,
            scorer,
            generator,
        ))
    }

    /// Create a pipeline with custom capability objects (for alternative
    /// backends or test doubles).
    pub fn with_components(
        settings: Settings,
        transcriber: Arc<dyn Transcriber>,
        splitter: Arc<dyn SentenceSplitter>,
        embedder: Arc<dyn Embedder>,
        scorer: Arc<dyn RelevanceScorer>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        let segmenter = Segmenter::new(splitter, settings.segmentation.max_words);
        let index = Arc::new(IndexStore::new(embedder, settings.index_dir()));
        let retriever = Retriever::new(index.clone(), scorer);
        let composer = AnswerComposer::new(generator);

        Self {
            settings,
            transcriber,
            segmenter,
            index,
            retriever,
            composer,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Process a video source: transcribe, segment, and build + persist its
    /// index. Reprocessing the same video overwrites prior artifacts.
    #[instrument(skip(self), fields(source = %source))]
    pub async fn process(&self, source: &str) -> Result<ProcessResult> {
        info!("Transcribing source");
        let transcript = self.transcriber.transcribe(source).await?;

        info!("Segmenting transcript ({} spans)", transcript.spans.len());
        let segments = self.segmenter.segment(&transcript);

        info!("Indexing {} segments", segments.len());
        self.index.build(&segments, &transcript.video_id).await?;

        Ok(ProcessResult {
            video_id: transcript.video_id,
            segments,
        })
    }

    /// Answer a question about a processed video.
    ///
    /// Runs two-stage retrieval, then composes a cited answer from the
    /// evidence. When retrieval finds nothing, a fixed answer is returned
    /// without invoking the generator.
    #[instrument(skip(self), fields(video_id = %video_id, query = %query))]
    pub async fn answer(
        &self,
        video_id: &str,
        query: &str,
        top_k: usize,
        rerank_top_k: usize,
    ) -> Result<AnswerResult> {
        let evidence = self
            .retriever
            .retrieve(video_id, query, top_k, rerank_top_k)
            .await?;

        if evidence.is_empty() {
            return Ok(AnswerResult {
                answer: NO_EVIDENCE_ANSWER.to_string(),
                evidence,
                citations: Vec::new(),
            });
        }

        let composition = self.composer.compose(query, &evidence).await;

        Ok(AnswerResult {
            answer: composition.answer,
            evidence,
            citations: composition.citations,
        })
    }

    /// Check whether a persisted index exists for a video.
    pub fn index_exists(&self, video_id: &str) -> bool {
        self.index.exists(video_id)
    }
}

/// Result of processing a video.
#[derive(Debug)]
pub struct ProcessResult {
    /// Video ID derived from the source.
    pub video_id: String,
    /// The indexed segments in emission order.
    pub segments: Vec<Segment>,
}

/// Result of answering a question.
#[derive(Debug)]
pub struct AnswerResult {
    /// The generated answer text.
    pub answer: String,
    /// Evidence used for the answer, most relevant first.
    pub evidence: Vec<RankedEvidence>,
    /// Distinct cited timestamps in seconds, ascending.
    pub citations: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::AnswerGenerator;
    use crate::embedding::Embedder;
    use crate::error::SpolError;
    use crate::transcription::{Transcript, TranscriptSpan};
    use async_trait::async_trait;

    struct FixedTranscriber {
        spans: Vec<(f64, f64, &'static str)>,
    }

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(&self, source: &str) -> Result<Transcript> {
            Ok(Transcript::new(
                source.to_string(),
                self.spans
                    .iter()
                    .map(|(s, e, t)| TranscriptSpan::new(*s, *e, t.to_string()))
                    .collect(),
            ))
        }
    }

    struct HashEmbedder {
        dims: usize,
    }

    impl HashEmbedder {
        fn vector(&self, text: &str) -> Vec<f32> {
            let mut v = vec![0.0f32; self.dims];
            for (i, b) in text.bytes().enumerate() {
                v[(i + b as usize) % self.dims] += (b % 23) as f32;
            }
            v
        }
    }

    #[async_trait]
    impl Embedder for HashEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(self.vector(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| self.vector(t)).collect())
        }

        fn dimensions(&self) -> usize {
            self.dims
        }
    }

    struct EchoGenerator;

    #[async_trait]
    impl AnswerGenerator for EchoGenerator {
        async fn generate(&self, _question: &str, context: &str) -> Result<String> {
            // Cite the first block's start time the way a model would.
            let cited = context
                .split("Time: ")
                .nth(1)
                .and_then(|rest| rest.split('-').next())
                .unwrap_or("0.00");
            Ok(format!("The answer appears at {}s in the video.", cited))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl AnswerGenerator for FailingGenerator {
        async fn generate(&self, _question: &str, _context: &str) -> Result<String> {
            Err(SpolError::Generation("connection refused".to_string()))
        }
    }

    fn settings_for(dir: &std::path::Path) -> Settings {
        let mut settings = Settings::default();
        settings.general.data_dir = dir.to_string_lossy().to_string();
        settings.segmentation.max_words = 6;
        settings
    }

    fn pipeline_for(dir: &std::path::Path, generator: Arc<dyn AnswerGenerator>) -> Pipeline {
        Pipeline::with_components(
            settings_for(dir),
            Arc::new(FixedTranscriber {
                spans: vec![
                    (0.0, 5.0, "The opening covers rust basics."),
                    (5.0, 10.0, "Then ownership and borrowing rules."),
                    (10.0, 15.0, "Finally async programming patterns."),
                ],
            }),
            Arc::new(RuleSentenceSplitter),
            Arc::new(HashEmbedder { dims: 8 }),
            Arc::new(LexicalScorer::new()),
            generator,
        )
    }

    #[tokio::test]
    async fn test_process_builds_persisted_index() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_for(dir.path(), Arc::new(EchoGenerator));

        let result = pipeline.process("talk1").await.unwrap();

        assert_eq!(result.video_id, "talk1");
        assert_eq!(result.segments.len(), 3);
        assert_eq!(result.segments[1].start_seconds, 5.0);
        assert!(pipeline.index_exists("talk1"));
        assert!(!pipeline.index_exists("other"));
    }

    #[tokio::test]
    async fn test_end_to_end_answer_with_citations() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_for(dir.path(), Arc::new(EchoGenerator));

        pipeline.process("talk1").await.unwrap();
        let result = pipeline
            .answer("talk1", "ownership and borrowing rules", 3, 2)
            .await
            .unwrap();

        // Exactly rerank_top_k evidence items, sorted by score descending,
        // each carrying its original time range.
        assert_eq!(result.evidence.len(), 2);
        assert!(result.evidence[0].relevance_score >= result.evidence[1].relevance_score);
        assert_eq!(result.evidence[0].segment_id, 1);
        assert_eq!(result.evidence[0].start_time, 5.0);
        assert_eq!(result.evidence[0].end_time, 10.0);

        // The echo generator cites the top item's start time.
        assert_eq!(result.citations, vec![5.0]);
    }

    #[tokio::test]
    async fn test_answer_for_unprocessed_video_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_for(dir.path(), Arc::new(EchoGenerator));

        let err = pipeline
            .answer("never-seen", "anything", 5, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, SpolError::VideoNotIndexed(_)));
    }

    #[tokio::test]
    async fn test_generation_failure_still_returns_answer_pair() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_for(dir.path(), Arc::new(FailingGenerator));

        pipeline.process("talk1").await.unwrap();
        let result = pipeline
            .answer("talk1", "ownership rules", 3, 2)
            .await
            .unwrap();

        assert!(result.answer.starts_with("Error generating answer:"));
        assert!(result.citations.is_empty());
        assert!(!result.evidence.is_empty());
    }

    #[tokio::test]
    async fn test_empty_video_answers_without_generator() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::with_components(
            settings_for(dir.path()),
            Arc::new(FixedTranscriber { spans: vec![] }),
            Arc::new(RuleSentenceSplitter),
            Arc::new(HashEmbedder { dims: 8 }),
            Arc::new(LexicalScorer::new()),
            Arc::new(FailingGenerator),
        );

        pipeline.process("silent").await.unwrap();
        let result = pipeline.answer("silent", "anything", 5, 3).await.unwrap();

        assert_eq!(result.answer, NO_EVIDENCE_ANSWER);
        assert!(result.evidence.is_empty());
        assert!(result.citations.is_empty());
    }
}
