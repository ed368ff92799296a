//! Spol - Video Question Answering with Cited Timestamps
//!
//! A local-first CLI tool for asking questions about long-form video content.
//!
//! The name "Spol" comes from the Norwegian word for "rewind."
//!
//! # Overview
//!
//! Spol allows you to:
//! - Transcribe a video's audio track and split it into retrieval segments
//! - Build a persistent per-video vector index over those segments
//! - Ask questions answered from the most relevant segments
//! - Jump back into the video using the timestamps cited in each answer
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `transcription` - Speech-to-text transcription
//! - `segmenter` - Semantic segmentation of transcripts
//! - `embedding` - Embedding generation
//! - `index` - Per-video vector index lifecycle
//! - `scoring` - Fine-grained relevance scoring
//! - `retrieval` - Two-stage retrieval protocol
//! - `answer` - Answer composition and citation extraction
//! - `pipeline` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use spol::config::Settings;
//! use spol::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     let processed = pipeline.process("talk.mp3").await?;
//!     println!("Indexed {} segments", processed.segments.len());
//!
//!     let result = pipeline.answer(&processed.video_id, "What is the main topic?", 5, 3).await?;
//!     println!("{}", result.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod answer;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod openai;
pub mod pipeline;
pub mod retrieval;
pub mod scoring;
pub mod segmenter;
pub mod transcription;

pub use error::{Result, SpolError};
