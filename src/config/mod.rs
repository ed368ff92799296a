//! Configuration module for Spol.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    EmbeddingSettings, GeneralSettings, GenerationSettings, RetrievalSettings,
    SegmentationSettings, Settings, TranscriptionSettings,
};
