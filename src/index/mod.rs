//! Per-video vector index lifecycle: build, persist, reload, search.
//!
//! Each video gets exactly one index: a flat exact-L2 structure over the
//! segment embeddings plus a parallel metadata table. Vector row `i` always
//! corresponds to metadata row `i`; the two artifacts are written together
//! and read together, and absence of either means "not indexed."

use crate::embedding::Embedder;
use crate::error::{Result, SpolError};
use crate::segmenter::Segment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, instrument};

/// One row of the metadata table persisted next to the vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    pub segment_id: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    pub video_id: String,
}

/// A coarse-stage search hit: segment fields plus the query distance.
#[derive(Debug, Clone)]
pub struct RetrievalCandidate {
    pub segment_id: usize,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub video_id: String,
    /// Squared L2 distance to the query embedding. Lower is more similar.
    pub distance: f32,
}

/// Flat exact nearest-neighbor structure over raw embedding rows.
#[derive(Debug, Serialize, Deserialize)]
struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    fn new(dimension: usize, vectors: Vec<Vec<f32>>) -> Self {
        Self { dimension, vectors }
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Exact k-nearest rows by squared L2 distance, closest first.
    /// Ties keep the lower row index first.
    fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut hits: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(row, vector)| (row, squared_l2(query, vector)))
            .collect();

        hits.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        hits.truncate(k);
        hits
    }
}

/// Squared Euclidean distance. Same ordering as true L2, no sqrt.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// The in-memory index this process is currently serving.
struct ActiveIndex {
    video_id: String,
    index: FlatIndex,
    metadata: Vec<IndexRecord>,
}

/// Owns the per-video nearest-neighbor structure and its durable files.
pub struct IndexStore {
    embedder: Arc<dyn Embedder>,
    index_dir: PathBuf,
    active: RwLock<Option<ActiveIndex>>,
}

impl IndexStore {
    /// Create a store rooted at `index_dir`. The directory is created on
    /// first build.
    pub fn new(embedder: Arc<dyn Embedder>, index_dir: PathBuf) -> Self {
        Self {
            embedder,
            index_dir,
            active: RwLock::new(None),
        }
    }

    fn structure_path(&self, video_id: &str) -> PathBuf {
        self.index_dir.join(format!("{}.index.json", video_id))
    }

    fn metadata_path(&self, video_id: &str) -> PathBuf {
        self.index_dir.join(format!("{}.metadata.json", video_id))
    }

    /// Check whether both persisted artifacts exist for a video.
    pub fn exists(&self, video_id: &str) -> bool {
        self.structure_path(video_id).is_file() && self.metadata_path(video_id).is_file()
    }

    /// The video id of the currently active in-memory index, if any.
    pub fn active_video(&self) -> Option<String> {
        self.active
            .read()
            .expect("index lock poisoned")
            .as_ref()
            .map(|a| a.video_id.clone())
    }

    /// Build the index for a video: embed every segment text (batched),
    /// construct the flat structure, persist both artifacts, and replace
    /// any previously active index in this process.
    ///
    /// Returns the number of indexed segments. Rebuilding the same video
    /// overwrites its prior artifacts.
    #[instrument(skip(self, segments), fields(video_id = %video_id, segments = segments.len()))]
    pub async fn build(&self, segments: &[Segment], video_id: &str) -> Result<usize> {
        let texts: Vec<String> = segments.iter().map(|s| s.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != segments.len() {
            return Err(SpolError::Embedding(format!(
                "Expected {} embeddings, got {}",
                segments.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings
            .first()
            .map(|v| v.len())
            .unwrap_or_else(|| self.embedder.dimensions());

        let index = FlatIndex::new(dimension, embeddings);

        let metadata: Vec<IndexRecord> = segments
            .iter()
            .map(|segment| IndexRecord {
                segment_id: segment.id,
                start_time: segment.start_seconds,
                end_time: segment.end_seconds,
                text: segment.text.clone(),
                video_id: video_id.to_string(),
            })
            .collect();

        std::fs::create_dir_all(&self.index_dir)?;
        std::fs::write(
            self.structure_path(video_id),
            serde_json::to_string(&index)?,
        )?;
        std::fs::write(
            self.metadata_path(video_id),
            serde_json::to_string(&metadata)?,
        )?;

        let count = index.len();
        info!("Built index with {} vectors", count);

        let mut active = self.active.write().expect("index lock poisoned");
        *active = Some(ActiveIndex {
            video_id: video_id.to_string(),
            index,
            metadata,
        });

        Ok(count)
    }

    /// Load a persisted index and make it active.
    ///
    /// Returns false without touching the active index when either artifact
    /// is missing. A row-count mismatch between the two artifacts is an
    /// index error.
    #[instrument(skip(self), fields(video_id = %video_id))]
    pub fn load(&self, video_id: &str) -> Result<bool> {
        if !self.exists(video_id) {
            debug!("No persisted index found");
            return Ok(false);
        }

        let index: FlatIndex =
            serde_json::from_str(&std::fs::read_to_string(self.structure_path(video_id))?)?;
        let metadata: Vec<IndexRecord> =
            serde_json::from_str(&std::fs::read_to_string(self.metadata_path(video_id))?)?;

        if index.len() != metadata.len() {
            return Err(SpolError::Index(format!(
                "Artifact mismatch for '{}': {} vectors vs {} metadata rows",
                video_id,
                index.len(),
                metadata.len()
            )));
        }

        info!("Loaded index with {} vectors", index.len());

        let mut active = self.active.write().expect("index lock poisoned");
        *active = Some(ActiveIndex {
            video_id: video_id.to_string(),
            index,
            metadata,
        });

        Ok(true)
    }

    /// Exact k-nearest-neighbor search over the active index.
    ///
    /// The query is embedded with the same embedder used at build time.
    /// Fails with [`SpolError::IndexUninitialized`] when no index has been
    /// built or loaded in this process.
    #[instrument(skip(self), fields(query = %query, k = k))]
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievalCandidate>> {
        let query_embedding = self.embedder.embed(query).await?;

        let active = self.active.read().expect("index lock poisoned");
        let active = active.as_ref().ok_or(SpolError::IndexUninitialized)?;

        if query_embedding.len() != active.index.dimension {
            return Err(SpolError::Index(format!(
                "Query embedding dimension {} does not match index dimension {}",
                query_embedding.len(),
                active.index.dimension
            )));
        }

        let hits = active.index.search(&query_embedding, k);

        // Rows without a metadata counterpart are skipped; the two tables
        // are written together so this only fires on corrupted artifacts.
        let candidates: Vec<RetrievalCandidate> = hits
            .into_iter()
            .filter_map(|(row, distance)| {
                active.metadata.get(row).map(|record| RetrievalCandidate {
                    segment_id: record.segment_id,
                    text: record.text.clone(),
                    start_time: record.start_time,
                    end_time: record.end_time,
                    video_id: record.video_id.clone(),
                    distance,
                })
            })
            .collect();

        debug!("Search returned {} candidates", candidates.len());
        Ok(candidates)
    }
}
