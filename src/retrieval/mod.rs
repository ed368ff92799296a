//! Two-stage retrieval: coarse vector search, then precision reranking.
//!
//! Stage 1 asks the index for up to `top_k` candidates by embedding
//! distance - cheap, recall-oriented, happy to admit loosely related
//! segments. Stage 2 scores every surviving (query, passage) pair with the
//! relevance capability and keeps the `rerank_top_k` best. Running the
//! expensive scorer only over the small candidate set bounds its cost.

use crate::error::{Result, SpolError};
use crate::index::{IndexStore, RetrievalCandidate};
use crate::scoring::RelevanceScorer;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A retrieval candidate promoted by the fine stage.
#[derive(Debug, Clone)]
pub struct RankedEvidence {
    pub segment_id: usize,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub video_id: String,
    /// Coarse-stage squared L2 distance (lower = more similar).
    pub distance: f32,
    /// Fine-stage relevance score (higher = more relevant).
    pub relevance_score: f32,
}

impl RankedEvidence {
    fn from_candidate(candidate: RetrievalCandidate, relevance_score: f32) -> Self {
        Self {
            segment_id: candidate.segment_id,
            text: candidate.text,
            start_time: candidate.start_time,
            end_time: candidate.end_time,
            video_id: candidate.video_id,
            distance: candidate.distance,
            relevance_score,
        }
    }
}

/// Orchestrates the two-stage retrieval protocol.
pub struct Retriever {
    index: Arc<IndexStore>,
    scorer: Arc<dyn RelevanceScorer>,
}

impl Retriever {
    /// Create a new retriever over an index store and a scoring capability.
    pub fn new(index: Arc<IndexStore>, scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { index, scorer }
    }

    /// Retrieve up to `min(rerank_top_k, top_k)` evidence items for a query,
    /// sorted by relevance score descending (ties: lower segment id first).
    ///
    /// An empty result is valid: it means the coarse stage found nothing.
    /// A video with no persisted index fails with
    /// [`SpolError::VideoNotIndexed`].
    #[instrument(skip(self), fields(video_id = %video_id, query = %query))]
    pub async fn retrieve(
        &self,
        video_id: &str,
        query: &str,
        top_k: usize,
        rerank_top_k: usize,
    ) -> Result<Vec<RankedEvidence>> {
        if self.index.active_video().as_deref() != Some(video_id)
            && !self.index.load(video_id)?
        {
            return Err(SpolError::VideoNotIndexed(video_id.to_string()));
        }

        let candidates = self.index.search(query, top_k).await?;
        if candidates.is_empty() {
            debug!("Coarse stage returned no candidates");
            return Ok(Vec::new());
        }

        let passages: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let scores = self.scorer.score(query, &passages).await?;

        if scores.len() != candidates.len() {
            return Err(SpolError::Scoring(format!(
                "Expected {} scores, got {}",
                candidates.len(),
                scores.len()
            )));
        }

        let mut evidence: Vec<RankedEvidence> = candidates
            .into_iter()
            .zip(scores)
            .map(|(candidate, score)| RankedEvidence::from_candidate(candidate, score))
            .collect();

        evidence.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.segment_id.cmp(&b.segment_id))
        });
        evidence.truncate(rerank_top_k.min(top_k));

        debug!("Retrieved {} evidence items", evidence.len());
        Ok(evidence)
    }
}
