//! Answer composition with timestamped citations.
//!
//! Renders the reranked evidence into a context block, asks the generation
//! capability for an answer grounded in that context, and pulls the cited
//! timestamps back out of the generated text. Generation failures never
//! propagate: the caller always receives a well-formed answer/citation pair.

mod citations;
mod generator;

pub use citations::extract_timestamps;
pub use generator::{AnswerGenerator, OpenAIGenerator};

use crate::retrieval::RankedEvidence;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// A composed answer with the timestamps it cites.
#[derive(Debug, Clone)]
pub struct Composition {
    /// The generated answer text (or a generation-failure description).
    pub answer: String,
    /// Distinct cited timestamps in seconds, ascending.
    pub citations: Vec<f64>,
}

/// Builds generation context from evidence and composes cited answers.
pub struct AnswerComposer {
    generator: Arc<dyn AnswerGenerator>,
}

impl AnswerComposer {
    /// Create a composer over a generation capability.
    pub fn new(generator: Arc<dyn AnswerGenerator>) -> Self {
        Self { generator }
    }

    /// Render evidence into a labeled context string, one block per item,
    /// blank-line separated. The retriever's ordering (most relevant first)
    /// is preserved verbatim.
    pub fn build_context(evidence: &[RankedEvidence]) -> String {
        evidence
            .iter()
            .enumerate()
            .map(|(i, item)| {
                format!(
                    "[Segment {}, Time: {:.2}-{:.2}s]: {}",
                    i + 1,
                    item.start_time,
                    item.end_time,
                    item.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Compose an answer for a question from the given evidence.
    ///
    /// A generation failure is absorbed: the failure text becomes the
    /// answer and the citation list is empty.
    #[instrument(skip(self, evidence), fields(question = %question, evidence = evidence.len()))]
    pub async fn compose(&self, question: &str, evidence: &[RankedEvidence]) -> Composition {
        let context = Self::build_context(evidence);

        match self.generator.generate(question, &context).await {
            Ok(answer) => {
                let citations = extract_timestamps(&answer);
                debug!("Composed answer citing {} timestamps", citations.len());
                Composition { answer, citations }
            }
            Err(e) => {
                warn!("Answer generation failed: {}", e);
                Composition {
                    answer: format!("Error generating answer: {}", e),
                    citations: Vec::new(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SpolError};
    use async_trait::async_trait;

    struct CannedGenerator {
        response: Result<String>,
    }

    #[async_trait]
    impl AnswerGenerator for CannedGenerator {
        async fn generate(&self, _question: &str, _context: &str) -> Result<String> {
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(SpolError::Generation("rate limited".to_string())),
            }
        }
    }

    fn evidence_item(id: usize, text: &str, start: f64, end: f64) -> RankedEvidence {
        RankedEvidence {
            segment_id: id,
            text: text.to_string(),
            start_time: start,
            end_time: end,
            video_id: "vid1".to_string(),
            distance: 0.0,
            relevance_score: 1.0,
        }
    }

    #[test]
    fn test_context_blocks_preserve_order() {
        let evidence = vec![
            evidence_item(2, "second topic", 10.0, 20.0),
            evidence_item(0, "first topic", 0.0, 5.0),
        ];

        let context = AnswerComposer::build_context(&evidence);

        assert!(context.starts_with("[Segment 1, Time: 10.00-20.00s]: second topic"));
        assert!(context.contains("[Segment 2, Time: 0.00-5.00s]: first topic"));
        assert_eq!(context.matches("\n\n").count(), 1);
    }

    #[test]
    fn test_empty_evidence_gives_empty_context() {
        assert_eq!(AnswerComposer::build_context(&[]), "");
    }

    #[tokio::test]
    async fn test_compose_extracts_citations() {
        let composer = AnswerComposer::new(Arc::new(CannedGenerator {
            response: Ok("The topic starts at 12.5s and concludes at 3s, see 12.5s again.".to_string()),
        }));

        let result = composer
            .compose("what happens?", &[evidence_item(0, "text", 0.0, 5.0)])
            .await;

        assert_eq!(result.citations, vec![3.0, 12.5]);
    }

    #[tokio::test]
    async fn test_generation_failure_is_absorbed() {
        let composer = AnswerComposer::new(Arc::new(CannedGenerator {
            response: Err(SpolError::Generation("rate limited".to_string())),
        }));

        let result = composer
            .compose("what happens?", &[evidence_item(0, "text", 0.0, 5.0)])
            .await;

        assert!(result.answer.starts_with("Error generating answer:"));
        assert!(result.citations.is_empty());
    }
}
