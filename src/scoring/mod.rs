//! Fine-grained relevance scoring for the second retrieval stage.
//!
//! The coarse vector search trades precision for recall; scoring every
//! surviving (query, passage) pair is what buys the precision back. The
//! capability is a trait so a real cross-encoder model can replace the
//! built-in lexical scorer. Scores are monotonic in relevance with no fixed
//! range guaranteed.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;

/// Trait for pairwise relevance scoring.
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    /// Score each (query, passage) pair: one scalar per passage, in input
    /// order. Higher means more relevant.
    async fn score(&self, query: &str, passages: &[String]) -> Result<Vec<f32>>;
}

/// Token-overlap relevance scorer.
///
/// Scores a pair by the Jaccard similarity of its lowercased token sets.
pub struct LexicalScorer;

impl LexicalScorer {
    pub fn new() -> Self {
        Self
    }

    fn tokens(text: &str) -> HashSet<String> {
        text.to_lowercase()
            .split_whitespace()
            .map(|s| s.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn similarity(query_tokens: &HashSet<String>, passage: &str) -> f32 {
        let passage_tokens = Self::tokens(passage);
        if query_tokens.is_empty() || passage_tokens.is_empty() {
            return 0.0;
        }

        let intersection = query_tokens.intersection(&passage_tokens).count();
        let union = query_tokens.union(&passage_tokens).count();

        if union == 0 {
            0.0
        } else {
            intersection as f32 / union as f32
        }
    }
}

impl Default for LexicalScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelevanceScorer for LexicalScorer {
    async fn score(&self, query: &str, passages: &[String]) -> Result<Vec<f32>> {
        let query_tokens = Self::tokens(query);
        Ok(passages
            .iter()
            .map(|p| Self::similarity(&query_tokens, p))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_overlapping_passage_scores_higher() {
        let scorer = LexicalScorer::new();
        let passages = vec![
            "machine learning techniques and algorithms".to_string(),
            "a recipe for sourdough bread".to_string(),
        ];

        let scores = scorer
            .score("machine learning algorithms", &passages)
            .await
            .unwrap();

        assert_eq!(scores.len(), 2);
        assert!(scores[0] > scores[1]);
    }

    #[tokio::test]
    async fn test_scores_align_with_input_order() {
        let scorer = LexicalScorer::new();
        let passages = vec![
            "nothing in common here".to_string(),
            "rust ownership explained".to_string(),
        ];

        let scores = scorer.score("rust ownership", &passages).await.unwrap();
        assert!(scores[1] > scores[0]);
    }

    #[tokio::test]
    async fn test_empty_query_scores_zero() {
        let scorer = LexicalScorer::new();
        let scores = scorer
            .score("", &["some passage".to_string()])
            .await
            .unwrap();
        assert_eq!(scores, vec![0.0]);
    }

    #[test]
    fn test_tokenization_strips_punctuation() {
        let tokens = LexicalScorer::tokens("Hello, world! (really)");
        assert!(tokens.contains("hello"));
        assert!(tokens.contains("world"));
        assert!(tokens.contains("really"));
    }
}
