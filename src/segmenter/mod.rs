//! Semantic segmentation of transcripts into retrieval units.
//!
//! Turns the unbounded span timeline of a transcript into bounded,
//! query-addressable segments, each carrying the time range it was spoken in.

mod sentences;

pub use sentences::{RuleSentenceSplitter, SentenceSplitter};

use crate::transcription::Transcript;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A bounded, timestamped unit of transcript text.
///
/// Segments are immutable once created: ids are dense and 0-based within a
/// video, assigned in emission order, and `start_seconds <= end_seconds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Dense 0-based id within the video, matching emission order.
    pub id: usize,
    /// Whitespace-trimmed text content.
    pub text: String,
    /// Start time in seconds.
    pub start_seconds: f64,
    /// End time in seconds.
    pub end_seconds: f64,
}

impl Segment {
    /// Create a new segment. Text is trimmed; the time range is normalized
    /// so that start never exceeds end.
    pub fn new(id: usize, text: String, start_seconds: f64, end_seconds: f64) -> Self {
        let start_seconds = start_seconds.max(0.0);
        let end_seconds = end_seconds.max(start_seconds);

        Self {
            id,
            text: text.trim().to_string(),
            start_seconds,
            end_seconds,
        }
    }

    /// Duration of this segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Splits a transcript into segments under a soft word-count ceiling.
///
/// Sentences from the injected splitter accumulate into a bundle. When the
/// bundle is non-empty and the next sentence would push its running word
/// count past `max_words`, the bundle closes as a segment and the sentence
/// opens a new one. A single sentence longer than the budget is never split
/// mid-sentence; it becomes its own over-budget segment.
pub struct Segmenter {
    splitter: Arc<dyn SentenceSplitter>,
    max_words: usize,
}

impl Segmenter {
    /// Create a segmenter. `max_words` is clamped to at least 1.
    pub fn new(splitter: Arc<dyn SentenceSplitter>, max_words: usize) -> Self {
        Self {
            splitter,
            max_words: max_words.max(1),
        }
    }

    /// Segment a transcript. Never fails: degenerate input yields fewer or
    /// shorter segments, an empty transcript yields an empty sequence.
    pub fn segment(&self, transcript: &Transcript) -> Vec<Segment> {
        let mut segments: Vec<Segment> = Vec::new();

        let mut bundle: Vec<String> = Vec::new();
        let mut bundle_words = 0usize;
        let mut bundle_start = 0.0f64;
        let mut bundle_end = 0.0f64;

        for span in &transcript.spans {
            let text = span.text.trim();
            if text.is_empty() {
                continue;
            }

            for sentence in self.splitter.split(text) {
                let sentence = sentence.trim();
                if sentence.is_empty() {
                    continue;
                }
                let words = sentence.split_whitespace().count();

                // Soft ceiling: checked before insertion, never mid-sentence.
                if !bundle.is_empty() && bundle_words + words > self.max_words {
                    segments.push(Segment::new(
                        segments.len(),
                        bundle.join(" "),
                        bundle_start,
                        bundle_end,
                    ));
                    bundle.clear();
                    bundle_words = 0;
                }

                if bundle.is_empty() {
                    bundle_start = span.start_seconds;
                }
                bundle.push(sentence.to_string());
                bundle_words += words;
                bundle_end = span.end_seconds;
            }
        }

        if !bundle.is_empty() {
            segments.push(Segment::new(
                segments.len(),
                bundle.join(" "),
                bundle_start,
                bundle_end,
            ));
        }

        debug!(
            "Segmented transcript into {} segments (max_words = {})",
            segments.len(),
            self.max_words
        );

        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::TranscriptSpan;

    fn segmenter(max_words: usize) -> Segmenter {
        Segmenter::new(Arc::new(RuleSentenceSplitter), max_words)
    }

    fn transcript(spans: Vec<(f64, f64, &str)>) -> Transcript {
        Transcript::new(
            "test".to_string(),
            spans
                .into_iter()
                .map(|(s, e, t)| TranscriptSpan::new(s, e, t.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_empty_transcript_yields_no_segments() {
        let segments = segmenter(50).segment(&transcript(vec![]));
        assert!(segments.is_empty());
    }

    #[test]
    fn test_blank_spans_contribute_nothing() {
        let segments = segmenter(50).segment(&transcript(vec![
            (0.0, 2.0, "   "),
            (2.0, 4.0, ""),
        ]));
        assert!(segments.is_empty());
    }

    #[test]
    fn test_single_bundle_under_budget() {
        let segments = segmenter(50).segment(&transcript(vec![
            (0.0, 5.0, "Hello there. How are you today?"),
        ]));

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, 0);
        assert_eq!(segments[0].text, "Hello there. How are you today?");
        assert_eq!(segments[0].start_seconds, 0.0);
        assert_eq!(segments[0].end_seconds, 5.0);
    }

    #[test]
    fn test_word_budget_is_respected() {
        // Two sentences of 4 words each against a budget of 5: the second
        // sentence must open a new segment.
        let segments = segmenter(5).segment(&transcript(vec![
            (0.0, 5.0, "One two three four."),
            (5.0, 10.0, "Five six seven eight."),
        ]));

        assert_eq!(segments.len(), 2);
        for segment in &segments {
            assert!(segment.word_count() <= 5);
        }
        assert_eq!(segments[0].start_seconds, 0.0);
        assert_eq!(segments[0].end_seconds, 5.0);
        assert_eq!(segments[1].start_seconds, 5.0);
        assert_eq!(segments[1].end_seconds, 10.0);
    }

    #[test]
    fn test_oversized_sentence_is_never_split() {
        let segments = segmenter(3).segment(&transcript(vec![(
            0.0,
            8.0,
            "This one sentence runs well past the tiny budget.",
        )]));

        assert_eq!(segments.len(), 1);
        assert!(segments[0].word_count() > 3);
    }

    #[test]
    fn test_oversized_sentence_closes_prior_bundle() {
        let segments = segmenter(4).segment(&transcript(vec![
            (0.0, 3.0, "Short one."),
            (3.0, 9.0, "But this following sentence is far too long for the budget."),
        ]));

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Short one.");
        assert!(segments[1].word_count() > 4);
    }

    #[test]
    fn test_ids_are_dense_and_starts_non_decreasing() {
        let segments = segmenter(6).segment(&transcript(vec![
            (0.0, 4.0, "Alpha beta gamma delta. Epsilon zeta eta."),
            (4.0, 8.0, "Theta iota kappa. Lambda mu nu xi omicron."),
            (8.0, 12.0, "Pi rho sigma tau upsilon."),
        ]));

        assert!(!segments.is_empty());
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.id, i);
            assert!(segment.start_seconds <= segment.end_seconds);
        }
        for pair in segments.windows(2) {
            assert!(pair[0].start_seconds <= pair[1].start_seconds);
        }
    }

    #[test]
    fn test_bundle_spanning_multiple_spans_keeps_opening_start() {
        // Both spans fit in one bundle: start comes from the first span,
        // end from the last contributing span.
        let segments = segmenter(50).segment(&transcript(vec![
            (1.5, 4.0, "First part here."),
            (4.0, 9.5, "Second part there."),
        ]));

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_seconds, 1.5);
        assert_eq!(segments[0].end_seconds, 9.5);
    }

    #[test]
    fn test_segment_normalizes_time_range() {
        let segment = Segment::new(0, " text ".to_string(), 5.0, 3.0);
        assert_eq!(segment.text, "text");
        assert!(segment.start_seconds <= segment.end_seconds);
    }
}
