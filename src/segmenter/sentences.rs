//! Sentence-boundary splitting.
//!
//! The segmenter consumes sentence boundaries as a capability so a smarter
//! linguistic splitter can be dropped in; the built-in implementation splits
//! on terminal punctuation.

/// Trait for sentence-boundary detection.
pub trait SentenceSplitter: Send + Sync {
    /// Split text into ordered sentence strings.
    fn split(&self, text: &str) -> Vec<String>;
}

/// Punctuation-based sentence splitter.
///
/// A sentence ends at `.`, `!` or `?` (plus any directly following closing
/// quotes or brackets) when followed by whitespace or end of input.
pub struct RuleSentenceSplitter;

impl SentenceSplitter for RuleSentenceSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            current.push(c);

            if matches!(c, '.' | '!' | '?') {
                // Pull trailing quotes/brackets into the same sentence.
                while let Some(&next) = chars.peek() {
                    if matches!(next, '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}') {
                        current.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }

                let at_boundary = chars.peek().map(|n| n.is_whitespace()).unwrap_or(true);
                if at_boundary {
                    let sentence = current.trim();
                    if !sentence.is_empty() {
                        sentences.push(sentence.to_string());
                    }
                    current.clear();
                }
            }
        }

        let trailing = current.trim();
        if !trailing.is_empty() {
            sentences.push(trailing.to_string());
        }

        sentences
    }
}
