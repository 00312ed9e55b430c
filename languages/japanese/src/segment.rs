//! Text segmentation for the full-text indexes.
//!
//! SQLite's FTS tokenizers split on whitespace and punctuation, which leaves a
//! whole kana or kanji run as a single token. Japanese text is therefore
//! pre-segmented here, one character per token, so that a phrase query over the
//! same segmentation matches any substring of a reading or writing.

use unicode_normalization::UnicodeNormalization;

use crate::kana::normalize;

/// Which segmentation rule an indexed column uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segmenter {
    /// Readings and writings
    Kana,
    /// Meanings and other latin-script text
    Plain,
}

impl Segmenter {
    pub fn segment(self, text: &str) -> String {
        match self {
            Segmenter::Kana => segment_kana(text),
            Segmenter::Plain => segment_text(text),
        }
    }

    /// Form stored in the `normalized` column next to the display text
    pub fn normalize(self, text: &str) -> String {
        match self {
            Segmenter::Kana => normalize(text),
            Segmenter::Plain => text.trim().nfkc().collect::<String>().to_lowercase(),
        }
    }
}

/// Normalize, then emit one space-separated token per non-space character
pub fn segment_kana(text: &str) -> String {
    let normalized = normalize(text);
    let mut out = String::with_capacity(normalized.len() * 2);
    for c in normalized.chars().filter(|c| !c.is_whitespace()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// NFKC and lowercase; word splitting is left to the index tokenizer
pub fn segment_text(text: &str) -> String {
    Segmenter::Plain.normalize(text)
}
