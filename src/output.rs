//! Values produced by a completed extraction.

use serde::{Deserialize, Serialize};

/// The text returned by the OCR endpoint for one file.
///
/// Immutable once received; lives only as long as the workflow session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted text exactly as the server returned it (possibly empty).
    pub text: String,
    /// Source file name, as echoed by the server or as uploaded.
    pub filename: String,
    /// Length of `text` in UTF-16 code units.
    pub char_count: usize,
    /// `char_count` as reported by the server, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_char_count: Option<usize>,
}

impl ExtractionResult {
    pub fn new(text: impl Into<String>, filename: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            char_count: char_count(&text),
            text,
            filename: filename.into(),
            server_char_count: None,
        }
    }

    /// `true` when the text is empty after trimming whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn stats(&self) -> TextStats {
        TextStats {
            chars: self.char_count,
            words: word_count(&self.text),
        }
    }
}

/// Character and word counts shown next to the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    pub chars: usize,
    pub words: usize,
}

/// Length in UTF-16 code units, the unit text widgets count in.
pub fn char_count(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Number of whitespace-delimited tokens in the trimmed text; 0 when blank.
pub fn word_count(text: &str) -> usize {
    text.trim().split_whitespace().count()
}
