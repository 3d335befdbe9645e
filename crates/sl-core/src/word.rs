//! Word normalization shared by the catalog, lexicon and rounds.

use crate::error::{SlError, SlResult};

/// Trim surrounding whitespace and lowercase.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Number of letters in a normalized word.
pub fn letter_count(word: &str) -> usize {
    word.chars().count()
}

/// Check that `word` is a non-empty run of letters, optionally of a fixed length.
pub fn validate(word: &str, expected_len: Option<usize>) -> SlResult<()> {
    if word.is_empty() {
        return Err(SlError::InvalidWord {
            word: word.to_string(),
            reason: "word is empty".into(),
        });
    }
    if !word.chars().all(char::is_alphabetic) {
        return Err(SlError::InvalidWord {
            word: word.to_string(),
            reason: "word must contain only letters".into(),
        });
    }
    if let Some(len) = expected_len
        && letter_count(word) != len
    {
        return Err(SlError::InvalidWord {
            word: word.to_string(),
            reason: format!("word must be {len} letters"),
        });
    }
    Ok(())
}
