//! Per-letter feedback for an agreed guess.
//!
//! Scoring follows the standard Wordle rules: exact matches are marked
//! first and consume their letter from the target, then the remaining guess
//! letters are scanned left to right and marked `Present` only while an
//! unconsumed occurrence is left in the target.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SlError, SlResult};

/// Match status of a single guess letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterStatus {
    /// Same letter in the same position.
    Correct,
    /// Letter occurs elsewhere in the target.
    Present,
    /// Letter does not occur (or all occurrences are already accounted for).
    Absent,
}

impl fmt::Display for LetterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LetterStatus::Correct => write!(f, "correct"),
            LetterStatus::Present => write!(f, "present"),
            LetterStatus::Absent => write!(f, "absent"),
        }
    }
}

/// Compare `guess` against `target`, case-insensitively.
pub fn evaluate(guess: &str, target: &str) -> SlResult<Vec<LetterStatus>> {
    let guess: Vec<char> = guess.chars().flat_map(char::to_lowercase).collect();
    let target: Vec<char> = target.chars().flat_map(char::to_lowercase).collect();

    if guess.len() != target.len() {
        return Err(SlError::LengthMismatch {
            guess: guess.len(),
            target: target.len(),
        });
    }

    let mut statuses = vec![LetterStatus::Absent; guess.len()];
    let mut unconsumed: HashMap<char, usize> = HashMap::new();

    for (i, (&g, &t)) in guess.iter().zip(&target).enumerate() {
        if g == t {
            statuses[i] = LetterStatus::Correct;
        } else {
            *unconsumed.entry(t).or_insert(0) += 1;
        }
    }

    for (i, g) in guess.iter().enumerate() {
        if statuses[i] == LetterStatus::Correct {
            continue;
        }
        if let Some(left) = unconsumed.get_mut(g)
            && *left > 0
        {
            *left -= 1;
            statuses[i] = LetterStatus::Present;
        }
    }

    Ok(statuses)
}

/// Whether `guess` hits `target` exactly, ignoring case.
pub fn is_win(guess: &str, target: &str) -> bool {
    guess.chars().count() == target.chars().count() && guess.to_lowercase() == target.to_lowercase()
}
