//! Configuration for sessions and catalog loading.

use serde::{Deserialize, Serialize};

/// How a session picks its target pair from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Uniformly random draw.
    #[default]
    Random,
    /// File order, wrapping around at the end.
    Sequential,
}

/// What to do when the catalog lists the same word twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail the load with `DuplicateWord`.
    #[default]
    Reject,
    /// Keep the first position but take the later image.
    LastWins,
}

/// What to do when a participant guesses again before the partner answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResubmitPolicy {
    /// Replace the pending guess.
    #[default]
    Overwrite,
    /// Keep the first pending guess and reject the new one.
    Reject,
}

/// Options for parsing a catalog source.
#[derive(Debug, Clone, Default)]
pub struct CatalogOptions {
    /// Duplicate-word handling.
    pub duplicates: DuplicatePolicy,
    /// Required word length; `None` accepts any length.
    pub word_length: Option<usize>,
}

impl CatalogOptions {
    /// Set the duplicate-word policy.
    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Require every catalog word to have exactly `len` letters.
    pub fn with_word_length(mut self, len: usize) -> Self {
        self.word_length = Some(len);
        self
    }
}

/// Configuration shared by every session of a registry.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Maximum agreed guesses before the game is lost.
    pub attempt_limit: u32,
    /// Pair selection policy.
    pub selection: SelectionPolicy,
    /// RNG seed for reproducible random selection.
    pub seed: Option<u64>,
    /// Resubmission policy for pending guesses.
    pub resubmit: ResubmitPolicy,
    /// Puzzles a pair plays in one room before it is closed.
    pub puzzles: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            attempt_limit: 5,
            selection: SelectionPolicy::Random,
            seed: None,
            resubmit: ResubmitPolicy::Overwrite,
            puzzles: 1,
        }
    }
}

impl GameConfig {
    /// Set the attempt limit (at least 1).
    pub fn with_attempt_limit(mut self, limit: u32) -> Self {
        self.attempt_limit = limit.max(1);
        self
    }

    /// Set the selection policy.
    pub fn with_selection(mut self, policy: SelectionPolicy) -> Self {
        self.selection = policy;
        self
    }

    /// Seed random selection.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the resubmission policy.
    pub fn with_resubmit(mut self, policy: ResubmitPolicy) -> Self {
        self.resubmit = policy;
        self
    }

    /// Set the number of puzzles per room (at least 1).
    pub fn with_puzzles(mut self, puzzles: u32) -> Self {
        self.puzzles = puzzles.max(1);
        self
    }
}
