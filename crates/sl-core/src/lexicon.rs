//! Optional dictionary of acceptable guesses.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::info;

use crate::catalog::Catalog;
use crate::error::SlResult;
use crate::word;

/// Set of normalized words players may guess.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    words: HashSet<String>,
}

impl Lexicon {
    /// Build a lexicon from newline-separated words. Blank lines are skipped.
    pub fn parse(source: &str) -> Self {
        let words = source
            .lines()
            .map(word::normalize)
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Load a word list from disk.
    pub fn load(path: &Path) -> SlResult<Self> {
        let lexicon = Self::parse(&fs::read_to_string(path)?);
        info!("Loaded {} words from {}", lexicon.len(), path.display());
        Ok(lexicon)
    }

    /// Add every catalog target so no game is unwinnable.
    pub fn extend_from_catalog(&mut self, catalog: &Catalog) {
        let before = self.words.len();
        self.words
            .extend(catalog.pairs().iter().map(|p| p.word.clone()));
        let added = self.words.len() - before;
        if added > 0 {
            info!("Added {added} catalog words missing from the word list");
        }
    }

    /// Whether `word` is known (case-insensitive).
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word::normalize(word))
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the lexicon is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
