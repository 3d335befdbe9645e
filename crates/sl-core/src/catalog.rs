//! Word/image pairs the game draws its targets from.
//!
//! The source format is one record per line, `word<TAB>image_ref`, with no
//! header. Blank lines are skipped. Words are normalized to lowercase on
//! load, and the catalog keeps file order so sequential selection is
//! reproducible.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{CatalogOptions, DuplicatePolicy, GameConfig, SelectionPolicy};
use crate::error::{SlError, SlResult};
use crate::word;

/// A target word and the image shown to the players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    /// Normalized target word.
    pub word: String,
    /// Opaque image reference, usually a URL.
    pub image_ref: String,
}

impl Pair {
    /// Number of letters in the target word.
    pub fn word_length(&self) -> usize {
        word::letter_count(&self.word)
    }
}

/// Ordered, deduplicated set of pairs. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pairs: Vec<Pair>,
}

/// Selection state kept outside the catalog so the catalog stays immutable.
#[derive(Debug)]
pub enum Selection {
    /// Uniform random draws.
    Random(StdRng),
    /// File order; holds the index of the next pair.
    Sequential {
        /// Index of the next pair to hand out.
        next: usize,
    },
}

impl Selection {
    /// Build selection state from the game configuration.
    pub fn from_config(config: &GameConfig) -> Self {
        match config.selection {
            SelectionPolicy::Sequential => Selection::Sequential { next: 0 },
            SelectionPolicy::Random => match config.seed {
                Some(seed) => Selection::Random(StdRng::seed_from_u64(seed)),
                None => Selection::Random(StdRng::from_os_rng()),
            },
        }
    }
}

impl Catalog {
    /// Parse catalog records from a string.
    pub fn parse(source: &str, options: &CatalogOptions) -> SlResult<Self> {
        let mut pairs: Vec<Pair> = Vec::new();
        let mut index_by_word: HashMap<String, usize> = HashMap::new();

        for (i, raw) in source.lines().enumerate() {
            let line = i + 1;
            if raw.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = raw.trim_end_matches('\r').split('\t').collect();
            if fields.len() != 2 {
                return Err(SlError::MalformedRecord {
                    line,
                    reason: format!("expected 2 tab-separated fields, found {}", fields.len()),
                });
            }

            let word = word::normalize(fields[0]);
            let image_ref = fields[1].trim().to_string();

            if word.is_empty() {
                return Err(SlError::MalformedRecord {
                    line,
                    reason: "empty word".into(),
                });
            }
            if image_ref.is_empty() {
                return Err(SlError::MalformedRecord {
                    line,
                    reason: "empty image reference".into(),
                });
            }
            if let Err(e) = word::validate(&word, options.word_length) {
                let reason = match e {
                    SlError::InvalidWord { reason, .. } => reason,
                    other => other.to_string(),
                };
                return Err(SlError::MalformedRecord { line, reason });
            }

            match index_by_word.get(&word) {
                Some(&existing) => match options.duplicates {
                    DuplicatePolicy::Reject => {
                        return Err(SlError::DuplicateWord { line, word });
                    }
                    DuplicatePolicy::LastWins => {
                        debug!("Line {line}: \"{word}\" replaces an earlier record");
                        pairs[existing].image_ref = image_ref;
                    }
                },
                None => {
                    index_by_word.insert(word.clone(), pairs.len());
                    pairs.push(Pair { word, image_ref });
                }
            }
        }

        Ok(Self { pairs })
    }

    /// Load a catalog file from disk.
    pub fn load(path: &Path, options: &CatalogOptions) -> SlResult<Self> {
        let source = fs::read_to_string(path)?;
        let catalog = Self::parse(&source, options)?;
        info!(
            "Loaded {} word/image pairs from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// All pairs in file order.
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Look up a pair by word (case-insensitive).
    pub fn get(&self, word: &str) -> Option<&Pair> {
        let word = word::normalize(word);
        self.pairs.iter().find(|p| p.word == word)
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the catalog has no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pick one pair. Only `selection` advances; the catalog is untouched.
    pub fn select_pair(&self, selection: &mut Selection) -> SlResult<&Pair> {
        if self.pairs.is_empty() {
            return Err(SlError::EmptyCatalog);
        }
        let index = match selection {
            Selection::Random(rng) => rng.random_range(0..self.pairs.len()),
            Selection::Sequential { next } => {
                let index = *next % self.pairs.len();
                *next = index + 1;
                index
            }
        };
        Ok(&self.pairs[index])
    }
}
