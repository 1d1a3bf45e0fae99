//! Adaptive dictionary: base lexicon plus an in-document learned-word store.
//!
//! The dictionary answers a single question (is this word plausible?) and
//! never corrects anything. Unknown words are simply not contained; the OCR
//! error selector decides what to do about them.
//!
//! Concurrency contract: during the parallel per-page phase the dictionary
//! is only read (`&self`). Each page records its `observe` calls into an
//! [`ObservationDelta`]; the pipeline merges deltas serially in ascending
//! page order so parallel runs are byte-identical to serial ones.

pub mod morphology;
mod persistence;

use std::collections::{BTreeMap, HashSet};

use crate::config::DictionaryConfig;
use crate::text::{has_triple_repeat, has_vowel, is_numeric_token, normalize_word, plausible_word_shape};

/// Embedded base lexicon: common English plus scholarly-register vocabulary.
const BASE_LEXICON: &str = include_str!("../../data/base_lexicon.txt");

/// A learned-word entry: occurrence count and derived confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnedEntry {
    /// How many times the word has been observed
    pub count: u32,
    /// Confidence in [0, 1], `min(1.0, 0.5 + 0.1 * count)` for entries
    /// learned in-process; persisted entries keep their stored value
    pub confidence: f32,
    /// Whether the entry passed morphological validation at promotion time
    validated: bool,
}

impl LearnedEntry {
    fn confidence_for(count: u32) -> f32 {
        (0.5 + 0.1 * count as f32).min(1.0)
    }
}

/// Base lexicon + learned-word store with morphological acceptance.
#[derive(Debug, Clone)]
pub struct AdaptiveDictionary {
    base: HashSet<String>,
    learned: BTreeMap<String, LearnedEntry>,
    config: DictionaryConfig,
}

impl AdaptiveDictionary {
    /// Create a dictionary over the embedded base lexicon.
    pub fn new(config: DictionaryConfig) -> Self {
        Self::from_base_words(BASE_LEXICON.lines(), config)
    }

    /// Create a dictionary over a caller-supplied base word list.
    pub fn from_base_words<I, S>(words: I, config: DictionaryConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let base = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            base,
            learned: BTreeMap::new(),
            config,
        }
    }

    /// Whether the word is accepted: in the base set after case-fold, or a
    /// qualifying learned entry, or a morphological derivation of an
    /// accepted stem.
    ///
    /// Never fails; unknown simply returns `false`.
    pub fn contains(&self, word: &str) -> bool {
        let folded = normalize_word(word);
        if folded.is_empty() {
            return false;
        }
        if self.accepted_plain(&folded) {
            return true;
        }
        morphology::derives_from_accepted(&folded, &self.config.morphology, |stem| {
            self.accepted_plain(stem)
        })
    }

    /// Acceptance without morphology: base set or qualifying learned entry.
    fn accepted_plain(&self, folded: &str) -> bool {
        if self.base.contains(folded) {
            return true;
        }
        match self.learned.get(folded) {
            Some(entry) => {
                entry.validated
                    && entry.count >= self.config.learn_count_threshold
                    && entry.confidence >= self.config.learn_confidence_threshold
            },
            None => false,
        }
    }

    /// Record one observation of a word.
    ///
    /// Promotion to a learned (accepted) entry requires: count ≥ 2, length
    /// ≥ 3, at least one vowel, no triple-repeated letter, and a
    /// morphological validation against the accepted stem pool: a word
    /// either derives from an accepted stem or at least looks like a word.
    pub fn observe(&mut self, word: &str) {
        self.observe_n(word, 1);
    }

    /// Record `n` observations at once (used when merging page deltas).
    pub fn observe_n(&mut self, word: &str, n: u32) {
        let folded = normalize_word(word);
        if folded.is_empty() || is_numeric_token(&folded) {
            return;
        }

        let validated = {
            let count = self.learned.get(&folded).map_or(0, |e| e.count) + n;
            count >= 2
                && folded.chars().count() >= 3
                && has_vowel(&folded)
                && !has_triple_repeat(&folded)
                && self.morphological_validation(&folded)
        };

        let entry = self.learned.entry(folded).or_insert(LearnedEntry {
            count: 0,
            confidence: 0.0,
            validated: false,
        });
        entry.count += n;
        entry.confidence = LearnedEntry::confidence_for(entry.count);
        entry.validated = validated;
    }

    /// Validation against the accepted stem pool. Derivations of accepted
    /// stems always pass; otherwise the word-shape filter decides, so that
    /// recurring domain vocabulary with no English stem can still be
    /// learned.
    fn morphological_validation(&self, folded: &str) -> bool {
        morphology::derives_from_accepted(folded, &self.config.morphology, |stem| {
            self.accepted_plain(stem)
        }) || plausible_word_shape(folded)
    }

    /// Occurrence count recorded for a word, zero if never observed.
    pub fn observed_count(&self, word: &str) -> u32 {
        self.learned.get(&normalize_word(word)).map_or(0, |e| e.count)
    }

    /// Iterate promoted learned entries in lexicographic order.
    pub fn learned_entries(&self) -> impl Iterator<Item = (&str, &LearnedEntry)> {
        self.learned
            .iter()
            .filter(|(_, e)| e.validated)
            .map(|(w, e)| (w.as_str(), e))
    }

    pub(crate) fn insert_learned(&mut self, word: String, count: u32, confidence: f32) {
        self.learned.insert(
            word,
            LearnedEntry {
                count,
                confidence,
                validated: true,
            },
        );
    }
}

/// Observations recorded by one page during the parallel phase.
///
/// Deltas are merged into the dictionary serially, in ascending page order,
/// after the parallel phase completes.
#[derive(Debug, Clone, Default)]
pub struct ObservationDelta {
    counts: BTreeMap<String, u32>,
}

impl ObservationDelta {
    /// Create an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation of a word.
    pub fn record(&mut self, word: &str) {
        let folded = normalize_word(word);
        if folded.is_empty() || is_numeric_token(&folded) {
            return;
        }
        *self.counts.entry(folded).or_insert(0) += 1;
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Apply the delta's counts to a dictionary.
    pub fn apply_to(&self, dictionary: &mut AdaptiveDictionary) {
        for (word, n) in &self.counts {
            dictionary.observe_n(word, *n);
        }
    }
}
