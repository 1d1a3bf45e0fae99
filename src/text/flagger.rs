//! OCR error selection: flag suspicious words for re-OCR.
//!
//! The selector annotates, it never rewrites. Every flag carries a byte
//! offset into the clean text, the original word, a reason, and a
//! confidence; downstream tooling decides whether to re-OCR the region.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dictionary::{AdaptiveDictionary, ObservationDelta};
use crate::text::{char_set_size, has_triple_repeat, has_vowel, is_numeric_token};

lazy_static! {
    /// Ordinal forms with a digit prefix: 1st, 2nd, 103rd, 4th
    static ref RE_ORDINAL: Regex = Regex::new(r"(?i)^\d+(st|nd|rd|th)$").unwrap();

    /// Reference codes mixing letters and digits: A64, B39, KrV2
    static ref RE_CODE: Regex = Regex::new(r"^[A-Za-z]{1,3}\d{1,4}$").unwrap();
}

/// Why a word was selected as a re-OCR candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagReason {
    /// Not in the dictionary and not otherwise suspicious
    NotInDict,
    /// Violates basic word-shape patterns (triple letter, vowelless,
    /// digit glued to a letter)
    PatternViolation,
    /// Two or fewer distinct characters over four or more positions
    LowEntropy,
    /// Looks like a mis-OCRed umlaut or ligature (`ii` for `ü`, `ti` for `fi`)
    UmlautArtifact,
}

impl FlagReason {
    /// How confident the selector is that the word needs re-OCR.
    pub fn confidence(&self) -> f32 {
        match self {
            FlagReason::PatternViolation | FlagReason::LowEntropy => 1.0,
            FlagReason::NotInDict => 0.8,
            FlagReason::UmlautArtifact => 0.6,
        }
    }
}

/// A word selected for re-OCR. The clean text is never modified; the flag
/// only points at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedWord {
    /// Page the word appears on
    pub page: usize,
    /// Byte offset of the word in the clean text
    pub offset: usize,
    /// The word as it appears in the clean text
    pub text: String,
    /// Why it was flagged
    pub reason: FlagReason,
    /// Confidence of the flag
    pub confidence: f32,
}

/// Selects re-OCR candidates from clean page text.
#[derive(Debug, Clone, Copy, Default)]
pub struct OcrErrorSelector;

impl OcrErrorSelector {
    /// Create a selector.
    pub fn new() -> Self {
        Self
    }

    /// Flag suspicious words in one page's clean text.
    ///
    /// Offsets in the returned flags are relative to `text`; the caller
    /// shifts them into document coordinates. Accepted words of three or
    /// more characters and unknown-but-plausible words are recorded into
    /// the observation delta so the dictionary keeps learning.
    pub fn flag_page(
        &self,
        text: &str,
        page_index: usize,
        dictionary: &AdaptiveDictionary,
        delta: &mut ObservationDelta,
    ) -> Vec<FlaggedWord> {
        let mut flags = Vec::new();

        for (offset, word) in words_with_offsets(text) {
            let normalized = word.to_lowercase();
            if is_numeric_token(&normalized) {
                continue;
            }

            if dictionary.contains(&normalized) {
                if normalized.chars().count() >= 3 {
                    delta.record(&normalized);
                }
                continue;
            }

            let reason = classify(&normalized, dictionary);
            if reason == FlagReason::NotInDict {
                // Plausible-but-unknown words still accumulate occurrences;
                // recurring domain vocabulary gets promoted and stops being
                // flagged on later passes.
                delta.record(&normalized);
            }
            flags.push(FlaggedWord {
                page: page_index,
                offset,
                text: word.to_string(),
                reason,
                confidence: reason.confidence(),
            });
        }
        flags
    }
}

fn classify(word: &str, dictionary: &AdaptiveDictionary) -> FlagReason {
    let len = word.chars().count();

    if has_triple_repeat(word)
        || (!has_vowel(word) && len >= 3)
        || (digit_adjacent_to_letter(word) && !is_approved_mixed_form(word))
    {
        return FlagReason::PatternViolation;
    }
    if is_umlaut_artifact(word, dictionary) {
        return FlagReason::UmlautArtifact;
    }
    if char_set_size(word) <= 2 && len >= 4 {
        return FlagReason::LowEntropy;
    }
    FlagReason::NotInDict
}

fn digit_adjacent_to_letter(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();
    chars.windows(2).any(|w| {
        (w[0].is_ascii_digit() && w[1].is_alphabetic())
            || (w[0].is_alphabetic() && w[1].is_ascii_digit())
    })
}

fn is_approved_mixed_form(word: &str) -> bool {
    RE_ORDINAL.is_match(word) || RE_CODE.is_match(word)
}

/// `ii` scanned for `ü`, `ti` scanned for the `fi` ligature: the word is
/// an artifact when the substituted form is accepted. The text keeps the
/// artifact; only the flag records the suspicion.
fn is_umlaut_artifact(word: &str, dictionary: &AdaptiveDictionary) -> bool {
    substitution_accepted(word, "ii", "ü", dictionary)
        || substitution_accepted(word, "ti", "fi", dictionary)
}

fn substitution_accepted(
    word: &str,
    bigram: &str,
    replacement: &str,
    dictionary: &AdaptiveDictionary,
) -> bool {
    let mut from = 0;
    while let Some(pos) = word[from..].find(bigram) {
        let at = from + pos;
        let mut candidate = String::with_capacity(word.len());
        candidate.push_str(&word[..at]);
        candidate.push_str(replacement);
        candidate.push_str(&word[at + bigram.len()..]);
        if dictionary.contains(&candidate) {
            return true;
        }
        from = at + 1;
    }
    false
}

/// Iterate the alphanumeric-cored words of `text` with their byte offsets.
/// Surrounding punctuation is excluded from both the offset and the word;
/// interior apostrophes and hyphens are kept.
fn words_with_offsets(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    for (token_start, token) in split_whitespace_with_offsets(text) {
        let core_start = token.char_indices().find(|(_, c)| c.is_alphanumeric()).map(|(i, _)| i);
        let Some(start) = core_start else { continue };
        let end = token
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_alphanumeric())
            .map(|(i, c)| i + c.len_utf8())
            .expect("core exists");
        words.push((token_start + start, &token[start..end]));
    }
    words
}

fn split_whitespace_with_offsets(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                out.push((s, &text[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push((s, &text[s..]));
    }
    out
}
