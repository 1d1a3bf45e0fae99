//! Heading candidates from the PDF outline (bookmarks).
//!
//! Bookmarks are the most reliable structure signal a PDF carries, so
//! outline candidates get the highest base confidence in the cascade.
//! Each bookmark title is located in the clean text by fuzzy, diacritic-
//! insensitive matching against line starts; a bookmark that cannot be
//! placed is dropped rather than guessed.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::document::builder::AssembledDocument;
use crate::error::{Warning, WarningKind};
use crate::structure::{CandidateSource, HeadingCandidate, SourceTag};

/// Base confidence for outline-sourced candidates.
const OUTLINE_CONFIDENCE: f32 = 0.95;

/// Titles are compared over at most this many characters.
const MATCH_PREFIX_CHARS: usize = 40;

/// Maximum Levenshtein distance for a title to count as found.
const MAX_EDIT_DISTANCE: usize = 2;

/// One bookmark from the parser's outline tree, flattened with its depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Bookmark title
    pub title: String,
    /// Depth in the bookmark tree, 1-based
    pub level: u8,
    /// Page the bookmark points at, when the parser resolved it
    pub page: Option<usize>,
}

/// Candidate source reading the embedded bookmark tree.
#[derive(Debug, Clone, Default)]
pub struct OutlineSource {
    entries: Vec<OutlineEntry>,
}

impl OutlineSource {
    /// Create a source over flattened outline entries.
    pub fn new(entries: Vec<OutlineEntry>) -> Self {
        Self { entries }
    }

    /// Whether the outline carries any entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Match entries against the clean text, returning placed candidates
    /// and a warning per bookmark that could not be located.
    pub fn match_candidates(
        &self,
        doc: &AssembledDocument,
    ) -> (Vec<HeadingCandidate>, Vec<Warning>) {
        let mut candidates = Vec::new();
        let mut warnings = Vec::new();

        for entry in &self.entries {
            match locate_title(&entry.title, entry.page, doc) {
                Some(position) => candidates.push(HeadingCandidate {
                    title: entry.title.clone(),
                    level: entry.level.max(1),
                    position,
                    source: SourceTag::Outline,
                    confidence: OUTLINE_CONFIDENCE,
                }),
                None => {
                    log::debug!("outline entry {:?} not found in clean text, dropping", entry.title);
                    warnings.push(Warning::new(
                        WarningKind::UnmatchedBookmark,
                        format!("bookmark {:?} has no match in the text", entry.title),
                    ));
                },
            }
        }

        candidates.sort_by_key(|c| (c.position, c.level));
        (candidates, warnings)
    }
}

impl CandidateSource for OutlineSource {
    fn source_tag(&self) -> SourceTag {
        SourceTag::Outline
    }

    fn base_confidence(&self) -> f32 {
        OUTLINE_CONFIDENCE
    }

    fn enumerate(&self, doc: &AssembledDocument) -> Vec<HeadingCandidate> {
        self.match_candidates(doc).0
    }
}

/// Find the earliest line whose start fuzzily matches the title.
///
/// When the bookmark carries a page hint the search starts there: the same
/// title usually also appears earlier, in the table of contents, and must
/// not bind to it.
fn locate_title(title: &str, page_hint: Option<usize>, doc: &AssembledDocument) -> Option<usize> {
    let key = fold_for_match(title);
    if key.is_empty() {
        return None;
    }

    let candidates = doc.lines.iter().filter(|line| match page_hint {
        Some(page) => line.page >= page,
        None => true,
    });

    for line in candidates {
        let line_text = &doc.text[line.start..line.end];
        let folded = fold_for_match(line_text);
        let prefix: String = folded.chars().take(key.chars().count()).collect();
        if strsim::levenshtein(&key, &prefix) <= MAX_EDIT_DISTANCE {
            return Some(line.start);
        }
    }
    None
}

/// Case-fold, strip diacritics (NFKD, combining marks removed), and
/// collapse whitespace; truncated to the match window.
fn fold_for_match(text: &str) -> String {
    let stripped: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MATCH_PREFIX_CHARS)
        .collect()
}

fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}' | '\u{1AB0}'..='\u{1AFF}' | '\u{20D0}'..='\u{20FF}')
}
