//! Table-of-contents enrichment.
//!
//! The ToC parser never creates sections. Printed contents pages often
//! carry fuller titles than bookmarks do ("Chapter 1" vs "Chapter 1 · The
//! Necessity of the Question"), so its only job in the cascade is to
//! rewrite the title of a section that already exists.

use lazy_static::lazy_static;
use regex::Regex;

use crate::document::builder::AssembledDocument;
use crate::structure::{CandidateSource, HeadingCandidate, SourceTag};

lazy_static! {
    /// A contents entry: title, dotted leader or spacing, page number.
    static ref RE_TOC_ENTRY: Regex = Regex::new(r"^(.{3,120}?)[\s.·]{2,}(\d{1,4}|[ivxlc]{1,7})$").unwrap();

    /// Contents page marker line.
    static ref RE_CONTENTS: Regex = Regex::new(r"(?i)^\s*(table\s+of\s+)?contents\s*$").unwrap();
}

/// Candidate source parsing printed contents pages for richer titles.
#[derive(Debug, Clone, Copy, Default)]
pub struct TocSource;

impl TocSource {
    /// Create a ToC source.
    pub fn new() -> Self {
        Self
    }
}

impl CandidateSource for TocSource {
    fn source_tag(&self) -> SourceTag {
        SourceTag::Toc
    }

    fn base_confidence(&self) -> f32 {
        0.9
    }

    /// Entries found on contents pages. The position of each candidate is
    /// the ToC line itself, not the section it names; the cascade matches
    /// candidates to existing spans by title and never places these.
    fn enumerate(&self, doc: &AssembledDocument) -> Vec<HeadingCandidate> {
        let mut contents_pages: Vec<usize> = doc
            .lines
            .iter()
            .filter(|l| RE_CONTENTS.is_match(doc.text[l.start..l.end].trim()))
            .map(|l| l.page)
            .collect();
        contents_pages.dedup();
        if contents_pages.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for line in &doc.lines {
            // A contents listing continues onto the following page.
            let on_contents = contents_pages
                .iter()
                .any(|&p| line.page == p || line.page == p + 1);
            if !on_contents {
                continue;
            }
            let text = doc.text[line.start..line.end].trim();
            if let Some(caps) = RE_TOC_ENTRY.captures(text) {
                let title = caps[1].trim_end_matches(['.', '·', ' ']).trim().to_string();
                if title.is_empty() {
                    continue;
                }
                candidates.push(HeadingCandidate {
                    title,
                    level: 1,
                    position: line.start,
                    source: SourceTag::Toc,
                    confidence: self.base_confidence(),
                });
            }
        }
        candidates
    }
}
