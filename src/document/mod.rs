//! The canonical document model.
//!
//! A converted document is one contiguous clean-text string plus
//! position-anchored annotations: page spans, section spans, re-OCR flags,
//! and stripped running headers/footers. All offsets are UTF-8 byte
//! positions into the clean text; exports rely on byte-exactness.

pub mod builder;
pub mod quality;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::structure::SectionSpan;
use crate::text::flagger::FlaggedWord;

pub use builder::{AssembledDocument, DocumentBuilder, PlacedLine, PlacedWord};
pub use quality::{PageQuality, QualityRating, QualityReport};

/// Document metadata as key/value pairs (title, author, source path, …).
pub type Metadata = BTreeMap<String, String>;

/// The clean-text range covered by one page.
///
/// Page spans partition `[0, text.len())` exactly: every byte of clean
/// text belongs to exactly one page, and no separator characters are
/// inserted between pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpan {
    /// First byte of the page's text
    pub start: usize,
    /// One past the last byte of the page's text
    pub end: usize,
    /// Zero-based page index
    pub page_index: usize,
    /// Printed page label (may be roman, arabic, mixed, or empty)
    pub label: String,
}

impl PageSpan {
    /// Whether the page contributed no text.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Whether a stripped line sat in the top or bottom band of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StripKind {
    /// Running header (top band)
    Header,
    /// Running footer (bottom band)
    Footer,
}

/// A running header/footer line removed from the clean text.
///
/// The removal is recorded as an annotation; the text itself carries no
/// trace of the stripped content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrippedLine {
    /// Page the line was removed from
    pub page: usize,
    /// The removed text
    pub text: String,
    /// Header or footer band
    pub kind: StripKind,
}

/// A fully converted scholarly document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarDocument {
    /// The clean text: no page numbers, running headers/footers, or
    /// hyphen line-wraps
    pub text: String,
    /// Page spans partitioning the clean text
    pub pages: Vec<PageSpan>,
    /// Section tree as a flat ordered span list
    pub sections: Vec<SectionSpan>,
    /// Re-OCR candidates
    pub flags: Vec<FlaggedWord>,
    /// Running headers/footers removed during assembly
    pub stripped: Vec<StrippedLine>,
    /// Document metadata
    pub metadata: Metadata,
    /// Per-page and aggregate quality
    pub quality: QualityReport,
}

impl ScholarDocument {
    /// The title of the section containing `offset`, preferring the
    /// deepest (highest-level-number) match.
    pub fn section_at(&self, offset: usize) -> Option<&SectionSpan> {
        self.sections
            .iter()
            .filter(|s| s.start <= offset && offset < s.end)
            .max_by_key(|s| s.level)
    }

    /// The page containing `offset`.
    pub fn page_at(&self, offset: usize) -> Option<&PageSpan> {
        self.pages.iter().find(|p| p.start <= offset && offset < p.end)
    }

    /// Top-level sections in order.
    pub fn top_level_sections(&self) -> impl Iterator<Item = &SectionSpan> {
        self.sections.iter().filter(|s| s.level == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::SourceTag;

    fn span(start: usize, end: usize, level: u8) -> SectionSpan {
        SectionSpan {
            start,
            end,
            title: format!("s{level}"),
            level,
            confidence: 0.9,
            source: SourceTag::Outline,
        }
    }

    #[test]
    fn test_section_at_prefers_deepest() {
        let doc = ScholarDocument {
            text: "x".repeat(100),
            pages: vec![],
            sections: vec![span(0, 100, 1), span(10, 50, 2)],
            flags: vec![],
            stripped: vec![],
            metadata: Metadata::new(),
            quality: QualityReport::default(),
        };
        assert_eq!(doc.section_at(20).unwrap().level, 2);
        assert_eq!(doc.section_at(60).unwrap().level, 1);
        assert!(doc.section_at(100).is_none());
    }

    #[test]
    fn test_page_at() {
        let doc = ScholarDocument {
            text: "abcdef".to_string(),
            pages: vec![
                PageSpan { start: 0, end: 3, page_index: 0, label: "i".into() },
                PageSpan { start: 3, end: 6, page_index: 1, label: "ii".into() },
            ],
            sections: vec![],
            flags: vec![],
            stripped: vec![],
            metadata: Metadata::new(),
            quality: QualityReport::default(),
        };
        assert_eq!(doc.page_at(0).unwrap().page_index, 0);
        assert_eq!(doc.page_at(3).unwrap().page_index, 1);
    }
}
