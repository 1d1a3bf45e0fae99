//! Raw page model: the input contract with the external PDF parser.
//!
//! The parser is authoritative for segmentation: every word arrives with a
//! block index (text region), a line index within the block, and a word
//! index within the line. Sorting by `(page, block, line, word)` reproduces
//! reading order within a block. Block indices separate body text from
//! margin content, which is what lets the rejoiner refuse cross-region
//! joins.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// A single word as reported by the PDF parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWord {
    /// The word text, exactly as extracted
    pub text: String,
    /// Bounding box on the page
    pub bbox: Rect,
    /// Block (region) index, dense per page
    pub block: usize,
    /// Line index within the block, dense per block
    pub line: usize,
    /// Word index within the line
    pub word: usize,
    /// Zero-based page index
    pub page: usize,
    /// Font size in page units
    pub font_size: f32,
    /// Whether the word is set in a bold face
    pub bold: bool,
}

/// One parsed page: ordered words plus page-level facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    /// Zero-based page index
    pub index: usize,
    /// Printed page label (roman, arabic, mixed, or empty)
    pub label: String,
    /// Page width in page units
    pub width: f32,
    /// Page height in page units
    pub height: f32,
    /// Words in parser order
    pub words: Vec<RawWord>,
}

impl RawPage {
    /// Create an empty page with the given index and label.
    pub fn new(index: usize, label: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            index,
            label: label.into(),
            width,
            height,
            words: Vec::new(),
        }
    }

    /// Words sorted into reading order `(block, line, word)`.
    pub fn words_in_reading_order(&self) -> Vec<&RawWord> {
        let mut words: Vec<&RawWord> = self.words.iter().collect();
        words.sort_by_key(|w| (w.block, w.line, w.word));
        words
    }

    /// Right margin of a block: the maximum x1 over its words.
    ///
    /// Returns `None` for a block with no words on this page.
    pub fn block_right_margin(&self, block: usize) -> Option<f32> {
        self.words
            .iter()
            .filter(|w| w.block == block)
            .map(|w| w.bbox.x1)
            .fold(None, |acc, x| Some(acc.map_or(x, |m: f32| m.max(x))))
    }
}
