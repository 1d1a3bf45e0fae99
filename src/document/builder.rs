//! Document assembly: concatenate rejoined pages into one clean text,
//! stripping running headers/footers and recording every removal as an
//! annotation.
//!
//! No separator characters are inserted between pages. Each non-empty
//! page's text ends with a newline that belongs to that page's span, so
//! the page spans tile `[0, text.len())` exactly and every exported offset
//! is a plain byte offset into `text`.

use std::collections::HashMap;

use crate::config::HeaderStripConfig;
use crate::document::{PageSpan, StripKind, StrippedLine};
use crate::geometry::Rect;
use crate::text::rejoin::{CleanLine, CleanPage};
use crate::text::is_numeric_token;

/// Provenance of one word in the assembled text.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    /// First byte of the word in the clean text
    pub start: usize,
    /// One past the last byte
    pub end: usize,
    /// Page the word came from
    pub page: usize,
    /// Index of the originating word in the page's reading order
    pub word_index: usize,
}

/// A kept line with its global text range and geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    /// First byte of the line in the clean text
    pub start: usize,
    /// One past the last byte (excludes the newline)
    pub end: usize,
    /// Page the line came from
    pub page: usize,
    /// Block the line belonged to
    pub block: usize,
    /// Line bounding box on its page
    pub bbox: Rect,
    /// Mean font size over the line
    pub mean_font_size: f32,
    /// Whether every word on the line was bold
    pub all_bold: bool,
    /// Number of words on the line
    pub word_count: usize,
}

/// The assembled clean text with positional annotations, before structure
/// extraction and flagging.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssembledDocument {
    /// The clean text
    pub text: String,
    /// Page spans partitioning the text
    pub pages: Vec<PageSpan>,
    /// Kept lines in document order
    pub lines: Vec<PlacedLine>,
    /// Word provenance in document order
    pub words: Vec<PlacedWord>,
    /// Running headers/footers removed during assembly
    pub stripped: Vec<StrippedLine>,
}

impl AssembledDocument {
    /// Words on a given page after cleanup.
    pub fn word_count(&self, page: usize) -> usize {
        self.words.iter().filter(|w| w.page == page).count()
    }

    /// The clean text of one page (trailing newline included).
    pub fn page_text(&self, page: usize) -> &str {
        match self.pages.iter().find(|p| p.page_index == page) {
            Some(span) => &self.text[span.start..span.end],
            None => "",
        }
    }
}

/// Builds the assembled document from rejoined pages.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    config: HeaderStripConfig,
}

impl DocumentBuilder {
    /// Create a builder with the given header-strip tuning.
    pub fn new(config: HeaderStripConfig) -> Self {
        Self { config }
    }

    /// Assemble pages into one clean text.
    ///
    /// Lines recognized as running headers/footers or bare page numbers in
    /// the top/bottom bands are removed from the text and recorded in
    /// `stripped`.
    pub fn assemble(&self, pages: &[CleanPage]) -> AssembledDocument {
        let repeated = self.repeated_band_lines(pages);

        let mut doc = AssembledDocument::default();
        for page in pages {
            let start = doc.text.len();
            for line in &page.lines {
                match self.band_of(line, page) {
                    Some(kind) if repeated.contains(&normalize_running_line(&line.text)) => {
                        doc.stripped.push(StrippedLine {
                            page: page.page_index,
                            text: line.text.clone(),
                            kind,
                        });
                        continue;
                    },
                    Some(kind) if is_bare_page_number(&line.text) => {
                        doc.stripped.push(StrippedLine {
                            page: page.page_index,
                            text: line.text.clone(),
                            kind,
                        });
                        continue;
                    },
                    _ => {},
                }

                let line_start = doc.text.len();
                doc.text.push_str(&line.text);
                doc.lines.push(PlacedLine {
                    start: line_start,
                    end: doc.text.len(),
                    page: page.page_index,
                    block: line.block,
                    bbox: line.bbox,
                    mean_font_size: line.mean_font_size,
                    all_bold: line.all_bold,
                    word_count: line.words.len(),
                });
                for word in &line.words {
                    doc.words.push(PlacedWord {
                        start: line_start + word.start,
                        end: line_start + word.end,
                        page: page.page_index,
                        word_index: word.word_index,
                    });
                }
                doc.text.push('\n');
            }
            doc.pages.push(PageSpan {
                start,
                end: doc.text.len(),
                page_index: page.page_index,
                label: page.label.clone(),
            });
        }

        if !doc.stripped.is_empty() {
            log::debug!(
                "stripped {} running header/footer lines across {} pages",
                doc.stripped.len(),
                pages.len()
            );
        }
        doc
    }

    /// Normalized band-line texts that repeat on enough pages to count as
    /// running headers/footers.
    fn repeated_band_lines(&self, pages: &[CleanPage]) -> Vec<String> {
        let mut seen_on: HashMap<String, Vec<usize>> = HashMap::new();
        for page in pages {
            for line in &page.lines {
                if self.band_of(line, page).is_some() {
                    let key = normalize_running_line(&line.text);
                    if key.is_empty() {
                        continue;
                    }
                    let entry = seen_on.entry(key).or_default();
                    if entry.last() != Some(&page.page_index) {
                        entry.push(page.page_index);
                    }
                }
            }
        }

        let threshold =
            ((pages.len() as f32 * self.config.min_page_fraction).ceil() as usize).max(2);
        let mut repeated: Vec<String> = seen_on
            .into_iter()
            .filter(|(_, pages)| pages.len() >= threshold)
            .map(|(text, _)| text)
            .collect();
        repeated.sort_unstable();
        repeated
    }

    fn band_of(&self, line: &CleanLine, page: &CleanPage) -> Option<StripKind> {
        if line.bbox.y1 <= self.config.band_height {
            Some(StripKind::Header)
        } else if line.bbox.y0 >= page.height - self.config.band_height {
            Some(StripKind::Footer)
        } else {
            None
        }
    }
}

/// Normalization for repetition counting: case-fold, drop digits (running
/// headers usually embed the page number), collapse whitespace.
fn normalize_running_line(text: &str) -> String {
    let lowered: String = text
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .collect::<String>()
        .to_lowercase();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A band line that is nothing but a page number.
fn is_bare_page_number(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty()
        && (is_numeric_token(trimmed) || is_roman_numeral(trimmed))
        && trimmed.split_whitespace().count() == 1
}

fn is_roman_numeral(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| matches!(c.to_ascii_lowercase(), 'i' | 'v' | 'x' | 'l' | 'c' | 'd' | 'm'))
        && text.chars().count() <= 7
}
