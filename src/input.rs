//! Parser dump input: the serialized form of the external PDF parser's
//! output.
//!
//! The core never touches PDF bytes. It consumes a dump carrying document
//! metadata, the flattened outline, and per-page word tuples. Block and
//! line indices are mandatory: the parser is authoritative for
//! segmentation, and a word without them makes its page unusable.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::Metadata;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::page::{RawPage, RawWord};
use crate::structure::OutlineEntry;

/// Default font size assumed when the parser did not report one.
const DEFAULT_FONT_SIZE: f32 = 10.0;

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

/// A word as serialized by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpWord {
    /// Word text
    pub text: String,
    /// Bounding box as `[x0, y0, x1, y1]`
    pub bbox: [f32; 4],
    /// Block (region) index; mandatory
    #[serde(default)]
    pub block: Option<usize>,
    /// Line index within the block; mandatory
    #[serde(default)]
    pub line: Option<usize>,
    /// Word index within the line; defaults to appearance order
    #[serde(default)]
    pub word: Option<usize>,
    /// Font size in page units
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Bold face flag
    #[serde(default)]
    pub bold: bool,
}

/// One page of the parser dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpPage {
    /// Zero-based page index
    pub index: usize,
    /// Printed page label
    #[serde(default)]
    pub label: String,
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Words in parser order
    #[serde(default)]
    pub words: Vec<DumpWord>,
}

impl DumpPage {
    /// Validate and convert into the typed raw-page model.
    ///
    /// Fails with [`Error::MalformedPage`] when any word lacks a block or
    /// line index.
    pub fn to_raw(&self) -> Result<RawPage> {
        let mut page = RawPage::new(self.index, self.label.clone(), self.width, self.height);
        let mut line_runs: std::collections::HashMap<(usize, usize), usize> =
            std::collections::HashMap::new();

        for (i, word) in self.words.iter().enumerate() {
            let (block, line) = match (word.block, word.line) {
                (Some(b), Some(l)) => (b, l),
                _ => {
                    return Err(Error::MalformedPage {
                        page: self.index,
                        reason: format!("word {} ({:?}) lacks block/line indices", i, word.text),
                    });
                },
            };
            let next_in_line = line_runs.entry((block, line)).or_insert(0);
            let word_index = word.word.unwrap_or(*next_in_line);
            *next_in_line = word_index + 1;

            page.words.push(RawWord {
                text: word.text.clone(),
                bbox: Rect::new(word.bbox[0], word.bbox[1], word.bbox[2], word.bbox[3]),
                block,
                line,
                word: word_index,
                page: self.index,
                font_size: word.font_size,
                bold: word.bold,
            });
        }
        Ok(page)
    }
}

/// The full parser dump for one document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Document metadata (title, author, …)
    #[serde(default)]
    pub metadata: Metadata,
    /// Flattened outline entries in tree order
    #[serde(default)]
    pub outline: Vec<OutlineEntry>,
    /// Pages in document order
    pub pages: Vec<DumpPage>,
}

impl ParsedDocument {
    /// Decode a dump from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| Error::MalformedDump(e.to_string()))
    }

    /// Decode a dump from a file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::Input(format!("{}: not found", path.display())),
            _ => Error::Io(e),
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dump_word(text: &str, block: Option<usize>, line: Option<usize>) -> DumpWord {
        DumpWord {
            text: text.to_string(),
            bbox: [0.0, 0.0, 10.0, 10.0],
            block,
            line,
            word: None,
            font_size: 10.0,
            bold: false,
        }
    }

    #[test]
    fn test_to_raw_assigns_word_indices() {
        let page = DumpPage {
            index: 0,
            label: "1".into(),
            width: 612.0,
            height: 792.0,
            words: vec![
                dump_word("one", Some(0), Some(0)),
                dump_word("two", Some(0), Some(0)),
                dump_word("three", Some(0), Some(1)),
            ],
        };
        let raw = page.to_raw().unwrap();
        assert_eq!(raw.words[0].word, 0);
        assert_eq!(raw.words[1].word, 1);
        assert_eq!(raw.words[2].word, 0, "indices restart per line");
    }

    #[test]
    fn test_missing_block_index_is_malformed() {
        let page = DumpPage {
            index: 3,
            label: String::new(),
            width: 612.0,
            height: 792.0,
            words: vec![dump_word("orphan", None, Some(0))],
        };
        match page.to_raw() {
            Err(Error::MalformedPage { page: 3, .. }) => {},
            other => panic!("expected MalformedPage, got {:?}", other),
        }
    }

    #[test]
    fn test_dump_json_roundtrip() {
        let dump = ParsedDocument {
            metadata: [("title".to_string(), "Being and Time".to_string())].into(),
            outline: vec![OutlineEntry {
                title: "Chapter 1".into(),
                level: 1,
                page: Some(3),
            }],
            pages: vec![DumpPage {
                index: 0,
                label: "i".into(),
                width: 612.0,
                height: 792.0,
                words: vec![dump_word("word", Some(0), Some(0))],
            }],
        };
        let json = serde_json::to_string(&dump).unwrap();
        let back = ParsedDocument::from_reader(json.as_bytes()).unwrap();
        assert_eq!(dump, back);
    }

    #[test]
    fn test_malformed_json_reports_malformed_dump() {
        let result = ParsedDocument::from_reader("{not json".as_bytes());
        assert!(matches!(result, Err(Error::MalformedDump(_))));
    }
}
