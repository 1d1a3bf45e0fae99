//! JSON projection of a converted document.
//!
//! The schema is fixed: `text`, `pages` (start/end/label), `sections`
//! (start/end/title/level/confidence), `flags` (offset/reason/confidence),
//! `metadata`. Offsets are UTF-8 byte positions into `text`; downstream
//! retrieval depends on byte-exactness, so export-then-parse preserves the
//! document structurally.

use serde::{Deserialize, Serialize};

use crate::document::{Metadata, ScholarDocument};
use crate::error::Result;
use crate::text::flagger::FlagReason;

/// One page record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonPage {
    /// First byte of the page in `text`
    pub start: usize,
    /// One past the last byte
    pub end: usize,
    /// Printed page label
    pub label: String,
}

/// One section record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSection {
    /// First byte of the section in `text`
    pub start: usize,
    /// One past the last byte
    pub end: usize,
    /// Section title
    pub title: String,
    /// Heading level, 1-based
    pub level: u8,
    /// Confidence from the originating source
    pub confidence: f32,
}

/// One flag record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonFlag {
    /// Byte offset of the flagged word in `text`
    pub offset: usize,
    /// Flag reason
    pub reason: FlagReason,
    /// Flag confidence
    pub confidence: f32,
}

/// The exported document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonDocument {
    /// The clean text
    pub text: String,
    /// Page spans in order
    pub pages: Vec<JsonPage>,
    /// Section spans in order
    pub sections: Vec<JsonSection>,
    /// Re-OCR flags in order
    pub flags: Vec<JsonFlag>,
    /// Document metadata
    pub metadata: Metadata,
}

impl From<&ScholarDocument> for JsonDocument {
    fn from(doc: &ScholarDocument) -> Self {
        Self {
            text: doc.text.clone(),
            pages: doc
                .pages
                .iter()
                .map(|p| JsonPage {
                    start: p.start,
                    end: p.end,
                    label: p.label.clone(),
                })
                .collect(),
            sections: doc
                .sections
                .iter()
                .map(|s| JsonSection {
                    start: s.start,
                    end: s.end,
                    title: s.title.clone(),
                    level: s.level,
                    confidence: s.confidence,
                })
                .collect(),
            flags: doc
                .flags
                .iter()
                .map(|f| JsonFlag {
                    offset: f.offset,
                    reason: f.reason,
                    confidence: f.confidence,
                })
                .collect(),
            metadata: doc.metadata.clone(),
        }
    }
}

impl JsonDocument {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a previously exported document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
