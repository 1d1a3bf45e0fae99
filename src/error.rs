//! Error and warning types for the conversion pipeline.
//!
//! Document-level failures surface as [`Error`]; page-local failures are
//! absorbed into [`Warning`] values carried alongside the (possibly partial)
//! document.

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input file missing or not in a supported format
    #[error("InputError: {0}")]
    Input(String),

    /// The parser dump could not be decoded
    #[error("MalformedDump: {0}")]
    MalformedDump(String),

    /// The parser produced no pages at all
    #[error("EmptyDocument: parser produced no pages")]
    EmptyDocument,

    /// A page is missing block/line indices or is otherwise unusable.
    ///
    /// Only raised by page validation; the pipeline converts it into a
    /// warning and continues with the remaining pages.
    #[error("MalformedPage: page {page}: {reason}")]
    MalformedPage {
        /// Zero-based page index
        page: usize,
        /// Why the page was rejected
        reason: String,
    },

    /// Dictionary file was corrupt beyond recovery
    #[error("DictionaryLoadError: {0}")]
    DictionaryLoad(String),

    /// IO error during reading input or persisting output
    #[error("IOError: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding error
    #[error("JsonError: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite persistence error
    #[error("SqliteError: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Conversion was canceled cooperatively
    #[error("Canceled: conversion canceled at a page boundary")]
    Canceled,
}

/// Category of an absorbed, non-fatal problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WarningKind {
    /// A page was skipped because the parser output was unusable
    MalformedPage,
    /// The dictionary file had corrupt lines or fell back to the base set
    DictionaryLoad,
    /// A heading candidate was dropped by overlap/hierarchy validation
    StructureValidation,
    /// An outline bookmark had no matching position in the clean text
    UnmatchedBookmark,
}

/// A non-fatal problem recorded during conversion.
///
/// Warnings never abort the document; they are reported next to the result
/// so callers can decide how much to trust it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Warning {
    /// What went wrong
    pub kind: WarningKind,
    /// Page the problem occurred on, if page-local
    pub page: Option<usize>,
    /// Human-readable description
    pub message: String,
}

impl Warning {
    /// Create a document-level warning.
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            page: None,
            message: message.into(),
        }
    }

    /// Create a warning tied to a specific page.
    pub fn on_page(kind: WarningKind, page: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            page: Some(page),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.page {
            Some(page) => write!(f, "[{:?}] page {}: {}", self.kind, page, self.message),
            None => write!(f, "[{:?}] {}", self.kind, self.message),
        }
    }
}
