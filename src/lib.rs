//! # Scholar Oxide
//!
//! Converts the text layer of scholarly PDFs into a clean, structured,
//! quality-scored intermediate representation for retrieval-augmented
//! generation, citation, and export.
//!
//! The crate consumes the output of an external PDF parser (word tuples
//! with block/line indices, plus the bookmark tree) and produces a
//! [`ScholarDocument`](document::ScholarDocument): one contiguous clean
//! text with position-anchored annotations for pages, sections, stripped
//! running headers, and re-OCR candidates.
//!
//! ## Core subsystems
//!
//! - **Line-break rejoiner** ([`text::rejoin`]): stitches hyphenated line
//!   wraps back together, arbitrated by the adaptive dictionary and the
//!   word's position against the block's right margin. Cross-block
//!   candidates are always rejected, which keeps margin apparatus out of
//!   body text.
//! - **Adaptive dictionary** ([`dictionary`]): base lexicon plus an
//!   in-document learned-word store with morphological validation and
//!   line-oriented persistence.
//! - **OCR error selector** ([`text::flagger`]): flags words for re-OCR,
//!   never rewrites them.
//! - **Structure cascade** ([`structure`]): outline → visual heading
//!   detection → ToC enrichment, composed by strict precedence with
//!   overlap and hierarchy validators.
//!
//! ## Quick start
//!
//! ```no_run
//! use scholar_oxide::config::PipelineConfig;
//! use scholar_oxide::dictionary::AdaptiveDictionary;
//! use scholar_oxide::input::ParsedDocument;
//! use scholar_oxide::pipeline::ScholarPipeline;
//!
//! # fn main() -> scholar_oxide::error::Result<()> {
//! let dump = ParsedDocument::from_path(std::path::Path::new("paper.pages.json"))?;
//! let config = PipelineConfig::new();
//! let mut dictionary = AdaptiveDictionary::new(config.dictionary.clone());
//! let conversion = ScholarPipeline::new(config).convert(&dump, &mut dictionary)?;
//!
//! println!("{} sections", conversion.document.sections.len());
//! println!("RAG-ready: {}", conversion.document.quality.is_rag_ready());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Input contract
pub mod geometry;
pub mod input;
pub mod page;

// OCR-quality pipeline
pub mod dictionary;
pub mod text;

// Document model and structure extraction
pub mod document;
pub mod structure;

// Orchestration
pub mod pipeline;

// Export projections
pub mod export;

pub use config::PipelineConfig;
pub use dictionary::AdaptiveDictionary;
pub use document::ScholarDocument;
pub use error::{Error, Result, Warning};
pub use input::ParsedDocument;
pub use pipeline::{CancelToken, Conversion, ScholarPipeline};
