//! Export projections of the document model.
//!
//! All three writers are pure projections: the model owns the offsets and
//! the invariants, the writers only serialize. Byte offsets survive the
//! JSON and SQLite round trips unchanged.

pub mod json;
pub mod markdown;
pub mod sqlite;

pub use json::JsonDocument;
pub use markdown::MarkdownExporter;
