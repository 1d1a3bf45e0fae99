//! SQLite projection for large documents.
//!
//! Schema: `metadata(key,value)`, `content(text)`, `pages(start,end,label,
//! idx)`, `sections(start,end,title,level)`, `flags(offset,reason,
//! confidence)`, with indexes on `pages.start` and `flags.offset` for
//! offset-range lookups. The whole write happens inside one transaction.

use std::path::Path;

use rusqlite::{params, Connection};

use crate::document::ScholarDocument;
use crate::error::Result;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS metadata (
    key   TEXT NOT NULL,
    value TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS content (
    text TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS pages (
    start INTEGER NOT NULL,
    "end" INTEGER NOT NULL,
    label TEXT NOT NULL,
    idx   INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS sections (
    start INTEGER NOT NULL,
    "end" INTEGER NOT NULL,
    title TEXT NOT NULL,
    level INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS flags (
    offset     INTEGER NOT NULL,
    reason     TEXT NOT NULL,
    confidence REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_pages_start ON pages(start);
CREATE INDEX IF NOT EXISTS idx_flags_offset ON flags(offset);
"#;

/// Write a document to a SQLite database at `path`, replacing previous
/// contents.
pub fn write_sqlite(doc: &ScholarDocument, path: &Path) -> Result<()> {
    let mut conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;

    let tx = conn.transaction()?;
    tx.execute_batch(
        "DELETE FROM metadata; DELETE FROM content; DELETE FROM pages; \
         DELETE FROM sections; DELETE FROM flags;",
    )?;

    for (key, value) in &doc.metadata {
        tx.execute("INSERT INTO metadata (key, value) VALUES (?1, ?2)", params![key, value])?;
    }
    tx.execute("INSERT INTO content (text) VALUES (?1)", params![doc.text])?;

    {
        let mut stmt =
            tx.prepare("INSERT INTO pages (start, \"end\", label, idx) VALUES (?1, ?2, ?3, ?4)")?;
        for page in &doc.pages {
            stmt.execute(params![page.start, page.end, page.label, page.page_index])?;
        }

        let mut stmt = tx
            .prepare("INSERT INTO sections (start, \"end\", title, level) VALUES (?1, ?2, ?3, ?4)")?;
        for section in &doc.sections {
            stmt.execute(params![section.start, section.end, section.title, section.level])?;
        }

        let mut stmt =
            tx.prepare("INSERT INTO flags (offset, reason, confidence) VALUES (?1, ?2, ?3)")?;
        for flag in &doc.flags {
            stmt.execute(params![flag.offset, format!("{:?}", flag.reason), flag.confidence])?;
        }
    }
    tx.commit()?;

    log::debug!(
        "wrote {} pages, {} sections, {} flags to {}",
        doc.pages.len(),
        doc.sections.len(),
        doc.flags.len(),
        path.display()
    );
    Ok(())
}
