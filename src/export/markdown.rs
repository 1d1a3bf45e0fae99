//! Markdown projection of a converted document.
//!
//! Heading levels map to `#`..`######`; page boundaries become
//! `<!-- page: L -->` comments when the marker style asks for them; the
//! debug flag renders flagged words inline as `word^⚠`.

use std::collections::BTreeMap;

use crate::config::{MarkdownOptions, PageMarkerStyle};
use crate::document::ScholarDocument;
use crate::structure::SectionSpan;

/// Renders a document as Markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownExporter {
    options: MarkdownOptions,
}

impl MarkdownExporter {
    /// Create an exporter with the given options.
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }

    /// Render the whole document.
    pub fn export(&self, doc: &ScholarDocument) -> String {
        let headings: BTreeMap<usize, &SectionSpan> =
            doc.sections.iter().map(|s| (s.start, s)).collect();

        let mut out = String::with_capacity(doc.text.len() + doc.text.len() / 8);
        for page in &doc.pages {
            if self.options.marker_style == PageMarkerStyle::Comment {
                let label = if page.label.is_empty() {
                    format!("{}", page.page_index + 1)
                } else {
                    page.label.clone()
                };
                out.push_str(&format!("<!-- page: {} -->\n", label));
            }

            let mut line_start = page.start;
            let page_text = &doc.text[page.start..page.end];
            for line in page_text.split_inclusive('\n') {
                let body = line.strip_suffix('\n').unwrap_or(line);
                match headings.get(&line_start) {
                    Some(section) => {
                        let depth = usize::from(section.level).min(6);
                        out.push('\n');
                        out.push_str(&"#".repeat(depth));
                        out.push(' ');
                        out.push_str(&section.title);
                        out.push_str("\n\n");
                    },
                    None => {
                        out.push_str(&self.render_body_line(doc, body, line_start));
                        out.push('\n');
                    },
                }
                line_start += line.len();
            }
        }
        out
    }

    fn render_body_line(&self, doc: &ScholarDocument, body: &str, line_start: usize) -> String {
        if !self.options.debug_flags {
            return body.to_string();
        }
        let line_end = line_start + body.len();
        let mut rendered = body.to_string();
        // Insert right-to-left so earlier offsets stay valid.
        for flag in doc
            .flags
            .iter()
            .filter(|f| f.offset >= line_start && f.offset < line_end)
            .rev()
        {
            let insert_at = flag.offset - line_start + flag.text.len();
            if insert_at <= rendered.len() {
                rendered.insert_str(insert_at, "^⚠");
            }
        }
        rendered
    }
}
