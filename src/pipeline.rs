//! The conversion pipeline: raw parser dump in, scored document out.
//!
//! Staging:
//! 1. validate pages (malformed ones degrade to empty pages + warnings);
//! 2. rejoin line breaks, per page (parallel when enabled);
//! 3. assemble clean text, stripping running headers/footers;
//! 4. flag re-OCR candidates, per page (parallel when enabled);
//! 5. merge dictionary observations serially in page order;
//! 6. run the structure cascade;
//! 7. score quality and build the document.
//!
//! Determinism: the dictionary is only read during the parallel phases
//! (the borrow checker enforces the snapshot), and per-page observation
//! deltas merge in ascending page order, so parallel and serial runs
//! produce byte-identical documents.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::dictionary::{AdaptiveDictionary, ObservationDelta};
use crate::document::builder::{AssembledDocument, DocumentBuilder};
use crate::document::{QualityReport, ScholarDocument};
use crate::error::{Error, Result, Warning, WarningKind};
use crate::input::ParsedDocument;
use crate::page::RawPage;
use crate::structure::{
    CandidateSource, CascadingExtractor, HeadingDetectionSource, OutlineSource, TocSource,
};
use crate::text::flagger::{FlaggedWord, OcrErrorSelector};
use crate::text::rejoin::{CleanPage, LineBreakRejoiner};

/// Cooperative cancellation flag, checked at page boundaries.
///
/// Cancellation discards all partial results; the conversion returns
/// [`Error::Canceled`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// A conversion outcome: the (possibly partial) document plus every
/// warning absorbed along the way.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The converted document
    pub document: ScholarDocument,
    /// Non-fatal problems encountered
    pub warnings: Vec<Warning>,
}

/// The document conversion pipeline.
#[derive(Debug, Clone, Default)]
pub struct ScholarPipeline {
    config: PipelineConfig,
}

impl ScholarPipeline {
    /// Create a pipeline with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Convert a parser dump, updating the dictionary in place.
    pub fn convert(
        &self,
        dump: &ParsedDocument,
        dictionary: &mut AdaptiveDictionary,
    ) -> Result<Conversion> {
        self.convert_with_cancel(dump, dictionary, &CancelToken::new())
    }

    /// Convert with a cancellation token checked at page boundaries.
    pub fn convert_with_cancel(
        &self,
        dump: &ParsedDocument,
        dictionary: &mut AdaptiveDictionary,
        cancel: &CancelToken,
    ) -> Result<Conversion> {
        if dump.pages.is_empty() {
            return Err(Error::EmptyDocument);
        }

        let mut warnings = Vec::new();

        // Stage 1: page validation. A malformed page degrades to an empty
        // one so it still gets a (BAD-rated) page span.
        let mut failed_pages = Vec::new();
        let raw_pages: Vec<RawPage> = dump
            .pages
            .iter()
            .map(|p| match p.to_raw() {
                Ok(raw) => raw,
                Err(e) => {
                    log::warn!("skipping page {}: {}", p.index, e);
                    warnings.push(Warning::on_page(WarningKind::MalformedPage, p.index, e.to_string()));
                    failed_pages.push(p.index);
                    RawPage::new(p.index, p.label.clone(), p.width, p.height)
                },
            })
            .collect();

        // Stage 2: rejoin, per page against the frozen dictionary.
        let rejoiner = LineBreakRejoiner::new(self.config.rejoin);
        let rejoin_page = |page: &RawPage| -> Result<(CleanPage, ObservationDelta)> {
            if cancel.is_canceled() {
                return Err(Error::Canceled);
            }
            let mut delta = ObservationDelta::new();
            let clean = rejoiner.rejoin_page(page, dictionary, &mut delta);
            Ok((clean, delta))
        };
        let rejoined: Vec<(CleanPage, ObservationDelta)> = if self.config.parallel {
            raw_pages.par_iter().map(rejoin_page).collect::<Result<_>>()?
        } else {
            raw_pages.iter().map(rejoin_page).collect::<Result<_>>()?
        };
        let (clean_pages, rejoin_deltas): (Vec<CleanPage>, Vec<ObservationDelta>) =
            rejoined.into_iter().unzip();

        // Stage 3: assembly with running header/footer stripping.
        let builder = DocumentBuilder::new(self.config.header_strip);
        let assembled = builder.assemble(&clean_pages);

        // Stage 4: flagging, per page against the same frozen dictionary.
        let selector = OcrErrorSelector::new();
        let flag_page = |span: &crate::document::PageSpan| -> Result<(Vec<FlaggedWord>, ObservationDelta)> {
            if cancel.is_canceled() {
                return Err(Error::Canceled);
            }
            let mut delta = ObservationDelta::new();
            let text = &assembled.text[span.start..span.end];
            let mut flags = selector.flag_page(text, span.page_index, dictionary, &mut delta);
            for flag in &mut flags {
                flag.offset += span.start;
            }
            Ok((flags, delta))
        };
        let flagged: Vec<(Vec<FlaggedWord>, ObservationDelta)> = if self.config.parallel {
            assembled.pages.par_iter().map(flag_page).collect::<Result<_>>()?
        } else {
            assembled.pages.iter().map(flag_page).collect::<Result<_>>()?
        };
        let (flags_per_page, flag_deltas): (Vec<Vec<FlaggedWord>>, Vec<ObservationDelta>) =
            flagged.into_iter().unzip();
        let flags: Vec<FlaggedWord> = flags_per_page.into_iter().flatten().collect();

        // Stage 5: serial dictionary merge, ascending page order.
        for delta in rejoin_deltas.iter().chain(flag_deltas.iter()) {
            delta.apply_to(dictionary);
        }

        // Stage 6: structure cascade.
        let outline = OutlineSource::new(dump.outline.clone());
        let (_, outline_warnings) = outline.match_candidates(&assembled);
        warnings.extend(outline_warnings);

        let sources: Vec<Box<dyn CandidateSource>> = vec![
            Box::new(outline),
            Box::new(HeadingDetectionSource::new(self.config.heading)),
            Box::new(TocSource::new()),
        ];
        let fallback_title = dump
            .metadata
            .get("title")
            .cloned()
            .unwrap_or_else(|| "Document".to_string());
        let extraction = CascadingExtractor::new(sources).extract(&assembled, &fallback_title);
        warnings.extend(extraction.warnings.clone());

        // Stage 7: quality and final assembly.
        let word_counts: Vec<(usize, usize)> = assembled
            .pages
            .iter()
            .map(|p| (p.page_index, assembled.word_count(p.page_index)))
            .collect();
        let quality = QualityReport::compute(&word_counts, &flags, &failed_pages, extraction.dropped);

        log::info!(
            "converted {} pages: {} words, {} flags, {} sections, rating {:?}",
            assembled.pages.len(),
            quality.total_words,
            quality.total_flagged,
            extraction.sections.len(),
            quality.rating
        );

        let AssembledDocument { text, pages, stripped, .. } = assembled;
        Ok(Conversion {
            document: ScholarDocument {
                text,
                pages,
                sections: extraction.sections,
                flags,
                stripped,
                metadata: dump.metadata.clone(),
                quality,
            },
            warnings,
        })
    }
}
