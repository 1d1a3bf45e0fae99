//! Per-page and document-level OCR quality scoring.
//!
//! The score is the flagged/word ratio. Thresholds: below 2% is GOOD,
//! below 10% is MARGINAL, anything above is BAD. A document is RAG-ready
//! only when the aggregate rating is GOOD.

use serde::{Deserialize, Serialize};

use crate::text::flagger::FlaggedWord;

/// GOOD/MARGINAL/BAD rating thresholds on the flagged/word ratio.
const GOOD_THRESHOLD: f64 = 0.02;
const MARGINAL_THRESHOLD: f64 = 0.10;

/// Quality rating on the shared page/document scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityRating {
    /// Flagged ratio below 2%
    Good,
    /// Flagged ratio below 10%
    Marginal,
    /// Flagged ratio at or above 10%, or a failed page
    Bad,
}

impl QualityRating {
    fn from_ratio(ratio: f64) -> Self {
        if ratio < GOOD_THRESHOLD {
            QualityRating::Good
        } else if ratio < MARGINAL_THRESHOLD {
            QualityRating::Marginal
        } else {
            QualityRating::Bad
        }
    }
}

/// Quality summary for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageQuality {
    /// Zero-based page index
    pub page_index: usize,
    /// Words on the page after cleanup
    pub words: usize,
    /// Words flagged for re-OCR
    pub flagged: usize,
    /// flagged / words (0 for an empty page)
    pub ratio: f64,
    /// Rating on the shared scale
    pub rating: QualityRating,
}

/// Document-level quality aggregate plus the per-page breakdown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityReport {
    /// Per-page summaries in page order
    pub pages: Vec<PageQuality>,
    /// Total words across pages
    pub total_words: usize,
    /// Total flagged words
    pub total_flagged: usize,
    /// Aggregate flagged/word ratio
    pub ratio: f64,
    /// Aggregate rating
    pub rating: Option<QualityRating>,
    /// Structure candidates dropped by overlap/hierarchy validation
    pub dropped_candidates: usize,
}

impl QualityReport {
    /// Build a report from per-page word counts and the flag list.
    ///
    /// `failed_pages` lists pages skipped as malformed; they rate BAD
    /// regardless of their (empty) content.
    pub fn compute(
        word_counts: &[(usize, usize)],
        flags: &[FlaggedWord],
        failed_pages: &[usize],
        dropped_candidates: usize,
    ) -> Self {
        let mut pages = Vec::with_capacity(word_counts.len());
        let mut total_words = 0usize;
        let mut total_flagged = 0usize;

        for &(page_index, words) in word_counts {
            let flagged = flags.iter().filter(|f| f.page == page_index).count();
            let ratio = if words == 0 { 0.0 } else { flagged as f64 / words as f64 };
            let rating = if failed_pages.contains(&page_index) {
                QualityRating::Bad
            } else {
                QualityRating::from_ratio(ratio)
            };
            total_words += words;
            total_flagged += flagged;
            pages.push(PageQuality {
                page_index,
                words,
                flagged,
                ratio,
                rating,
            });
        }

        let ratio = if total_words == 0 {
            0.0
        } else {
            total_flagged as f64 / total_words as f64
        };
        Self {
            pages,
            total_words,
            total_flagged,
            ratio,
            rating: Some(QualityRating::from_ratio(ratio)),
            dropped_candidates,
        }
    }

    /// Whether the document is clean enough for retrieval use.
    pub fn is_rag_ready(&self) -> bool {
        self.rating == Some(QualityRating::Good)
    }
}
