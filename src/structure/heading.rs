//! Visual heading detection from font statistics.
//!
//! Works without any embedded structure: a line is a heading candidate
//! when it is a typographic outlier for its page: oversized against the
//! page's font-size distribution, isolated by whitespace, bold among
//! non-bold neighbours, or shaped like a chapter/section label. Levels
//! come from clustering the accepted headings' font sizes into tiers.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::HeadingConfig;
use crate::document::builder::{AssembledDocument, PlacedLine};
use crate::structure::{CandidateSource, HeadingCandidate, SourceTag};

lazy_static! {
    /// Chapter/section labels: "Chapter 3", "Section 2", "§ 14"
    static ref RE_CHAPTER: Regex = Regex::new(r"^(Chapter|Section|§)\s+\S").unwrap();

    /// Numbered headings: "3 Method", "2.1.4 Results"
    static ref RE_NUMBERED: Regex = Regex::new(r"^\d+(\.\d+)*\s+\S").unwrap();
}

/// Font sizes within this distance merge into one tier.
const TIER_MERGE_DISTANCE: f32 = 1.0;

/// All-caps lines longer than this are body text (e.g. shouted quotes).
const MAX_CAPS_HEADING_CHARS: usize = 60;

/// Candidate source detecting headings from layout statistics.
#[derive(Debug, Clone, Default)]
pub struct HeadingDetectionSource {
    config: HeadingConfig,
}

impl HeadingDetectionSource {
    /// Create a detector with the given tuning.
    pub fn new(config: HeadingConfig) -> Self {
        Self { config }
    }

    fn detect(&self, doc: &AssembledDocument) -> Vec<HeadingCandidate> {
        let mut scored: Vec<(usize, u32, f32)> = Vec::new(); // (line idx, signals, size)

        let mut page_start = 0usize;
        while page_start < doc.lines.len() {
            let page = doc.lines[page_start].page;
            let page_end = doc.lines[page_start..]
                .iter()
                .position(|l| l.page != page)
                .map_or(doc.lines.len(), |off| page_start + off);
            let lines = &doc.lines[page_start..page_end];

            let (median, mad) = font_size_distribution(lines);
            for (i, line) in lines.iter().enumerate() {
                let signals = self.signals(line, i, lines, median, mad, doc);
                if signals > 0 {
                    scored.push((page_start + i, signals, line.mean_font_size));
                }
            }
            page_start = page_end;
        }

        let tiers = cluster_tiers(
            scored.iter().map(|&(_, _, size)| size),
            self.config.max_tiers,
        );

        scored
            .into_iter()
            .map(|(idx, signals, size)| {
                let line = &doc.lines[idx];
                let confidence = (0.5 + 0.1 * (signals.saturating_sub(1)) as f32).clamp(0.5, 0.8);
                let level = tier_of(size, &tiers) as u8 + 1;
                HeadingCandidate {
                    title: doc.text[line.start..line.end].to_string(),
                    level,
                    position: line.start,
                    source: SourceTag::Heading,
                    confidence,
                }
            })
            .collect()
    }

    fn signals(
        &self,
        line: &PlacedLine,
        index: usize,
        page_lines: &[PlacedLine],
        median: f32,
        mad: f32,
        doc: &AssembledDocument,
    ) -> u32 {
        let mut signals = 0;

        if line.mean_font_size > median + self.config.mad_factor * mad {
            signals += 1;
        }

        let prev = index.checked_sub(1).map(|i| &page_lines[i]);
        let next = page_lines.get(index + 1);
        if line.all_bold
            && !prev.is_some_and(|l| l.all_bold)
            && !next.is_some_and(|l| l.all_bold)
        {
            signals += 1;
        }

        let height = line.bbox.height().max(1.0);
        let gap_before = prev.map_or(f32::MAX, |p| line.bbox.y0 - p.bbox.y1);
        let gap_after = next.map_or(f32::MAX, |n| n.bbox.y0 - line.bbox.y1);
        if gap_before >= self.config.gap_factor * height && gap_after >= self.config.gap_factor * height {
            signals += 1;
        }

        let text = &doc.text[line.start..line.end];
        if RE_CHAPTER.is_match(text) || RE_NUMBERED.is_match(text) || is_all_caps_heading(text) {
            signals += 1;
        }

        signals
    }
}

impl CandidateSource for HeadingDetectionSource {
    fn source_tag(&self) -> SourceTag {
        SourceTag::Heading
    }

    fn base_confidence(&self) -> f32 {
        0.5
    }

    fn enumerate(&self, doc: &AssembledDocument) -> Vec<HeadingCandidate> {
        self.detect(doc)
    }
}

/// Median and median absolute deviation of the page's font sizes, weighted
/// by word count so a single oversized title cannot shift the body median.
fn font_size_distribution(lines: &[PlacedLine]) -> (f32, f32) {
    let mut sizes: Vec<f32> = Vec::new();
    for line in lines {
        for _ in 0..line.word_count.max(1) {
            sizes.push(line.mean_font_size);
        }
    }
    if sizes.is_empty() {
        return (0.0, 0.0);
    }
    let median = median_of(&mut sizes);
    let mut deviations: Vec<f32> = sizes.iter().map(|s| (s - median).abs()).collect();
    let mad = median_of(&mut deviations);
    (median, mad)
}

fn median_of(values: &mut [f32]) -> f32 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Cluster heading font sizes into at most `max_tiers` descending tiers.
/// Sizes within [`TIER_MERGE_DISTANCE`] of a tier representative merge
/// into it; everything below the last tier joins it.
fn cluster_tiers<I: Iterator<Item = f32>>(sizes: I, max_tiers: usize) -> Vec<f32> {
    let mut unique: Vec<f32> = sizes.collect();
    unique.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    unique.dedup_by(|a, b| (*a - *b).abs() < TIER_MERGE_DISTANCE);
    unique.truncate(max_tiers);
    unique
}

fn tier_of(size: f32, tiers: &[f32]) -> usize {
    tiers
        .iter()
        .position(|&t| (t - size).abs() < TIER_MERGE_DISTANCE || size > t)
        .unwrap_or(tiers.len().saturating_sub(1))
}

fn is_all_caps_heading(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.chars().count() <= MAX_CAPS_HEADING_CHARS
        && trimmed.split_whitespace().count() <= 8
        && trimmed.chars().any(|c| c.is_alphabetic())
        && !trimmed.chars().any(|c| c.is_lowercase())
}
