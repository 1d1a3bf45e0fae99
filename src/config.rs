//! Unified configuration for the conversion pipeline.
//!
//! One [`PipelineConfig`] value travels through the whole pipeline; the
//! nested sections mirror the pipeline stages (dictionary learning,
//! rejoining, heading detection, header stripping, export).

use serde::{Deserialize, Serialize};

/// Morphological rule set used to accept derivations of known stems.
///
/// The exact rule set differs between corpora, so it is configurable; the
/// defaults cover the common English derivations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphologyRules {
    /// Suffixes that may be stripped to reach an accepted stem
    pub suffixes: Vec<String>,
    /// Prefixes that may be stripped to reach an accepted stem
    pub prefixes: Vec<String>,
}

impl Default for MorphologyRules {
    fn default() -> Self {
        Self {
            suffixes: ["s", "es", "ed", "ing"].iter().map(|s| s.to_string()).collect(),
            prefixes: ["un", "re", "pre", "in"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Thresholds controlling the adaptive dictionary's learning behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// Occurrences required before a learned entry is accepted
    pub learn_count_threshold: u32,
    /// Confidence required before a learned entry is accepted
    pub learn_confidence_threshold: f32,
    /// Morphological derivations accepted against the stem pool
    pub morphology: MorphologyRules,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            learn_count_threshold: 2,
            // The confidence formula 0.5 + 0.1*count yields 0.7 at count 2,
            // so the two thresholds agree by default.
            learn_confidence_threshold: 0.7,
            morphology: MorphologyRules::default(),
        }
    }
}

/// Tuning for the line-break rejoiner's positional signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RejoinConfig {
    /// How close (in page units) a hyphenated word must come to the block's
    /// right margin to count as a line wrap rather than a paragraph end
    pub margin_slack: f32,
}

impl Default for RejoinConfig {
    fn default() -> Self {
        Self { margin_slack: 12.0 }
    }
}

/// Tuning for statistical heading detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingConfig {
    /// Font sizes above `median + mad_factor * mad` are heading-sized
    pub mad_factor: f32,
    /// Blank space before and after must exceed `gap_factor` line heights
    pub gap_factor: f32,
    /// Maximum number of font-size tiers mapped to heading levels
    pub max_tiers: usize,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            mad_factor: 1.5,
            gap_factor: 1.5,
            max_tiers: 4,
        }
    }
}

/// Detection parameters for running headers and footers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeaderStripConfig {
    /// Height in page units of the top and bottom bands inspected
    pub band_height: f32,
    /// Fraction of pages a normalized line must repeat on to be stripped
    pub min_page_fraction: f32,
}

impl Default for HeaderStripConfig {
    fn default() -> Self {
        Self {
            band_height: 50.0,
            min_page_fraction: 0.3,
        }
    }
}

/// How page boundaries are rendered in Markdown output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageMarkerStyle {
    /// Emit `<!-- page: L -->` HTML comments
    #[default]
    Comment,
    /// Emit nothing at page boundaries
    None,
}

/// Markdown export options.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkdownOptions {
    /// How page boundaries are marked
    pub marker_style: PageMarkerStyle,
    /// Render flagged words inline as `word^⚠` (debugging aid)
    pub debug_flags: bool,
}

/// Top-level configuration for one conversion run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Run the per-page phases on a rayon pool
    pub parallel: bool,
    /// Dictionary learning thresholds and morphology
    pub dictionary: DictionaryConfig,
    /// Rejoiner positional tuning
    pub rejoin: RejoinConfig,
    /// Heading detection tuning
    pub heading: HeadingConfig,
    /// Running header/footer detection
    pub header_strip: HeaderStripConfig,
    /// Markdown export options
    pub markdown: MarkdownOptions,
}

impl PipelineConfig {
    /// Create a configuration with default tuning and parallelism enabled.
    pub fn new() -> Self {
        Self {
            parallel: true,
            ..Default::default()
        }
    }

    /// Enable or disable the parallel per-page phases.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Replace the morphological rule set.
    pub fn with_morphology(mut self, rules: MorphologyRules) -> Self {
        self.dictionary.morphology = rules;
        self
    }

    /// Set the Markdown page-marker style.
    pub fn with_marker_style(mut self, style: PageMarkerStyle) -> Self {
        self.markdown.marker_style = style;
        self
    }

    /// Render flagged words inline in Markdown output.
    pub fn with_debug_flags(mut self, debug: bool) -> Self {
        self.markdown.debug_flags = debug;
        self
    }
}
