//! Line-break rejoining: undo hyphenation introduced by line wrapping.
//!
//! PDFs of scholarly books wrap words across lines:
//! "func-" (line 7) + "tion." (line 8) should read "function." in the
//! clean text, while "meta-" at the end of a body block must never fuse
//! with a margin marker from another block. The parser's block indices are
//! the guard: joins happen only between consecutive lines of the same
//! block.
//!
//! Decision order: the dictionary dominates the positional signal. An
//! unknown joined form can still be accepted on position alone when the
//! hyphenated word reaches the block's right margin and the joined form
//! passes the word-shape filter.

use serde::{Deserialize, Serialize};

use crate::config::RejoinConfig;
use crate::dictionary::{AdaptiveDictionary, ObservationDelta};
use crate::geometry::Rect;
use crate::page::{RawPage, RawWord};
use crate::text::{is_numeric_token, normalize_word, plausible_word_shape};

/// Soft hyphen, treated exactly like an ASCII hyphen at line end.
const SOFT_HYPHEN: char = '\u{00AD}';

/// Minimum length of the hyphen-stripped stem before a join is considered.
const MIN_STEM_LEN: usize = 3;

/// Join or keep the line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinDecision {
    /// The hyphenated word was stitched back together
    Join,
    /// The line break was kept as whitespace
    Reject,
}

/// Why a join candidate was decided the way it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinReason {
    /// The joined form is accepted by the dictionary
    AcceptedWord,
    /// The stem alone is unknown but the joined form is accepted
    CompletesStem,
    /// Unknown joined form, but the wrap is positionally unambiguous and
    /// the joined form passes the word-shape filter
    UnambiguousWrap,
    /// The two ends live in different blocks; never joined
    CrossBlock,
    /// The stem is a word on its own and the joined form is not
    StemIsWord,
    /// The continuation is a numeric token
    NumericToken,
    /// No dictionary support and no positional evidence of a wrap
    ParagraphEnd,
}

/// An audit record for one hyphen-at-line-end candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRecord {
    /// Hyphen-ended word on the earlier line
    pub previous: String,
    /// First word of the later line
    pub next: String,
    /// Block index of the earlier word
    pub block: usize,
    /// The decision taken
    pub decision: JoinDecision,
    /// Why
    pub reason: JoinReason,
}

/// A word in a clean line, with provenance back to the raw page.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanWord {
    /// The emitted text (joined text for stitched words)
    pub text: String,
    /// Byte offset of this word within its line's text
    pub start: usize,
    /// Byte offset one past the word within its line's text
    pub end: usize,
    /// Index of the originating word in the page's reading order
    pub word_index: usize,
}

/// One line of rejoined text with its geometry and font statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanLine {
    /// Space-joined word texts
    pub text: String,
    /// Per-word provenance, in order
    pub words: Vec<CleanWord>,
    /// Block the line belongs to
    pub block: usize,
    /// Line index within the block
    pub line: usize,
    /// Union of the word bounding boxes
    pub bbox: Rect,
    /// Mean font size over the line's words
    pub mean_font_size: f32,
    /// Whether every word on the line is bold
    pub all_bold: bool,
}

/// A page after line-break rejoining.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanPage {
    /// Zero-based page index
    pub page_index: usize,
    /// Printed page label
    pub label: String,
    /// Page width in page units
    pub width: f32,
    /// Page height in page units
    pub height: f32,
    /// Rejoined lines in reading order
    pub lines: Vec<CleanLine>,
    /// Every hyphen-at-line-end candidate and its decision
    pub joins: Vec<JoinRecord>,
}

impl CleanPage {
    /// The page's clean text: lines joined by newlines, no trailing one.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Detects hyphenated line wraps within a block and stitches them.
#[derive(Debug, Clone, Default)]
pub struct LineBreakRejoiner {
    config: RejoinConfig,
}

// Internal view of one raw line during rejoining.
struct LineGroup<'a> {
    block: usize,
    line: usize,
    words: Vec<(usize, &'a RawWord)>, // (reading-order index, word)
    top: f32,
}

impl LineBreakRejoiner {
    /// Create a rejoiner with the given positional tuning.
    pub fn new(config: RejoinConfig) -> Self {
        Self { config }
    }

    /// Rejoin one page. Accepted joins record `observe(joined)` into the
    /// page's observation delta; the dictionary itself is only read.
    pub fn rejoin_page(
        &self,
        page: &RawPage,
        dictionary: &AdaptiveDictionary,
        delta: &mut ObservationDelta,
    ) -> CleanPage {
        let groups = group_lines(page);
        let mut lines: Vec<CleanLine> = Vec::with_capacity(groups.len());
        let mut joins = Vec::new();

        for group in &groups {
            // A candidate forms whenever the previous emitted line ends in a
            // hyphenated word, regardless of block: cross-block candidates
            // are recorded and always rejected.
            if let (Some(prev), Some(&(_, first))) = (lines.last(), group.words.first()) {
                if let Some(stem) = hyphen_stem(prev.words.last().map(|w| w.text.as_str()).unwrap_or("")) {
                    let record = self.decide(&stem, prev, first, group.block, page, dictionary);
                    let decision = record.decision;
                    joins.push(record);
                    if decision == JoinDecision::Join {
                        let joined = format!("{}{}", stem, first.text);
                        delta.record(&joined);
                        // The wrapped line continues the previous one: the
                        // joined word replaces the stem and the remainder
                        // flows on with the newline suppressed.
                        let prev_line = lines.last_mut().expect("previous line exists");
                        replace_last_word(prev_line, joined);
                        append_words(prev_line, &group.words[1..]);
                        continue;
                    }
                }
            }

            if let Some(line) = build_line(group) {
                lines.push(line);
            }
        }

        CleanPage {
            page_index: page.index,
            label: page.label.clone(),
            width: page.width,
            height: page.height,
            lines,
            joins,
        }
    }

    fn decide(
        &self,
        stem: &str,
        prev_line: &CleanLine,
        next: &RawWord,
        next_block: usize,
        page: &RawPage,
        dictionary: &AdaptiveDictionary,
    ) -> JoinRecord {
        let previous = prev_line
            .words
            .last()
            .map(|w| w.text.clone())
            .unwrap_or_default();
        let record = |decision, reason| JoinRecord {
            previous: previous.clone(),
            next: next.text.clone(),
            block: prev_line.block,
            decision,
            reason,
        };

        if prev_line.block != next_block {
            return record(JoinDecision::Reject, JoinReason::CrossBlock);
        }

        let continuation = normalize_word(&next.text);
        if continuation.is_empty() || is_numeric_token(&continuation) {
            return record(JoinDecision::Reject, JoinReason::NumericToken);
        }

        let joined = format!("{}{}", stem, continuation);
        let stem_known = dictionary.contains(stem);
        let joined_known = dictionary.contains(&joined);

        // Dictionary verdict first; position only breaks ties the
        // dictionary cannot call.
        if joined_known {
            let reason = if stem_known {
                JoinReason::AcceptedWord
            } else {
                JoinReason::CompletesStem
            };
            return record(JoinDecision::Join, reason);
        }
        if stem_known {
            return record(JoinDecision::Reject, JoinReason::StemIsWord);
        }
        if self.reaches_right_margin(prev_line, page) && plausible_word_shape(&joined) {
            return record(JoinDecision::Join, JoinReason::UnambiguousWrap);
        }
        record(JoinDecision::Reject, JoinReason::ParagraphEnd)
    }

    /// A hyphen at a line end reads as a wrap (not a paragraph end) when
    /// the word runs up to the block's right margin.
    fn reaches_right_margin(&self, line: &CleanLine, page: &RawPage) -> bool {
        match page.block_right_margin(line.block) {
            Some(margin) => line.bbox.x1 >= margin - self.config.margin_slack,
            None => false,
        }
    }
}

/// The hyphen-stripped stem of a word, when the word qualifies as a join
/// candidate: ends in `-` or a soft hyphen after an alphabetic character,
/// with a stem of at least three characters. Em-dashes and numeric tokens
/// never qualify.
fn hyphen_stem(word: &str) -> Option<String> {
    let trimmed = word.trim_end();
    let stem = trimmed
        .strip_suffix(SOFT_HYPHEN)
        .or_else(|| trimmed.strip_suffix('-'))?;
    let last = stem.chars().last()?;
    if !last.is_alphabetic() {
        return None;
    }
    if stem.chars().count() < MIN_STEM_LEN || is_numeric_token(stem) {
        return None;
    }
    Some(stem.to_string())
}

fn group_lines(page: &RawPage) -> Vec<LineGroup<'_>> {
    let ordered = page.words_in_reading_order();
    let mut groups: Vec<LineGroup<'_>> = Vec::new();
    for (idx, word) in ordered.into_iter().enumerate() {
        match groups.last_mut() {
            Some(g) if g.block == word.block && g.line == word.line => {
                g.top = g.top.min(word.bbox.y0);
                g.words.push((idx, word));
            },
            _ => groups.push(LineGroup {
                block: word.block,
                line: word.line,
                words: vec![(idx, word)],
                top: word.bbox.y0,
            }),
        }
    }
    // Lines within a block emit top-to-bottom even when the parser's line
    // numbering disagrees with the geometry.
    groups.sort_by(|a, b| {
        a.block
            .cmp(&b.block)
            .then(a.top.partial_cmp(&b.top).unwrap_or(std::cmp::Ordering::Equal))
            .then(a.line.cmp(&b.line))
    });
    groups
}

fn build_line(group: &LineGroup<'_>) -> Option<CleanLine> {
    let words = &group.words[..];
    if words.is_empty() {
        return None;
    }

    let mut text = String::new();
    let mut clean_words = Vec::with_capacity(words.len());
    let mut bbox = words[0].1.bbox;
    let mut font_sum = 0.0f32;
    let mut all_bold = true;

    for (i, (idx, word)) in words.iter().enumerate() {
        if i > 0 {
            text.push(' ');
        }
        let start = text.len();
        text.push_str(&word.text);
        clean_words.push(CleanWord {
            text: word.text.clone(),
            start,
            end: text.len(),
            word_index: *idx,
        });
        bbox = bbox.union(&word.bbox);
        font_sum += word.font_size;
        all_bold &= word.bold;
    }

    Some(CleanLine {
        text,
        words: clean_words,
        block: group.block,
        line: group.line,
        bbox,
        mean_font_size: font_sum / words.len() as f32,
        all_bold,
    })
}

fn replace_last_word(line: &mut CleanLine, joined: String) {
    let last = line.words.last_mut().expect("line has words");
    line.text.truncate(last.start);
    line.text.push_str(&joined);
    last.text = joined;
    last.end = line.text.len();
}

/// Flow the remainder of a consumed wrapped line onto `line`.
fn append_words(line: &mut CleanLine, rest: &[(usize, &RawWord)]) {
    if rest.is_empty() {
        return;
    }
    let old_count = line.words.len() as f32;
    let mut font_sum = line.mean_font_size * old_count;
    for (idx, word) in rest {
        line.text.push(' ');
        let start = line.text.len();
        line.text.push_str(&word.text);
        line.words.push(CleanWord {
            text: word.text.clone(),
            start,
            end: line.text.len(),
            word_index: *idx,
        });
        line.bbox = line.bbox.union(&word.bbox);
        font_sum += word.font_size;
        line.all_bold &= word.bold;
    }
    line.mean_font_size = font_sum / line.words.len() as f32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DictionaryConfig;

    fn word(text: &str, block: usize, line: usize, idx: usize, x0: f32) -> RawWord {
        RawWord {
            text: text.to_string(),
            bbox: Rect::new(x0, line as f32 * 14.0, x0 + text.len() as f32 * 6.0, line as f32 * 14.0 + 12.0),
            block,
            line,
            word: idx,
            page: 0,
            font_size: 10.0,
            bold: false,
        }
    }

    fn dict(words: &[&str]) -> AdaptiveDictionary {
        AdaptiveDictionary::from_base_words(words.iter().copied(), DictionaryConfig::default())
    }

    fn rejoin(page: &RawPage, d: &AdaptiveDictionary) -> (CleanPage, ObservationDelta) {
        let mut delta = ObservationDelta::new();
        let clean = LineBreakRejoiner::default().rejoin_page(page, d, &mut delta);
        (clean, delta)
    }

    #[test]
    fn test_hyphen_stem() {
        assert_eq!(hyphen_stem("func-"), Some("func".to_string()));
        assert_eq!(hyphen_stem("Govern\u{00AD}"), Some("Govern".to_string()));
        assert_eq!(hyphen_stem("word"), None);
        assert_eq!(hyphen_stem("ab-"), None, "stem too short");
        assert_eq!(hyphen_stem("123-"), None, "numeric stem");
        assert_eq!(hyphen_stem("word—"), None, "em-dash is not a wrap");
    }

    #[test]
    fn test_same_block_join() {
        let mut page = RawPage::new(0, "12", 612.0, 792.0);
        page.words = vec![word("func-", 2, 7, 0, 400.0), word("tion.", 2, 8, 0, 72.0)];
        let d = dict(&["function"]);
        let (clean, delta) = rejoin(&page, &d);

        assert_eq!(clean.text(), "function.");
        assert_eq!(clean.joins.len(), 1);
        assert_eq!(clean.joins[0].decision, JoinDecision::Join);
        assert_eq!(clean.joins[0].reason, JoinReason::CompletesStem);
        assert!(!delta.is_empty(), "accepted join must observe the word");
    }

    #[test]
    fn test_cross_block_always_rejected() {
        // A margin marker "a x" in block 4 must never fuse with body text.
        let mut page = RawPage::new(0, "12", 612.0, 792.0);
        page.words = vec![
            word("meta-", 2, 5, 0, 540.0),
            word("a", 4, 1, 0, 20.0),
            word("x", 4, 1, 1, 30.0),
        ];
        let d = dict(&["meta", "metaphysics"]);
        let (clean, _) = rejoin(&page, &d);

        assert_eq!(clean.text(), "meta-\na x");
        assert_eq!(clean.joins.len(), 1);
        assert_eq!(clean.joins[0].decision, JoinDecision::Reject);
        assert_eq!(clean.joins[0].reason, JoinReason::CrossBlock);
    }

    #[test]
    fn test_dictionary_wins_over_position() {
        // "over-" reaches the margin, but "overthe" is nonsense while
        // "over" is a word: the dictionary verdict dominates.
        let mut page = RawPage::new(0, "3", 612.0, 792.0);
        page.words = vec![word("over-", 0, 0, 0, 560.0), word("the", 0, 1, 0, 72.0)];
        let d = dict(&["over", "the"]);
        let (clean, _) = rejoin(&page, &d);

        assert_eq!(clean.joins[0].decision, JoinDecision::Reject);
        assert_eq!(clean.joins[0].reason, JoinReason::StemIsWord);
        assert_eq!(clean.text(), "over-\nthe");
    }

    #[test]
    fn test_positional_join_for_unknown_word() {
        // Domain vocabulary unknown to the dictionary still joins when the
        // stem reaches the right margin and the joined shape is plausible.
        let mut page = RawPage::new(0, "3", 612.0, 792.0);
        page.words = vec![
            word("body", 0, 0, 0, 72.0),
            word("herme-", 0, 0, 1, 560.0),
            word("neutics", 0, 1, 0, 72.0),
        ];
        let d = dict(&["body"]);
        let (clean, _) = rejoin(&page, &d);

        assert_eq!(clean.joins[0].decision, JoinDecision::Join);
        assert_eq!(clean.joins[0].reason, JoinReason::UnambiguousWrap);
        assert_eq!(clean.text(), "body hermeneutics");
    }

    #[test]
    fn test_paragraph_end_not_joined() {
        // Hyphenated word well short of the margin, unknown joined form.
        let mut page = RawPage::new(0, "3", 612.0, 792.0);
        page.words = vec![
            word("qzx-", 0, 0, 0, 100.0),
            word("wide", 0, 0, 1, 560.0), // the margin is set by this word
            word("ab", 0, 1, 0, 72.0),
        ];
        let d = dict(&[]);
        let (clean, _) = rejoin(&page, &d);
        assert!(clean.joins.is_empty() || clean.joins[0].decision == JoinDecision::Reject);
    }

    #[test]
    fn test_numeric_continuation_rejected() {
        let mut page = RawPage::new(0, "3", 612.0, 792.0);
        page.words = vec![word("page-", 0, 0, 0, 560.0), word("12", 0, 1, 0, 72.0)];
        let d = dict(&["page"]);
        let (clean, _) = rejoin(&page, &d);

        assert_eq!(clean.joins[0].decision, JoinDecision::Reject);
        assert_eq!(clean.joins[0].reason, JoinReason::NumericToken);
    }

    #[test]
    fn test_soft_hyphen_joins() {
        let mut page = RawPage::new(0, "3", 612.0, 792.0);
        page.words = vec![word("Govern\u{00AD}", 0, 0, 0, 540.0), word("ment", 0, 1, 0, 72.0)];
        let d = dict(&["government"]);
        let (clean, _) = rejoin(&page, &d);
        assert_eq!(clean.text(), "Government");
    }

    #[test]
    fn test_no_hyphens_is_noop() {
        let mut page = RawPage::new(0, "3", 612.0, 792.0);
        page.words = vec![
            word("plain", 0, 0, 0, 72.0),
            word("text", 0, 0, 1, 120.0),
            word("here", 0, 1, 0, 72.0),
        ];
        let d = dict(&["plain", "text", "here"]);
        let (clean, delta) = rejoin(&page, &d);

        assert_eq!(clean.text(), "plain text\nhere");
        assert!(clean.joins.is_empty());
        assert!(delta.is_empty());
    }

    #[test]
    fn test_single_word_line_consumed_entirely() {
        let mut page = RawPage::new(0, "3", 612.0, 792.0);
        page.words = vec![
            word("func-", 0, 0, 0, 560.0),
            word("tion", 0, 1, 0, 72.0),
            word("next", 0, 2, 0, 72.0),
        ];
        let d = dict(&["function", "next"]);
        let (clean, _) = rejoin(&page, &d);
        // Line 1 had a single word which was consumed; no empty line left.
        assert_eq!(clean.text(), "function\nnext");
        assert_eq!(clean.lines.len(), 2);
    }

    #[test]
    fn test_word_provenance_offsets() {
        let mut page = RawPage::new(0, "3", 612.0, 792.0);
        page.words = vec![word("alpha", 0, 0, 0, 72.0), word("beta", 0, 0, 1, 130.0)];
        let d = dict(&[]);
        let (clean, _) = rejoin(&page, &d);
        let line = &clean.lines[0];
        assert_eq!(&line.text[line.words[0].start..line.words[0].end], "alpha");
        assert_eq!(&line.text[line.words[1].start..line.words[1].end], "beta");
        assert_eq!(line.words[1].word_index, 1);
    }
}
