//! Cascading composition of heading candidate sources.
//!
//! The extractor seeds the section tree from the highest-priority source
//! that produced candidates, lets lower-priority sources fill the gaps the
//! rules allow, recomputes span ends over the merged candidate set, and
//! then runs the validators. Conflicts are dropped, never averaged.

use crate::document::builder::AssembledDocument;
use crate::error::{Warning, WarningKind};
use crate::structure::{CandidateSource, HeadingCandidate, SectionSpan, SourceTag};

/// Confidence of the whole-document fallback section.
const FALLBACK_CONFIDENCE: f32 = 0.1;

/// Output of the cascade: validated spans plus bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// Validated section spans in document order
    pub sections: Vec<SectionSpan>,
    /// Candidates dropped by merge rules or validators
    pub dropped: usize,
    /// One warning per dropped candidate
    pub warnings: Vec<Warning>,
}

/// Composes candidate sources by strict precedence.
pub struct CascadingExtractor {
    sources: Vec<Box<dyn CandidateSource>>,
}

impl std::fmt::Debug for CascadingExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tags: Vec<_> = self.sources.iter().map(|s| s.source_tag()).collect();
        f.debug_struct("CascadingExtractor").field("sources", &tags).finish()
    }
}

impl CascadingExtractor {
    /// Create an extractor over sources in priority order.
    pub fn new(sources: Vec<Box<dyn CandidateSource>>) -> Self {
        Self { sources }
    }

    /// Run the cascade over an assembled document.
    ///
    /// `fallback_title` names the single whole-document section produced
    /// when no candidate survives.
    pub fn extract(&self, doc: &AssembledDocument, fallback_title: &str) -> ExtractionResult {
        let mut result = ExtractionResult::default();

        let mut accepted: Vec<HeadingCandidate> = Vec::new();
        let mut toc_candidates: Vec<HeadingCandidate> = Vec::new();

        for source in &self.sources {
            let mut candidates = source.enumerate(doc);
            candidates.sort_by_key(|c| (c.position, c.level));

            if source.source_tag() == SourceTag::Toc {
                // Enrichment only: ToC candidates never place spans.
                toc_candidates.extend(candidates);
                continue;
            }

            if accepted.is_empty() {
                log::debug!(
                    "seeding structure from {:?} with {} candidates",
                    source.source_tag(),
                    candidates.len()
                );
                accepted = candidates;
                continue;
            }

            for candidate in candidates {
                match self.admit(&candidate, &accepted) {
                    Admission::Accept => {
                        let at = accepted
                            .binary_search_by_key(&(candidate.position, candidate.level), |c| {
                                (c.position, c.level)
                            })
                            .unwrap_or_else(|i| i);
                        accepted.insert(at, candidate);
                    },
                    Admission::Duplicate => {},
                    Admission::Orphan => {
                        result.dropped += 1;
                        result.warnings.push(Warning::new(
                            WarningKind::StructureValidation,
                            format!(
                                "candidate {:?} (level {}) has no containing parent, dropped",
                                candidate.title, candidate.level
                            ),
                        ));
                    },
                }
            }
        }

        if accepted.is_empty() {
            result.sections = vec![SectionSpan {
                start: 0,
                end: doc.text.len(),
                title: fallback_title.to_string(),
                level: 1,
                confidence: FALLBACK_CONFIDENCE,
                source: SourceTag::Heading,
            }];
            return result;
        }

        let mut sections = compute_spans(&accepted, doc.text.len());
        result.dropped += NoOverlapValidator.validate(&mut sections, &mut result.warnings);
        result.dropped += HierarchyValidator.validate(&mut sections, &mut result.warnings);
        enrich_titles(&mut sections, &toc_candidates);
        result.sections = sections;
        result
    }

    fn admit(&self, candidate: &HeadingCandidate, accepted: &[HeadingCandidate]) -> Admission {
        // The line is already a heading of equal or higher rank.
        if accepted
            .iter()
            .any(|a| a.position == candidate.position && a.level <= candidate.level)
        {
            return Admission::Duplicate;
        }

        if candidate.level > 1 {
            let has_parent = accepted.iter().any(|a| {
                a.level < candidate.level
                    && a.position <= candidate.position
                    && candidate.position < implied_end(a, accepted, usize::MAX)
            });
            if !has_parent {
                return Admission::Orphan;
            }
        }
        Admission::Accept
    }
}

enum Admission {
    Accept,
    Duplicate,
    Orphan,
}

/// End of a candidate's implied span: the next candidate of equal or
/// higher rank, or the document end.
fn implied_end(of: &HeadingCandidate, accepted: &[HeadingCandidate], doc_end: usize) -> usize {
    accepted
        .iter()
        .filter(|c| c.position > of.position && c.level <= of.level)
        .map(|c| c.position)
        .min()
        .unwrap_or(doc_end)
}

fn compute_spans(accepted: &[HeadingCandidate], doc_end: usize) -> Vec<SectionSpan> {
    accepted
        .iter()
        .map(|c| SectionSpan {
            start: c.position,
            end: implied_end(c, accepted, doc_end),
            title: c.title.clone(),
            level: c.level,
            confidence: c.confidence,
            source: c.source,
        })
        .collect()
}

/// Enforces disjointness of same-level spans; overlap drops the
/// lower-confidence span.
struct NoOverlapValidator;

impl NoOverlapValidator {
    fn validate(&self, sections: &mut Vec<SectionSpan>, warnings: &mut Vec<Warning>) -> usize {
        let mut dropped = 0;
        loop {
            let mut victim: Option<usize> = None;
            'search: for i in 0..sections.len() {
                for j in (i + 1)..sections.len() {
                    if sections[i].level == sections[j].level && sections[i].overlaps(&sections[j]) {
                        victim = Some(if sections[i].confidence <= sections[j].confidence { i } else { j });
                        break 'search;
                    }
                }
            }
            match victim {
                Some(i) => {
                    let gone = sections.remove(i);
                    warnings.push(Warning::new(
                        WarningKind::StructureValidation,
                        format!("section {:?} overlaps a same-level span, dropped", gone.title),
                    ));
                    dropped += 1;
                },
                None => return dropped,
            }
        }
    }
}

/// Enforces strict containment across levels: a level-k span must sit
/// inside exactly one level-(k-1) span whenever that level exists.
struct HierarchyValidator;

impl HierarchyValidator {
    fn validate(&self, sections: &mut Vec<SectionSpan>, warnings: &mut Vec<Warning>) -> usize {
        let mut dropped = 0;
        loop {
            let victim = sections.iter().position(|s| {
                s.level > 1 && {
                    let parents: Vec<&SectionSpan> = sections
                        .iter()
                        .filter(|p| p.level == s.level - 1)
                        .collect();
                    !parents.is_empty() && parents.iter().filter(|p| p.contains(s)).count() != 1
                }
            });
            match victim {
                Some(i) => {
                    let gone = sections.remove(i);
                    warnings.push(Warning::new(
                        WarningKind::StructureValidation,
                        format!("section {:?} violates the level hierarchy, dropped", gone.title),
                    ));
                    dropped += 1;
                },
                None => return dropped,
            }
        }
    }
}

/// Rewrite span titles from richer ToC entries. A ToC entry matches a span
/// when the folded span title is a prefix of the folded entry.
fn enrich_titles(sections: &mut [SectionSpan], toc: &[HeadingCandidate]) {
    if toc.is_empty() {
        return;
    }
    for section in sections.iter_mut() {
        let folded = fold_title(&section.title);
        if folded.is_empty() {
            continue;
        }
        let richer = toc
            .iter()
            .filter(|t| {
                let t_folded = fold_title(&t.title);
                match t_folded.strip_prefix(&folded) {
                    // A word boundary must follow, so "chapter 1" does not
                    // claim "chapter 10 …".
                    Some(rest) => rest.starts_with(|c: char| !c.is_alphanumeric()) && !rest.is_empty(),
                    None => false,
                }
            })
            .max_by_key(|t| t.title.len());
        if let Some(entry) = richer {
            log::debug!("enriching section title {:?} from ToC: {:?}", section.title, entry.title);
            section.title = entry.title.clone();
        }
    }
}

fn fold_title(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
