//! Structure extraction through the full pipeline: outline seeding,
//! visual detection filling gaps, and validator guarantees.

use scholar_oxide::config::PipelineConfig;
use scholar_oxide::dictionary::AdaptiveDictionary;
use scholar_oxide::input::{DumpPage, DumpWord, ParsedDocument};
use scholar_oxide::pipeline::ScholarPipeline;
use scholar_oxide::structure::{OutlineEntry, SourceTag};
use scholar_oxide::ScholarDocument;

fn word_at(text: &str, block: usize, line: usize, x0: f32, y0: f32, size: f32) -> DumpWord {
    DumpWord {
        text: text.to_string(),
        bbox: [x0, y0, x0 + text.len() as f32 * size * 0.6, y0 + size * 1.2],
        block: Some(block),
        line: Some(line),
        word: None,
        font_size: size,
        bold: false,
    }
}

/// A page with one optional heading line followed by body lines.
fn page(index: usize, heading: Option<(&str, f32)>, body_lines: &[&str]) -> DumpPage {
    let mut words = Vec::new();
    let mut line = 0usize;
    let mut y = 72.0f32;
    if let Some((text, size)) = heading {
        for (i, w) in text.split_whitespace().enumerate() {
            words.push(word_at(w, 0, line, 72.0 + i as f32 * 80.0, y, size));
        }
        line += 1;
        y += 60.0;
    }
    for body in body_lines {
        for (i, w) in body.split_whitespace().enumerate() {
            words.push(word_at(w, 0, line, 72.0 + i as f32 * 60.0, y, 10.0));
        }
        line += 1;
        y += 14.0;
    }
    DumpPage {
        index,
        label: format!("{}", index + 1),
        width: 612.0,
        height: 792.0,
        words,
    }
}

fn convert(dump: &ParsedDocument) -> (ScholarDocument, Vec<scholar_oxide::Warning>) {
    let config = PipelineConfig::default();
    let mut dictionary = AdaptiveDictionary::new(config.dictionary.clone());
    let conversion = ScholarPipeline::new(config).convert(dump, &mut dictionary).unwrap();
    (conversion.document, conversion.warnings)
}

const BODY: &[&str] = &[
    "the question of the meaning of being must first be raised",
    "and this question has today been forgotten although our time",
    "considers itself progressive in again affirming metaphysics",
];

#[test]
fn test_outline_seeds_detection_fills_appendix() {
    let dump = ParsedDocument {
        metadata: [("title".to_string(), "Being and Time".to_string())].into(),
        outline: vec![
            OutlineEntry { title: "Chapter 1".into(), level: 1, page: Some(1) },
            OutlineEntry { title: "1.1 Intro".into(), level: 2, page: Some(2) },
        ],
        pages: vec![
            page(0, None, BODY),
            page(1, Some(("Chapter 1", 10.0)), BODY),
            page(2, Some(("1.1 Intro", 10.0)), BODY),
            page(3, None, BODY),
            page(4, Some(("APPENDIX", 18.0)), BODY),
        ],
    };
    let (document, _) = convert(&dump);

    assert_eq!(document.sections.len(), 3, "sections: {:#?}", document.sections);

    let chapter = &document.sections[0];
    assert_eq!(chapter.title, "Chapter 1");
    assert_eq!(chapter.source, SourceTag::Outline);
    assert!((chapter.confidence - 0.95).abs() < 1e-6);

    let intro = &document.sections[1];
    assert_eq!(intro.level, 2);
    assert!((intro.confidence - 0.95).abs() < 1e-6);

    let appendix = &document.sections[2];
    assert_eq!(appendix.source, SourceTag::Heading);
    assert_eq!(appendix.level, 1);
    assert!(appendix.confidence >= 0.5 && appendix.confidence <= 0.8);

    // Same-level spans disjoint; chapter ends where the appendix begins.
    assert_eq!(chapter.end, appendix.start);
    assert!(!chapter.overlaps(appendix));
    // The subsection nests strictly inside its chapter.
    assert!(chapter.contains(intro));
}

#[test]
fn test_unmatched_bookmark_produces_no_span() {
    let dump = ParsedDocument {
        metadata: Default::default(),
        outline: vec![
            OutlineEntry { title: "Chapter 1".into(), level: 1, page: Some(0) },
            OutlineEntry { title: "A Chapter That Does Not Exist".into(), level: 1, page: None },
        ],
        pages: vec![page(0, Some(("Chapter 1", 10.0)), BODY)],
    };
    let (document, warnings) = convert(&dump);

    assert_eq!(document.sections.len(), 1);
    assert!(warnings
        .iter()
        .any(|w| w.kind == scholar_oxide::error::WarningKind::UnmatchedBookmark));
}

#[test]
fn test_detection_alone_when_no_outline() {
    let dump = ParsedDocument {
        metadata: Default::default(),
        outline: vec![],
        pages: vec![
            page(0, Some(("INTRODUCTION", 18.0)), BODY),
            page(1, None, BODY),
        ],
    };
    let (document, _) = convert(&dump);

    assert!(!document.sections.is_empty());
    assert!(document.sections.iter().all(|s| s.source == SourceTag::Heading));
    let intro = document.sections.iter().find(|s| s.title == "INTRODUCTION").unwrap();
    assert!(intro.confidence >= 0.5 && intro.confidence <= 0.8);
}

#[test]
fn test_section_invariants_hold() {
    let dump = ParsedDocument {
        metadata: Default::default(),
        outline: vec![
            OutlineEntry { title: "Part One".into(), level: 1, page: Some(0) },
            OutlineEntry { title: "Chapter 1".into(), level: 2, page: Some(1) },
            OutlineEntry { title: "Chapter 2".into(), level: 2, page: Some(3) },
            OutlineEntry { title: "Part Two".into(), level: 1, page: Some(4) },
        ],
        pages: vec![
            page(0, Some(("Part One", 14.0)), BODY),
            page(1, Some(("Chapter 1", 12.0)), BODY),
            page(2, None, BODY),
            page(3, Some(("Chapter 2", 12.0)), BODY),
            page(4, Some(("Part Two", 14.0)), BODY),
        ],
    };
    let (document, _) = convert(&dump);

    // Same-level disjointness and ordering.
    for level in 1..=4u8 {
        let spans: Vec<_> = document.sections.iter().filter(|s| s.level == level).collect();
        for pair in spans.windows(2) {
            assert!(pair[0].start <= pair[1].start, "same-level spans ordered");
            assert!(pair[0].end <= pair[1].start, "same-level spans disjoint");
        }
    }

    // Strict containment: every level-k span sits in exactly one parent.
    for section in document.sections.iter().filter(|s| s.level > 1) {
        let parents: Vec<_> = document
            .sections
            .iter()
            .filter(|p| p.level == section.level - 1 && p.contains(section))
            .collect();
        assert_eq!(parents.len(), 1, "section {:?} has {} parents", section.title, parents.len());
    }

    // Every section start is a line boundary.
    for section in &document.sections {
        assert!(
            section.start == 0 || document.text.as_bytes()[section.start - 1] == b'\n',
            "section {:?} does not start at a paragraph boundary",
            section.title
        );
    }
}
