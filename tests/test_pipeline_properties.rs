//! Property tests for the universal pipeline invariants: page spans tile
//! the clean text, flags stay in bounds and point at their own words, and
//! serial and parallel runs agree byte for byte.

use proptest::prelude::*;
use scholar_oxide::config::PipelineConfig;
use scholar_oxide::dictionary::AdaptiveDictionary;
use scholar_oxide::input::{DumpPage, DumpWord, ParsedDocument};
use scholar_oxide::pipeline::ScholarPipeline;
use scholar_oxide::ScholarDocument;

/// A pool mixing dictionary words, OCR garbage, numerals, and hyphen
/// stems so generated pages exercise the rejoiner and the flagger.
const WORD_POOL: &[&str] = &[
    "the", "question", "of", "being", "must", "first", "raised", "again",
    "qzv", "tbese", "wrrrd", "1927", "a", "func-", "tion", "govern-", "ment",
];

fn word_strategy() -> impl Strategy<Value = String> {
    (0..WORD_POOL.len()).prop_map(|i| WORD_POOL[i].to_string())
}

fn pages_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(word_strategy(), 0..12), 1..4)
}

fn build_dump(pages: &[Vec<String>]) -> ParsedDocument {
    ParsedDocument {
        metadata: Default::default(),
        outline: vec![],
        pages: pages
            .iter()
            .enumerate()
            .map(|(index, words)| DumpPage {
                index,
                label: format!("{}", index + 1),
                width: 612.0,
                height: 792.0,
                words: words
                    .iter()
                    .enumerate()
                    .map(|(i, text)| {
                        let line = i / 4;
                        let col = i % 4;
                        let x0 = 72.0 + col as f32 * 90.0;
                        let y0 = 72.0 + line as f32 * 14.0;
                        DumpWord {
                            text: text.clone(),
                            bbox: [x0, y0, x0 + text.len() as f32 * 6.0, y0 + 12.0],
                            block: Some(0),
                            line: Some(line),
                            word: None,
                            font_size: 10.0,
                            bold: false,
                        }
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn convert(dump: &ParsedDocument, parallel: bool) -> ScholarDocument {
    let config = PipelineConfig::default().with_parallel(parallel);
    let mut dictionary = AdaptiveDictionary::new(config.dictionary.clone());
    ScholarPipeline::new(config).convert(dump, &mut dictionary).unwrap().document
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_page_spans_tile_clean_text(pages in pages_strategy()) {
        let document = convert(&build_dump(&pages), false);

        prop_assert_eq!(document.pages.len(), pages.len());
        prop_assert_eq!(document.pages[0].start, 0);
        for pair in document.pages.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
        prop_assert_eq!(document.pages.last().unwrap().end, document.text.len());
    }

    #[test]
    fn prop_flags_point_at_their_words(pages in pages_strategy()) {
        let document = convert(&build_dump(&pages), false);

        for flag in &document.flags {
            let end = flag.offset + flag.text.len();
            prop_assert!(end <= document.text.len());
            prop_assert_eq!(&document.text[flag.offset..end], flag.text.as_str());
        }
    }

    #[test]
    fn prop_sections_cover_within_bounds(pages in pages_strategy()) {
        let document = convert(&build_dump(&pages), false);

        for section in &document.sections {
            prop_assert!(section.start <= section.end);
            prop_assert!(section.end <= document.text.len());
        }
        // Same-level spans are disjoint and ordered.
        let mut levels: Vec<u8> = document.sections.iter().map(|s| s.level).collect();
        levels.dedup();
        for level in levels {
            let spans: Vec<_> = document.sections.iter().filter(|s| s.level == level).collect();
            for pair in spans.windows(2) {
                prop_assert!(pair[0].end <= pair[1].start);
            }
        }
    }

    #[test]
    fn prop_serial_and_parallel_agree(pages in pages_strategy()) {
        let dump = build_dump(&pages);
        let serial = convert(&dump, false);
        let parallel = convert(&dump, true);

        prop_assert_eq!(serial.text, parallel.text);
        prop_assert_eq!(serial.flags, parallel.flags);
        prop_assert_eq!(serial.sections, parallel.sections);
        prop_assert_eq!(serial.pages, parallel.pages);
    }
}
