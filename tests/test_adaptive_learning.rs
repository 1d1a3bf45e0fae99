//! In-document learning and cross-document dictionary persistence.

use scholar_oxide::config::PipelineConfig;
use scholar_oxide::dictionary::AdaptiveDictionary;
use scholar_oxide::input::{DumpPage, DumpWord, ParsedDocument};
use scholar_oxide::pipeline::ScholarPipeline;

fn line_words(text: &str, line: usize, y0: f32) -> Vec<DumpWord> {
    text.split_whitespace()
        .enumerate()
        .map(|(i, w)| DumpWord {
            text: w.to_string(),
            bbox: [72.0 + i as f32 * 70.0, y0, 72.0 + i as f32 * 70.0 + 60.0, y0 + 12.0],
            block: Some(0),
            line: Some(line),
            word: None,
            font_size: 10.0,
            bold: false,
        })
        .collect()
}

fn dump_with_lines(lines: &[&str]) -> ParsedDocument {
    let words = lines
        .iter()
        .enumerate()
        .flat_map(|(i, text)| line_words(text, i, 72.0 + i as f32 * 14.0))
        .collect();
    ParsedDocument {
        metadata: Default::default(),
        outline: vec![],
        pages: vec![DumpPage {
            index: 0,
            label: "1".into(),
            width: 612.0,
            height: 792.0,
            words,
        }],
    }
}

#[test]
fn test_recurring_domain_word_is_learned() {
    // "dasein" is not base vocabulary, but it recurs; the learned store
    // promotes it, and a second pass over the same document stops
    // flagging it.
    let dump = dump_with_lines(&[
        "the term dasein names the being of the human being",
        "dasein is in each case mine and the analysis of dasein",
        "must reckon with this circumstance",
    ]);
    let config = PipelineConfig::default();
    let mut dictionary = AdaptiveDictionary::new(config.dictionary.clone());
    let pipeline = ScholarPipeline::new(config);

    let first = pipeline.convert(&dump, &mut dictionary).unwrap();
    let first_dasein_flags = first.document.flags.iter().filter(|f| f.text == "dasein").count();
    assert!(first_dasein_flags > 0, "unknown on the first pass");
    assert!(dictionary.contains("dasein"), "three observations promote the word");

    let second = pipeline.convert(&dump, &mut dictionary).unwrap();
    let second_dasein_flags = second.document.flags.iter().filter(|f| f.text == "dasein").count();
    assert_eq!(second_dasein_flags, 0, "learned vocabulary is no longer flagged");
}

#[test]
fn test_learned_store_roundtrips_through_file() {
    let dump = dump_with_lines(&[
        "ontic and ontic again",
        "the word ontic recurs in this text",
    ]);
    let config = PipelineConfig::default();
    let mut dictionary = AdaptiveDictionary::new(config.dictionary.clone());
    ScholarPipeline::new(config.clone()).convert(&dump, &mut dictionary).unwrap();
    assert!(dictionary.contains("ontic"));

    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("learned.dict");
    dictionary.save(&path).unwrap();

    let mut restored = AdaptiveDictionary::new(config.dictionary.clone());
    assert!(!restored.contains("ontic"));
    let warnings = restored.load_learned(&path).unwrap();
    assert!(warnings.is_empty());
    assert!(restored.contains("ontic"));
}

#[test]
fn test_flagged_garbage_is_never_learned() {
    let dump = dump_with_lines(&[
        "qzv qzv qzv qzv",
        "qzv and more qzv",
    ]);
    let config = PipelineConfig::default();
    let mut dictionary = AdaptiveDictionary::new(config.dictionary.clone());
    ScholarPipeline::new(config).convert(&dump, &mut dictionary).unwrap();

    // Vowelless tokens fail promotion no matter how often they recur.
    assert!(!dictionary.contains("qzv"));
}
