//! Morphological derivation against an accepted stem pool.
//!
//! A word like "readings" is accepted when "reading" or "read" is, without
//! either form having to appear in the lexicon itself. The rule set is
//! deliberately small and configurable; it is a recall aid, not a stemmer.

use crate::config::MorphologyRules;

/// Minimum stem length left after stripping an affix.
const MIN_STEM_LEN: usize = 2;

/// Candidate stems reachable from `word` by stripping one suffix, one
/// prefix, or one of each, under the given rules.
///
/// Suffix stripping also proposes the `+e` restoration variant so that
/// "hoped" reaches "hope" as well as "hop".
pub fn candidate_stems(word: &str, rules: &MorphologyRules) -> Vec<String> {
    let mut stems = Vec::new();
    push_suffix_stems(word, rules, &mut stems);

    for prefix in &rules.prefixes {
        if let Some(rest) = word.strip_prefix(prefix.as_str()) {
            if rest.chars().count() >= MIN_STEM_LEN {
                stems.push(rest.to_string());
                push_suffix_stems(rest, rules, &mut stems);
            }
        }
    }

    stems.sort_unstable();
    stems.dedup();
    stems
}

fn push_suffix_stems(word: &str, rules: &MorphologyRules, stems: &mut Vec<String>) {
    for suffix in &rules.suffixes {
        if let Some(stem) = word.strip_suffix(suffix.as_str()) {
            if stem.chars().count() >= MIN_STEM_LEN {
                stems.push(stem.to_string());
                if !stem.ends_with('e') {
                    stems.push(format!("{}e", stem));
                }
            }
        }
    }
}

/// Whether any derivation of `word` reaches a stem accepted by `accepts`.
pub fn derives_from_accepted<F>(word: &str, rules: &MorphologyRules, accepts: F) -> bool
where
    F: Fn(&str) -> bool,
{
    candidate_stems(word, rules).iter().any(|stem| accepts(stem))
}
