//! Learned-dictionary persistence.
//!
//! Format (`#DICT v1`): one header line, then one entry per line as
//! `word<TAB>count<TAB>confidence`, sorted lexicographically by word.
//! The reader skips unknown lines and rejects negative counts; a file
//! without the header is treated as corrupt and ignored wholesale, falling
//! back to the base set. Writes go to a temporary file in the same
//! directory and are renamed into place.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, Warning, WarningKind};

use super::AdaptiveDictionary;

const HEADER: &str = "#DICT v1";

impl AdaptiveDictionary {
    /// Merge learned entries from a dictionary file.
    ///
    /// Corrupt lines are skipped with a warning; a missing or wrong header
    /// discards the whole file with a warning. IO failures other than a
    /// missing file surface as errors.
    pub fn load_learned(&mut self, path: &Path) -> Result<Vec<Warning>> {
        let mut warnings = Vec::new();
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no dictionary file at {}, starting from base set", path.display());
                return Ok(warnings);
            },
            Err(e) => return Err(e.into()),
        };

        let mut lines = contents.lines();
        match lines.next() {
            Some(first) if first.trim() == HEADER => {},
            _ => {
                log::warn!("dictionary file {} has no {} header, ignoring it", path.display(), HEADER);
                warnings.push(Warning::new(
                    WarningKind::DictionaryLoad,
                    format!("{}: missing {} header, falling back to base set", path.display(), HEADER),
                ));
                return Ok(warnings);
            },
        }

        let mut loaded = 0usize;
        for (lineno, line) in lines.enumerate() {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_entry(line) {
                Some((word, count, confidence)) => {
                    self.insert_learned(word, count, confidence);
                    loaded += 1;
                },
                None => {
                    warnings.push(Warning::new(
                        WarningKind::DictionaryLoad,
                        format!("{}: skipped corrupt line {}", path.display(), lineno + 2),
                    ));
                },
            }
        }
        log::info!("loaded {} learned entries from {}", loaded, path.display());
        Ok(warnings)
    }

    /// Persist promoted learned entries with replace-on-close semantics.
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            writeln!(file, "{}", HEADER)?;
            // BTreeMap iteration already yields lexicographic order.
            for (word, entry) in self.learned_entries() {
                writeln!(file, "{}\t{}\t{:.3}", word, entry.count, entry.confidence)?;
            }
            file.sync_all()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn parse_entry(line: &str) -> Option<(String, u32, f32)> {
    let mut fields = line.split('\t');
    let word = fields.next()?.trim();
    let count: i64 = fields.next()?.trim().parse().ok()?;
    let confidence: f32 = fields.next()?.trim().parse().ok()?;
    if word.is_empty() || count < 0 || fields.next().is_some() {
        return None;
    }
    Some((word.to_lowercase(), count as u32, confidence.clamp(0.0, 1.0)))
}
