//! Zip extraction mapper.
//!
//! Entries are visited in archive order. Each is tested against the rules in
//! declaration order and the first rule whose pattern matches at the start of the
//! entry name decides: skip it, write it once, or write it to several destinations.

use regex::Regex;
use std::io::{Cursor, Read};

use super::write_file;
use crate::config::{EntryTarget, OrderedMap};
use crate::error::{GrablibError, Result};
use crate::path_resolver::PathResolver;

/// Rules with their patterns compiled once per archive.
#[derive(Debug)]
pub struct ArchiveRules {
    rules: Vec<(Regex, EntryTarget)>,
}

impl ArchiveRules {
    pub fn compile(rules: &OrderedMap<String, EntryTarget>) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|(pattern, target)| {
                Regex::new(pattern)
                    .map(|re| (re, target.clone()))
                    .map_err(|source| GrablibError::InvalidPattern {
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// First rule matching at the start of `name`.
    pub fn first_match(&self, name: &str) -> Option<(&Regex, &EntryTarget)> {
        self.rules
            .iter()
            .find(|(re, _)| re.find(name).is_some_and(|m| m.start() == 0))
            .map(|(re, target)| (re, target))
    }
}

/// Counters for one archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOutcome {
    pub copied: usize,
    pub ignored: usize,
}

/// Expands `content` (zip bytes fetched from `url`) according to `rules`.
pub fn extract(
    url: &str,
    content: &[u8],
    rules: &ArchiveRules,
    resolver: &PathResolver,
) -> Result<ExtractOutcome> {
    let archive_err = |source: ::zip::result::ZipError| GrablibError::Archive {
        url: url.to_string(),
        source,
    };

    let mut zip = ::zip::ZipArchive::new(Cursor::new(content)).map_err(archive_err)?;
    tracing::debug!("{} files in zip archive", zip.len());

    let mut outcome = ExtractOutcome::default();
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(archive_err)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();

        let (pattern, target) = match rules.first_match(&name) {
            Some(hit) => hit,
            None => {
                tracing::debug!(entry = %name, "no target found");
                outcome.ignored += 1;
                continue;
            }
        };
        if matches!(target, EntryTarget::Skip) {
            tracing::debug!(entry = %name, pattern = pattern.as_str(), "target null, skipping");
            outcome.ignored += 1;
            continue;
        }

        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|e| GrablibError::io(&name, e))?;

        for template in target.templates() {
            let dest = resolver.resolve(&name, template, pattern)?;
            tracing::debug!(
                "{} > {} based on regex {}",
                name,
                dest.strip_prefix(resolver.root()).unwrap_or(&dest).display(),
                pattern.as_str()
            );
            write_file(&dest, &data)?;
            outcome.copied += 1;
        }
    }
    Ok(outcome)
}
