//! Destination path templating.
//!
//! A regex is searched in a source identifier (a URL or an archive entry name), its
//! captures are substituted into a destination template such as `js/{filename}`, and
//! the result is joined onto a root it must not escape.

mod normalize;

pub use normalize::within_root;

use regex::Regex;
use std::path::{Path, PathBuf};

use crate::error::{GrablibError, Result};

/// Placeholder appended to templates that name a directory.
pub const FILENAME_TOKEN: &str = "{filename}";

/// Resolves destination templates under a fixed root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `template` for `source_key` using the captures of `pattern`.
    pub fn resolve(&self, source_key: &str, template: &str, pattern: &Regex) -> Result<PathBuf> {
        let caps = pattern
            .captures(source_key)
            .ok_or_else(|| GrablibError::NoMatch {
                source_key: source_key.to_string(),
                pattern: pattern.as_str().to_string(),
            })?;

        let mut dest = template.to_string();
        if dest.is_empty() || dest.ends_with('/') {
            dest.push_str(FILENAME_TOKEN);
        }

        for (name, value) in bindings(pattern, &caps) {
            dest = dest.replace(&format!("{{{}}}", name), value);
        }
        if has_token(&dest) {
            tracing::warn!(template, dest = %dest, "unreplaced placeholder in destination");
        }

        let dest = dest.trim_matches(|c| c == ' ' || c == '/');
        if dest.is_empty() {
            return Err(GrablibError::BadTemplate {
                template: template.to_string(),
            });
        }
        within_root(&self.root, dest)
    }
}

/// Named groups win; otherwise the last positional group is bound to `filename`.
fn bindings<'p, 't>(pattern: &'p Regex, caps: &regex::Captures<'t>) -> Vec<(&'p str, &'t str)> {
    let named: Vec<(&str, &str)> = pattern
        .capture_names()
        .flatten()
        .map(|name| (name, caps.name(name).map_or("", |m| m.as_str())))
        .collect();
    if !named.is_empty() {
        return named;
    }
    if caps.len() > 1 {
        if let Some(last) = caps.get(caps.len() - 1) {
            return vec![("filename", last.as_str())];
        }
    }
    Vec::new()
}

fn has_token(s: &str) -> bool {
    match s.find('{') {
        Some(open) => s[open..].contains('}'),
        None => false,
    }
}
