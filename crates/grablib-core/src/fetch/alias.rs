//! URL alias expansion.

use crate::config::OrderedMap;

/// Built-in aliases, applied before user aliases.
pub const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("GITHUB", "https://raw.githubusercontent.com"),
    ("CDNJS", "http://cdnjs.cloudflare.com/ajax/libs"),
];

/// Ordered token to URL-prefix table.
///
/// Expansion is a literal replace of each token, anywhere in the key, one entry at a
/// time in table order. Tokens that are substrings of each other therefore depend on
/// that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<(String, String)>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self {
            entries: BUILTIN_ALIASES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl AliasTable {
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Built-in table overlaid with `user` aliases.
    pub fn with_overrides(user: &OrderedMap<String, String>) -> Self {
        let mut table = Self::default();
        for (token, prefix) in user.iter() {
            table.insert(token, prefix);
        }
        table
    }

    /// Replaces an existing token in place, or appends a new one.
    pub fn insert(&mut self, token: &str, prefix: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == token) {
            Some(entry) => entry.1 = prefix.to_string(),
            None => self.entries.push((token.to_string(), prefix.to_string())),
        }
    }

    pub fn expand(&self, key: &str) -> String {
        let mut url = key.to_string();
        for (token, prefix) in &self.entries {
            url = url.replace(token.as_str(), prefix);
        }
        url
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
