//! Jurisdiction advisory resolution.
//!
//! Maps a free-form jurisdiction token (two-letter code or full name) to a
//! compliance advisory string. Lookup is case- and whitespace-insensitive
//! and never fails: unknown codes resolve to a generic default advisory.

use std::collections::HashMap;

use crate::config::DisclaimerConfig;

/// Read-only advisory lookup table.
///
/// Built once from configuration, then shared process-wide. Resolution is a
/// pure function over the table, safe for unsynchronized concurrent reads.
#[derive(Debug, Clone)]
pub struct DisclaimerTable {
    entries: HashMap<String, String>,
    default_advisory: String,
}

impl DisclaimerTable {
    /// Build a table from `(code, advisory)` pairs and a default advisory.
    ///
    /// Keys are normalized on insertion, so `"CA"`, `"ca"` and `" Ca "`
    /// configure the same entry.
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, V)>, default_advisory: impl Into<String>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (normalize(k.as_ref()), v.into()))
            .collect();

        Self {
            entries,
            default_advisory: default_advisory.into(),
        }
    }

    /// Resolve a jurisdiction code to its advisory text.
    ///
    /// Falls back to the default advisory when no entry matches.
    pub fn resolve(&self, code: &str) -> &str {
        self.entries
            .get(&normalize(code))
            .map_or(self.default_advisory.as_str(), String::as_str)
    }

    /// Advisory text for an optional jurisdiction token.
    ///
    /// Returns `None` when the token is absent or blank, so responses carry
    /// no advisory for requests that never named a jurisdiction.
    pub fn advisory(&self, code: Option<&str>) -> Option<String> {
        let code = code?;
        if normalize(code).is_empty() {
            return None;
        }
        Some(self.resolve(code).to_string())
    }

    pub fn default_advisory(&self) -> &str {
        &self.default_advisory
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<&DisclaimerConfig> for DisclaimerTable {
    fn from(config: &DisclaimerConfig) -> Self {
        Self::new(
            config.entries.iter().map(|(k, v)| (k.as_str(), v.clone())),
            config.default_advisory.clone(),
        )
    }
}

impl Default for DisclaimerTable {
    fn default() -> Self {
        Self::from(&DisclaimerConfig::default())
    }
}

/// Lowercase and strip all whitespace before lookup.
fn normalize(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
