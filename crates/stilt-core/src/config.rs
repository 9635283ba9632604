//! Resolved per-file configuration
//!
//! Configuration discovery (hierarchical config files, CLI overrides, editor
//! settings) is an external collaborator's responsibility. The engine receives
//! a flat, already-resolved mapping from option name to string value per file.
//! Rules document their own option names; the engine itself only interprets
//! the rule-execution keys defined here.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::StiltError;
use crate::result::Result;

/// Key that enables rules registered as experimental. Experimental rules are
/// skipped unless this is set to `enabled` or the rule is enabled explicitly.
pub const EXPERIMENTAL_KEY: &str = "stilt_experimental";

/// Prefix for per-rule execution keys, e.g. `stilt_rule_no-multi-spaces`.
/// A per-rule key takes precedence over [`EXPERIMENTAL_KEY`], so a single
/// experimental rule can be enabled without enabling them all, and a stable
/// rule can be disabled individually.
pub const RULE_KEY_PREFIX: &str = "stilt_rule_";

/// Build the execution key for a rule id.
pub fn rule_execution_key(rule_id: &str) -> String {
    format!("{RULE_KEY_PREFIX}{rule_id}")
}

/// A resolved key→value configuration map for one file.
///
/// Insertion order is preserved so that diagnostics about configuration are
/// stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    values: IndexMap<String, String>,
}

impl ResolvedConfig {
    /// Empty configuration; every rule falls back to its defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option value, replacing any previous value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Raw string value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Boolean value for a key; accepts `true`/`false`/`enabled`/`disabled`.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some("true") | Some("enabled") => Ok(Some(true)),
            Some("false") | Some("disabled") => Ok(Some(false)),
            Some(other) => Err(StiltError::config_error(
                key,
                format!("expected a boolean, got '{other}'"),
            )),
        }
    }

    /// Unsigned integer value for a key.
    pub fn get_usize(&self, key: &str) -> Result<Option<usize>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<usize>()
                .map(Some)
                .map_err(|_| StiltError::config_error(key, format!("expected an integer, got '{raw}'"))),
        }
    }

    /// Explicit execution state for a rule id, if configured.
    ///
    /// `Some(true)` means the rule was enabled explicitly, `Some(false)`
    /// disabled explicitly, `None` that the stability-based default applies.
    pub fn rule_execution(&self, rule_id: &str) -> Result<Option<bool>> {
        self.get_bool(&rule_execution_key(rule_id))
    }

    /// Whether experimental rules are enabled for this file.
    pub fn experimental_enabled(&self) -> Result<bool> {
        Ok(self.get_bool(EXPERIMENTAL_KEY)?.unwrap_or(false))
    }

    /// Number of configured options.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the configuration carries no options.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over (key, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResolvedConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = Self::new();
        for (key, value) in iter {
            config.set(key, value);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_execution_keys_take_the_prefix() {
        assert_eq!(
            rule_execution_key("no-multi-spaces"),
            "stilt_rule_no-multi-spaces"
        );
    }

    #[test]
    fn booleans_accept_enabled_disabled_spelling() {
        let config: ResolvedConfig =
            [("stilt_experimental", "enabled"), ("flag", "false")].into_iter().collect();
        assert!(config.experimental_enabled().unwrap());
        assert_eq!(config.get_bool("flag").unwrap(), Some(false));
        assert_eq!(config.get_bool("missing").unwrap(), None);
    }

    #[test]
    fn malformed_values_are_config_errors() {
        let config: ResolvedConfig = [("limit", "many")].into_iter().collect();
        assert!(config.get_usize("limit").is_err());
    }
}
