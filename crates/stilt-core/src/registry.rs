//! Rule registry and governance gate
//!
//! The registry is an ordered, deduplicated collection of rule specs, built
//! once per process and immutable afterwards. Construction validates the
//! stability/since-version contract for every rule and fails fast with an
//! error naming each offender: the rule catalog is large and maintained by
//! many contributors, and a misclassified rule must not ship silently.
//!
//! The validation iterates an explicit, statically-constructed metadata
//! table; there is no runtime introspection of rule objects.

use serde::Serialize;

use crate::config::ResolvedConfig;
use crate::error::{GovernanceProblem, StiltError};
use crate::result::Result;
use crate::rule::{RuleSpec, Since, Stability};

/// Immutable, ordered rule collection shared read-only across files.
#[derive(Debug)]
pub struct Registry {
    specs: Vec<RuleSpec>,
}

/// One row of the governance query surface: everything external tooling
/// (release notes, documentation) needs to know about a rule's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GovernanceRecord {
    pub id: String,
    pub stability: Stability,
    pub since: Vec<Since>,
}

impl Registry {
    /// Build a registry, validating every rule's metadata.
    ///
    /// Rules run in the order given here; the order is part of the engine's
    /// observable behavior and never depends on hashing or scheduling.
    /// Duplicate ids keep the first spec.
    pub fn build(specs: Vec<RuleSpec>) -> Result<Self> {
        let mut deduped: Vec<RuleSpec> = Vec::with_capacity(specs.len());
        for spec in specs {
            if deduped.iter().any(|existing| existing.id() == spec.id()) {
                tracing::debug!(rule = spec.id(), "dropping duplicate rule spec");
                continue;
            }
            deduped.push(spec);
        }

        let mut problems = Vec::new();
        for spec in &deduped {
            validate_spec(spec, &mut problems);
        }
        if !problems.is_empty() {
            return Err(StiltError::GovernanceError { problems });
        }
        Ok(Self { specs: deduped })
    }

    /// All rule specs in execution order.
    pub fn rules(&self) -> &[RuleSpec] {
        &self.specs
    }

    /// Look up a rule spec by id.
    pub fn get(&self, id: &str) -> Option<&RuleSpec> {
        self.specs.iter().find(|spec| spec.id() == id)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Lifecycle metadata for every rule, in execution order.
    pub fn governance(&self) -> Vec<GovernanceRecord> {
        self.specs
            .iter()
            .map(|spec| {
                let meta = spec.metadata();
                GovernanceRecord {
                    id: meta.id.clone(),
                    stability: meta.stability,
                    since: meta.since.clone(),
                }
            })
            .collect()
    }

    /// The rules enabled for a file, in execution order.
    ///
    /// A per-rule execution key takes precedence; otherwise stable rules are
    /// enabled by default and experimental rules require the experimental
    /// opt-in.
    pub fn enabled_rules(&self, config: &ResolvedConfig) -> Result<Vec<&RuleSpec>> {
        let experimental = config.experimental_enabled()?;
        let mut enabled = Vec::new();
        for spec in &self.specs {
            let rule_enabled = match config.rule_execution(spec.id())? {
                Some(explicit) => explicit,
                None => match spec.metadata().stability {
                    Stability::Stable => true,
                    Stability::Experimental => experimental,
                },
            };
            if rule_enabled {
                enabled.push(spec);
            } else {
                tracing::trace!(rule = spec.id(), "rule disabled for this file");
            }
        }
        Ok(enabled)
    }
}

fn validate_spec(spec: &RuleSpec, problems: &mut Vec<GovernanceProblem>) {
    let meta = spec.metadata();
    let mut push = |reason: String| {
        problems.push(GovernanceProblem {
            rule_id: meta.id.clone(),
            reason,
        });
    };

    if !is_valid_rule_id(&meta.id) {
        push("rule id must be non-empty, lower-case and hyphenated".to_string());
    }
    if meta.since.is_empty() {
        push("rule has no since-version record".to_string());
        return;
    }

    let stable_records = meta
        .since
        .iter()
        .filter(|s| s.status == Stability::Stable)
        .count();
    let experimental_records = meta
        .since
        .iter()
        .filter(|s| s.status == Stability::Experimental)
        .count();

    match meta.stability {
        Stability::Stable => {
            if stable_records != 1 {
                push(format!(
                    "stable rule must have exactly one STABLE since record, found {stable_records}"
                ));
            }
            if experimental_records > 1 {
                push(format!(
                    "stable rule may have at most one EXPERIMENTAL since record, found {experimental_records}"
                ));
            }
        }
        Stability::Experimental => {
            if experimental_records != 1 {
                push(format!(
                    "experimental rule must have exactly one EXPERIMENTAL since record, found {experimental_records}"
                ));
            }
            if stable_records != 0 {
                push("experimental rule must not have a STABLE since record".to_string());
            }
        }
    }
}

fn is_valid_rule_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('-')
        && !id.ends_with('-')
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
