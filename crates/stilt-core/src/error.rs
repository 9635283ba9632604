//! Error types and handling for the stilt engine

use thiserror::Error;

/// Main error type for stilt operations
#[derive(Debug, Error)]
pub enum StiltError {
    /// The source text could not be parsed into a syntax tree. Carries the
    /// parser's own diagnostic; no rule is executed on an unparseable file.
    #[error("Parse error at {line}:{column}: {message}")]
    ParseError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Rule metadata failed the registry governance gate. Raised once at
    /// registry construction and lists every offending rule.
    #[error("Rule governance error:\n{}", format_problems(.problems))]
    GovernanceError { problems: Vec<GovernanceProblem> },

    /// A structural edit was applied to a node for which it is not defined,
    /// for example replacing the root or re-attaching an attached node.
    #[error("Tree edit error: {message}")]
    TreeError { message: String },

    /// A rule misbehaved in a way the engine cannot localize to one node,
    /// for example mutating the tree in lint mode.
    #[error("Rule error in '{rule_id}': {message}")]
    RuleError { rule_id: String, message: String },

    /// Configuration value could not be interpreted
    #[error("Configuration error for '{key}': {message}")]
    ConfigError { key: String, message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// A single violation of the rule metadata contract, reported by the
/// registry governance gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernanceProblem {
    /// Identifier of the offending rule
    pub rule_id: String,
    /// What the rule got wrong
    pub reason: String,
}

fn format_problems(problems: &[GovernanceProblem]) -> String {
    problems
        .iter()
        .map(|p| format!("  {}: {}", p.rule_id, p.reason))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Governance,
    Tree,
    Rule,
    Config,
    Internal,
}

impl StiltError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StiltError::ParseError { .. } => ErrorKind::Parse,
            StiltError::GovernanceError { .. } => ErrorKind::Governance,
            StiltError::TreeError { .. } => ErrorKind::Tree,
            StiltError::RuleError { .. } => ErrorKind::Rule,
            StiltError::ConfigError { .. } => ErrorKind::Config,
            StiltError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (the caller can continue with other files)
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Parse | ErrorKind::Rule)
    }

    /// Create a parse error
    pub fn parse_error(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a tree edit error
    pub fn tree_error(message: impl Into<String>) -> Self {
        Self::TreeError {
            message: message.into(),
        }
    }

    /// Create a rule error
    pub fn rule_error(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleError {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigError {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn governance_error_lists_every_offender() {
        let err = StiltError::GovernanceError {
            problems: vec![
                GovernanceProblem {
                    rule_id: "first-rule".to_string(),
                    reason: "missing since-version record".to_string(),
                },
                GovernanceProblem {
                    rule_id: "second-rule".to_string(),
                    reason: "stable rule without STABLE record".to_string(),
                },
            ],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("first-rule"));
        assert!(rendered.contains("second-rule"));
    }

    #[test]
    fn parse_errors_are_recoverable() {
        assert!(StiltError::parse_error(1, 1, "unexpected token").is_recoverable());
        assert!(!StiltError::internal_error("boom").is_recoverable());
    }
}
