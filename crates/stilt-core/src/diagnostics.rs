//! Violation types produced by rule execution

use serde::{Deserialize, Serialize};

/// A 1-based line/column pair into the source text.
///
/// Columns are counted in characters, not bytes, so that identifiers with
/// multi-byte or diacritic characters report accurately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters)
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Severity levels for violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational messages
    Info,
    /// Hints for improvements
    Hint,
    /// Warnings that should be addressed
    Warning,
    /// Errors that must be fixed
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Distinguishes ordinary style findings from engine-reported rule failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// A style violation found by a rule
    Style,
    /// A rule failed while visiting a node. The violation carries the rule id
    /// and the position of the node that was being visited; processing of the
    /// rest of the file continued.
    RuleInternalError,
}

/// A reported rule failure with source position and autocorrection status.
///
/// Immutable once emitted. The position reflects the tree state at the moment
/// of detection; it is never retroactively adjusted after later edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    /// Identifier of the rule that reported the violation
    pub rule_id: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters)
    pub column: usize,
    /// Human-readable message
    pub message: String,
    /// Whether the reporting rule is able to autocorrect this violation
    pub can_be_autocorrected: bool,
    /// Severity declared by the rule
    pub severity: Severity,
    /// Style finding or rule-internal failure
    pub kind: ViolationKind,
}

impl Violation {
    /// Position of the violation
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {} ({})",
            self.line, self.column, self.message, self.rule_id
        )?;
        if !self.can_be_autocorrected {
            write!(f, " [cannot be autocorrected]")?;
        }
        Ok(())
    }
}

/// Sort violations by (line, column) ascending, the order in which they are
/// reported to callers.
pub fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by_key(|v| (v.line, v.column));
}
