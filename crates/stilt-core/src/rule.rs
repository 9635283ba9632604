//! The rule contract
//!
//! A rule is a pluggable check over syntax tree nodes. It declares which node
//! kinds it is interested in and, optionally, a subtree scope; the dispatcher
//! enforces both, so rule bodies stay free of self-filtering boilerplate.
//! Rules report violations and, when the engine runs in format mode, may
//! autocorrect them by mutating the tree in place.
//!
//! Rule instances are created fresh for every pass over a file, so they may
//! keep per-file state (compiled patterns, configured options) without being
//! thread-safe themselves. The metadata describing a rule is separate from
//! the instance and lives in a statically-constructed [`RuleSpec`] table.

use serde::{Deserialize, Serialize};

use crate::config::ResolvedConfig;
use crate::cst::{NodeId, SyntaxKind, SyntaxTree};
use crate::diagnostics::{Position, Severity};
use crate::result::Result;

/// Stability classification of a rule. A rule is exactly one of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stability {
    Stable,
    Experimental,
}

impl std::fmt::Display for Stability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stability::Stable => write!(f, "STABLE"),
            Stability::Experimental => write!(f, "EXPERIMENTAL"),
        }
    }
}

/// A MAJOR.MINOR release version. Deliberately has no patch component: rule
/// lifecycle is tracked per minor release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleVersion {
    pub major: u16,
    pub minor: u16,
}

impl RuleVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl std::fmt::Display for RuleVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl std::str::FromStr for RuleVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| format!("'{s}' is not a MAJOR.MINOR version"))?;
        if minor.contains('.') {
            return Err(format!("'{s}' must not contain a patch component"));
        }
        let major = major
            .parse::<u16>()
            .map_err(|_| format!("invalid major version in '{s}'"))?;
        let minor = minor
            .parse::<u16>()
            .map_err(|_| format!("invalid minor version in '{s}'"))?;
        Ok(Self { major, minor })
    }
}

impl Serialize for RuleVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RuleVersion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One lifecycle record: the release in which the rule reached `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Since {
    pub version: RuleVersion,
    pub status: Stability,
}

impl Since {
    pub const fn stable(version: RuleVersion) -> Self {
        Self {
            version,
            status: Stability::Stable,
        }
    }

    pub const fn experimental(version: RuleVersion) -> Self {
        Self {
            version,
            status: Stability::Experimental,
        }
    }
}

/// Governance metadata for one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetadata {
    /// Unique lower-case hyphenated identifier
    pub id: String,
    /// Human-readable description of what the rule checks
    pub description: String,
    /// Severity of violations reported by this rule
    pub severity: Severity,
    /// Current stability classification
    pub stability: Stability,
    /// Release history; validated by the registry governance gate
    pub since: Vec<Since>,
}

/// Where in the tree a rule wants to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleScope {
    /// Visit every node of the file
    WholeFile,
    /// Visit only nodes at or below composites of the given kinds
    Subtree(Vec<SyntaxKind>),
}

/// Outcome of visiting one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitControl {
    /// Keep traversing
    Continue,
    /// Stop this rule for the remainder of the pass. The goal of the rule is
    /// reached; skipping the rest of the file keeps cost down.
    Stop,
}

/// Per-invocation context handed to a rule: the autocorrect mode and the
/// violation sink.
#[derive(Debug)]
pub struct VisitContext {
    autocorrect: bool,
    reports: Vec<Report>,
}

/// A violation as reported by a rule, before the engine stamps rule identity
/// and severity onto it.
#[derive(Debug, Clone)]
pub(crate) struct Report {
    pub position: Position,
    pub message: String,
    pub can_be_autocorrected: bool,
}

impl VisitContext {
    pub(crate) fn new(autocorrect: bool) -> Self {
        Self {
            autocorrect,
            reports: Vec::new(),
        }
    }

    /// Whether the rule may mutate the tree during this invocation.
    pub fn autocorrect(&self) -> bool {
        self.autocorrect
    }

    /// Report a violation at a position.
    ///
    /// The position must be computed from the tree *before* applying the
    /// matching autocorrection, so that it reflects the tree state at the
    /// moment of detection.
    pub fn report(
        &mut self,
        position: Position,
        message: impl Into<String>,
        can_be_autocorrected: bool,
    ) {
        self.reports.push(Report {
            position,
            message: message.into(),
            can_be_autocorrected,
        });
    }

    pub(crate) fn take_reports(&mut self) -> Vec<Report> {
        std::mem::take(&mut self.reports)
    }
}

/// A pluggable style check.
pub trait Rule {
    /// Called once before the first node of a pass, with the resolved
    /// configuration for the file. Rules compile their options here.
    fn setup(&mut self, _config: &ResolvedConfig) -> Result<()> {
        Ok(())
    }

    /// Called for every node the rule is interested in, parents before
    /// children, siblings left to right.
    ///
    /// Report violations through `ctx`; when `ctx.autocorrect()` is true the
    /// rule may fix a reported violation by mutating the tree. An `Err` is
    /// treated as a localized failure of this rule at this node: the engine
    /// records a rule-internal-error violation and continues with the next
    /// rule and node.
    fn before_visit_node(
        &mut self,
        tree: &mut SyntaxTree,
        node: NodeId,
        ctx: &mut VisitContext,
    ) -> Result<VisitControl>;
}

/// Factory producing a fresh rule instance for each pass over a file.
pub type RuleFactory = Box<dyn Fn() -> Box<dyn Rule> + Send + Sync>;

/// Static description of one rule: governance metadata, dispatch interests
/// and the instance factory.
pub struct RuleSpec {
    metadata: RuleMetadata,
    interest: Option<Vec<SyntaxKind>>,
    scope: RuleScope,
    factory: RuleFactory,
}

impl RuleSpec {
    pub fn new(metadata: RuleMetadata, factory: RuleFactory) -> Self {
        Self {
            metadata,
            interest: None,
            scope: RuleScope::WholeFile,
            factory,
        }
    }

    /// Restrict dispatch to nodes of the given kinds.
    pub fn with_interest(mut self, kinds: impl Into<Vec<SyntaxKind>>) -> Self {
        self.interest = Some(kinds.into());
        self
    }

    /// Restrict dispatch to subtrees rooted at composites of the given kinds.
    pub fn with_scope(mut self, scope: RuleScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn scope(&self) -> &RuleScope {
        &self.scope
    }

    /// Whether the rule wants to see nodes of `kind` at all.
    pub fn is_interested_in(&self, kind: SyntaxKind) -> bool {
        match &self.interest {
            None => true,
            Some(kinds) => kinds.contains(&kind),
        }
    }

    /// Instantiate a fresh rule for one pass.
    pub fn instantiate(&self) -> Box<dyn Rule> {
        (self.factory)()
    }
}

impl std::fmt::Debug for RuleSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSpec")
            .field("metadata", &self.metadata)
            .field("interest", &self.interest)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
