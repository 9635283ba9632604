//! Format-convergence engine and visitor dispatch
//!
//! One pass visits every node depth-first pre-order and invokes the
//! applicable rules per node in registry order. Autocorrections mutate the
//! tree during traversal, so the cursor re-resolves "next node" from the live
//! tree after every rule call instead of holding a precomputed plan.
//!
//! Formatting repeats passes until a pass makes no mutation (convergence) or
//! the pass cap is hit. Autocorrections are not globally confluent: one
//! rule's fix can create the condition another rule fixes, and in the worst
//! case two fixes oscillate. The cap bounds that worst case; the engine then
//! runs one final lint-only pass and reports non-convergence as a non-fatal
//! diagnostic.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::config::ResolvedConfig;
use crate::cst::{NodeId, SyntaxKind, SyntaxTree, parse_source};
use crate::diagnostics::{Position, Severity, Violation, ViolationKind, sort_violations};
use crate::registry::Registry;
use crate::result::Result;
use crate::rule::{Report, Rule, RuleScope, RuleSpec, VisitContext, VisitControl};

/// Default number of format passes per file.
///
/// Enough to converge the bundled rules in practice while bounding the cost
/// of oscillating autocorrections. Raise it via [`EngineConfig`] for rule
/// sets with longer fix chains.
pub const DEFAULT_MAX_FORMAT_PASSES: usize = 3;

/// Engine-wide tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Hard cap on mutating passes per file; see [`DEFAULT_MAX_FORMAT_PASSES`].
    pub max_format_passes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_format_passes: DEFAULT_MAX_FORMAT_PASSES,
        }
    }
}

/// Result of formatting one file.
#[derive(Debug, Clone)]
pub struct FormatOutcome {
    /// The rendered text after the last pass
    pub text: String,
    /// Violations still present after convergence (or after the capped last
    /// pass), ordered by position. `can_be_autocorrected` distinguishes
    /// violations the engine could not fully resolve from never-correctable
    /// ones.
    pub violations: Vec<Violation>,
    /// False when the pass cap was reached before a fixed point
    pub converged: bool,
    /// Number of passes that ran, including the final non-mutating one
    pub passes: usize,
}

/// The style engine: a shared registry plus tuning configuration.
///
/// Per-file processing is strictly sequential; the engine itself is cheap to
/// share across file workers because the registry is immutable.
pub struct StyleEngine {
    registry: Arc<Registry>,
    config: EngineConfig,
}

impl StyleEngine {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: Arc<Registry>, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run all enabled rules read-only and report violations ordered by
    /// (line, column). The tree is not mutated.
    ///
    /// The callback is invoked once per violation; the second argument is
    /// always false in lint mode.
    pub fn lint(
        &self,
        tree: &mut SyntaxTree,
        config: &ResolvedConfig,
        mut callback: impl FnMut(&Violation, bool),
    ) -> Result<Vec<Violation>> {
        let session = FormatSession::new(&self.registry, config)?;
        let mut pass = session.run_pass(tree, false)?;
        sort_violations(&mut pass.violations);
        for violation in &pass.violations {
            callback(violation, false);
        }
        Ok(pass.violations)
    }

    /// Parse and lint source text.
    pub fn lint_source(
        &self,
        source: &str,
        config: &ResolvedConfig,
        callback: impl FnMut(&Violation, bool),
    ) -> Result<Vec<Violation>> {
        let mut tree = parse_source(source)?;
        self.lint(&mut tree, config, callback)
    }

    /// Format a tree to a fixed point and render it.
    ///
    /// The callback is invoked once per violation: autocorrected ones with
    /// true, the remaining ones with false, merged in position order.
    pub fn format(
        &self,
        tree: &mut SyntaxTree,
        config: &ResolvedConfig,
        mut callback: impl FnMut(&Violation, bool),
    ) -> Result<FormatOutcome> {
        let session = FormatSession::new(&self.registry, config)?;
        let mut corrected: Vec<Violation> = Vec::new();
        let mut passes = 0usize;

        let (mut remaining, converged) = loop {
            let generation = tree.edit_generation();
            let pass = session.run_pass(tree, true)?;
            passes += 1;
            if tree.edit_generation() == generation {
                // Fixed point: this pass's findings are the authoritative
                // lint output.
                break (pass.violations, true);
            }
            tracing::debug!(pass = passes, "pass mutated the tree, rescanning");
            // The tree changed, so this pass's findings are superseded; keep
            // only what was actually corrected, for the reporting callback.
            for violation in pass.violations {
                if violation.can_be_autocorrected && !corrected.contains(&violation) {
                    corrected.push(violation);
                }
            }
            if passes >= self.config.max_format_passes {
                tracing::warn!(
                    max_passes = self.config.max_format_passes,
                    "format did not converge; reporting the state after the capped pass"
                );
                let lint = session.run_pass(tree, false)?;
                passes += 1;
                break (lint.violations, false);
            }
        };

        sort_violations(&mut remaining);
        let mut reported: Vec<(Violation, bool)> = corrected
            .into_iter()
            .map(|v| (v, true))
            .chain(remaining.iter().cloned().map(|v| (v, false)))
            .collect();
        reported.sort_by_key(|(v, _)| (v.line, v.column));
        for (violation, was_corrected) in &reported {
            callback(violation, *was_corrected);
        }

        Ok(FormatOutcome {
            text: tree.text(),
            violations: remaining,
            converged,
            passes,
        })
    }

    /// Parse and format source text.
    pub fn format_source(
        &self,
        source: &str,
        config: &ResolvedConfig,
        callback: impl FnMut(&Violation, bool),
    ) -> Result<FormatOutcome> {
        let mut tree = parse_source(source)?;
        self.format(&mut tree, config, callback)
    }
}

/// Transient per-file state: the enabled rules for this file's configuration.
struct FormatSession<'a> {
    enabled: Vec<&'a RuleSpec>,
    config: &'a ResolvedConfig,
}

struct PassOutcome {
    violations: Vec<Violation>,
}

struct ActiveRule<'a> {
    spec: &'a RuleSpec,
    instance: Box<dyn Rule>,
    active: bool,
}

impl<'a> FormatSession<'a> {
    fn new(registry: &'a Registry, config: &'a ResolvedConfig) -> Result<Self> {
        Ok(Self {
            enabled: registry.enabled_rules(config)?,
            config,
        })
    }

    /// One full visitor pass over the tree.
    ///
    /// Rule instances are created fresh per pass, so rules may carry per-file
    /// state without surviving across passes.
    fn run_pass(&self, tree: &mut SyntaxTree, autocorrect: bool) -> Result<PassOutcome> {
        let mut violations = Vec::new();
        let mut rules: Vec<ActiveRule<'a>> = Vec::with_capacity(self.enabled.len());
        for &spec in &self.enabled {
            let mut instance = spec.instantiate();
            let mut active = true;
            if let Err(err) = instance.setup(self.config) {
                violations.push(internal_error(spec, Position::new(1, 1), err.to_string()));
                active = false;
            }
            rules.push(ActiveRule {
                spec,
                instance,
                active,
            });
        }

        let any_scoped = self
            .enabled
            .iter()
            .any(|spec| matches!(spec.scope(), RuleScope::Subtree(_)));
        // Rules interested in a kind, in registry order. Built once per kind
        // instead of scanning every rule at every node; a node's kind never
        // changes, so the list stays valid for the whole visit.
        let mut dispatch: HashMap<SyntaxKind, Vec<usize>> = HashMap::new();

        let root = tree.root();
        let mut cursor = Some(root);
        while let Some(node) = cursor {
            // Snapshot where the node sits before any rule can detach it.
            let resume_slot = tree.position_in_parent(node);
            let kind = tree.kind(node);
            let interested = dispatch.entry(kind).or_insert_with(|| {
                self.enabled
                    .iter()
                    .enumerate()
                    .filter(|(_, spec)| spec.is_interested_in(kind))
                    .map(|(index, _)| index)
                    .collect()
            });
            // Scope membership is decided once, when the node is reached; the
            // single upward walk serves every scoped rule at this node.
            let ancestors = any_scoped.then(|| ancestor_kinds(tree, node));

            for &rule_index in interested.iter() {
                let rule = &mut rules[rule_index];
                if !rule.active {
                    continue;
                }
                if !tree.is_attached(node) {
                    // A previous rule removed the node; later rules must not
                    // see it.
                    break;
                }
                if let RuleScope::Subtree(kinds) = rule.spec.scope() {
                    let inside = ancestors
                        .as_ref()
                        .is_some_and(|chain| kinds.iter().any(|k| chain.contains(k)));
                    if !inside {
                        continue;
                    }
                }

                let generation = tree.edit_generation();
                let mut ctx = VisitContext::new(autocorrect);
                let outcome = {
                    let instance = &mut rule.instance;
                    catch_unwind(AssertUnwindSafe(|| {
                        instance.before_visit_node(tree, node, &mut ctx)
                    }))
                };
                let reports = ctx.take_reports();
                stamp_reports(&mut violations, rule.spec, reports);

                match outcome {
                    Ok(Ok(VisitControl::Continue)) => {}
                    Ok(Ok(VisitControl::Stop)) => rule.active = false,
                    Ok(Err(err)) => {
                        violations.push(internal_error(
                            rule.spec,
                            node_position(tree, node),
                            err.to_string(),
                        ));
                    }
                    Err(panic) => {
                        tracing::error!(
                            rule = rule.spec.id(),
                            "rule panicked while visiting a node"
                        );
                        violations.push(internal_error(
                            rule.spec,
                            node_position(tree, node),
                            format!("rule panicked: {}", panic_message(&panic)),
                        ));
                    }
                }

                if !autocorrect && tree.edit_generation() != generation {
                    // Lint mode is read-only by contract; flag the rule and
                    // keep going.
                    tracing::warn!(rule = rule.spec.id(), "rule mutated the tree in lint mode");
                    violations.push(internal_error(
                        rule.spec,
                        node_position(tree, node),
                        "rule mutated the tree in lint mode".to_string(),
                    ));
                }
            }

            // Re-resolve the next node from the live tree: mutation may have
            // shifted siblings, removed the current node, or inserted nodes.
            cursor = if tree.is_attached(node) {
                tree.next_preorder(node, root)
            } else {
                resume_after_detach(tree, root, resume_slot)
            };
        }

        Ok(PassOutcome { violations })
    }
}

/// Where to continue when the visited node was detached: the node now
/// occupying its old slot (a replacement, which gets visited), or past the
/// parent's children if the slot is gone.
fn resume_after_detach(
    tree: &SyntaxTree,
    root: NodeId,
    slot: Option<(NodeId, usize)>,
) -> Option<NodeId> {
    let (parent, index) = slot?;
    if !tree.is_attached(parent) {
        // An ancestor went away as well; end the pass. The mutation forces
        // another pass, which covers whatever remains.
        return None;
    }
    if let Some(&child) = tree.children(parent).get(index) {
        return Some(child);
    }
    // No replacement: continue after the parent's children.
    let mut current = parent;
    loop {
        if current == root {
            return None;
        }
        if let Some(sibling) = tree.next_sibling(current) {
            return Some(sibling);
        }
        current = tree.parent(current)?;
    }
}

/// Kinds of a node and all its ancestors, innermost first.
fn ancestor_kinds(tree: &SyntaxTree, node: NodeId) -> Vec<SyntaxKind> {
    let mut kinds = Vec::new();
    let mut current = Some(node);
    while let Some(candidate) = current {
        kinds.push(tree.kind(candidate));
        current = tree.parent(candidate);
    }
    kinds
}

fn stamp_reports(violations: &mut Vec<Violation>, spec: &RuleSpec, reports: Vec<Report>) {
    for report in reports {
        violations.push(Violation {
            rule_id: spec.id().to_string(),
            line: report.position.line,
            column: report.position.column,
            message: report.message,
            can_be_autocorrected: report.can_be_autocorrected,
            severity: spec.metadata().severity,
            kind: ViolationKind::Style,
        });
    }
}

fn internal_error(spec: &RuleSpec, position: Position, message: String) -> Violation {
    Violation {
        rule_id: spec.id().to_string(),
        line: position.line,
        column: position.column,
        message,
        can_be_autocorrected: false,
        severity: Severity::Error,
        kind: ViolationKind::RuleInternalError,
    }
}

fn node_position(tree: &SyntaxTree, node: NodeId) -> Position {
    tree.position_of(node).unwrap_or(Position::new(1, 1))
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
