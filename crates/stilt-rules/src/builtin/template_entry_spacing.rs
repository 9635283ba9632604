//! Forbids padding whitespace just inside `${` and `}` of template entries.

use stilt_core::cst::{NodeId, SyntaxKind, SyntaxTree};
use stilt_core::rule::{Rule, RuleScope, RuleSpec, VisitContext, VisitControl};
use stilt_core::{Position, Result};

pub const TEMPLATE_ENTRY_SPACING: &str = "template-entry-spacing";

pub(crate) fn spec() -> RuleSpec {
    RuleSpec::new(
        super::stable_metadata(
            TEMPLATE_ENTRY_SPACING,
            "No padding whitespace directly inside ${ and } of a template entry",
        ),
        Box::new(|| Box::new(TemplateEntrySpacing)),
    )
    .with_interest(vec![SyntaxKind::TemplateEntry])
    .with_scope(RuleScope::Subtree(vec![SyntaxKind::StringTemplate]))
}

struct TemplateEntrySpacing;

impl Rule for TemplateEntrySpacing {
    fn before_visit_node(
        &mut self,
        tree: &mut SyntaxTree,
        node: NodeId,
        ctx: &mut VisitContext,
    ) -> Result<VisitControl> {
        let children = tree.children(node).to_vec();
        // `$name` entries have no braces and nothing to pad.
        if children.first().map(|&c| tree.kind(c)) != Some(SyntaxKind::TemplateOpen) {
            return Ok(VisitControl::Continue);
        }

        // Positions are taken now, before any removal, so the second report
        // still points into the text as it was at detection time.
        let mut offenders: Vec<(NodeId, Position, &str)> = Vec::new();
        if let Some(&second) = children.get(1) {
            if tree.kind(second) == SyntaxKind::Whitespace {
                if let Some(position) = tree.position_of(second) {
                    offenders.push((second, position, "after \"${\""));
                }
            }
        }
        if children.len() >= 2 && tree.kind(children[children.len() - 1]) == SyntaxKind::TemplateClose
        {
            let before_close = children[children.len() - 2];
            if tree.kind(before_close) == SyntaxKind::Whitespace
                && offenders.iter().all(|(id, _, _)| *id != before_close)
            {
                if let Some(position) = tree.position_of(before_close) {
                    offenders.push((before_close, position, "before \"}\""));
                }
            }
        }

        for (whitespace, position, location) in offenders {
            ctx.report(position, format!("unexpected whitespace {location}"), true);
            if ctx.autocorrect() {
                tree.remove(whitespace)?;
            }
        }
        Ok(VisitControl::Continue)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stilt_core::{parse_source, Registry, ResolvedConfig, StyleEngine};

    fn engine() -> StyleEngine {
        StyleEngine::new(Arc::new(Registry::build(vec![super::spec()]).unwrap()))
    }

    #[test]
    fn padding_inside_braces_is_removed() {
        let outcome = engine()
            .format_source("val s = \"${ name }\"", &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert_eq!(outcome.text, "val s = \"${name}\"");
        assert!(outcome.converged);
    }

    #[test]
    fn spacing_deeper_in_the_expression_is_untouched() {
        let source = "val s = \"${add(1, 2)}\"";
        let mut tree = parse_source(source).unwrap();
        let violations = engine()
            .lint(&mut tree, &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn dollar_entries_are_ignored() {
        let mut tree = parse_source("val s = \"hi $name !\"").unwrap();
        let violations = engine()
            .lint(&mut tree, &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn whitespace_outside_the_template_is_out_of_scope() {
        let mut tree = parse_source("val x  = \"${a}\"").unwrap();
        let violations = engine()
            .lint(&mut tree, &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn both_paddings_report_their_pre_fix_columns() {
        let mut reported = Vec::new();
        let outcome = engine()
            .format_source("val s = \"${ a }\"", &ResolvedConfig::new(), |v, corrected| {
                reported.push((v.line, v.column, corrected));
            })
            .unwrap();
        assert_eq!(outcome.text, "val s = \"${a}\"");
        // The closing-side whitespace sits at column 14 in the original text;
        // removing the opening-side one first must not shift its report.
        assert_eq!(reported, vec![(1, 12, true), (1, 14, true)]);
    }

    #[test]
    fn both_sides_are_reported_in_one_pass() {
        let mut tree = parse_source("val s = \"${ a }\"").unwrap();
        let violations = engine()
            .lint(&mut tree, &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert_eq!(violations.len(), 2);
        assert!(violations[0].message.contains("after"));
        assert!(violations[1].message.contains("before"));
    }
}
