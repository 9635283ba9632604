//! Collapses runs of more than one space inside a line.

use stilt_core::cst::{NodeId, SyntaxKind, SyntaxTree};
use stilt_core::rule::{Rule, RuleSpec, VisitContext, VisitControl};
use stilt_core::Result;

pub const NO_MULTI_SPACES: &str = "no-multi-spaces";

pub(crate) fn spec() -> RuleSpec {
    RuleSpec::new(
        super::stable_metadata(
            NO_MULTI_SPACES,
            "Runs of more than one space inside a line are collapsed to a single space",
        ),
        Box::new(|| Box::new(NoMultiSpaces)),
    )
    .with_interest(vec![SyntaxKind::Whitespace])
}

struct NoMultiSpaces;

impl Rule for NoMultiSpaces {
    fn before_visit_node(
        &mut self,
        tree: &mut SyntaxTree,
        node: NodeId,
        ctx: &mut VisitContext,
    ) -> Result<VisitControl> {
        let Some(text) = tree.token_text(node) else {
            return Ok(VisitControl::Continue);
        };
        // Whitespace containing a newline is line structure and indentation,
        // which is out of this rule's hands.
        if text.contains('\n') || text.len() < 2 || !text.bytes().all(|b| b == b' ') {
            return Ok(VisitControl::Continue);
        }
        let Some(offset) = tree.start_offset(node) else {
            return Ok(VisitControl::Continue);
        };
        // Report at the first redundant space, not at the run start.
        ctx.report(
            tree.position_at_offset(offset + 1),
            "unnecessary long whitespace",
            true,
        );
        if ctx.autocorrect() {
            tree.set_token_text(node, " ")?;
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
    fn collapses_the_run_and_reports_the_second_space() {
        let outcome = engine()
            .format_source("x(1,  3)", &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert_eq!(outcome.text, "x(1, 3)");
        assert!(outcome.converged);
    }

    #[test]
    fn indentation_is_left_alone() {
        let source = "fun f() {\n    x(1)\n}\n";
        let mut tree = parse_source(source).unwrap();
        let violations = engine()
            .lint(&mut tree, &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn reports_position_of_the_redundant_space() {
        let mut tree = parse_source("val x  = 1").unwrap();
        let violations = engine()
            .lint(&mut tree, &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!((violations[0].line, violations[0].column), (1, 7));
    }
}
