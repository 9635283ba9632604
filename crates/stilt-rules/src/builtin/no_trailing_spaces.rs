//! Strips spaces and tabs that precede a line break or the end of the file.
//!
//! Runs over whitespace and comment tokens: a line comment can end in blanks
//! that sit right before the line break held by the next token.

use stilt_core::cst::{NodeId, SyntaxKind, SyntaxTree};
use stilt_core::rule::{Rule, RuleSpec, VisitContext, VisitControl};
use stilt_core::Result;

pub const NO_TRAILING_SPACES: &str = "no-trailing-spaces";

pub(crate) fn spec() -> RuleSpec {
    RuleSpec::new(
        super::stable_metadata(
            NO_TRAILING_SPACES,
            "Spaces and tabs before a line break or the end of the file are removed",
        ),
        Box::new(|| Box::new(NoTrailingSpaces)),
    )
    .with_interest(vec![SyntaxKind::Whitespace, SyntaxKind::Comment])
}

struct NoTrailingSpaces;

impl Rule for NoTrailingSpaces {
    fn before_visit_node(
        &mut self,
        tree: &mut SyntaxTree,
        node: NodeId,
        ctx: &mut VisitContext,
    ) -> Result<VisitControl> {
        let Some(text) = tree.token_text(node) else {
            return Ok(VisitControl::Continue);
        };
        // A run at the end of the token is only trailing when a line break or
        // the end of the file follows it.
        let ends_line = match next_token(tree, node) {
            None => true,
            Some(next) => tree
                .token_text(next)
                .is_some_and(|t| t.starts_with('\n') || t.starts_with('\r')),
        };
        let Some(first_trailing) = first_trailing_byte(text, ends_line) else {
            return Ok(VisitControl::Continue);
        };
        let fixed = strip_trailing(text, ends_line);
        let Some(offset) = tree.start_offset(node) else {
            return Ok(VisitControl::Continue);
        };
        ctx.report(
            tree.position_at_offset(offset + first_trailing),
            "trailing whitespace",
            true,
        );
        if ctx.autocorrect() {
            if fixed.is_empty() {
                tree.remove(node)?;
            } else {
                tree.set_token_text(node, fixed)?;
            }
        }
        Ok(VisitControl::Continue)
    }
}

fn next_token(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    let root = tree.root();
    let mut current = tree.next_preorder(node, root);
    while let Some(candidate) = current {
        if tree.is_token(candidate) {
            return Some(candidate);
        }
        current = tree.next_preorder(candidate, root);
    }
    None
}

/// Byte index of the first space or tab of the first trailing run, if any.
/// `\r` counts as part of the line break, so blanks before `\r\n` are caught.
fn first_trailing_byte(text: &str, ends_line: bool) -> Option<usize> {
    let mut run_start: Option<usize> = None;
    for (index, ch) in text.char_indices() {
        match ch {
            ' ' | '\t' => {
                if run_start.is_none() {
                    run_start = Some(index);
                }
            }
            '\n' | '\r' => {
                if let Some(start) = run_start {
                    return Some(start);
                }
            }
            _ => run_start = None,
        }
    }
    if ends_line { run_start } else { None }
}

fn strip_trailing(text: &str, ends_line: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    for ch in text.chars() {
        match ch {
            ' ' | '\t' => run.push(ch),
            '\n' | '\r' => {
                run.clear();
                out.push(ch);
            }
            other => {
                out.push_str(&run);
                run.clear();
                out.push(other);
            }
        }
    }
    if !ends_line {
        out.push_str(&run);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stilt_core::{parse_source, Registry, ResolvedConfig, StyleEngine};

    fn engine() -> StyleEngine {
        StyleEngine::new(Arc::new(Registry::build(vec![super::spec()]).unwrap()))
    }

    #[test]
    fn strips_spaces_before_a_newline() {
        let outcome = engine()
            .format_source("val a = 1  \nval b = 2\n", &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert_eq!(outcome.text, "val a = 1\nval b = 2\n");
        assert!(outcome.converged);
    }

    #[test]
    fn strips_spaces_before_a_crlf_line_ending() {
        let outcome = engine()
            .format_source("val a = 1  \r\nval b = 2\r\n", &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert_eq!(outcome.text, "val a = 1\r\nval b = 2\r\n");
        assert!(outcome.converged);
    }

    #[test]
    fn strips_spaces_at_end_of_file() {
        let outcome = engine()
            .format_source("val a = 1   ", &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert_eq!(outcome.text, "val a = 1");
    }

    #[test]
    fn strips_blanks_at_the_end_of_a_line_comment() {
        let outcome = engine()
            .format_source("// note  \nval a = 1\n", &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert_eq!(outcome.text, "// note\nval a = 1\n");
    }

    #[test]
    fn strips_blanks_inside_a_block_comment_before_its_line_breaks() {
        let outcome = engine()
            .format_source("/* one  \n two */\n", &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert_eq!(outcome.text, "/* one\n two */\n");
    }

    #[test]
    fn blanks_before_comment_text_are_not_trailing() {
        let mut tree = parse_source("/* a  b */\n").unwrap();
        let violations = engine()
            .lint(&mut tree, &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn inner_spacing_is_not_trailing() {
        let mut tree = parse_source("val a  = 1\n").unwrap();
        let violations = engine()
            .lint(&mut tree, &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn reports_the_start_of_the_trailing_run() {
        let mut tree = parse_source("x \t\ny\n").unwrap();
        let violations = engine()
            .lint(&mut tree, &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!((violations[0].line, violations[0].column), (1, 2));
    }
}
