//! Requires files to end with exactly one newline.

use stilt_core::cst::{NodeId, SyntaxKind, SyntaxTree};
use stilt_core::rule::{Rule, RuleMetadata, RuleSpec, Since, Stability, VisitContext, VisitControl};
use stilt_core::{Result, Severity};

pub const FINAL_NEWLINE: &str = "final-newline";

pub(crate) fn spec() -> RuleSpec {
    RuleSpec::new(
        RuleMetadata {
            id: FINAL_NEWLINE.to_string(),
            description: "Files end with exactly one newline".to_string(),
            severity: Severity::Warning,
            stability: Stability::Experimental,
            since: vec![Since::experimental(super::STABLE_RELEASE)],
        },
        Box::new(|| Box::new(FinalNewline)),
    )
    .with_interest(vec![SyntaxKind::File])
}

struct FinalNewline;

impl Rule for FinalNewline {
    fn before_visit_node(
        &mut self,
        tree: &mut SyntaxTree,
        node: NodeId,
        ctx: &mut VisitContext,
    ) -> Result<VisitControl> {
        // Only the file node itself is of interest; an empty file is fine.
        let Some(last) = tree.last_token() else {
            return Ok(VisitControl::Stop);
        };
        let Some(text) = tree.token_text(last).map(str::to_string) else {
            return Ok(VisitControl::Stop);
        };
        let Some(offset) = tree.start_offset(last) else {
            return Ok(VisitControl::Stop);
        };
        let trailing_newlines = text.chars().rev().take_while(|&c| c == '\n').count();

        if trailing_newlines == 0 {
            ctx.report(
                tree.position_at_offset(offset + text.len()),
                "File must end with a newline",
                true,
            );
            if ctx.autocorrect() {
                if tree.kind(last) == SyntaxKind::Whitespace {
                    tree.set_token_text(last, text + "\n")?;
                } else {
                    let newline = tree.alloc_token(SyntaxKind::Whitespace, "\n")?;
                    tree.push_child(node, newline)?;
                }
            }
        } else if trailing_newlines > 1 {
            let keep = text.len() - (trailing_newlines - 1);
            ctx.report(
                tree.position_at_offset(offset + keep),
                "File must end with exactly one newline",
                true,
            );
            if ctx.autocorrect() {
                tree.set_token_text(last, text[..keep].to_string())?;
            }
        }
        Ok(VisitControl::Stop)
    }
}
