//! Groups the digits of long integer literals with underscores.

use stilt_core::cst::{NodeId, SyntaxKind, SyntaxTree};
use stilt_core::rule::{Rule, RuleSpec, VisitContext, VisitControl};
use stilt_core::{ResolvedConfig, Result};

pub const DIGIT_GROUPING: &str = "digit-grouping";

/// Configuration key: minimum digit count before grouping is required.
pub const MIN_DIGITS_KEY: &str = "digit_grouping_min_digits";

const DEFAULT_MIN_DIGITS: usize = 5;

pub(crate) fn spec() -> RuleSpec {
    RuleSpec::new(
        super::stable_metadata(
            DIGIT_GROUPING,
            "Integer literals at or above the configured digit count use underscore grouping",
        ),
        Box::new(|| Box::new(DigitGrouping {
            min_digits: DEFAULT_MIN_DIGITS,
        })),
    )
    .with_interest(vec![SyntaxKind::IntegerLiteral])
}

struct DigitGrouping {
    min_digits: usize,
}

impl Rule for DigitGrouping {
    fn setup(&mut self, config: &ResolvedConfig) -> Result<()> {
        if let Some(min) = config.get_usize(MIN_DIGITS_KEY)? {
            self.min_digits = min;
        }
        Ok(())
    }

    fn before_visit_node(
        &mut self,
        tree: &mut SyntaxTree,
        node: NodeId,
        ctx: &mut VisitContext,
    ) -> Result<VisitControl> {
        let Some(text) = tree.token_text(node) else {
            return Ok(VisitControl::Continue);
        };
        // Literals that already carry separators are the author's grouping;
        // non-decimal digits never reach this kind.
        if text.contains('_')
            || text.len() < self.min_digits
            || !text.bytes().all(|b| b.is_ascii_digit())
        {
            return Ok(VisitControl::Continue);
        }
        let message = format!("{}-digit literal should group digits with underscores", text.len());
        let grouped = group_digits(text);
        let Some(position) = tree.position_of(node) else {
            return Ok(VisitControl::Continue);
        };
        ctx.report(position, message, true);
        if ctx.autocorrect() {
            tree.set_token_text(node, grouped)?;
        }
        Ok(VisitControl::Continue)
    }
}

/// Insert an underscore before every group of three digits, counted from the
/// right.
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let total = digits.len();
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (total - index) % 3 == 0 {
            out.push('_');
        }
        out.push(ch);
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
    fn groups_from_the_right_in_threes() {
        assert_eq!(super::group_digits("12345678"), "12_345_678");
        assert_eq!(super::group_digits("123456"), "123_456");
        assert_eq!(super::group_digits("1234567"), "1_234_567");
    }

    #[test]
    fn long_literals_are_rewritten_and_converge() {
        let outcome = engine()
            .format_source("val n = 12345678", &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert_eq!(outcome.text, "val n = 12_345_678");
        assert!(outcome.converged);
        assert!(outcome.violations.is_empty());
    }

    #[test]
    fn short_and_already_grouped_literals_pass() {
        let mut tree = parse_source("val a = 1234\nval b = 12_345_678\n").unwrap();
        let violations = engine()
            .lint(&mut tree, &ResolvedConfig::new(), |_, _| {})
            .unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn the_threshold_is_configurable() {
        let mut config = ResolvedConfig::new();
        config.set(super::MIN_DIGITS_KEY, "7");
        let mut tree = parse_source("val a = 123456").unwrap();
        let violations = engine().lint(&mut tree, &config, |_, _| {}).unwrap();
        assert!(violations.is_empty());
    }
}
