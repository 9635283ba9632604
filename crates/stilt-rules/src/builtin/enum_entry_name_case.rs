//! Checks enum entry names against the configured casing style.
//!
//! Report-only: renaming an entry changes call sites outside the file, so no
//! autocorrection is offered.

use once_cell::sync::Lazy;
use regex::Regex;

use stilt_core::cst::{NodeId, SyntaxKind, SyntaxTree};
use stilt_core::rule::{Rule, RuleSpec, VisitContext, VisitControl};
use stilt_core::{ResolvedConfig, Result, StiltError};

pub const ENUM_ENTRY_NAME_CASE: &str = "enum-entry-name-case";

/// Configuration key selecting the accepted casing style.
pub const CASING_KEY: &str = "enum_entry_name_casing";

// \p{Lu} rather than A-Z so that diacritics in names are accepted.
static UPPER_OR_CAMEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\p{Lu}([\p{L}\d]*|[\p{Lu}_\d]*)$").expect("valid pattern")
});
static UPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Lu}[\p{Lu}_\d]*$").expect("valid pattern"));
static CAMEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{Lu}[\p{L}\d]*$").expect("valid pattern"));

pub(crate) fn spec() -> RuleSpec {
    RuleSpec::new(
        super::stable_metadata(
            ENUM_ENTRY_NAME_CASE,
            "Enum entry names follow the configured casing style",
        ),
        Box::new(|| Box::new(EnumEntryNameCase::default())),
    )
    .with_interest(vec![SyntaxKind::EnumEntry])
}

#[derive(Default, Clone, Copy)]
enum Casing {
    #[default]
    UpperOrCamel,
    Upper,
    Camel,
}

#[derive(Default)]
struct EnumEntryNameCase {
    casing: Casing,
}

impl Rule for EnumEntryNameCase {
    fn setup(&mut self, config: &ResolvedConfig) -> Result<()> {
        self.casing = match config.get(CASING_KEY) {
            None | Some("upper_or_camel_cases") => Casing::UpperOrCamel,
            Some("upper_cases") => Casing::Upper,
            Some("camel_cases") => Casing::Camel,
            Some(other) => {
                return Err(StiltError::config_error(
                    CASING_KEY,
                    format!("unknown casing style '{other}'"),
                ));
            }
        };
        Ok(())
    }

    fn before_visit_node(
        &mut self,
        tree: &mut SyntaxTree,
        node: NodeId,
        ctx: &mut VisitContext,
    ) -> Result<VisitControl> {
        let Some(name_token) = tree
            .children(node)
            .iter()
            .copied()
            .find(|&child| tree.kind(child) == SyntaxKind::Identifier)
        else {
            return Ok(VisitControl::Continue);
        };
        let Some(name) = tree.token_text(name_token) else {
            return Ok(VisitControl::Continue);
        };
        let (pattern, expected) = match self.casing {
            Casing::UpperOrCamel => (
                &*UPPER_OR_CAMEL,
                "upper underscore-separated names like \"ENUM_ENTRY\" or upper camel-case like \"EnumEntry\"",
            ),
            Casing::Upper => (&*UPPER, "upper underscore-separated names like \"ENUM_ENTRY\""),
            Casing::Camel => (&*CAMEL, "upper camel-case like \"EnumEntry\""),
        };
        if !pattern.is_match(name) {
            if let Some(position) = tree.position_of(name_token) {
                ctx.report(position, format!("Enum entry name should be {expected}"), false);
            }
        }
        Ok(VisitControl::Continue)
    }
}
