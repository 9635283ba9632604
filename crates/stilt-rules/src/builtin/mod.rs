//! The built-in rule catalog
//!
//! One module per rule. [`builtin_rules`] lists them in execution order;
//! that order is observable behavior and changes to it are breaking.

mod digit_grouping;
mod enum_entry_name_case;
mod final_newline;
mod no_multi_spaces;
mod no_trailing_spaces;
mod template_entry_spacing;

use stilt_core::rule::{RuleMetadata, RuleSpec, RuleVersion, Since, Stability};
use stilt_core::Severity;

pub use digit_grouping::{DIGIT_GROUPING, MIN_DIGITS_KEY};
pub use enum_entry_name_case::{CASING_KEY, ENUM_ENTRY_NAME_CASE};
pub use final_newline::FINAL_NEWLINE;
pub use no_multi_spaces::NO_MULTI_SPACES;
pub use no_trailing_spaces::NO_TRAILING_SPACES;
pub use template_entry_spacing::TEMPLATE_ENTRY_SPACING;

/// Release in which the first rule batch shipped, as experimental.
pub(crate) const FIRST_RELEASE: RuleVersion = RuleVersion::new(0, 1);
/// Release in which the first rule batch was promoted to stable.
pub(crate) const STABLE_RELEASE: RuleVersion = RuleVersion::new(0, 2);

/// Metadata for a rule that shipped in the first batch and is stable today.
pub(crate) fn stable_metadata(id: &str, description: &str) -> RuleMetadata {
    RuleMetadata {
        id: id.to_string(),
        description: description.to_string(),
        severity: Severity::Warning,
        stability: Stability::Stable,
        since: vec![
            Since::experimental(FIRST_RELEASE),
            Since::stable(STABLE_RELEASE),
        ],
    }
}

/// Every built-in rule, in execution order.
pub fn builtin_rules() -> Vec<RuleSpec> {
    vec![
        no_multi_spaces::spec(),
        no_trailing_spaces::spec(),
        enum_entry_name_case::spec(),
        digit_grouping::spec(),
        template_entry_spacing::spec(),
        final_newline::spec(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_catalog_passes_the_governance_gate() {
        let registry = crate::builtin_registry().unwrap();
        assert_eq!(registry.len(), builtin_rules().len());
    }

    #[test]
    fn catalog_order_is_the_documented_one() {
        let ids: Vec<_> = builtin_rules()
            .iter()
            .map(|spec| spec.id().to_string())
            .collect();
        assert_eq!(
            ids,
            vec![
                NO_MULTI_SPACES,
                NO_TRAILING_SPACES,
                ENUM_ENTRY_NAME_CASE,
                DIGIT_GROUPING,
                TEMPLATE_ENTRY_SPACING,
                FINAL_NEWLINE,
            ]
        );
    }

    #[test]
    fn governance_export_serializes_lifecycle_records() {
        let registry = crate::builtin_registry().unwrap();
        let json = serde_json::to_string(&registry.governance()).unwrap();
        assert!(json.contains("\"no-multi-spaces\""));
        assert!(json.contains("\"EXPERIMENTAL\""));
        assert!(json.contains("\"0.2\""));
    }
}
