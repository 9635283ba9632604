//! Stilt built-in rules
//!
//! The bundled rule catalog for the stilt style engine. Every rule implements
//! [`stilt_core::Rule`] and registers through a [`stilt_core::RuleSpec`]
//! carrying its governance metadata; the catalog order is the execution
//! order.

pub mod builtin;

use std::sync::Arc;

use stilt_core::{Registry, Result, StyleEngine};

pub use builtin::builtin_rules;

/// Build a registry holding every built-in rule, in catalog order.
pub fn builtin_registry() -> Result<Registry> {
    let registry = Registry::build(builtin_rules())?;
    tracing::debug!(rules = registry.len(), "built-in registry constructed");
    Ok(registry)
}

/// An engine over the built-in registry with default tuning.
pub fn builtin_engine() -> Result<StyleEngine> {
    Ok(StyleEngine::new(Arc::new(builtin_registry()?)))
}
