//! Stilt Core
//!
//! Core style-enforcement engine: a lossless mutable syntax tree, an ordered
//! rule pipeline with autocorrect, and the governance layer that validates
//! rule lifecycle metadata. Rule implementations live in separate crates and
//! plug in through the [`rule::Rule`] trait.

pub mod config;
pub mod cst;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod registry;
pub mod result;
pub mod rule;

// Re-export commonly used types
pub use config::{EXPERIMENTAL_KEY, RULE_KEY_PREFIX, ResolvedConfig, rule_execution_key};
pub use cst::{LexError, LexedToken, NodeId, SyntaxKind, SyntaxTree, TreeBuilder, lex, parse_source};
pub use diagnostics::{Position, Severity, Violation, ViolationKind, sort_violations};
pub use engine::{
    DEFAULT_MAX_FORMAT_PASSES, EngineConfig, FormatOutcome, StyleEngine,
};
pub use error::{ErrorKind, GovernanceProblem, StiltError};
pub use registry::{GovernanceRecord, Registry};
pub use result::Result;
pub use rule::{
    Rule, RuleFactory, RuleMetadata, RuleScope, RuleSpec, RuleVersion, Since, Stability,
    VisitContext, VisitControl,
};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stilt=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
