//! Error types for rule authoring and execution.
//!
//! Parsing and serialization never fail; only rule configuration and
//! rule-author-supplied rewriters can produce errors.

use thiserror::Error;

/// Boxed error returned by custom rewriters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the rule engine and executor.
#[derive(Debug, Error)]
pub enum Error {
    /// A rule was finalized without any match criteria.
    #[error("rule `{0}` has no condition")]
    MissingCondition(String),

    /// A rule was finalized without any rewrite.
    #[error("rule `{0}` has no transform")]
    MissingTransform(String),

    /// Two rules with the same name were registered on one executor.
    #[error("rule `{0}` is already registered")]
    DuplicateRule(String),

    /// A custom rewriter failed while the rule was being applied.
    #[error("rule `{rule}` failed: {source}")]
    Transform {
        rule: String,
        #[source]
        source: BoxError,
    },
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
