// File: src/error.rs
// Purpose: Faults raised while running a rule set

use thiserror::Error;

use crate::rule::RuleId;

/// A validation run that could not complete.
///
/// Failing rules are not errors; they end up in the
/// [`ErrorReport`](crate::ErrorReport). These are misconfigurations: a rule
/// applied to a value it cannot handle, or a rule set that does not exist.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("rule `{rule}` on field `{field}` needs an element count, got a {kind}")]
    NoElementCount {
        field: String,
        rule: RuleId,
        kind: &'static str,
    },

    #[error("rule `{rule}` on field `{field}` cannot be applied to a {kind}")]
    UnsupportedValue {
        field: String,
        rule: RuleId,
        kind: &'static str,
    },

    #[error("rule `{rule}` on field `{field}` is missing argument {position}")]
    MissingArgument {
        field: String,
        rule: RuleId,
        position: usize,
    },

    #[error("no default rule set configured")]
    NoDefaultRuleSet,

    #[error("rule set not found: {0}")]
    UnknownRuleSet(String),
}

pub type Result<T> = std::result::Result<T, RuleError>;
