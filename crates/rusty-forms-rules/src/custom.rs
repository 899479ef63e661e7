// File: src/custom.rs
// Purpose: Host-supplied predicates for the `custom` rule

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::evaluator::Evaluator;
use crate::rule::RuleArg;
use crate::value::Value;

/// Signature of a custom predicate: the value under test, the rule's raw
/// arguments (the first one is the handler name) and the evaluator, which
/// gives access to the record and argument resolution.
pub type CustomFn = dyn Fn(&Value, &[RuleArg], &Evaluator<'_>) -> bool + Send + Sync;

/// Named custom predicates, looked up by the `custom` rule.
///
/// ```ignore
/// let customs = CustomRules::new().with("even", |value, _, _| {
///     value.as_number().map_or(false, |n| n % 2.0 == 0.0)
/// });
/// ```
#[derive(Clone, Default)]
pub struct CustomRules {
    handlers: HashMap<String, Arc<CustomFn>>,
}

impl CustomRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Value, &[RuleArg], &Evaluator<'_>) -> bool + Send + Sync + 'static,
    {
        self.register(name, handler);
        self
    }

    /// Register a handler, replacing any previous one with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Value, &[RuleArg], &Evaluator<'_>) -> bool + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<CustomFn>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for CustomRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("CustomRules").field("handlers", &names).finish()
    }
}
