// File: src/report.rs
// Purpose: Result of a validation run and its message queries

use indexmap::IndexMap;
use serde::Serialize;

use crate::rule::{RuleArg, RuleId};

/// One failed rule on a field, or on one element of a multi-valued field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub rule: RuleId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<RuleArg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Violation {
    /// The declared message, or a description of the rule that failed
    pub fn message(&self) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => self.describe(),
        }
    }

    /// `rule = lengthMax, args = [10], index = 2`
    pub fn describe(&self) -> String {
        let mut text = format!("rule = {}", self.rule);
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
            text.push_str(&format!(", args = [{}]", args.join(",")));
        }
        if let Some(index) = self.index {
            text.push_str(&format!(", index = {}", index));
        }
        text
    }
}

/// Outcome of one validation run.
///
/// Built by the validator and read-only afterwards. Fields appear in the
/// order the rule set declared them, whether or not they failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    status: bool,
    fields: Vec<String>,
    field_element_counts: IndexMap<String, usize>,
    violations: IndexMap<String, Vec<Violation>>,
}

impl ErrorReport {
    pub(crate) fn new() -> Self {
        Self {
            status: true,
            fields: Vec::new(),
            field_element_counts: IndexMap::new(),
            violations: IndexMap::new(),
        }
    }

    pub(crate) fn push_field(&mut self, field: &str) {
        self.fields.push(field.to_string());
    }

    pub(crate) fn set_element_count(&mut self, field: &str, count: usize) {
        self.field_element_counts.insert(field.to_string(), count);
    }

    pub(crate) fn record(&mut self, field: &str, violation: Violation) {
        tracing::trace!(field = %field, rule = %violation.rule, index = ?violation.index, "rule failed");
        self.violations
            .entry(field.to_string())
            .or_default()
            .push(violation);
    }

    /// Record an element violation unless the field already holds one
    pub(crate) fn record_first_element(&mut self, field: &str, violation: Violation) {
        let already = self
            .violations
            .get(field)
            .is_some_and(|list| list.iter().any(|v| v.index.is_some()));
        if !already {
            self.record(field, violation);
        }
    }

    pub(crate) fn finish(mut self) -> Self {
        self.status = self.violations.is_empty();
        self
    }

    /// `true` when no rule failed
    pub fn status(&self) -> bool {
        self.status
    }

    pub fn is_valid(&self) -> bool {
        self.status
    }

    /// Every field the rule set declared, in declaration order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Element count of a field validated per element, `None` for scalars
    pub fn element_count(&self, field: &str) -> Option<usize> {
        self.field_element_counts.get(field).copied()
    }

    pub fn is_collection(&self, field: &str) -> bool {
        self.field_element_counts.contains_key(field)
    }

    /// Violations of one field, in the order they were found
    pub fn violations(&self, field: &str) -> Option<&[Violation]> {
        self.violations.get(field).map(Vec::as_slice)
    }

    /// Failing fields and their violations, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Violation])> {
        self.violations
            .iter()
            .map(|(field, list)| (field.as_str(), list.as_slice()))
    }

    pub fn violation_count(&self) -> usize {
        self.violations.values().map(Vec::len).sum()
    }

    /// Messages for one field. With an index, only violations of that
    /// element are included.
    ///
    /// Returns `None` when nothing matches.
    pub fn messages(&self, field: &str, index: Option<usize>) -> Option<Vec<String>> {
        let list = self.violations.get(field)?;
        let messages: Vec<String> = list
            .iter()
            .filter(|v| index.is_none() || v.index == index)
            .map(Violation::message)
            .collect();

        if messages.is_empty() {
            None
        } else {
            Some(messages)
        }
    }

    /// Messages of violations that belong to the field as a whole rather
    /// than to one element
    pub(crate) fn collection_messages(&self, field: &str) -> Option<Vec<String>> {
        let messages: Vec<String> = self
            .violations
            .get(field)?
            .iter()
            .filter(|v| v.index.is_none())
            .map(Violation::message)
            .collect();

        (!messages.is_empty()).then_some(messages)
    }

    /// Messages of every failing field.
    ///
    /// A multi-valued field lists the violations of all its elements
    /// together with any whole-collection ones, in the order found.
    pub fn all_messages(&self) -> IndexMap<String, Vec<String>> {
        self.fields
            .iter()
            .filter_map(|field| {
                self.messages(field, None)
                    .map(|messages| (field.clone(), messages))
            })
            .collect()
    }
}
