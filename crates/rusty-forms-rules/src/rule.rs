// File: src/rule.rs
// Purpose: Rule catalog, rule declarations and compiled rule sets

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::value::{format_number, serialize_number, Value};

/// The fixed catalog of validation rules.
///
/// Wire names are camelCase (`lengthBetween`, `selectedLengthMax`, ...), the
/// same strings accepted in JSON rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleId {
    Required,
    Length,
    LengthMin,
    LengthMax,
    LengthBetween,
    ByteLength,
    ByteLengthMin,
    ByteLengthMax,
    ByteLengthBetween,
    Value,
    ValueMin,
    ValueMax,
    ValueBetween,
    Selected,
    SelectedLength,
    SelectedLengthMin,
    SelectedLengthMax,
    SelectedLengthBetween,
    Confirmed,
    Like,
    CharacterExists,
    AlphaNumeric,
    AlphaNumericLower,
    AlphaNumericUpper,
    Alpha,
    AlphaLower,
    AlphaUpper,
    Numeric,
    #[serde(rename = "isHiranaga", alias = "isHiragana")]
    IsHiragana,
    IsKatakana,
    Custom,
}

/// How a rule treats a multi-valued field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Checked once per element of an array value
    Element,
    /// Checked once against the whole array (counts of selected items)
    WholeCollection,
}

impl RuleId {
    pub const ALL: [RuleId; 31] = [
        RuleId::Required,
        RuleId::Length,
        RuleId::LengthMin,
        RuleId::LengthMax,
        RuleId::LengthBetween,
        RuleId::ByteLength,
        RuleId::ByteLengthMin,
        RuleId::ByteLengthMax,
        RuleId::ByteLengthBetween,
        RuleId::Value,
        RuleId::ValueMin,
        RuleId::ValueMax,
        RuleId::ValueBetween,
        RuleId::Selected,
        RuleId::SelectedLength,
        RuleId::SelectedLengthMin,
        RuleId::SelectedLengthMax,
        RuleId::SelectedLengthBetween,
        RuleId::Confirmed,
        RuleId::Like,
        RuleId::CharacterExists,
        RuleId::AlphaNumeric,
        RuleId::AlphaNumericLower,
        RuleId::AlphaNumericUpper,
        RuleId::Alpha,
        RuleId::AlphaLower,
        RuleId::AlphaUpper,
        RuleId::Numeric,
        RuleId::IsHiragana,
        RuleId::IsKatakana,
        RuleId::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::Required => "required",
            RuleId::Length => "length",
            RuleId::LengthMin => "lengthMin",
            RuleId::LengthMax => "lengthMax",
            RuleId::LengthBetween => "lengthBetween",
            RuleId::ByteLength => "byteLength",
            RuleId::ByteLengthMin => "byteLengthMin",
            RuleId::ByteLengthMax => "byteLengthMax",
            RuleId::ByteLengthBetween => "byteLengthBetween",
            RuleId::Value => "value",
            RuleId::ValueMin => "valueMin",
            RuleId::ValueMax => "valueMax",
            RuleId::ValueBetween => "valueBetween",
            RuleId::Selected => "selected",
            RuleId::SelectedLength => "selectedLength",
            RuleId::SelectedLengthMin => "selectedLengthMin",
            RuleId::SelectedLengthMax => "selectedLengthMax",
            RuleId::SelectedLengthBetween => "selectedLengthBetween",
            RuleId::Confirmed => "confirmed",
            RuleId::Like => "like",
            RuleId::CharacterExists => "characterExists",
            RuleId::AlphaNumeric => "alphaNumeric",
            RuleId::AlphaNumericLower => "alphaNumericLower",
            RuleId::AlphaNumericUpper => "alphaNumericUpper",
            RuleId::Alpha => "alpha",
            RuleId::AlphaLower => "alphaLower",
            RuleId::AlphaUpper => "alphaUpper",
            RuleId::Numeric => "numeric",
            RuleId::IsHiragana => "isHiranaga",
            RuleId::IsKatakana => "isKatakana",
            RuleId::Custom => "custom",
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            RuleId::SelectedLength
            | RuleId::SelectedLengthMin
            | RuleId::SelectedLengthMax
            | RuleId::SelectedLengthBetween => Scope::WholeCollection,
            _ => Scope::Element,
        }
    }
}

static CATALOG: Lazy<HashMap<&'static str, RuleId>> = Lazy::new(|| {
    let mut catalog: HashMap<&'static str, RuleId> =
        RuleId::ALL.iter().map(|id| (id.as_str(), *id)).collect();
    // Correctly spelled alias for the hiragana rule
    catalog.insert("isHiragana", RuleId::IsHiragana);
    catalog
});

/// Error returned when a rule name is not in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown rule: {0}")]
pub struct UnknownRule(pub String);

impl FromStr for RuleId {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATALOG
            .get(s)
            .copied()
            .ok_or_else(|| UnknownRule(s.to_string()))
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for RuleId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// One literal rule argument as declared.
///
/// A string starting with the reference prefix (`@` by default) names
/// another field instead of being used literally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleArg {
    Number(#[serde(serialize_with = "serialize_number")] f64),
    Text(String),
}

impl RuleArg {
    pub fn to_value(&self) -> Value {
        match self {
            RuleArg::Number(n) => Value::Number(*n),
            RuleArg::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for RuleArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleArg::Number(n) => f.write_str(&format_number(*n)),
            RuleArg::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RuleArg {
    fn from(s: &str) -> Self {
        RuleArg::Text(s.to_string())
    }
}

impl From<String> for RuleArg {
    fn from(s: String) -> Self {
        RuleArg::Text(s)
    }
}

impl From<f64> for RuleArg {
    fn from(n: f64) -> Self {
        RuleArg::Number(n)
    }
}

impl From<i32> for RuleArg {
    fn from(n: i32) -> Self {
        RuleArg::Number(n as f64)
    }
}

impl From<i64> for RuleArg {
    fn from(n: i64) -> Self {
        RuleArg::Number(n as f64)
    }
}

impl From<usize> for RuleArg {
    fn from(n: usize) -> Self {
        RuleArg::Number(n as f64)
    }
}

/// A rule declared on a field.
///
/// ```ignore
/// RuleSpec::new(RuleId::LengthBetween)
///     .args([5, 30])
///     .message("Between 5 and 30 characters");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSpec {
    /// Rule name. Names missing from the catalog are ignored.
    pub rule: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<RuleArg>,
    /// Replaces the generated description in reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Only check this element of a multi-valued field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl RuleSpec {
    pub fn new(rule: impl AsRef<str>) -> Self {
        Self {
            rule: rule.as_ref().to_string(),
            args: Vec::new(),
            message: None,
            index: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<RuleArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<RuleArg>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl From<RuleId> for RuleSpec {
    fn from(id: RuleId) -> Self {
        RuleSpec::new(id)
    }
}

/// Rules per field. Declaration order is the processing and report order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(IndexMap<String, Vec<RuleSpec>>);

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of `field -> [rule, ...]`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Append rules to a field, declaring it if needed
    pub fn field<I, R>(mut self, name: impl Into<String>, rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RuleSpec>,
    {
        self.0
            .entry(name.into())
            .or_default()
            .extend(rules.into_iter().map(Into::into));
        self
    }

    pub fn get(&self, field: &str) -> Option<&[RuleSpec]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RuleSpec])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve rule names against the catalog. Unknown names are dropped.
    pub fn compile(&self) -> CompiledRuleSet {
        let fields = self
            .0
            .iter()
            .map(|(field, specs)| {
                let rules = specs
                    .iter()
                    .filter_map(|spec| match spec.rule.parse::<RuleId>() {
                        Ok(id) => Some(CompiledRule {
                            id,
                            args: spec.args.clone(),
                            message: spec.message.clone(),
                            index: spec.index,
                        }),
                        Err(UnknownRule(name)) => {
                            tracing::debug!(field = %field, rule = %name, "skipping unknown rule");
                            None
                        }
                    })
                    .collect();
                (field.clone(), rules)
            })
            .collect();

        CompiledRuleSet { fields }
    }
}

/// A rule with its identifier resolved
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    pub id: RuleId,
    pub args: Vec<RuleArg>,
    pub message: Option<String>,
    pub index: Option<usize>,
}

/// A rule set ready to run. Fields keep their declaration order, even
/// when every rule they declared was unknown.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledRuleSet {
    fields: Vec<(String, Vec<CompiledRule>)>,
}

impl CompiledRuleSet {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[CompiledRule])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
