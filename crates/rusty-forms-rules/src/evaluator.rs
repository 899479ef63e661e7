// File: src/evaluator.rs
// Purpose: Argument resolution and the predicate behind every catalog rule

use std::cmp::Ordering;

use crate::charset::{character_exists, CharClass, DIGITS, HIRAGANA, KATAKANA, LOWER, UPPER};
use crate::custom::CustomRules;
use crate::error::{Result, RuleError};
use crate::rule::{RuleArg, RuleId};
use crate::value::{InputRecord, Value};

/// Default prefix marking an argument as a reference to another field
pub const REFERENCE_PREFIX: char = '@';

/// Evaluates rules against values of one input record.
///
/// Created once per validation run. Cross-field references are resolved
/// against the record on every call, never cached.
pub struct Evaluator<'a> {
    input: &'a InputRecord,
    customs: &'a CustomRules,
    reference_prefix: char,
}

impl<'a> Evaluator<'a> {
    pub fn new(input: &'a InputRecord, customs: &'a CustomRules, reference_prefix: char) -> Self {
        Self {
            input,
            customs,
            reference_prefix,
        }
    }

    /// The record being validated
    pub fn input(&self) -> &'a InputRecord {
        self.input
    }

    /// `Null` and `""` are missing; anything else is present.
    pub fn required(value: &Value) -> bool {
        !value.is_absent()
    }

    /// Resolve one argument: `@field` reads the named field of the record
    /// (`Null` when it is not there), anything else is literal. A bare `@`
    /// is literal.
    pub fn resolve(&self, arg: &RuleArg) -> Value {
        match arg {
            RuleArg::Text(text) => match text
                .strip_prefix(self.reference_prefix)
                .filter(|field| !field.is_empty())
            {
                Some(field) => self.input.get(field).clone(),
                None => arg.to_value(),
            },
            RuleArg::Number(_) => arg.to_value(),
        }
    }

    /// Resolved argument at `position`, `None` when not declared
    pub fn arg(&self, args: &[RuleArg], position: usize) -> Option<Value> {
        args.get(position).map(|arg| self.resolve(arg))
    }

    /// Run one rule against one value. `field` only labels faults.
    ///
    /// Every rule except `required` passes on a missing value.
    pub fn evaluate(&self, field: &str, rule: RuleId, value: &Value, args: &[RuleArg]) -> Result<bool> {
        let passed = match rule {
            RuleId::Required => Self::required(value),
            _ if value.is_absent() => true,

            RuleId::Length | RuleId::SelectedLength => {
                let count = element_count(field, rule, value)?;
                equals(&count, self.arg(args, 0))
            }
            RuleId::LengthMin | RuleId::SelectedLengthMin => {
                let count = element_count(field, rule, value)?;
                at_least(&count, self.arg(args, 0))
            }
            RuleId::LengthMax | RuleId::SelectedLengthMax => {
                let count = element_count(field, rule, value)?;
                at_most(&count, self.arg(args, 0))
            }
            RuleId::LengthBetween | RuleId::SelectedLengthBetween => {
                let count = element_count(field, rule, value)?;
                at_least(&count, self.arg(args, 0)) && at_most(&count, self.arg(args, 1))
            }

            RuleId::ByteLength => {
                let bytes = byte_length(field, rule, value)?;
                equals(&bytes, self.arg(args, 0))
            }
            RuleId::ByteLengthMin => {
                let bytes = byte_length(field, rule, value)?;
                at_least(&bytes, self.arg(args, 0))
            }
            RuleId::ByteLengthMax => {
                let bytes = byte_length(field, rule, value)?;
                at_most(&bytes, self.arg(args, 0))
            }
            RuleId::ByteLengthBetween => {
                let bytes = byte_length(field, rule, value)?;
                at_least(&bytes, self.arg(args, 0)) && at_most(&bytes, self.arg(args, 1))
            }

            RuleId::Value => equals(value, self.arg(args, 0)),
            RuleId::ValueMin => at_least(value, self.arg(args, 0)),
            RuleId::ValueMax => at_most(value, self.arg(args, 0)),
            RuleId::ValueBetween => {
                at_least(value, self.arg(args, 0)) && at_most(value, self.arg(args, 1))
            }

            RuleId::Selected => args.iter().any(|arg| self.resolve(arg) == *value),

            RuleId::Confirmed => self
                .arg(args, 0)
                .is_some_and(|target| value.loose_eq(&target)),

            RuleId::Like => {
                let Some(text) = value.as_str() else {
                    return Err(RuleError::UnsupportedValue {
                        field: field.to_string(),
                        rule,
                        kind: value.kind(),
                    });
                };
                match self.arg(args, 0) {
                    Some(Value::Null) | None => false,
                    Some(needle) => text.contains(needle.to_string().as_str()),
                }
            }

            RuleId::CharacterExists => {
                let charset = self.arg(args, 0).ok_or_else(|| RuleError::MissingArgument {
                    field: field.to_string(),
                    rule,
                    position: 0,
                })?;
                character_exists(&value.to_string(), &charset.to_string())
            }

            RuleId::AlphaNumeric => self.char_class(value, args, &[DIGITS, LOWER, UPPER]),
            RuleId::AlphaNumericLower => self.char_class(value, args, &[DIGITS, LOWER]),
            RuleId::AlphaNumericUpper => self.char_class(value, args, &[DIGITS, UPPER]),
            RuleId::Alpha => self.char_class(value, args, &[LOWER, UPPER]),
            RuleId::AlphaLower => self.char_class(value, args, &[LOWER]),
            RuleId::AlphaUpper => self.char_class(value, args, &[UPPER]),
            RuleId::Numeric => self.char_class(value, args, &[DIGITS]),
            RuleId::IsHiragana => self.char_class(value, args, &[HIRAGANA]),
            RuleId::IsKatakana => self.char_class(value, args, &[KATAKANA]),

            RuleId::Custom => {
                let name = args.first().ok_or_else(|| RuleError::MissingArgument {
                    field: field.to_string(),
                    rule,
                    position: 0,
                })?;
                let name = name.to_string();
                match self.customs.get(&name) {
                    Some(handler) => handler(value, args, self),
                    None => {
                        tracing::debug!(field = %field, handler = %name, "custom rule handler not registered, passing");
                        true
                    }
                }
            }
        };

        Ok(passed)
    }

    fn char_class(&self, value: &Value, args: &[RuleArg], base: &'static [&'static str]) -> bool {
        let extra = match self.arg(args, 0) {
            Some(Value::Null) | None => None,
            Some(extra) => Some(extra.to_string()),
        };
        let class = CharClass::new(base).with_extra(extra.as_deref());
        character_exists(&value.to_string(), &class)
    }
}

fn element_count(field: &str, rule: RuleId, value: &Value) -> Result<Value> {
    value
        .element_count()
        .map(Value::from)
        .ok_or_else(|| RuleError::NoElementCount {
            field: field.to_string(),
            rule,
            kind: value.kind(),
        })
}

fn byte_length(field: &str, rule: RuleId, value: &Value) -> Result<Value> {
    match value {
        Value::Object(_) => Err(RuleError::UnsupportedValue {
            field: field.to_string(),
            rule,
            kind: value.kind(),
        }),
        _ => Ok(Value::from(value.to_string().len())),
    }
}

// A target that is missing or not comparable never orders below or above,
// so min/max bounds pass and exact matches fail.

fn equals(actual: &Value, target: Option<Value>) -> bool {
    target.is_some_and(|t| actual.compare(&t) == Some(Ordering::Equal))
}

fn at_least(actual: &Value, min: Option<Value>) -> bool {
    !matches!(min.and_then(|m| actual.compare(&m)), Some(Ordering::Less))
}

fn at_most(actual: &Value, max: Option<Value>) -> bool {
    !matches!(max.and_then(|m| actual.compare(&m)), Some(Ordering::Greater))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn check(rule: RuleId, value: impl Into<Value>, args: &[RuleArg]) -> bool {
        let input = InputRecord::new();
        let customs = CustomRules::new();
        let evaluator = Evaluator::new(&input, &customs, REFERENCE_PREFIX);
        evaluator.evaluate("field", rule, &value.into(), args).unwrap()
    }

    fn n(value: i32) -> RuleArg {
        RuleArg::from(value)
    }

    fn s(value: &str) -> RuleArg {
        RuleArg::from(value)
    }

    #[rstest]
    #[case(Value::Null, false)]
    #[case(Value::from(""), false)]
    #[case(Value::from(0), true)]
    #[case(Value::from(false), true)]
    #[case(Value::Array(vec![]), true)]
    #[case(Value::from(" "), true)]
    fn test_required(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(check(RuleId::Required, value, &[]), expected);
    }

    #[rstest]
    #[case(RuleId::Length)]
    #[case(RuleId::LengthMax)]
    #[case(RuleId::ValueMin)]
    #[case(RuleId::Alpha)]
    #[case(RuleId::Confirmed)]
    #[case(RuleId::Like)]
    #[case(RuleId::Selected)]
    #[case(RuleId::Custom)]
    fn test_absent_value_passes_every_other_rule(#[case] rule: RuleId) {
        assert!(check(rule, Value::Null, &[n(999)]));
        assert!(check(rule, "", &[n(999)]));
    }

    #[rstest]
    #[case("abc", true)]
    #[case("abcd", true)]
    #[case("abcdefgh", true)]
    #[case("ab", false)]
    #[case("abcdefghi", false)]
    fn test_length_between_bounds(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(check(RuleId::LengthBetween, value, &[n(3), n(8)]), expected);
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(check(RuleId::Length, "héllo", &[n(5)]));
        assert!(check(RuleId::LengthMin, "abc", &[n(3)]));
        assert!(!check(RuleId::LengthMin, "ab", &[n(3)]));
        assert!(check(RuleId::LengthMax, "abc", &[n(3)]));
        assert!(!check(RuleId::LengthMax, "abcd", &[n(3)]));
        // exact length against no target can never match
        assert!(!check(RuleId::Length, "abc", &[]));
    }

    #[test]
    fn test_byte_length() {
        assert!(check(RuleId::ByteLength, "héllo", &[n(6)]));
        assert!(!check(RuleId::ByteLengthMax, "あいう", &[n(6)]));
        assert!(check(RuleId::ByteLengthBetween, "あいう", &[n(9), n(9)]));
        assert!(check(RuleId::ByteLengthMin, 12345, &[n(5)]));
    }

    #[test]
    fn test_value_comparisons() {
        assert!(check(RuleId::Value, 30, &[n(30)]));
        assert!(check(RuleId::Value, "30", &[n(30)]));
        assert!(!check(RuleId::Value, 31, &[n(30)]));

        assert!(check(RuleId::ValueMin, 10, &[n(10)]));
        assert!(!check(RuleId::ValueMin, 9, &[n(10)]));
        assert!(check(RuleId::ValueMax, 255, &[n(255)]));
        assert!(!check(RuleId::ValueMax, 256, &[n(255)]));

        assert!(!check(RuleId::ValueBetween, 17, &[n(18), n(65)]));
        assert!(check(RuleId::ValueBetween, 18, &[n(18), n(65)]));
        assert!(check(RuleId::ValueBetween, "65", &[n(18), n(65)]));
        assert!(!check(RuleId::ValueBetween, 66, &[n(18), n(65)]));
        // Words are not numbers and have no order against a number
        assert!(check(RuleId::ValueBetween, "inf", &[n(18), n(65)]));
        assert!(check(RuleId::ValueBetween, "NaN", &[n(18), n(65)]));

        assert!(check(RuleId::ValueMin, "b", &[s("a")]));
    }

    #[test]
    fn test_selected_matches_whole_value() {
        let fruit = [s("apple"), s("orange"), s("kiwi")];
        assert!(check(RuleId::Selected, "kiwi", &fruit));
        assert!(!check(RuleId::Selected, "ki", &fruit));
        assert!(!check(RuleId::Selected, "banana", &fruit));
        // strict: a string never matches a number argument
        assert!(!check(RuleId::Selected, "1", &[n(1)]));
        assert!(check(RuleId::Selected, 1, &[n(1)]));
    }

    #[test]
    fn test_selected_length_counts_items() {
        let picks = Value::from(vec!["a", "b", "c"]);
        assert!(check(RuleId::SelectedLength, picks.clone(), &[n(3)]));
        assert!(!check(RuleId::SelectedLengthMax, picks.clone(), &[n(2)]));
        assert!(check(RuleId::SelectedLengthMin, picks.clone(), &[n(1)]));
        assert!(check(RuleId::SelectedLengthBetween, picks, &[n(1), n(3)]));
    }

    #[test]
    fn test_like() {
        assert!(check(RuleId::Like, "hello world", &[s("world")]));
        assert!(!check(RuleId::Like, "hello world", &[s("mars")]));
        assert!(!check(RuleId::Like, "hello", &[]));
    }

    #[test]
    fn test_character_classes() {
        assert!(check(RuleId::AlphaNumeric, "abc123XYZ", &[]));
        assert!(!check(RuleId::AlphaNumeric, "abc-123", &[]));
        assert!(check(RuleId::AlphaNumeric, "abc-123", &[s("-")]));
        assert!(check(RuleId::AlphaNumericLower, "abc123", &[]));
        assert!(!check(RuleId::AlphaNumericLower, "Abc123", &[]));
        assert!(check(RuleId::AlphaNumericUpper, "ABC123", &[]));
        assert!(check(RuleId::Alpha, "abcXYZ", &[]));
        assert!(!check(RuleId::Alpha, "abc1", &[]));
        assert!(check(RuleId::AlphaLower, "abc", &[]));
        assert!(!check(RuleId::AlphaUpper, "ABc", &[]));
        assert!(check(RuleId::Numeric, "0123", &[]));
        assert!(check(RuleId::Numeric, 2024, &[]));
        assert!(!check(RuleId::Numeric, "12.5", &[]));
        assert!(check(RuleId::Numeric, "12.5", &[s(".")]));
        assert!(check(RuleId::IsHiragana, "ひらがな", &[]));
        assert!(!check(RuleId::IsHiragana, "カタカナ", &[]));
        assert!(check(RuleId::IsKatakana, "カタカナ", &[]));
        assert!(check(RuleId::IsKatakana, "カタカナー", &[s("ー")]));
    }

    #[test]
    fn test_character_exists() {
        assert!(check(RuleId::CharacterExists, "abba", &[s("ab")]));
        assert!(!check(RuleId::CharacterExists, "abc", &[s("ab")]));
        assert!(check(RuleId::CharacterExists, 1011, &[s("01")]));
    }

    #[test]
    fn test_cross_field_reference_strips_sentinel() {
        let input = InputRecord::new()
            .with("password", "s3cret")
            .with("min_age", 21);
        let customs = CustomRules::new();
        let evaluator = Evaluator::new(&input, &customs, REFERENCE_PREFIX);

        assert_eq!(evaluator.resolve(&s("@password")), Value::from("s3cret"));
        assert_eq!(evaluator.resolve(&s("@missing")), Value::Null);
        assert_eq!(evaluator.resolve(&s("password")), Value::from("password"));
        assert_eq!(evaluator.resolve(&s("@")), Value::from("@"));

        let confirmed = |value: &str| {
            evaluator
                .evaluate("confirm", RuleId::Confirmed, &Value::from(value), &[s("@password")])
                .unwrap()
        };
        assert!(confirmed("s3cret"));
        assert!(!confirmed("other"));

        let age = |value: i32| {
            evaluator
                .evaluate("age", RuleId::ValueMin, &Value::from(value), &[s("@min_age")])
                .unwrap()
        };
        assert!(age(21));
        assert!(!age(20));
    }

    #[test]
    fn test_confirmed_against_missing_field_fails() {
        let input = InputRecord::new();
        let customs = CustomRules::new();
        let evaluator = Evaluator::new(&input, &customs, REFERENCE_PREFIX);
        let passed = evaluator
            .evaluate("confirm", RuleId::Confirmed, &Value::from("x"), &[s("@password")])
            .unwrap();
        assert!(!passed);
    }

    #[test]
    fn test_custom_prefix() {
        let input = InputRecord::new().with("email", "a@b.c");
        let customs = CustomRules::new();
        let evaluator = Evaluator::new(&input, &customs, '$');
        assert_eq!(evaluator.resolve(&s("$email")), Value::from("a@b.c"));
        assert_eq!(evaluator.resolve(&s("@email")), Value::from("@email"));
    }

    #[test]
    fn test_custom_rule_dispatch() {
        let input = InputRecord::new().with("other", "yes");
        let customs = CustomRules::new().with("matchesOther", |value, args, evaluator| {
            let target = evaluator.arg(args, 1).unwrap_or_default();
            *value == target
        });
        let evaluator = Evaluator::new(&input, &customs, REFERENCE_PREFIX);
        let args = [s("matchesOther"), s("@other")];

        assert!(evaluator
            .evaluate("f", RuleId::Custom, &Value::from("yes"), &args)
            .unwrap());
        assert!(!evaluator
            .evaluate("f", RuleId::Custom, &Value::from("no"), &args)
            .unwrap());
    }

    #[test]
    fn test_missing_custom_handler_passes() {
        assert!(check(RuleId::Custom, "anything", &[s("notRegistered")]));
    }

    #[test]
    fn test_malformed_invocations_are_errors() {
        let input = InputRecord::new();
        let customs = CustomRules::new();
        let evaluator = Evaluator::new(&input, &customs, REFERENCE_PREFIX);

        let err = evaluator
            .evaluate("age", RuleId::LengthMax, &Value::from(42), &[n(2)])
            .unwrap_err();
        assert_eq!(
            err,
            RuleError::NoElementCount {
                field: "age".to_string(),
                rule: RuleId::LengthMax,
                kind: "number",
            }
        );

        assert!(matches!(
            evaluator.evaluate("f", RuleId::Like, &Value::from(3), &[s("3")]),
            Err(RuleError::UnsupportedValue { .. })
        ));
        assert!(matches!(
            evaluator.evaluate("f", RuleId::CharacterExists, &Value::from("a"), &[]),
            Err(RuleError::MissingArgument { position: 0, .. })
        ));
        assert!(matches!(
            evaluator.evaluate("f", RuleId::Custom, &Value::from("a"), &[]),
            Err(RuleError::MissingArgument { .. })
        ));
    }
}
