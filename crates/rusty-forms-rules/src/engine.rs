// File: src/engine.rs
// Purpose: Validator runtime: rule-set resolution and field iteration

use std::collections::HashMap;

use crate::bind::{BindOptions, ErrorView};
use crate::config::ValidatorConfig;
use crate::custom::CustomRules;
use crate::error::{Result, RuleError};
use crate::evaluator::Evaluator;
use crate::report::{ErrorReport, Violation};
use crate::rule::{CompiledRule, CompiledRuleSet, RuleArg, RuleSet, Scope};
use crate::value::{InputRecord, Value};

/// Which rules a call to [`Validator::verify`] runs
#[derive(Debug, Clone, Default)]
pub enum RuleSource {
    /// The validator's default rule set
    #[default]
    Default,
    /// A rule set registered on the validator under this name
    Named(String),
    /// Rules supplied with the call
    Inline(RuleSet),
}

/// Per-call options
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    pub rules: RuleSource,
    /// Overrides [`ValidatorConfig::one_message`] for this call
    pub one_message: Option<bool>,
}

impl VerifyOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            rules: RuleSource::Named(name.into()),
            one_message: None,
        }
    }

    pub fn inline(rules: RuleSet) -> Self {
        Self {
            rules: RuleSource::Inline(rules),
            one_message: None,
        }
    }

    pub fn one_message(mut self, one_message: bool) -> Self {
        self.one_message = Some(one_message);
        self
    }
}

/// Runs rule sets against input records.
///
/// Immutable once built; every call to [`verify`](Self::verify) produces a
/// fresh [`ErrorReport`].
///
/// # Example
///
/// ```ignore
/// let validator = Validator::builder()
///     .default_rules(RuleSet::new().field("age", [
///         RuleSpec::new(RuleId::ValueBetween).args([18, 65]),
///     ]))
///     .build();
///
/// let input = InputRecord::new().with("age", 17);
/// let report = validator.verify(&input, &VerifyOptions::default())?;
/// assert!(!report.status());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    default_rules: Option<CompiledRuleSet>,
    rule_sets: HashMap<String, CompiledRuleSet>,
    customs: CustomRules,
    config: ValidatorConfig,
}

impl Validator {
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn customs(&self) -> &CustomRules {
        &self.customs
    }

    pub fn has_rule_set(&self, name: &str) -> bool {
        self.rule_sets.contains_key(name)
    }

    /// Validate `input` and report every failing rule.
    ///
    /// Failing rules never produce an `Err`; only a rule set that cannot be
    /// found or a rule applied to a value it cannot handle does.
    pub fn verify(&self, input: &InputRecord, options: &VerifyOptions) -> Result<ErrorReport> {
        let inline;
        let plan = match &options.rules {
            RuleSource::Default => self
                .default_rules
                .as_ref()
                .ok_or(RuleError::NoDefaultRuleSet)?,
            RuleSource::Named(name) => self
                .rule_sets
                .get(name)
                .ok_or_else(|| RuleError::UnknownRuleSet(name.clone()))?,
            RuleSource::Inline(rules) => {
                inline = rules.compile();
                &inline
            }
        };
        let one_message = options.one_message.unwrap_or(self.config.one_message);

        let evaluator = Evaluator::new(input, &self.customs, self.config.reference_prefix);
        let mut report = ErrorReport::new();

        for (field, rules) in plan.iter() {
            report.push_field(field);
            let value = input.get(field);

            for rule in rules {
                check_rule(&evaluator, &mut report, field, value, rule, one_message)?;
            }
        }

        let report = report.finish();
        tracing::debug!(
            fields = report.fields().len(),
            violations = report.violation_count(),
            status = report.status(),
            "validation finished"
        );
        Ok(report)
    }

    /// [`verify`](Self::verify), then bind the report to `view`
    pub fn verify_bind(
        &self,
        view: &mut dyn ErrorView,
        input: &InputRecord,
        options: &VerifyOptions,
    ) -> Result<ErrorReport> {
        let report = self.verify(input, options)?;
        report.bind(
            view,
            &BindOptions::default().separator(&self.config.message_separator),
        );
        Ok(report)
    }
}

fn check_rule(
    evaluator: &Evaluator<'_>,
    report: &mut ErrorReport,
    field: &str,
    value: &Value,
    rule: &CompiledRule,
    one_message: bool,
) -> Result<()> {
    match value {
        Value::Array(items) if rule.id.scope() == Scope::Element => {
            report.set_element_count(field, items.len());

            for (index, item) in items.iter().enumerate() {
                if rule.index.is_some_and(|only| only != index) {
                    continue;
                }
                if evaluator.evaluate(field, rule.id, item, &rule.args)? {
                    continue;
                }

                let found = violation(rule, Some(index));
                if one_message {
                    report.record_first_element(field, found);
                } else {
                    report.record(field, found);
                }
            }
        }
        _ => {
            if !evaluator.evaluate(field, rule.id, value, &rule.args)? {
                report.record(field, violation(rule, None));
            }
        }
    }
    Ok(())
}

fn violation(rule: &CompiledRule, index: Option<usize>) -> Violation {
    Violation {
        rule: rule.id,
        index,
        args: rule.args.clone(),
        message: rule.message.clone(),
    }
}

/// Builder for [`Validator`]. Rule sets are compiled as they are added.
#[derive(Debug, Default)]
pub struct ValidatorBuilder {
    default_rules: Option<CompiledRuleSet>,
    rule_sets: HashMap<String, CompiledRuleSet>,
    customs: CustomRules,
    config: ValidatorConfig,
}

impl ValidatorBuilder {
    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn one_message(mut self, one_message: bool) -> Self {
        self.config.one_message = one_message;
        self
    }

    /// Rules used by [`RuleSource::Default`]
    pub fn default_rules(mut self, rules: RuleSet) -> Self {
        self.default_rules = Some(rules.compile());
        self
    }

    /// Rules used by [`RuleSource::Named`]
    pub fn rule_set(mut self, name: impl Into<String>, rules: RuleSet) -> Self {
        self.rule_sets.insert(name.into(), rules.compile());
        self
    }

    pub fn custom<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Value, &[RuleArg], &Evaluator<'_>) -> bool + Send + Sync + 'static,
    {
        self.customs.register(name, handler);
        self
    }

    pub fn customs(mut self, customs: CustomRules) -> Self {
        self.customs = customs;
        self
    }

    pub fn build(self) -> Validator {
        Validator {
            default_rules: self.default_rules,
            rule_sets: self.rule_sets,
            customs: self.customs,
            config: self.config,
        }
    }
}
