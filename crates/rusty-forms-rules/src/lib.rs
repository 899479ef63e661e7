//! Rusty Forms Rules
//!
//! Declarative validation of submitted form data. A [`RuleSet`] lists rules
//! per field; a [`Validator`] runs it against an [`InputRecord`] and returns
//! an [`ErrorReport`] that can be queried for messages or bound to the error
//! slots of a view.
//!
//! Multi-valued fields (arrays) are checked element by element, except for
//! the `selectedLength*` rules, which count the selected items.

pub mod bind;
pub mod charset;
pub mod config;
pub mod custom;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod report;
pub mod rule;
pub mod value;

pub use bind::{BindOptions, ErrorSlot, ErrorView, MemorySlot, MemoryView};
pub use charset::CharacterSet;
pub use config::ValidatorConfig;
pub use custom::{CustomFn, CustomRules};
pub use engine::{RuleSource, Validator, ValidatorBuilder, VerifyOptions};
pub use error::RuleError;
pub use evaluator::Evaluator;
pub use report::{ErrorReport, Violation};
pub use rule::{RuleArg, RuleId, RuleSet, RuleSpec, Scope};
pub use value::{InputRecord, Value};
