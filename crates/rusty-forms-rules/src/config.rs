// File: src/config.rs
// Purpose: Validator configuration parsing from rusty-forms.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::bind::DEFAULT_SEPARATOR;
use crate::evaluator::REFERENCE_PREFIX;

/// Engine-wide defaults. Per-call options override `one_message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Keep a single element violation per multi-valued field
    #[serde(default = "default_false")]
    pub one_message: bool,

    /// Marks an argument as a reference to another field (default: '@')
    #[serde(default = "default_reference_prefix")]
    pub reference_prefix: char,

    /// Joins messages when binding them to a view (default: "\n")
    #[serde(default = "default_message_separator")]
    pub message_separator: String,
}

fn default_false() -> bool {
    false
}

fn default_reference_prefix() -> char {
    REFERENCE_PREFIX
}

fn default_message_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            one_message: false,
            reference_prefix: default_reference_prefix(),
            message_separator: default_message_separator(),
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: ValidatorConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        tracing::debug!(?path, one_message = config.one_message, "loaded validator config");
        Ok(config)
    }

    /// Load configuration from default path (./rusty-forms.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("rusty-forms.toml")
    }
}
