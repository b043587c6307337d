//! Router configuration
//!
//! Only the subset of configuration the engine and validator consume lives
//! here: identity definitions, the maximum delegation depth, and per-check
//! enable flags. Schema-level concerns (types, required fields) are settled by
//! TOML deserialization; semantic validation is a separate pass (see
//! [`crate::validation`]).

use crate::routing::rules::MetaAgentDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Full router configuration as loaded from TOML.
///
/// `agents` is a sorted map so that validation output is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub router: RouterSection,
    #[serde(default)]
    pub agents: BTreeMap<String, MetaAgentDefinition>,
}

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterSection {
    /// Maximum chain length considered when searching for delegation cycles
    #[serde(default = "default_max_delegation_depth")]
    pub max_delegation_depth: u32,
    #[serde(default)]
    pub checks: CheckToggles,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            max_delegation_depth: default_max_delegation_depth(),
            checks: CheckToggles::default(),
        }
    }
}

fn default_max_delegation_depth() -> u32 {
    3
}

/// Per-check enable flags for the semantic validator. All default to enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckToggles {
    #[serde(default = "default_true")]
    pub circular_dependencies: bool,
    #[serde(default = "default_true")]
    pub reference_validity: bool,
    #[serde(default = "default_true")]
    pub regex_flags: bool,
    #[serde(default = "default_true")]
    pub regex_performance: bool,
}

impl Default for CheckToggles {
    fn default() -> Self {
        Self {
            circular_dependencies: true,
            reference_validity: true,
            regex_flags: true,
            regex_performance: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("invalid identity name: {0}")]
    InvalidIdentityName(String),
}

impl RouterConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RouterConfig = toml::from_str(content)?;

        for name in config.agents.keys() {
            validate_identity_name(name)?;
        }

        Ok(config)
    }
}

/// Identity names must match [a-zA-Z0-9._-]+
fn validate_identity_name(name: &str) -> Result<(), ConfigError> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');

    if name.is_empty() || !valid_chars {
        return Err(ConfigError::InvalidIdentityName(format!(
            "identity '{name}' must match pattern [a-zA-Z0-9._-]+"
        )));
    }

    Ok(())
}
