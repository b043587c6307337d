//! Per-resolution input and output types
//!
//! A `RoutingContext` is built once per incoming prompt and is immutable for
//! the duration of one resolution. A `ResolvedRoute` is the outcome of a
//! successful resolution; `None` signals that no rule matched.

use crate::routing::rules::RuleOverrides;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a matcher may inspect for one resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingContext {
    /// The incoming task prompt, verbatim
    pub prompt: String,
    /// Root of the project the prompt concerns
    pub project_dir: PathBuf,
    /// Known project files, relative to `project_dir`
    #[serde(default)]
    pub project_files: Vec<String>,
    /// Declared project dependencies
    #[serde(default)]
    pub project_deps: Vec<String>,
}

impl RoutingContext {
    /// Create a context with just a prompt and project directory
    pub fn new<S: Into<String>, P: Into<PathBuf>>(prompt: S, project_dir: P) -> Self {
        Self {
            prompt: prompt.into(),
            project_dir: project_dir.into(),
            project_files: Vec::new(),
            project_deps: Vec::new(),
        }
    }

    /// Builder method to attach known project files
    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.project_files = files;
        self
    }

    /// Builder method to attach declared dependencies
    pub fn with_deps(mut self, deps: Vec<String>) -> Self {
        self.project_deps = deps;
        self
    }
}

/// Outcome of a successful rule resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRoute {
    /// Identity the prompt is delegated to
    pub target: String,
    /// Kind of the matcher that won (see [`crate::matcher::Matcher::kind`])
    pub matcher_kind: String,
    /// Human-readable description of what matched, for diagnostics only
    pub matched: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<RuleOverrides>,
}

/// One entry of a full evaluation trace: every rule, not just the winner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEvaluation {
    pub matcher_kind: String,
    pub matched: bool,
}
