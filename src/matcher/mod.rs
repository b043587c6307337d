//! Matcher Engine
//!
//! Evaluates one routing condition against one prompt/context. Five matcher
//! kinds are supported as a closed tagged union, so adding a kind is a
//! compile-time-checked change everywhere matchers are consumed.
//!
//! Evaluation is pure and side-effect-free apart from diagnostic logging on
//! malformed input: a regex pattern that fails to compile is logged and
//! treated as non-matching, never surfaced as an error that could abort
//! resolution of other rules.

pub mod complexity;

pub use complexity::{complexity_score, ComplexityThreshold, TECHNICAL_TERMS};

use crate::routing::context::RoutingContext;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Keyword matching mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordMode {
    /// At least one keyword must appear in the prompt
    Any,
    /// Every keyword must appear in the prompt
    All,
}

/// A routing condition evaluated against a prompt/context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Matcher {
    /// Case-insensitive substring search for one or more keywords
    Keyword {
        keywords: Vec<String>,
        mode: KeywordMode,
    },
    /// Heuristic prompt-complexity threshold (see [`complexity`])
    Complexity { threshold: ComplexityThreshold },
    /// Regular-expression test against the prompt. Flags default to
    /// case-insensitive when absent.
    Regex {
        pattern: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        flags: Option<String>,
    },
    /// Project-shape test: ALL listed files must exist and ALL listed
    /// dependencies must be declared. Empty lists are trivially true.
    ProjectContext {
        #[serde(skip_serializing_if = "Option::is_none")]
        has_files: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        has_deps: Option<Vec<String>>,
    },
    /// Unconditionally true; intended as a terminal fallback rule
    Always,
}

impl Matcher {
    /// Stable name of the matcher kind, used in traces and diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Matcher::Keyword { .. } => "keyword",
            Matcher::Complexity { .. } => "complexity",
            Matcher::Regex { .. } => "regex",
            Matcher::ProjectContext { .. } => "project_context",
            Matcher::Always => "always",
        }
    }
}

/// Synchronous file-existence probe used by `ProjectContext` evaluation.
///
/// This is the only I/O seam in the engine; tests substitute a fake.
pub trait FsProbe: Send + Sync {
    /// Does `relative` exist under `base`?
    fn exists(&self, base: &Path, relative: &str) -> bool;
}

/// Probe backed by the real file system
#[derive(Debug, Default, Clone)]
pub struct SystemFsProbe;

impl FsProbe for SystemFsProbe {
    fn exists(&self, base: &Path, relative: &str) -> bool {
        base.join(relative).exists()
    }
}

/// Evaluates matchers against routing contexts
#[derive(Clone)]
pub struct MatcherEngine {
    probe: Arc<dyn FsProbe>,
}

impl Default for MatcherEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MatcherEngine {
    /// Create an engine backed by the real file system
    pub fn new() -> Self {
        Self {
            probe: Arc::new(SystemFsProbe),
        }
    }

    /// Create an engine with a custom file-existence probe
    pub fn with_probe(probe: Arc<dyn FsProbe>) -> Self {
        Self { probe }
    }

    /// Evaluate one matcher against one context
    pub fn evaluate(&self, matcher: &Matcher, context: &RoutingContext) -> bool {
        match matcher {
            Matcher::Keyword { keywords, mode } => {
                let prompt = context.prompt.to_lowercase();
                let mut hits = keywords.iter().map(|k| prompt.contains(&k.to_lowercase()));
                match mode {
                    KeywordMode::Any => hits.any(|hit| hit),
                    KeywordMode::All => hits.all(|hit| hit),
                }
            }
            Matcher::Complexity { threshold } => {
                complexity::meets_threshold(&context.prompt, *threshold)
            }
            Matcher::Regex { pattern, flags } => {
                match compile_pattern(pattern, flags.as_deref()) {
                    Ok(re) => re.is_match(&context.prompt),
                    Err(e) => {
                        warn!(pattern = %pattern, error = %e, "regex matcher failed to compile, treating as non-matching");
                        false
                    }
                }
            }
            Matcher::ProjectContext {
                has_files,
                has_deps,
            } => {
                let files_ok = has_files.iter().flatten().all(|f| {
                    context.project_files.iter().any(|pf| pf == f)
                        || self.probe.exists(&context.project_dir, f)
                });
                let deps_ok = has_deps
                    .iter()
                    .flatten()
                    .all(|d| context.project_deps.iter().any(|pd| pd == d));
                files_ok && deps_ok
            }
            Matcher::Always => true,
        }
    }

    /// Human-readable description of what matched, for diagnostics only.
    /// Routing decisions never depend on this string.
    pub fn describe_match(&self, matcher: &Matcher, context: &RoutingContext) -> String {
        match matcher {
            Matcher::Keyword { keywords, mode } => {
                let prompt = context.prompt.to_lowercase();
                let hits: Vec<&str> = keywords
                    .iter()
                    .filter(|k| prompt.contains(&k.to_lowercase()))
                    .map(String::as_str)
                    .collect();
                let mode = match mode {
                    KeywordMode::Any => "any",
                    KeywordMode::All => "all",
                };
                format!("keywords ({mode}): [{}]", hits.join(", "))
            }
            Matcher::Complexity { threshold } => {
                let score = complexity_score(&context.prompt);
                format!(
                    "complexity score {score} vs {:?} bound {}",
                    threshold,
                    threshold.bound()
                )
            }
            Matcher::Regex { pattern, flags } => {
                format!(
                    "pattern '{pattern}' with flags '{}'",
                    flags.as_deref().unwrap_or("i")
                )
            }
            Matcher::ProjectContext {
                has_files,
                has_deps,
            } => {
                let files = has_files.as_deref().unwrap_or(&[]).join(", ");
                let deps = has_deps.as_deref().unwrap_or(&[]).join(", ");
                format!("project has files [{files}] and deps [{deps}]")
            }
            Matcher::Always => "always (fallback)".to_string(),
        }
    }
}

/// Compile a pattern with its declared flags.
///
/// Flags use the conventional modifier letters. The letters `i`, `m`, `s`,
/// `x` and `u` translate to inline flag groups; the remaining allowed letters
/// (`g`, `y`, `d`, `v`) have no per-match meaning here and are inert. Absent
/// flags default to case-insensitive.
fn compile_pattern(pattern: &str, flags: Option<&str>) -> Result<Regex, regex::Error> {
    let mut inline = String::new();
    for c in flags.unwrap_or("i").chars() {
        if "imsxu".contains(c) && !inline.contains(c) {
            inline.push(c);
        } else if !"gydv".contains(c) {
            debug!(flag = %c, pattern = %pattern, "ignoring unsupported regex flag");
        }
    }

    if inline.is_empty() {
        Regex::new(pattern)
    } else {
        Regex::new(&format!("(?{inline}){pattern}"))
    }
}
