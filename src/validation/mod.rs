//! Semantic configuration validation
//!
//! Runs after schema-level loading has already succeeded. Three independent,
//! order-independent error checks (circular dependency, reference validity,
//! regex flags) and one advisory analysis (regex performance) run over the
//! full configuration; every finding is collected, never just the first, so
//! an operator can fix a configuration in one pass. Warnings never affect
//! validity. Each check can be disabled via configuration flags.

pub mod graph;
pub mod patterns;

pub use graph::DelegationGraph;
pub use patterns::{performance_risk, ALLOWED_REGEX_FLAGS};

use crate::config::RouterConfig;
use crate::matcher::Matcher;
use crate::routing::rules::{is_builtin_identity, BUILTIN_IDENTITIES};
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

fn location(path: &[String]) -> String {
    path.join(".")
}

fn builtin_list() -> String {
    BUILTIN_IDENTITIES.join(", ")
}

/// Fatal configuration errors; any of these must prevent routing activation
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("circular delegation: {}", .path.join(" -> "))]
    CircularDependency {
        /// The discovered cycle, starting and ending at the same identity
        path: Vec<String>,
        involved: BTreeSet<String>,
    },

    #[error("invalid reference '{reference}' at {}: not a declared agent or builtin identity (builtins: {})", location(.path), builtin_list())]
    InvalidReference {
        path: Vec<String>,
        reference: String,
    },

    #[error("invalid regex flags '{flags}' at {}: allowed flags are '{ALLOWED_REGEX_FLAGS}'", location(.path))]
    InvalidRegexFlags { path: Vec<String>, flags: String },
}

/// Advisory findings; never block validity
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    #[error("pattern '{pattern}' at {}: {reason}", location(.path))]
    RegexPerformance {
        path: Vec<String>,
        pattern: String,
        reason: String,
    },

    #[error("empty rule list at {}: this identity will never match", location(.path))]
    EmptyRuleList { path: Vec<String> },
}

/// Aggregate result of one validation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    fn new(errors: Vec<ValidationError>, warnings: Vec<ValidationWarning>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// True iff no errors were found; warnings are ignored
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Orchestrates the semantic checks over a full configuration
pub struct SemanticValidator<'a> {
    config: &'a RouterConfig,
}

impl<'a> SemanticValidator<'a> {
    pub fn new(config: &'a RouterConfig) -> Self {
        Self { config }
    }

    /// Run every enabled check and aggregate the findings.
    ///
    /// Deterministic: the same configuration always yields the same report,
    /// in the same order.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let checks = &self.config.router.checks;

        if checks.circular_dependencies {
            self.check_circular_dependencies(&mut errors);
        } else {
            debug!("circular dependency check disabled");
        }

        if checks.reference_validity {
            self.check_references(&mut errors);
        } else {
            debug!("reference validity check disabled");
        }

        if checks.regex_flags {
            self.check_regex_flags(&mut errors);
        }

        if checks.regex_performance {
            self.check_regex_performance(&mut warnings);
        }

        self.check_empty_rule_lists(&mut warnings);

        debug!(
            errors = errors.len(),
            warnings = warnings.len(),
            "validation complete"
        );
        ValidationReport::new(errors, warnings)
    }

    /// For every declared edge `N -> X`, ask whether a path leads from `X`
    /// back to `N` within the configured delegation depth.
    fn check_circular_dependencies(&self, errors: &mut Vec<ValidationError>) {
        let graph = DelegationGraph::from_agents(&self.config.agents);
        let max_depth = self.config.router.max_delegation_depth;

        for (owner, targets) in graph.edges() {
            for target in targets {
                if let Some(back_path) = graph.find_path(target, owner, max_depth) {
                    let mut path = Vec::with_capacity(back_path.len() + 1);
                    path.push(owner.to_string());
                    path.extend(back_path);
                    let involved: BTreeSet<String> = path.iter().cloned().collect();
                    errors.push(ValidationError::CircularDependency { path, involved });
                }
            }
        }
    }

    fn check_references(&self, errors: &mut Vec<ValidationError>) {
        let declared: BTreeSet<&str> = self.config.agents.keys().map(String::as_str).collect();
        let is_valid = |name: &str| is_builtin_identity(name) || declared.contains(name);

        for (name, definition) in &self.config.agents {
            for (i, delegate) in definition.delegates_to.iter().enumerate() {
                if !is_valid(delegate) {
                    errors.push(ValidationError::InvalidReference {
                        path: vec![
                            "agents".to_string(),
                            name.clone(),
                            format!("delegates_to[{i}]"),
                        ],
                        reference: delegate.clone(),
                    });
                }
            }
            for (i, rule) in definition.rules.iter().enumerate() {
                if !is_valid(&rule.target) {
                    errors.push(ValidationError::InvalidReference {
                        path: vec![
                            "agents".to_string(),
                            name.clone(),
                            format!("rules[{i}]"),
                            "target".to_string(),
                        ],
                        reference: rule.target.clone(),
                    });
                }
            }
        }
    }

    fn check_regex_flags(&self, errors: &mut Vec<ValidationError>) {
        self.for_each_regex(|path, _pattern, flags| {
            if let Some(flags) = flags {
                if !patterns::invalid_flag_chars(flags).is_empty() {
                    errors.push(ValidationError::InvalidRegexFlags {
                        path,
                        flags: flags.to_string(),
                    });
                }
            }
        });
    }

    fn check_regex_performance(&self, warnings: &mut Vec<ValidationWarning>) {
        self.for_each_regex(|path, pattern, _flags| {
            if let Some(reason) = performance_risk(pattern) {
                warnings.push(ValidationWarning::RegexPerformance {
                    path,
                    pattern: pattern.to_string(),
                    reason: reason.to_string(),
                });
            }
        });
    }

    fn check_empty_rule_lists(&self, warnings: &mut Vec<ValidationWarning>) {
        for (name, definition) in &self.config.agents {
            if definition.rules.is_empty() {
                warnings.push(ValidationWarning::EmptyRuleList {
                    path: vec!["agents".to_string(), name.clone(), "rules".to_string()],
                });
            }
        }
    }

    /// Visit every `Regex` matcher with its location path
    fn for_each_regex<F: FnMut(Vec<String>, &str, Option<&str>)>(&self, mut visit: F) {
        for (name, definition) in &self.config.agents {
            for (i, rule) in definition.rules.iter().enumerate() {
                if let Matcher::Regex { pattern, flags } = &rule.matcher {
                    let path = vec![
                        "agents".to_string(),
                        name.clone(),
                        format!("rules[{i}]"),
                        "matcher".to_string(),
                    ];
                    visit(path, pattern, flags.as_deref());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;

    fn config(toml_content: &str) -> RouterConfig {
        RouterConfig::from_toml(toml_content).unwrap()
    }

    fn base_agent(name: &str, target: &str) -> String {
        format!(
            r#"
[agents.{name}]
base_model = "m"
delegates_to = ["{target}"]

[[agents.{name}.rules]]
target = "{target}"
matcher = {{ type = "always" }}
"#
        )
    }

    #[test]
    fn test_clean_config_is_valid() {
        let cfg = config(&base_agent("planner", "reviewer"));
        let report = SemanticValidator::new(&cfg).validate();
        assert!(report.is_valid());
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_mutual_cycle_detected() {
        let toml_content = format!(
            "{}{}",
            base_agent("alpha", "beta"),
            base_agent("beta", "alpha")
        );
        let cfg = config(&toml_content);
        let report = SemanticValidator::new(&cfg).validate();

        assert!(!report.is_valid());
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::CircularDependency { .. })));
    }

    #[test]
    fn test_self_delegation_detected() {
        let cfg = config(&base_agent("loop", "loop"));
        let report = SemanticValidator::new(&cfg).validate();

        assert!(!report.is_valid());
        match &report.errors[0] {
            ValidationError::CircularDependency { path, involved } => {
                assert_eq!(path, &vec!["loop".to_string(), "loop".to_string()]);
                assert!(involved.contains("loop"));
            }
            other => panic!("expected circular dependency, got {other:?}"),
        }
    }

    #[test]
    fn test_three_hop_cycle_respects_depth_bound() {
        let cycle = format!(
            "{}{}{}",
            base_agent("a", "b"),
            base_agent("b", "c"),
            base_agent("c", "a")
        );

        let shallow = config(&format!(
            "[router]\nmax_delegation_depth = 1\n{cycle}"
        ));
        let report = SemanticValidator::new(&shallow).validate();
        assert!(report.is_valid(), "depth 1 must not see a 3-hop cycle");

        let deep = config(&format!("[router]\nmax_delegation_depth = 3\n{cycle}"));
        let report = SemanticValidator::new(&deep).validate();
        assert!(!report.is_valid());
    }

    #[test]
    fn test_invalid_reference_reported_per_offence() {
        let toml_content = r#"
[agents.planner]
base_model = "m"
delegates_to = ["ghost", "reviewer"]

[[agents.planner.rules]]
target = "phantom"
matcher = { type = "always" }
"#;
        let cfg = config(toml_content);
        let report = SemanticValidator::new(&cfg).validate();

        let refs: Vec<&ValidationError> = report
            .errors
            .iter()
            .filter(|e| matches!(e, ValidationError::InvalidReference { .. }))
            .collect();
        assert_eq!(refs.len(), 2);

        match refs[0] {
            ValidationError::InvalidReference { path, reference } => {
                assert_eq!(reference, "ghost");
                assert_eq!(path[2], "delegates_to[0]");
            }
            _ => unreachable!(),
        }

        // the message must enumerate the builtin identities for guidance
        let message = refs[0].to_string();
        for builtin in BUILTIN_IDENTITIES {
            assert!(message.contains(builtin), "missing builtin {builtin}");
        }
    }

    #[test]
    fn test_builtin_targets_are_valid_references() {
        let cfg = config(&base_agent("planner", "general"));
        let report = SemanticValidator::new(&cfg).validate();
        assert!(report.is_valid());
    }

    #[test]
    fn test_invalid_regex_flags_reported() {
        let toml_content = r#"
[agents.planner]
base_model = "m"
delegates_to = ["reviewer"]

[[agents.planner.rules]]
target = "reviewer"
matcher = { type = "regex", pattern = "deploy", flags = "gxi" }
"#;
        let cfg = config(toml_content);
        let report = SemanticValidator::new(&cfg).validate();

        assert!(!report.is_valid());
        match &report.errors[0] {
            ValidationError::InvalidRegexFlags { flags, path } => {
                assert_eq!(flags, "gxi");
                assert_eq!(path[3], "matcher");
            }
            other => panic!("expected flags error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_valid_flags_accepted() {
        let toml_content = r#"
[agents.planner]
base_model = "m"
delegates_to = ["reviewer"]

[[agents.planner.rules]]
target = "reviewer"
matcher = { type = "regex", pattern = "deploy", flags = "gg" }
"#;
        let cfg = config(toml_content);
        let report = SemanticValidator::new(&cfg).validate();
        assert!(report.is_valid());
    }

    #[test]
    fn test_performance_warning_does_not_block_validity() {
        let toml_content = r#"
[agents.planner]
base_model = "m"
delegates_to = ["reviewer"]

[[agents.planner.rules]]
target = "reviewer"
matcher = { type = "regex", pattern = "(a+)+" }
"#;
        let cfg = config(toml_content);
        let report = SemanticValidator::new(&cfg).validate();

        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        match &report.warnings[0] {
            ValidationWarning::RegexPerformance { pattern, .. } => {
                assert_eq!(pattern, "(a+)+");
            }
            other => panic!("expected performance warning, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_rule_list_warns() {
        let toml_content = r#"
[agents.idle]
base_model = "m"
delegates_to = ["reviewer"]
"#;
        let cfg = config(toml_content);
        let report = SemanticValidator::new(&cfg).validate();

        assert!(report.is_valid());
        assert!(matches!(
            report.warnings[0],
            ValidationWarning::EmptyRuleList { .. }
        ));
    }

    #[test]
    fn test_disabled_checks_are_skipped() {
        let toml_content = r#"
[router.checks]
circular_dependencies = false
reference_validity = false

[agents.loop]
base_model = "m"
delegates_to = ["loop", "ghost"]

[[agents.loop.rules]]
target = "loop"
matcher = { type = "always" }
"#;
        let cfg = config(toml_content);
        let report = SemanticValidator::new(&cfg).validate();
        assert!(report.is_valid());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let toml_content = format!(
            "{}{}",
            base_agent("alpha", "beta"),
            base_agent("beta", "alpha")
        );
        let cfg = config(&toml_content);

        let first = SemanticValidator::new(&cfg).validate();
        let second = SemanticValidator::new(&cfg).validate();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_config_trivially_valid() {
        let cfg = config("");
        let report = SemanticValidator::new(&cfg).validate();
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }
}
