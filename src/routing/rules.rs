//! Routing rule and meta-agent definition types
//!
//! A meta-agent is a named identity that owns an ordered list of routing rules
//! and a list of identities it may delegate to. Rule order is significant: it
//! encodes priority, and the resolver stops at the first rule whose matcher
//! holds.

use crate::matcher::Matcher;
use serde::{Deserialize, Serialize};

/// Identities that are always valid delegation targets, independent of what a
/// configuration declares. Delegating to any other undeclared name is a
/// configuration error.
pub const BUILTIN_IDENTITIES: &[&str] = &[
    "general",
    "architect",
    "implementer",
    "reviewer",
    "researcher",
    "tester",
];

/// Check whether a name refers to a builtin identity
pub fn is_builtin_identity(name: &str) -> bool {
    BUILTIN_IDENTITIES.contains(&name)
}

/// Per-rule overrides applied to the delegation when the rule wins.
///
/// All fields are optional; an absent field leaves the target identity's own
/// setting in effect.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleOverrides {
    /// Override the target's base model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Override sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Override the delegation prompt template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Named behavioral variant of the target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// One conditional routing rule: if `matcher` holds for a context, delegate to
/// `target` with the optional `overrides`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRule {
    pub matcher: Matcher,
    /// Identity to delegate to when this rule wins
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<RuleOverrides>,
}

/// Definition of one routing identity ("meta-agent").
///
/// Definitions are immutable after registration; re-registering a name
/// replaces the whole definition, never patches it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaAgentDefinition {
    /// Model the identity itself runs on
    pub base_model: String,
    /// Identities this one is allowed to delegate to
    pub delegates_to: Vec<String>,
    /// Ordered rule list; first satisfied rule wins. An empty list means the
    /// identity never matches (the validator flags this as a warning).
    #[serde(default)]
    pub rules: Vec<RoutingRule>,
    /// Template for the synthesized delegation prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl MetaAgentDefinition {
    /// Iterate every identity name this definition references: declared
    /// delegates first, then rule targets, in declared order.
    pub fn referenced_identities(&self) -> impl Iterator<Item = &str> {
        self.delegates_to
            .iter()
            .map(String::as_str)
            .chain(self.rules.iter().map(|r| r.target.as_str()))
    }
}
