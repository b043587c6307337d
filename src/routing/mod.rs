//! Routing Infrastructure
//!
//! Rule types, the per-request context, the identity registry, and the
//! first-match-wins resolver. The matcher engine that rules delegate to lives
//! in [`crate::matcher`]; configuration validation lives in
//! [`crate::validation`].

pub mod context;
pub mod registry;
pub mod resolver;
pub mod rules;

pub use context::{ResolvedRoute, RoutingContext, RuleEvaluation};
pub use registry::AgentRegistry;
pub use resolver::{render_delegation_prompt, Delegation, RouteResolver};
pub use rules::{
    is_builtin_identity, MetaAgentDefinition, RoutingRule, RuleOverrides, BUILTIN_IDENTITIES,
};
