//! metaroute - Declarative prompt routing
//!
//! Routes incoming natural-language task prompts among named "meta-agent"
//! identities according to declarative configuration. Each identity carries an
//! ordered rule list; the first rule whose matcher holds picks the delegation
//! target. A semantic validator runs at load time and rejects configurations
//! whose delegation topology can loop or that reference unknown identities.
//!
//! # Quick Start
//!
//! ```rust
//! use metaroute::config::RouterConfig;
//! use metaroute::routing::{AgentRegistry, RouteResolver, RoutingContext};
//! use metaroute::validation::SemanticValidator;
//!
//! let config = RouterConfig::from_toml(r#"
//! [agents.planner]
//! base_model = "claude-sonnet-4-20250514"
//! delegates_to = ["reviewer"]
//!
//! [[agents.planner.rules]]
//! target = "reviewer"
//! matcher = { type = "keyword", keywords = ["review", "audit"], mode = "any" }
//! "#).unwrap();
//!
//! // reject bad topologies before routing is activated
//! let report = SemanticValidator::new(&config).validate();
//! assert!(report.is_valid());
//!
//! let registry = AgentRegistry::from_config(&config);
//! let resolver = RouteResolver::default();
//!
//! let context = RoutingContext::new("please review this patch", ".");
//! let delegation = resolver.resolve_for(&registry, "planner", &context).unwrap();
//! assert_eq!(delegation.unwrap().route.target, "reviewer");
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod matcher;
pub mod observability;
pub mod routing;
pub mod validation;

pub use config::{CheckToggles, ConfigError, RouterConfig};
pub use error::{RouterError, RouterResult};
pub use matcher::{Matcher, MatcherEngine};
pub use routing::{
    AgentRegistry, MetaAgentDefinition, ResolvedRoute, RouteResolver, RoutingContext, RoutingRule,
};
pub use validation::{SemanticValidator, ValidationReport};
