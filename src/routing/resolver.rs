//! Routing Resolver
//!
//! Iterates an identity's rules in declared order and stops at the first
//! matcher that holds; later rules never determine the outcome. When the
//! diagnostics collaborator runs verbose, every rule is still evaluated so a
//! full trace can be reported, but the winner remains the first match.

use crate::error::{RouterError, RouterResult};
use crate::matcher::MatcherEngine;
use crate::observability::diagnostics::{RouteDiagnostics, TracingDiagnostics};
use crate::routing::context::{ResolvedRoute, RoutingContext, RuleEvaluation};
use crate::routing::registry::AgentRegistry;
use crate::routing::rules::RoutingRule;
use crate::events::{EventSink, RoutingEvent};
use std::sync::Arc;
use tracing::debug;

/// Default delegation prompt used when neither the winning rule nor the
/// identity definition supplies a template. Placeholders: `{source}`,
/// `{target}`, `{prompt}`.
pub const DEFAULT_DELEGATION_TEMPLATE: &str =
    "Task delegated from {source} to {target}.\n\n{prompt}";

/// Render a delegation template, substituting the three placeholders.
/// The original prompt is always carried verbatim.
pub fn render_delegation_prompt(template: &str, source: &str, target: &str, prompt: &str) -> String {
    template
        .replace("{source}", source)
        .replace("{target}", target)
        .replace("{prompt}", prompt)
}

/// Resolves routes for identities against contexts
pub struct RouteResolver {
    engine: MatcherEngine,
    diagnostics: Arc<dyn RouteDiagnostics>,
    events: Option<Arc<dyn EventSink>>,
}

impl Default for RouteResolver {
    fn default() -> Self {
        Self::new(MatcherEngine::new())
    }
}

impl RouteResolver {
    /// Create a resolver with tracing-backed diagnostics and no event sink
    pub fn new(engine: MatcherEngine) -> Self {
        Self {
            engine,
            diagnostics: Arc::new(TracingDiagnostics::default()),
            events: None,
        }
    }

    /// Replace the diagnostics collaborator
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn RouteDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Attach an analytics event sink
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Resolve a route for one identity over its rule list.
    ///
    /// Returns `None` when no rule matches. Malformed matchers are treated as
    /// non-matching by the engine; this call never fails for them.
    pub fn resolve(
        &self,
        identity: &str,
        rules: &[RoutingRule],
        context: &RoutingContext,
    ) -> Option<ResolvedRoute> {
        let want_trace = self.diagnostics.enabled() && self.diagnostics.verbose();
        let (route, trace) = self.evaluate_rules(rules, context, want_trace);

        self.report(identity, route.as_ref(), trace.as_deref());
        route
    }

    /// Resolve and always return the full per-rule trace, regardless of the
    /// diagnostics collaborator's verbosity.
    pub fn resolve_traced(
        &self,
        identity: &str,
        rules: &[RoutingRule],
        context: &RoutingContext,
    ) -> (Option<ResolvedRoute>, Vec<RuleEvaluation>) {
        let (route, trace) = self.evaluate_rules(rules, context, true);
        let trace = trace.unwrap_or_default();

        self.report(identity, route.as_ref(), Some(&trace));
        (route, trace)
    }

    /// Resolve for a registered identity, synthesizing the delegation prompt.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnregisteredIdentity`] when `identity` has no
    /// registered definition; this is a caller bug, not a configuration
    /// error.
    pub fn resolve_for(
        &self,
        registry: &AgentRegistry,
        identity: &str,
        context: &RoutingContext,
    ) -> RouterResult<Option<Delegation>> {
        let definition = registry
            .get(identity)
            .ok_or_else(|| RouterError::unregistered(identity))?;

        let route = match self.resolve(identity, &definition.rules, context) {
            Some(route) => route,
            None => return Ok(None),
        };

        let template = route
            .overrides
            .as_ref()
            .and_then(|o| o.prompt.as_deref())
            .or(definition.prompt_template.as_deref())
            .unwrap_or(DEFAULT_DELEGATION_TEMPLATE);
        let prompt =
            render_delegation_prompt(template, identity, &route.target, &context.prompt);

        Ok(Some(Delegation { route, prompt }))
    }

    fn evaluate_rules(
        &self,
        rules: &[RoutingRule],
        context: &RoutingContext,
        want_trace: bool,
    ) -> (Option<ResolvedRoute>, Option<Vec<RuleEvaluation>>) {
        let mut winner: Option<ResolvedRoute> = None;
        let mut trace = want_trace.then(|| Vec::with_capacity(rules.len()));

        for rule in rules {
            let matched = self.engine.evaluate(&rule.matcher, context);

            if let Some(trace) = trace.as_mut() {
                trace.push(RuleEvaluation {
                    matcher_kind: rule.matcher.kind().to_string(),
                    matched,
                });
            }

            if matched && winner.is_none() {
                winner = Some(ResolvedRoute {
                    target: rule.target.clone(),
                    matcher_kind: rule.matcher.kind().to_string(),
                    matched: self.engine.describe_match(&rule.matcher, context),
                    overrides: rule.overrides.clone(),
                });
                // without a trace there is nothing left to compute
                if trace.is_none() {
                    break;
                }
            }
        }

        (winner, trace)
    }

    /// Report the outcome to the diagnostics and analytics collaborators.
    /// Their failures are logged and never propagated.
    fn report(&self, identity: &str, route: Option<&ResolvedRoute>, trace: Option<&[RuleEvaluation]>) {
        if self.diagnostics.enabled() {
            match route {
                Some(route) => self.diagnostics.route_resolved(identity, route, trace),
                None => self.diagnostics.no_match(identity, trace),
            }
        }

        if let Some(sink) = &self.events {
            let event = match route {
                Some(route) => RoutingEvent::resolved(
                    identity.to_string(),
                    route.target.clone(),
                    route.matcher_kind.clone(),
                ),
                None => RoutingEvent::no_match(identity.to_string()),
            };
            if let Err(e) = sink.record(&event) {
                debug!(identity, error = %e, "event sink failed, ignoring");
            }
        }
    }
}

/// A resolved route together with the synthesized delegation prompt
#[derive(Debug, Clone, PartialEq)]
pub struct Delegation {
    pub route: ResolvedRoute,
    pub prompt: String,
}
