//! Routing diagnostics collaborator
//!
//! The resolver reports each outcome exactly once through this seam. The
//! collaborator decides the destination; it is never on the critical path for
//! correctness, and resolver callers must not observe its failures.

use crate::routing::context::{ResolvedRoute, RuleEvaluation};
use tracing::{debug, info};

/// Receives routing outcomes for observability purposes.
///
/// When `verbose` is true the resolver evaluates every rule and supplies the
/// full per-rule trace alongside the winner; otherwise only the winner is
/// reported and evaluation stops at the first match.
pub trait RouteDiagnostics: Send + Sync {
    /// Whether diagnostics are collected at all
    fn enabled(&self) -> bool {
        true
    }

    /// Whether the full per-rule trace should be collected
    fn verbose(&self) -> bool {
        false
    }

    /// Called once per successful resolution
    fn route_resolved(
        &self,
        identity: &str,
        route: &ResolvedRoute,
        trace: Option<&[RuleEvaluation]>,
    );

    /// Called once when no rule matched
    fn no_match(&self, identity: &str, trace: Option<&[RuleEvaluation]>);
}

/// Diagnostics backed by the tracing subsystem
#[derive(Debug, Clone, Default)]
pub struct TracingDiagnostics {
    pub verbose: bool,
}

impl RouteDiagnostics for TracingDiagnostics {
    fn verbose(&self) -> bool {
        self.verbose
    }

    fn route_resolved(
        &self,
        identity: &str,
        route: &ResolvedRoute,
        trace: Option<&[RuleEvaluation]>,
    ) {
        info!(
            identity,
            target = %route.target,
            matcher = %route.matcher_kind,
            matched = %route.matched,
            "route resolved"
        );
        if let Some(trace) = trace {
            for (i, step) in trace.iter().enumerate() {
                debug!(
                    identity,
                    rule = i,
                    matcher = %step.matcher_kind,
                    matched = step.matched,
                    "rule evaluation"
                );
            }
        }
    }

    fn no_match(&self, identity: &str, trace: Option<&[RuleEvaluation]>) {
        info!(identity, "no routing rule matched");
        if let Some(trace) = trace {
            debug!(identity, rules = trace.len(), "all rules evaluated false");
        }
    }
}

/// Diagnostics that discard everything
#[derive(Debug, Clone, Default)]
pub struct NoopDiagnostics;

impl RouteDiagnostics for NoopDiagnostics {
    fn enabled(&self) -> bool {
        false
    }

    fn route_resolved(&self, _: &str, _: &ResolvedRoute, _: Option<&[RuleEvaluation]>) {}

    fn no_match(&self, _: &str, _: Option<&[RuleEvaluation]>) {}
}
