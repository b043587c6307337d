//! End-to-end resolution tests
//!
//! Load a configuration, build the registry, and resolve prompts through the
//! public API the way an embedding host would.

use metaroute::config::RouterConfig;
use metaroute::error::RouterError;
use metaroute::events::{EventSink, EventSinkError, RoutingEvent};
use metaroute::matcher::MatcherEngine;
use metaroute::routing::{AgentRegistry, RouteResolver, RoutingContext};
use std::sync::{Arc, Mutex};

const CONFIG: &str = r#"
[agents.triage]
base_model = "claude-sonnet-4-20250514"
delegates_to = ["researcher", "implementer"]
prompt_template = "[{source} -> {target}] {prompt}"

[[agents.triage.rules]]
target = "researcher"
matcher = { type = "keyword", keywords = ["investigate", "explore"], mode = "any" }

[[agents.triage.rules]]
target = "implementer"
matcher = { type = "regex", pattern = "(bug|fix|crash)", flags = "i" }

[agents.escalator]
base_model = "claude-sonnet-4-20250514"
delegates_to = ["architect"]

[[agents.escalator.rules]]
target = "architect"
matcher = { type = "complexity", threshold = "high" }

[[agents.escalator.rules]]
target = "general"
matcher = { type = "always" }
"#;

fn setup() -> (AgentRegistry, RouteResolver) {
    let config = RouterConfig::from_toml(CONFIG).unwrap();
    let registry = AgentRegistry::from_config(&config);
    (registry, RouteResolver::default())
}

#[test]
fn test_keyword_route_end_to_end() {
    let (registry, resolver) = setup();
    let context = RoutingContext::new("please EXPLORE the options", "/tmp");

    let delegation = resolver
        .resolve_for(&registry, "triage", &context)
        .unwrap()
        .expect("a rule should match");

    assert_eq!(delegation.route.target, "researcher");
    assert_eq!(delegation.route.matcher_kind, "keyword");
    assert_eq!(
        delegation.prompt,
        "[triage -> researcher] please EXPLORE the options"
    );
}

#[test]
fn test_regex_route_when_first_rule_misses() {
    let (registry, resolver) = setup();
    let context = RoutingContext::new("there is a CRASH on startup", "/tmp");

    let delegation = resolver
        .resolve_for(&registry, "triage", &context)
        .unwrap()
        .expect("regex rule should match");

    assert_eq!(delegation.route.target, "implementer");
    assert_eq!(delegation.route.matcher_kind, "regex");
}

#[test]
fn test_no_match_is_none_not_error() {
    let (registry, resolver) = setup();
    let context = RoutingContext::new("write a haiku about spring", "/tmp");

    let delegation = resolver.resolve_for(&registry, "triage", &context).unwrap();
    assert!(delegation.is_none());
}

#[test]
fn test_always_fallback_catches_everything() {
    let (registry, resolver) = setup();
    let context = RoutingContext::new("short note", "/tmp");

    let delegation = resolver
        .resolve_for(&registry, "escalator", &context)
        .unwrap()
        .expect("the always rule should win");

    assert_eq!(delegation.route.target, "general");
    assert_eq!(delegation.route.matcher_kind, "always");
}

#[test]
fn test_complexity_escalation() {
    let (registry, resolver) = setup();
    let prompt = "Redesign the distributed architecture for performance.\n\
                  We need security, encryption, scalability and latency work.\n\
                  Plan deployment, migration, integration and benchmark phases.";
    let context = RoutingContext::new(prompt, "/tmp");

    let delegation = resolver
        .resolve_for(&registry, "escalator", &context)
        .unwrap()
        .expect("complexity rule should win");

    assert_eq!(delegation.route.target, "architect");
}

#[test]
fn test_unregistered_identity_is_a_distinct_error() {
    let (registry, resolver) = setup();
    let context = RoutingContext::new("anything", "/tmp");

    let result = resolver.resolve_for(&registry, "nobody", &context);
    match result {
        Err(RouterError::UnregisteredIdentity { identity }) => assert_eq!(identity, "nobody"),
        other => panic!("expected UnregisteredIdentity, got {other:?}"),
    }
}

#[test]
fn test_default_template_used_without_overrides() {
    let config = RouterConfig::from_toml(
        r#"
[agents.plain]
base_model = "m"
delegates_to = ["general"]

[[agents.plain.rules]]
target = "general"
matcher = { type = "always" }
"#,
    )
    .unwrap();
    let registry = AgentRegistry::from_config(&config);
    let resolver = RouteResolver::default();
    let context = RoutingContext::new("do the thing", "/tmp");

    let delegation = resolver
        .resolve_for(&registry, "plain", &context)
        .unwrap()
        .unwrap();

    assert!(delegation.prompt.contains("plain"));
    assert!(delegation.prompt.contains("general"));
    assert!(delegation.prompt.ends_with("do the thing"));
}

#[test]
fn test_rule_override_template_beats_identity_template() {
    let config = RouterConfig::from_toml(
        r#"
[agents.custom]
base_model = "m"
delegates_to = ["general"]
prompt_template = "identity-level: {prompt}"

[[agents.custom.rules]]
target = "general"
matcher = { type = "always" }

[agents.custom.rules.overrides]
prompt = "rule-level for {target}: {prompt}"
"#,
    )
    .unwrap();
    let registry = AgentRegistry::from_config(&config);
    let resolver = RouteResolver::default();
    let context = RoutingContext::new("payload", "/tmp");

    let delegation = resolver
        .resolve_for(&registry, "custom", &context)
        .unwrap()
        .unwrap();

    assert_eq!(delegation.prompt, "rule-level for general: payload");
}

/// Sink that records events and can be told to start failing
#[derive(Default)]
struct FlakySink {
    events: Mutex<Vec<RoutingEvent>>,
    fail: Mutex<bool>,
}

impl EventSink for FlakySink {
    fn record(&self, event: &RoutingEvent) -> Result<(), EventSinkError> {
        if *self.fail.lock().unwrap() {
            return Err(EventSinkError::Poisoned);
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

#[test]
fn test_event_emitted_per_resolution_and_failures_ignored() {
    let (registry, _) = setup();
    let sink = Arc::new(FlakySink::default());
    let resolver =
        RouteResolver::new(MatcherEngine::new()).with_event_sink(sink.clone());
    let context = RoutingContext::new("investigate the outage", "/tmp");

    let first = resolver
        .resolve_for(&registry, "triage", &context)
        .unwrap()
        .unwrap();
    assert_eq!(first.route.target, "researcher");
    assert_eq!(sink.events.lock().unwrap().len(), 1);

    // the sink starts failing; routing results must be unaffected
    *sink.fail.lock().unwrap() = true;
    let second = resolver
        .resolve_for(&registry, "triage", &context)
        .unwrap()
        .unwrap();
    assert_eq!(second.route.target, "researcher");
    assert_eq!(sink.events.lock().unwrap().len(), 1);
}

#[test]
fn test_registry_replacement_changes_routing() {
    let (registry, resolver) = setup();
    let context = RoutingContext::new("investigate the logs", "/tmp");

    let before = resolver
        .resolve_for(&registry, "triage", &context)
        .unwrap()
        .unwrap();
    assert_eq!(before.route.target, "researcher");

    // replace triage wholesale: everything now routes to reviewer
    let mut replacement = (*registry.get("triage").unwrap()).clone();
    replacement.rules = vec![metaroute::routing::RoutingRule {
        matcher: metaroute::matcher::Matcher::Always,
        target: "reviewer".to_string(),
        overrides: None,
    }];
    registry.register("triage".to_string(), replacement);

    let after = resolver
        .resolve_for(&registry, "triage", &context)
        .unwrap()
        .unwrap();
    assert_eq!(after.route.target, "reviewer");
}

#[test]
fn test_project_context_matcher_against_real_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Cargo.toml"), "[package]").unwrap();

    let config = RouterConfig::from_toml(
        r#"
[agents.lang]
base_model = "m"
delegates_to = ["implementer"]

[[agents.lang.rules]]
target = "implementer"
matcher = { type = "project_context", has_files = ["Cargo.toml", "src/lib.rs"] }

[[agents.lang.rules]]
target = "general"
matcher = { type = "always" }
"#,
    )
    .unwrap();
    let registry = AgentRegistry::from_config(&config);
    let resolver = RouteResolver::default();

    // only Cargo.toml exists: ALL semantics means the rule misses
    let context = RoutingContext::new("port this", dir.path());
    let delegation = resolver
        .resolve_for(&registry, "lang", &context)
        .unwrap()
        .unwrap();
    assert_eq!(delegation.route.target, "general");

    // with both files present the rule wins
    std::fs::create_dir(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("src/lib.rs"), "").unwrap();
    let delegation = resolver
        .resolve_for(&registry, "lang", &context)
        .unwrap()
        .unwrap();
    assert_eq!(delegation.route.target, "implementer");
}
