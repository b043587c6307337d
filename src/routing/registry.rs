//! Registry of routing identity definitions
//!
//! Definitions are built in full before being published and are replaced
//! atomically on re-registration, never patched in place. Readers clone the
//! `Arc` behind the lock and can never observe a partially-built definition.

use crate::config::RouterConfig;
use crate::routing::rules::MetaAgentDefinition;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Thread-safe registry of identity definitions
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: Arc<RwLock<HashMap<String, Arc<MetaAgentDefinition>>>>,
}

impl AgentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a loaded configuration.
    ///
    /// The caller is expected to have run the semantic validator first; this
    /// constructor does not re-validate.
    pub fn from_config(config: &RouterConfig) -> Self {
        let registry = Self::new();
        for (name, definition) in &config.agents {
            registry.register(name.clone(), definition.clone());
        }
        info!(agents = config.agents.len(), "registry built from configuration");
        registry
    }

    /// Register or replace a definition. Replacement swaps the map entry
    /// whole; concurrent readers keep the definition they already hold.
    pub fn register(&self, name: String, definition: MetaAgentDefinition) {
        let definition = Arc::new(definition);
        let mut agents = self.agents.write().unwrap();
        let replaced = agents.insert(name.clone(), definition).is_some();
        debug!(identity = %name, replaced, "identity registered");
    }

    /// Fetch a definition by name
    pub fn get(&self, name: &str) -> Option<Arc<MetaAgentDefinition>> {
        let agents = self.agents.read().unwrap();
        agents.get(name).cloned()
    }

    /// Remove a definition; returns whether it existed
    pub fn remove(&self, name: &str) -> bool {
        let mut agents = self.agents.write().unwrap();
        agents.remove(name).is_some()
    }

    /// Registered identity names, sorted
    pub fn names(&self) -> Vec<String> {
        let agents = self.agents.read().unwrap();
        let mut names: Vec<String> = agents.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered identities
    pub fn len(&self) -> usize {
        self.agents.read().unwrap().len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.agents.read().unwrap().is_empty()
    }
}
