//! Delegation graph and depth-bounded cycle search
//!
//! The graph holds one edge per distinct `(from, to)` pair, derived from each
//! identity's declared delegates and rule targets. Cycle detection is a
//! depth-bounded depth-first search, not a full-graph cycle check: the depth
//! bound is a configuration knob, and cycles longer than the bound are
//! deliberately not reported.

use crate::routing::rules::MetaAgentDefinition;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Directed graph of identity-to-identity delegation edges
#[derive(Debug, Clone, Default)]
pub struct DelegationGraph {
    /// Deduplicated adjacency, sorted for deterministic traversal
    edges: BTreeMap<String, BTreeSet<String>>,
    /// How many declarations produced each edge; diagnostics only
    multiplicity: BTreeMap<(String, String), u32>,
}

impl DelegationGraph {
    /// Build the graph from registered identity definitions: an edge `N -> D`
    /// for every declared delegate `D` and an edge `N -> T` for every rule
    /// target `T`.
    pub fn from_agents(agents: &BTreeMap<String, MetaAgentDefinition>) -> Self {
        let mut graph = Self::default();
        for (name, definition) in agents {
            for target in definition.referenced_identities() {
                graph.add_edge(name, target);
            }
        }
        graph
    }

    /// Add one declared edge, deduplicating but counting multiplicity
    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.edges
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
        *self
            .multiplicity
            .entry((from.to_string(), to.to_string()))
            .or_insert(0) += 1;
    }

    /// Iterate identities that have outgoing edges, with their targets
    pub fn edges(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.edges.iter().map(|(from, tos)| (from.as_str(), tos))
    }

    /// How many declarations produced the `(from, to)` edge
    pub fn multiplicity(&self, from: &str, to: &str) -> u32 {
        self.multiplicity
            .get(&(from.to_string(), to.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct edges
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Search for a path from `from` to `to` within `max_depth` hops.
    ///
    /// Returns the discovered path including both endpoints, or `None` if no
    /// path exists within the bound. The visited set is branch-local (cloned
    /// per recursive call), so independent branches never prune each other.
    /// Revisiting a node on the same branch is conservatively treated as
    /// arrival; this prevents unbounded recursion at the cost of occasionally
    /// over-reporting, which is acceptable for a validity check.
    pub fn find_path(&self, from: &str, to: &str, max_depth: u32) -> Option<Vec<String>> {
        self.search(from, to, max_depth, &HashSet::new())
    }

    fn search(
        &self,
        current: &str,
        target: &str,
        depth: u32,
        visited: &HashSet<String>,
    ) -> Option<Vec<String>> {
        if depth == 0 {
            return None;
        }
        if current == target || visited.contains(current) {
            return Some(vec![current.to_string()]);
        }

        let mut branch = visited.clone();
        branch.insert(current.to_string());

        for next in self.edges.get(current).into_iter().flatten() {
            if let Some(mut path) = self.search(next, target, depth - 1, &branch) {
                path.insert(0, current.to_string());
                return Some(path);
            }
        }

        None
    }
}
