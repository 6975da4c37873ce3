use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Node identifier inside a single graph
pub type NodeId = usize;

/// Opaque node or edge label, compared lexicographically
pub type Label = String;

/// An undirected labeled edge as stored in the input record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub u: NodeId,
    pub v: NodeId,
    pub label: Label,
}

/// Canonical undirected edge type: (low endpoint label, edge label, high endpoint label).
///
/// Serialized as a three element array, e.g. `["C", "b", "N"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgePattern(pub Label, pub Label, pub Label);

impl EdgePattern {
    /// Build the orientation independent pattern for an edge between `a` and `b`
    pub fn canonical(a: &str, edge: &str, b: &str) -> Self {
        if a > b {
            EdgePattern(b.to_string(), edge.to_string(), a.to_string())
        } else {
            EdgePattern(a.to_string(), edge.to_string(), b.to_string())
        }
    }

    pub fn is_canonical(&self) -> bool {
        self.0 <= self.2
    }
}

/// A labeled undirected multigraph, immutable once parsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    pub id: String,
    /// Node id -> node label
    pub nodes: BTreeMap<NodeId, Label>,
    /// Edges in input order; parallel edges are kept as stored
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(id: impl Into<String>) -> Self {
        Graph {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Insert a node. Returns `false` if the id was already present.
    pub fn add_node(&mut self, id: NodeId, label: impl Into<Label>) -> bool {
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.nodes.insert(id, label.into());
        true
    }

    /// Insert an edge. Returns `false` if either endpoint is unknown.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, label: impl Into<Label>) -> bool {
        if !self.nodes.contains_key(&u) || !self.nodes.contains_key(&v) {
            return false;
        }
        self.edges.push(Edge {
            u,
            v,
            label: label.into(),
        });
        true
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(String::as_str)
    }

    /// Number of distinct undirected endpoint pairs
    pub fn edge_count(&self) -> usize {
        self.edges
            .iter()
            .map(|e| (e.u.min(e.v), e.u.max(e.v)))
            .collect::<HashSet<_>>()
            .len()
    }

    /// Canonical patterns present in the graph, in first-seen edge order
    pub fn edge_patterns(&self) -> IndexSet<EdgePattern> {
        self.edges
            .iter()
            .filter_map(|e| {
                let a = self.label(e.u)?;
                let b = self.label(e.v)?;
                Some(EdgePattern::canonical(a, &e.label, b))
            })
            .collect()
    }

    /// Degree of every node counting each stored edge once per endpoint
    pub fn stored_degrees(&self) -> BTreeMap<NodeId, usize> {
        let mut degrees: BTreeMap<NodeId, usize> = self.nodes.keys().map(|&id| (id, 0)).collect();
        for e in &self.edges {
            *degrees.entry(e.u).or_default() += 1;
            *degrees.entry(e.v).or_default() += 1;
        }
        degrees
    }

    /// Degree of every node after dropping duplicate (min, max, label) edge records
    pub fn simple_degrees(&self) -> BTreeMap<NodeId, usize> {
        let mut degrees: BTreeMap<NodeId, usize> = self.nodes.keys().map(|&id| (id, 0)).collect();
        let mut seen = HashSet::new();
        for e in &self.edges {
            if !seen.insert((e.u.min(e.v), e.u.max(e.v), e.label.as_str())) {
                continue;
            }
            *degrees.entry(e.u).or_default() += 1;
            *degrees.entry(e.v).or_default() += 1;
        }
        degrees
    }

    /// Distinct neighbors of every node. A self-loop makes a node its own neighbor.
    pub fn adjacency(&self) -> BTreeMap<NodeId, BTreeSet<NodeId>> {
        let mut adj: BTreeMap<NodeId, BTreeSet<NodeId>> =
            self.nodes.keys().map(|&id| (id, BTreeSet::new())).collect();
        for e in &self.edges {
            adj.entry(e.u).or_default().insert(e.v);
            adj.entry(e.v).or_default().insert(e.u);
        }
        adj
    }
}

// Module declarations
pub mod error;
pub mod filter;
pub mod parser;
pub mod report;
pub mod schema;
pub mod signature;
pub mod utils;
pub mod vectorize;

pub use error::{FilterError, Result};
pub use filter::{filter_candidates, CandidateFilter, QueryCandidates, StageCounts};
pub use schema::{build_schema, Schema, SchemaConfig};
pub use vectorize::{vectorize, FeatureMatrix, FeatureVector, Vectorizer};

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_with_duplicate() -> Graph {
        let mut g = Graph::new("t");
        g.add_node(0, "C");
        g.add_node(1, "N");
        g.add_node(2, "C");
        g.add_edge(0, 1, "b");
        g.add_edge(1, 0, "b");
        g.add_edge(1, 2, "b");
        g.add_edge(2, 0, "a");
        g
    }

    #[test]
    fn test_graph_creation() {
        let g = triangle_with_duplicate();
        assert_eq!(g.num_nodes(), 3);
        assert_eq!(g.edges.len(), 4);
        assert_eq!(g.label(1), Some("N"));
        assert_eq!(g.label(7), None);
    }

    #[test]
    fn test_rejects_bad_nodes_and_edges() {
        let mut g = triangle_with_duplicate();
        assert!(!g.add_node(0, "X"));
        assert!(!g.add_edge(0, 9, "b"));
        assert_eq!(g.edges.len(), 4);
    }

    #[test]
    fn test_canonical_pattern_is_orientation_free() {
        assert_eq!(
            EdgePattern::canonical("N", "b", "C"),
            EdgePattern::canonical("C", "b", "N")
        );
        assert!(EdgePattern::canonical("N", "b", "C").is_canonical());
        assert!(!EdgePattern("N".into(), "b".into(), "C".into()).is_canonical());
    }

    #[test]
    fn test_edge_patterns_deduplicated_in_first_seen_order() {
        let g = triangle_with_duplicate();
        let patterns: Vec<_> = g.edge_patterns().into_iter().collect();
        assert_eq!(
            patterns,
            vec![
                EdgePattern::canonical("C", "b", "N"),
                EdgePattern::canonical("C", "a", "C"),
            ]
        );
    }

    #[test]
    fn test_degrees() {
        let g = triangle_with_duplicate();
        let stored = g.stored_degrees();
        assert_eq!(stored[&0], 3);
        assert_eq!(stored[&1], 3);
        assert_eq!(stored[&2], 2);

        let simple = g.simple_degrees();
        assert_eq!(simple[&0], 2);
        assert_eq!(simple[&1], 2);
        assert_eq!(simple[&2], 2);
    }

    #[test]
    fn test_edge_count_ignores_parallel_edges() {
        let g = triangle_with_duplicate();
        assert_eq!(g.edge_count(), 3);
        assert_eq!(Graph::new("empty").edge_count(), 0);
    }

    #[test]
    fn test_isolated_nodes_have_empty_adjacency() {
        let mut g = Graph::new("iso");
        g.add_node(0, "C");
        g.add_node(1, "C");
        g.add_edge(1, 1, "s");
        let adj = g.adjacency();
        assert!(adj[&0].is_empty());
        assert_eq!(adj[&1].iter().copied().collect::<Vec<_>>(), vec![1]);
    }
}
