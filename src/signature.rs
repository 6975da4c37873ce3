//! Per-node neighborhood signatures used by the last filter stage.
//!
//! A node's signature is its label plus the sorted labels of its distinct
//! neighbors. If a query embeds into a host graph, every query node maps to
//! a host node with the same label whose neighbor labels contain the query
//! node's neighbor labels as a multiset. The converse does not hold: nodes
//! are matched independently, so passing this test is necessary but not
//! sufficient for containment.

use crate::Graph;
use std::collections::HashMap;

/// Label of a node and the sorted labels of its neighbors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSignature<'g> {
    pub label: &'g str,
    pub neighbors: Vec<&'g str>,
}

/// Signatures of every node of a graph, in node id order
pub fn node_signatures(graph: &Graph) -> Vec<NodeSignature<'_>> {
    graph
        .adjacency()
        .into_iter()
        .filter_map(|(id, nbrs)| {
            let label = graph.label(id)?;
            let mut neighbors: Vec<&str> = nbrs.into_iter().filter_map(|n| graph.label(n)).collect();
            neighbors.sort_unstable();
            Some(NodeSignature { label, neighbors })
        })
        .collect()
}

/// True if the sorted sequence `needle` is a sub-multiset of the sorted sequence `haystack`.
///
/// Two-pointer merge: linear in the combined length.
pub fn is_sorted_submultiset<T: Ord>(needle: &[T], haystack: &[T]) -> bool {
    if needle.len() > haystack.len() {
        return false;
    }

    let (mut i, mut j) = (0, 0);
    while i < needle.len() {
        if j >= haystack.len() {
            return false;
        }
        match needle[i].cmp(&haystack[j]) {
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Less => return false,
        }
    }
    true
}

/// Host graph signatures grouped by node label, built once per database graph
#[derive(Debug, Clone, Default)]
pub struct SignatureIndex<'g> {
    by_label: HashMap<&'g str, Vec<Vec<&'g str>>>,
}

impl<'g> SignatureIndex<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let mut by_label: HashMap<&'g str, Vec<Vec<&'g str>>> = HashMap::new();
        for sig in node_signatures(graph) {
            by_label.entry(sig.label).or_default().push(sig.neighbors);
        }
        for bucket in by_label.values_mut() {
            bucket.sort_unstable();
            bucket.dedup();
        }
        SignatureIndex { by_label }
    }

    /// Some host node carries `sig.label` and dominates its neighbor labels
    pub fn covers_node(&self, sig: &NodeSignature<'_>) -> bool {
        self.by_label.get(sig.label).is_some_and(|candidates| {
            candidates
                .iter()
                .any(|host| is_sorted_submultiset(&sig.neighbors, host))
        })
    }

    /// Every query node is covered by at least one host node
    pub fn covers(&self, query: &[NodeSignature<'_>]) -> bool {
        query.iter().all(|sig| self.covers_node(sig))
    }
}
