//! Feature schema mining.
//!
//! A schema is the shared vocabulary every feature vector is built against:
//! the sorted node labels of the training corpus, the most frequent
//! canonical edge patterns, and the largest node degree observed.

use crate::error::{FilterError, Result};
use crate::utils::min_support_count;
use crate::{EdgePattern, Graph, Label};
use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::ops::Range;
use std::path::Path;

/// Parameters of the schema mining step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaConfig {
    /// Fraction of the corpus a pattern must occur in
    pub min_support: f64,
    /// Maximum number of patterns kept
    pub top_k: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            min_support: 0.10,
            top_k: 50,
        }
    }
}

/// Largest `max_degree` a schema may carry. Each degree is one feature
/// column, so this also bounds the vector width.
pub const MAX_DEGREE_LIMIT: usize = 1 << 24;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub node_labels: Vec<Label>,
    pub frequent_edge_patterns: Vec<EdgePattern>,
    pub max_degree: usize,
}

impl Schema {
    pub fn num_degree_buckets(&self) -> usize {
        self.max_degree.saturating_add(1)
    }

    /// Feature vector width: labels, then patterns, then degree buckets.
    /// Saturates on schemas that `validate` would reject.
    pub fn width(&self) -> usize {
        self.degree_offset().saturating_add(self.num_degree_buckets())
    }

    pub fn pattern_offset(&self) -> usize {
        self.node_labels.len()
    }

    pub fn degree_offset(&self) -> usize {
        self.node_labels.len() + self.frequent_edge_patterns.len()
    }

    /// Feature positions of the degree buckets
    pub fn degree_range(&self) -> Range<usize> {
        self.degree_offset()..self.width()
    }

    /// Reject schemas whose indices would be ambiguous or whose width is unbounded
    pub fn validate(&self) -> Result<()> {
        if self.max_degree > MAX_DEGREE_LIMIT {
            return Err(FilterError::InvalidSchema(format!(
                "max degree {} exceeds the limit of {MAX_DEGREE_LIMIT}",
                self.max_degree
            )));
        }

        let mut labels = HashSet::new();
        for label in &self.node_labels {
            if !labels.insert(label) {
                return Err(FilterError::InvalidSchema(format!(
                    "duplicate node label {label:?}"
                )));
            }
        }

        let mut patterns = HashSet::new();
        for pattern in &self.frequent_edge_patterns {
            if !pattern.is_canonical() {
                return Err(FilterError::InvalidSchema(format!(
                    "edge pattern {pattern:?} is not canonical"
                )));
            }
            if !patterns.insert(pattern) {
                return Err(FilterError::InvalidSchema(format!(
                    "duplicate edge pattern {pattern:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let schema: Schema = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}

/// Mine a schema from a training corpus.
///
/// Pattern support is counted per graph, not per edge. Patterns with equal
/// support keep the order in which they were first seen while scanning the
/// corpus (graph order, then edge order), so the result is deterministic.
pub fn build_schema(corpus: &[Graph], config: &SchemaConfig) -> Schema {
    let mut support: IndexMap<EdgePattern, usize> = IndexMap::new();
    for graph in corpus {
        for pattern in graph.edge_patterns() {
            *support.entry(pattern).or_default() += 1;
        }
    }

    let min_count = min_support_count(config.min_support, corpus.len());
    let mut frequent: Vec<(EdgePattern, usize)> = support
        .into_iter()
        .filter(|(_, count)| *count >= min_count)
        .collect();
    // stable: ties stay in first-seen order
    frequent.sort_by(|a, b| b.1.cmp(&a.1));
    frequent.truncate(config.top_k);

    let node_labels: BTreeSet<&Label> = corpus.iter().flat_map(|g| g.nodes.values()).collect();

    let max_degree = corpus
        .iter()
        .flat_map(|g| g.stored_degrees().into_values())
        .max()
        .unwrap_or(0);

    let schema = Schema {
        node_labels: node_labels.into_iter().cloned().collect(),
        frequent_edge_patterns: frequent.into_iter().map(|(p, _)| p).collect(),
        max_degree,
    };

    info!(
        "Mined schema from {} graphs (min support count {}): {} labels, {} edge patterns, max degree {}",
        corpus.len(),
        min_count,
        schema.node_labels.len(),
        schema.frequent_edge_patterns.len(),
        schema.max_degree
    );
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(id: &str, labels: &[&str], edges: &[(usize, usize, &str)]) -> Graph {
        let mut g = Graph::new(id);
        for (i, label) in labels.iter().enumerate() {
            g.add_node(i, *label);
        }
        for &(u, v, label) in edges {
            assert!(g.add_edge(u, v, label));
        }
        g
    }

    #[test]
    fn test_support_counts_graphs_not_edges() {
        let corpus = vec![
            // one graph with many O-O edges
            graph(
                "0",
                &["O", "O", "O", "O"],
                &[(0, 1, "s"), (1, 2, "s"), (2, 3, "s")],
            ),
            graph("1", &["C", "N"], &[(0, 1, "b")]),
            graph("2", &["N", "C"], &[(0, 1, "b")]),
        ];
        let schema = build_schema(
            &corpus,
            &SchemaConfig {
                min_support: 0.5,
                top_k: 10,
            },
        );
        // min count = floor(1.5) = 1, C-b-N has support 2 and ranks first
        assert_eq!(
            schema.frequent_edge_patterns,
            vec![
                EdgePattern::canonical("C", "b", "N"),
                EdgePattern::canonical("O", "s", "O"),
            ]
        );
        assert_eq!(schema.node_labels, vec!["C", "N", "O"]);
        assert_eq!(schema.max_degree, 2);
    }

    #[test]
    fn test_threshold_and_top_k() {
        let corpus = vec![
            graph("0", &["A", "B"], &[(0, 1, "x")]),
            graph("1", &["A", "B"], &[(0, 1, "x")]),
            graph("2", &["A", "C"], &[(0, 1, "y")]),
            graph("3", &["A", "D"], &[(0, 1, "z")]),
        ];
        let schema = build_schema(
            &corpus,
            &SchemaConfig {
                min_support: 0.5,
                top_k: 10,
            },
        );
        assert_eq!(
            schema.frequent_edge_patterns,
            vec![EdgePattern::canonical("A", "x", "B")]
        );

        let schema = build_schema(
            &corpus,
            &SchemaConfig {
                min_support: 0.0,
                top_k: 2,
            },
        );
        // ties between y and z broken by first-seen order
        assert_eq!(
            schema.frequent_edge_patterns,
            vec![
                EdgePattern::canonical("A", "x", "B"),
                EdgePattern::canonical("A", "y", "C"),
            ]
        );
    }

    #[test]
    fn test_max_degree_counts_stored_parallel_edges() {
        let corpus = vec![graph("0", &["A", "B"], &[(0, 1, "x"), (1, 0, "x")])];
        let schema = build_schema(&corpus, &SchemaConfig::default());
        assert_eq!(schema.max_degree, 2);
        assert_eq!(schema.frequent_edge_patterns.len(), 1);
    }

    #[test]
    fn test_empty_corpus_gives_empty_schema() {
        let schema = build_schema(&[], &SchemaConfig::default());
        assert!(schema.node_labels.is_empty());
        assert!(schema.frequent_edge_patterns.is_empty());
        assert_eq!(schema.max_degree, 0);
        assert_eq!(schema.width(), 1);
    }

    #[test]
    fn test_ten_graph_corpus_keeps_single_occurrence_pattern() {
        let mut corpus: Vec<Graph> = (0..9)
            .map(|i| graph(&i.to_string(), &["C", "N"], &[]))
            .collect();
        corpus.push(graph("9", &["N", "C"], &[(0, 1, "b")]));
        let schema = build_schema(&corpus, &SchemaConfig::default());
        assert_eq!(
            schema.frequent_edge_patterns,
            vec![EdgePattern("C".into(), "b".into(), "N".into())]
        );
    }

    #[test]
    fn test_schema_is_deterministic() {
        let corpus = vec![
            graph("0", &["A", "B", "C"], &[(0, 1, "x"), (1, 2, "y"), (2, 0, "z")]),
            graph("1", &["C", "B", "A"], &[(0, 1, "y"), (1, 2, "x")]),
        ];
        let first = build_schema(&corpus, &SchemaConfig::default());
        let second = build_schema(&corpus, &SchemaConfig::default());
        assert_eq!(
            first.to_json_string().unwrap(),
            second.to_json_string().unwrap()
        );
    }

    #[test]
    fn test_json_round_trip_and_layout() {
        let schema = Schema {
            node_labels: vec!["C".into(), "N".into()],
            frequent_edge_patterns: vec![EdgePattern::canonical("N", "b", "C")],
            max_degree: 3,
        };
        let json = schema.to_json_string().unwrap();
        assert_eq!(
            json,
            r#"{"node_labels":["C","N"],"frequent_edge_patterns":[["C","b","N"]],"max_degree":3}"#
        );
        assert_eq!(Schema::from_json_str(&json).unwrap(), schema);
        assert_eq!(schema.width(), 2 + 1 + 4);
        assert_eq!(schema.pattern_offset(), 2);
        assert_eq!(schema.degree_offset(), 3);
        assert_eq!(schema.degree_range(), 3..7);
    }

    #[test]
    fn test_rejects_invalid_schema() {
        let non_canonical =
            r#"{"node_labels":["C","N"],"frequent_edge_patterns":[["N","b","C"]],"max_degree":1}"#;
        assert!(matches!(
            Schema::from_json_str(non_canonical),
            Err(FilterError::InvalidSchema(_))
        ));

        let duplicate = r#"{"node_labels":["C","C"],"frequent_edge_patterns":[],"max_degree":1}"#;
        assert!(Schema::from_json_str(duplicate).is_err());

        assert!(matches!(
            Schema::from_json_str("{"),
            Err(FilterError::Json(_))
        ));
    }

    #[test]
    fn test_rejects_unbounded_max_degree() {
        let overflowing = format!(
            r#"{{"node_labels":["C"],"frequent_edge_patterns":[],"max_degree":{}}}"#,
            usize::MAX
        );
        assert!(matches!(
            Schema::from_json_str(&overflowing),
            Err(FilterError::InvalidSchema(_))
        ));

        let huge = r#"{"node_labels":["C"],"frequent_edge_patterns":[],"max_degree":1000000000000000}"#;
        assert!(matches!(
            Schema::from_json_str(huge),
            Err(FilterError::InvalidSchema(_))
        ));

        let at_limit = Schema {
            node_labels: vec!["C".into()],
            frequent_edge_patterns: Vec::new(),
            max_degree: MAX_DEGREE_LIMIT,
        };
        assert!(at_limit.validate().is_ok());

        // built in code, never validated: width saturates instead of overflowing
        let unchecked = Schema {
            max_degree: usize::MAX,
            ..at_limit
        };
        assert_eq!(unchecked.width(), usize::MAX);
    }
}
