use crate::error::Result;
use crate::schema::Schema;
use crate::utils::degree_bucket;
use crate::{EdgePattern, Graph};
use itertools::Itertools;
use log::info;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::ops::Range;
use std::path::Path;

const WORD_BITS: usize = 64;

/// Fixed-width presence/absence signature of one graph, packed into u64 words
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureVector {
    width: usize,
    words: Vec<u64>,
}

impl FeatureVector {
    pub fn zeros(width: usize) -> Self {
        FeatureVector {
            width,
            words: vec![0; width.div_ceil(WORD_BITS)],
        }
    }

    pub fn from_bits(bits: &[bool]) -> Self {
        let mut vector = Self::zeros(bits.len());
        for (i, &bit) in bits.iter().enumerate() {
            if bit {
                vector.set(i);
            }
        }
        vector
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// # Panics
    /// If `index` is outside the vector width.
    pub fn set(&mut self, index: usize) {
        assert!(index < self.width, "feature index {index} out of range");
        self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
    }

    pub fn get(&self, index: usize) -> bool {
        index < self.width && self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.width).map(|i| self.get(i))
    }

    /// True if every feature set here is also set in `other`.
    /// Vectors of different widths never dominate each other.
    pub fn is_dominated_by(&self, other: &FeatureVector) -> bool {
        self.width == other.width
            && self
                .words
                .iter()
                .zip(&other.words)
                .all(|(&mine, &theirs)| mine & !theirs == 0)
    }

    /// Dominance restricted to the positions set in `mask`
    pub fn is_dominated_by_masked(&self, other: &FeatureVector, mask: &FeatureVector) -> bool {
        self.width == other.width
            && self.width == mask.width
            && self
                .words
                .iter()
                .zip(&other.words)
                .zip(&mask.words)
                .all(|((&mine, &theirs), &m)| mine & m & !theirs == 0)
    }

    /// Highest set position inside `range`
    pub fn last_set_in(&self, range: Range<usize>) -> Option<usize> {
        range.rev().find(|&i| self.get(i))
    }
}

/// Rows of feature vectors sharing one width
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureMatrix {
    width: usize,
    rows: Vec<FeatureVector>,
}

impl FeatureMatrix {
    pub fn new(width: usize) -> Self {
        FeatureMatrix {
            width,
            rows: Vec::new(),
        }
    }

    /// Wrap already built vectors. Row widths are checked against the schema
    /// when the matrix is handed to a filter, not here.
    pub fn from_rows(width: usize, rows: Vec<FeatureVector>) -> Self {
        FeatureMatrix { width, rows }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn push(&mut self, row: FeatureVector) {
        self.rows.push(row);
    }

    /// Text form: `<rows> <cols>` header, then one line of 0/1 cells per row
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {}", self.rows.len(), self.width);
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{}",
                row.bits().map(|bit| if bit { '1' } else { '0' }).join(" ")
            );
        }
        out
    }

    pub fn load(path: &Path) -> Result<Self> {
        crate::parser::parse_matrix_file(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_text())?;
        Ok(())
    }
}

/// Embeds graphs into the feature space of one schema
#[derive(Debug, Clone)]
pub struct Vectorizer<'s> {
    schema: &'s Schema,
    label_index: HashMap<&'s str, usize>,
    pattern_index: HashMap<&'s EdgePattern, usize>,
}

impl<'s> Vectorizer<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        let label_index = schema
            .node_labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.as_str(), i))
            .collect();
        let pattern_index = schema
            .frequent_edge_patterns
            .iter()
            .enumerate()
            .map(|(i, pattern)| (pattern, i))
            .collect();
        Vectorizer {
            schema,
            label_index,
            pattern_index,
        }
    }

    pub fn width(&self) -> usize {
        self.schema.width()
    }

    /// Labels and patterns unknown to the schema are ignored
    pub fn vectorize_graph(&self, graph: &Graph) -> FeatureVector {
        let mut vector = FeatureVector::zeros(self.width());

        for label in graph.nodes.values() {
            if let Some(&i) = self.label_index.get(label.as_str()) {
                vector.set(i);
            }
        }

        let pattern_offset = self.schema.pattern_offset();
        for pattern in graph.edge_patterns() {
            if let Some(&i) = self.pattern_index.get(&pattern) {
                vector.set(pattern_offset + i);
            }
        }

        let degree_offset = self.schema.degree_offset();
        let buckets = self.schema.num_degree_buckets();
        for degree in graph.simple_degrees().into_values() {
            vector.set(degree_offset + degree_bucket(degree, buckets));
        }

        vector
    }

    /// Vectorize a batch in parallel, preserving input order
    pub fn vectorize(&self, graphs: &[Graph]) -> FeatureMatrix {
        let rows: Vec<FeatureVector> = graphs
            .par_iter()
            .map(|graph| self.vectorize_graph(graph))
            .collect();
        info!(
            "Vectorized {} graphs into {} features",
            rows.len(),
            self.width()
        );
        FeatureMatrix::from_rows(self.width(), rows)
    }
}

/// One feature vector per graph, in input order
pub fn vectorize(graphs: &[Graph], schema: &Schema) -> FeatureMatrix {
    Vectorizer::new(schema).vectorize(graphs)
}
