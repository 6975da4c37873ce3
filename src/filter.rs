//! Candidate filter cascade.
//!
//! Each query is screened against every database graph with three tests of
//! increasing cost: feature dominance, an edge count bound, and the
//! neighborhood signature check. A database graph that could contain the
//! query is never rejected; graphs that survive may still be false positives.

use crate::error::{FilterError, Result};
use crate::schema::Schema;
use crate::signature::{node_signatures, SignatureIndex};
use crate::vectorize::{FeatureMatrix, FeatureVector};
use crate::Graph;
use log::debug;
use rayon::prelude::*;
use serde::Serialize;

/// Survivors after each stage of the cascade for one query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub dominance: usize,
    pub edge_count: usize,
    pub neighborhood: usize,
}

/// Candidates of one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryCandidates {
    /// 1-based query position
    pub query: usize,
    pub query_id: String,
    /// 1-based database positions, ascending
    pub candidates: Vec<usize>,
    pub stages: StageCounts,
}

/// Checks that a set of vectors was built with `schema` and lines up with its graphs
fn check_inputs(
    what: &'static str,
    schema: &Schema,
    graphs: &[Graph],
    vectors: &FeatureMatrix,
) -> Result<()> {
    let expected = schema.width();
    if vectors.width() != expected {
        return Err(FilterError::SchemaMismatch {
            source_name: what,
            row: 0,
            expected,
            actual: vectors.width(),
        });
    }
    if let Some((row, v)) = vectors
        .rows()
        .iter()
        .enumerate()
        .find(|(_, v)| v.width() != expected)
    {
        return Err(FilterError::SchemaMismatch {
            source_name: what,
            row: row + 1,
            expected,
            actual: v.width(),
        });
    }
    if graphs.len() != vectors.len() {
        return Err(FilterError::CountMismatch {
            what,
            graphs: graphs.len(),
            vectors: vectors.len(),
        });
    }
    Ok(())
}

/// A validated database, ready to answer queries
pub struct CandidateFilter<'a> {
    schema: &'a Schema,
    vectors: &'a [FeatureVector],
    /// Label and pattern positions, compared bit by bit
    presence_mask: FeatureVector,
    /// Highest degree bucket present in each database vector
    top_degrees: Vec<Option<usize>>,
    edge_counts: Vec<usize>,
    signatures: Vec<SignatureIndex<'a>>,
}

impl<'a> CandidateFilter<'a> {
    /// Fails fast if the schema is invalid or the database vectors do not
    /// match the schema or the graphs
    pub fn new(schema: &'a Schema, graphs: &'a [Graph], vectors: &'a FeatureMatrix) -> Result<Self> {
        schema.validate()?;
        check_inputs("database", schema, graphs, vectors)?;

        let (edge_counts, signatures): (Vec<usize>, Vec<SignatureIndex<'a>>) = graphs
            .par_iter()
            .map(|g| (g.edge_count(), SignatureIndex::new(g)))
            .unzip();

        let mut presence_mask = FeatureVector::zeros(schema.width());
        for i in 0..schema.degree_offset() {
            presence_mask.set(i);
        }
        let top_degrees = vectors
            .rows()
            .iter()
            .map(|v| v.last_set_in(schema.degree_range()))
            .collect();

        Ok(CandidateFilter {
            schema,
            vectors: vectors.rows(),
            presence_mask,
            top_degrees,
            edge_counts,
            signatures,
        })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Stage 1: database positions whose features dominate the query's.
    ///
    /// Label and pattern bits must be dominated position by position. The
    /// degree buckets are not: a bit-by-bit test over them would reject real
    /// hosts, since a query node of degree d can sit on a host node of any
    /// degree >= d (a lone isolated query node sets bucket 0 even when the
    /// host has no isolated node). Instead the query's highest set bucket must
    /// not exceed the host's.
    pub fn dominance_stage(&self, query_vector: &FeatureVector) -> Vec<usize> {
        let query_top = query_vector.last_set_in(self.schema.degree_range());
        self.vectors
            .iter()
            .zip(&self.top_degrees)
            .enumerate()
            .filter(|(_, (db, db_top))| {
                query_top <= **db_top
                    && query_vector.is_dominated_by_masked(db, &self.presence_mask)
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Stage 2: drop hosts with fewer edges than the query
    pub fn edge_count_stage(&self, query: &Graph, survivors: &[usize]) -> Vec<usize> {
        let needed = query.edge_count();
        survivors
            .iter()
            .copied()
            .filter(|&idx| self.edge_counts[idx] >= needed)
            .collect()
    }

    /// Stage 3: every query node needs a host node with a dominating neighborhood
    pub fn neighborhood_stage(&self, query: &Graph, survivors: &[usize]) -> Vec<usize> {
        let query_sigs = node_signatures(query);
        survivors
            .iter()
            .copied()
            .filter(|&idx| self.signatures[idx].covers(&query_sigs))
            .collect()
    }

    /// Run the cascade for one query. `query` is the 1-based query position
    /// used in the result.
    pub fn filter_query(
        &self,
        query: usize,
        graph: &Graph,
        vector: &FeatureVector,
    ) -> QueryCandidates {
        let initial = self.dominance_stage(vector);
        let by_edges = self.edge_count_stage(graph, &initial);
        let survivors = self.neighborhood_stage(graph, &by_edges);

        let stages = StageCounts {
            dominance: initial.len(),
            edge_count: by_edges.len(),
            neighborhood: survivors.len(),
        };
        debug!(
            "Query {}: {} initial -> {} by edge count -> {} filtered",
            query, stages.dominance, stages.edge_count, stages.neighborhood
        );

        // survivors keep database order, so the ids are already ascending
        QueryCandidates {
            query,
            query_id: graph.id.clone(),
            candidates: survivors.into_iter().map(|idx| idx + 1).collect(),
            stages,
        }
    }

    /// Filter a whole query set in parallel. Results are in query order.
    pub fn filter_all(
        &self,
        queries: &[Graph],
        query_vectors: &FeatureMatrix,
    ) -> Result<Vec<QueryCandidates>> {
        check_inputs("query", self.schema, queries, query_vectors)?;

        Ok(queries
            .par_iter()
            .zip(query_vectors.rows().par_iter())
            .enumerate()
            .map(|(idx, (graph, vector))| self.filter_query(idx + 1, graph, vector))
            .collect())
    }
}

/// Candidate sets for every query, in query order. Query inputs are checked
/// by `filter_all` once the database side has been validated.
pub fn filter_candidates(
    db_graphs: &[Graph],
    db_vectors: &FeatureMatrix,
    query_graphs: &[Graph],
    query_vectors: &FeatureMatrix,
    schema: &Schema,
) -> Result<Vec<QueryCandidates>> {
    CandidateFilter::new(schema, db_graphs, db_vectors)?.filter_all(query_graphs, query_vectors)
}
