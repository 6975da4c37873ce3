use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use subgraph_candidate_filter::{
    parser::parse_graph_file, utils::init_logging, Schema, Vectorizer,
};

/// Encode every graph as a binary presence vector over a schema's features
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Graph file in transaction format
    graphs: PathBuf,

    /// Schema JSON produced by identify-features
    schema: PathBuf,

    /// Output path for the feature matrix
    output: PathBuf,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let schema =
        Schema::load(&args.schema).with_context(|| format!("load schema {:?}", args.schema))?;
    let graphs = parse_graph_file(&args.graphs)
        .with_context(|| format!("parse graphs {:?}", args.graphs))?;

    let matrix = Vectorizer::new(&schema).vectorize(&graphs);
    matrix
        .save(&args.output)
        .with_context(|| format!("write feature matrix to {:?}", args.output))?;

    println!(
        "Vectorized {} graphs ({} features: {} labels, {} edge patterns, {} degree buckets)",
        matrix.len(),
        schema.width(),
        schema.node_labels.len(),
        schema.frequent_edge_patterns.len(),
        schema.num_degree_buckets()
    );
    Ok(())
}
