use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use subgraph_candidate_filter::{
    build_schema, parser::parse_graph_file, utils::init_logging, SchemaConfig,
};

/// Mine the feature schema (labels, frequent edge patterns, max degree) from a graph corpus
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Graph corpus in transaction format (`t #`, `v`, `e` lines)
    graphs: PathBuf,

    /// Output path for the schema JSON
    output: PathBuf,

    /// Minimum fraction of graphs an edge pattern must occur in
    #[arg(short = 's', long, default_value_t = 0.10, value_parser = parse_fraction)]
    min_support: f64,

    /// Maximum number of edge patterns kept
    #[arg(short = 'k', long, default_value_t = 50)]
    top_k: usize,
}

fn parse_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not within [0, 1]"))
    }
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let corpus = parse_graph_file(&args.graphs)
        .with_context(|| format!("parse graph corpus {:?}", args.graphs))?;
    info!("Loaded {} graphs from {:?}", corpus.len(), args.graphs);

    let config = SchemaConfig {
        min_support: args.min_support,
        top_k: args.top_k,
    };
    let schema = build_schema(&corpus, &config);
    schema
        .save(&args.output)
        .with_context(|| format!("write schema to {:?}", args.output))?;

    println!(
        "Found {} frequent edge patterns (minsup={}), {} labels, max degree {}",
        schema.frequent_edge_patterns.len(),
        config.min_support,
        schema.node_labels.len(),
        schema.max_degree
    );
    Ok(())
}
