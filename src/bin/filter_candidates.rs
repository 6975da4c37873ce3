use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Instant;
use subgraph_candidate_filter::{
    parser::parse_graph_file, report, utils::init_logging, CandidateFilter, FeatureMatrix, Schema,
};

/// Screen a graph database for candidate containers of each query graph
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Feature matrix of the database graphs
    db_vectors: PathBuf,

    /// Feature matrix of the query graphs
    query_vectors: PathBuf,

    /// Database graphs in transaction format
    db_graphs: PathBuf,

    /// Query graphs in transaction format
    query_graphs: PathBuf,

    /// Output path for the candidate listing
    output: PathBuf,

    /// Schema both matrices were built with
    #[arg(short, long)]
    schema: PathBuf,

    /// Write the listing as JSON with per-stage counts
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    info!("Loading indices and graphs...");
    let schema =
        Schema::load(&args.schema).with_context(|| format!("load schema {:?}", args.schema))?;
    let db_vectors = FeatureMatrix::load(&args.db_vectors)
        .with_context(|| format!("load database vectors {:?}", args.db_vectors))?;
    let query_vectors = FeatureMatrix::load(&args.query_vectors)
        .with_context(|| format!("load query vectors {:?}", args.query_vectors))?;
    let db_graphs = parse_graph_file(&args.db_graphs)
        .with_context(|| format!("parse database graphs {:?}", args.db_graphs))?;
    let query_graphs = parse_graph_file(&args.query_graphs)
        .with_context(|| format!("parse query graphs {:?}", args.query_graphs))?;

    let start = Instant::now();
    let filter = CandidateFilter::new(&schema, &db_graphs, &db_vectors)
        .context("prepare database for filtering")?;
    let results = filter
        .filter_all(&query_graphs, &query_vectors)
        .context("filter queries")?;
    let elapsed = start.elapsed();

    let listing = if args.json {
        report::to_json(&results)?
    } else {
        report::to_text(&results)
    };
    std::fs::write(&args.output, listing)
        .with_context(|| format!("write candidates to {:?}", args.output))?;

    if let Some(avg) = report::stage_averages(&results) {
        info!(
            "Average survivors over {} queries: dominance {:.2}, edge count {:.2}, neighborhood {:.2}",
            results.len(),
            avg.dominance,
            avg.edge_count,
            avg.neighborhood
        );
    }
    println!(
        "Filtered {} queries against {} graphs in {:.3}s",
        results.len(),
        filter.len(),
        elapsed.as_secs_f64()
    );
    Ok(())
}
