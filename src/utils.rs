/// Minimum number of graphs a pattern must occur in: floor(fraction * corpus_size)
pub fn min_support_count(fraction: f64, corpus_size: usize) -> usize {
    if !fraction.is_finite() || fraction <= 0.0 {
        return 0;
    }

    let count = (fraction * corpus_size as f64).floor();
    if count >= corpus_size as f64 {
        return corpus_size;
    }

    count as usize
}

/// Map a degree onto one of `buckets` degree bits; the last bucket absorbs everything larger
pub fn degree_bucket(degree: usize, buckets: usize) -> usize {
    degree.min(buckets.saturating_sub(1))
}

/// Logger used by the command-line tools, `RUST_LOG` overrides the `info` default
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
