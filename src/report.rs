use crate::error::Result;
use crate::filter::QueryCandidates;
use itertools::Itertools;
use std::fmt::Write as _;

/// Text listing read by the verification step:
///
/// ```text
/// q # 1
/// c # 2 5 9
/// ```
pub fn to_text(results: &[QueryCandidates]) -> String {
    let mut out = String::new();
    for result in results {
        let _ = writeln!(out, "q # {}", result.query);
        let _ = writeln!(out, "c # {}", result.candidates.iter().join(" "));
    }
    out
}

pub fn to_json(results: &[QueryCandidates]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Mean survivors per stage over a query set
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageAverages {
    pub dominance: f64,
    pub edge_count: f64,
    pub neighborhood: f64,
}

pub fn stage_averages(results: &[QueryCandidates]) -> Option<StageAverages> {
    if results.is_empty() {
        return None;
    }
    let count = results.len() as f64;
    let mean = |stage: fn(&QueryCandidates) -> usize| {
        results.iter().map(stage).sum::<usize>() as f64 / count
    };
    Some(StageAverages {
        dominance: mean(|r| r.stages.dominance),
        edge_count: mean(|r| r.stages.edge_count),
        neighborhood: mean(|r| r.stages.neighborhood),
    })
}
