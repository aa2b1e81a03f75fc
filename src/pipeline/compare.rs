use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::input::InputError;
use crate::input::scores::load_scores;
use crate::model::{MetricSummary, ScoreTable};
use crate::stats::kendall::kendall_tau_c;
use crate::stats::{pearson, rmse};

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("no common (t60, identifier) keys between the two score folders")]
    EmptyJoin,
    #[error("joined score table has {n} row(s); at least 2 are required")]
    InsufficientData { n: usize },
    #[error(transparent)]
    Input(#[from] InputError),
}

pub fn compare_folders(
    left: &Path,
    right: &Path,
    t60_range: Option<(f64, f64)>,
) -> Result<MetricSummary, CompareError> {
    let left_table = load_scores(left, t60_range)?;
    let right_table = load_scores(right, t60_range)?;
    compare_tables(&left_table, &right_table)
}

pub fn compare_tables(
    left: &ScoreTable,
    right: &ScoreTable,
) -> Result<MetricSummary, CompareError> {
    let joined = join_scores(left, right);
    if joined.pairs.is_empty() {
        return Err(CompareError::EmptyJoin);
    }
    let n = joined.pairs.len();
    if n < 2 {
        return Err(CompareError::InsufficientData { n });
    }
    info!(
        "joined {} score pairs from {} x {} rows ({} left-only keys, {} right-only keys dropped)",
        n,
        left.len(),
        right.len(),
        joined.left_only_keys,
        joined.right_only_keys
    );

    let x: Vec<f64> = joined.pairs.iter().map(|&(a, _)| a).collect();
    let y: Vec<f64> = joined.pairs.iter().map(|&(_, b)| b).collect();

    let pearson_r = pearson(&x, &y);
    if pearson_r.is_nan() {
        warn!("scores are constant on at least one side; Pearson correlation is undefined");
    }
    let kendall = kendall_tau_c(&x, &y);

    Ok(MetricSummary {
        pearson: pearson_r,
        kendall_tau: kendall.tau,
        kendall_p_value: kendall.p_value,
        rmse: rmse(&x, &y),
        n_pairs: n,
        left_only_keys: joined.left_only_keys,
        right_only_keys: joined.right_only_keys,
    })
}

struct JoinedScores {
    pairs: Vec<(f64, f64)>,
    left_only_keys: usize,
    right_only_keys: usize,
}

// Inner join on (t60, identifier). Duplicate keys multiply the join exactly
// like a dataframe merge would; pair order is fixed by sorting the left side.
fn join_scores(left: &ScoreTable, right: &ScoreTable) -> JoinedScores {
    let mut right_map: HashMap<(u64, &str), Vec<f64>> = HashMap::new();
    for record in &right.records {
        right_map
            .entry((record.t60.to_bits(), record.identifier.as_str()))
            .or_default()
            .push(record.score);
    }

    let mut left_sorted: Vec<_> = left.records.iter().collect();
    // T60 values are non-negative, so bit order matches numeric order.
    left_sorted.sort_by(|a, b| {
        (a.t60.to_bits(), a.identifier.as_str()).cmp(&(b.t60.to_bits(), b.identifier.as_str()))
    });

    let mut pairs = Vec::new();
    let mut matched: std::collections::HashSet<(u64, &str)> = std::collections::HashSet::new();
    let mut left_only = std::collections::HashSet::new();
    for record in left_sorted {
        let key = (record.t60.to_bits(), record.identifier.as_str());
        match right_map.get(&key) {
            Some(scores) => {
                matched.insert(key);
                for &s in scores {
                    pairs.push((record.score, s));
                }
            }
            None => {
                left_only.insert(key);
            }
        }
    }
    let right_only_keys = right_map.keys().filter(|k| !matched.contains(*k)).count();

    JoinedScores {
        pairs,
        left_only_keys: left_only.len(),
        right_only_keys,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/compare.rs"]
mod tests;
