use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::input::{InputError, MEAN_SUFFIX, open_maybe_gz};

#[derive(Debug, Clone, Default)]
pub struct AggregateReport {
    pub files_written: usize,
    pub files_skipped: usize,
    pub rows_dropped: usize,
}

// Collapses raw per-file score CSVs into the per-RIR mean files every other
// command consumes. Error rows from the batch scorer fail the numeric parse
// and are dropped from the averages.
pub fn aggregate_scores(scores_dir: &Path, out_dir: &Path) -> Result<AggregateReport, InputError> {
    let files = find_raw_score_files(scores_dir)?;
    if files.is_empty() {
        warn!("no raw score files in {}", scores_dir.display());
    }
    std::fs::create_dir_all(out_dir)?;

    let mut report = AggregateReport::default();
    let mut written: Vec<String> = Vec::new();
    for (path, t60_token) in &files {
        match read_raw_scores(path) {
            Ok((groups, dropped)) if groups.is_empty() => {
                warn!("no numeric rows in {}; nothing to aggregate", path.display());
                report.files_skipped += 1;
                report.rows_dropped += dropped;
            }
            Ok((groups, dropped)) => {
                if written.contains(t60_token) {
                    warn!(
                        "multiple raw files share T60 token {}; overwriting earlier output",
                        t60_token
                    );
                }
                let out_path = out_dir.join(format!("{}{}", t60_token, MEAN_SUFFIX));
                write_mean_file(&out_path, &groups)?;
                info!(
                    "aggregated {} -> {} ({} RIRs, {} rows dropped)",
                    path.display(),
                    out_path.display(),
                    groups.len(),
                    dropped
                );
                written.push(t60_token.clone());
                report.files_written += 1;
                report.rows_dropped += dropped;
            }
            Err(err) => {
                warn!("skipping {}: {}", path.display(), err);
                report.files_skipped += 1;
            }
        }
    }
    Ok(report)
}

// Raw files are named <t60>_<metric>_scores.csv; the leading token is the
// T60 folder they came from.
fn find_raw_score_files(dir: &Path) -> Result<Vec<(PathBuf, String)>, InputError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with("_scores.csv") || name.ends_with(MEAN_SUFFIX) {
            continue;
        }
        let Some(token) = name.split('_').next().filter(|t| !t.is_empty()) else {
            continue;
        };
        if token.parse::<f64>().is_err() {
            warn!("skipping {}: leading token is not a T60 value", name);
            continue;
        }
        files.push((entry.path(), token.to_string()));
    }
    files.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    Ok(files)
}

fn read_raw_scores(path: &Path) -> Result<(BTreeMap<String, Vec<f64>>, usize), InputError> {
    let reader = open_maybe_gz(path)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut dropped = 0usize;
    for row in csv_reader.records() {
        let row = row?;
        let record_name = match row.get(0).map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => {
                dropped += 1;
                continue;
            }
        };
        let score = match row.get(1).and_then(|s| s.trim().parse::<f64>().ok()) {
            Some(v) if !v.is_nan() => v,
            _ => {
                dropped += 1;
                continue;
            }
        };
        let rir = match record_name.split_once('/') {
            Some((rir, _)) => rir,
            None => record_name,
        };
        groups.entry(rir.to_string()).or_default().push(score);
    }
    Ok((groups, dropped))
}

fn write_mean_file(path: &Path, groups: &BTreeMap<String, Vec<f64>>) -> Result<(), InputError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["rir", "mean_score", "count"])?;
    for (rir, scores) in groups {
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        writer.write_record([rir.clone(), mean.to_string(), scores.len().to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/aggregate.rs"]
mod tests;
