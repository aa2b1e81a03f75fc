use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::input::{InputError, MeanScoreFile, find_mean_score_files, open_maybe_gz};
use crate::model::{ScoreRecord, ScoreTable};

// One flat (t60, identifier, score) table from every mean-score file in the
// folder. Files that cannot be read or parsed are skipped, not fatal.
pub fn load_scores(dir: &Path, t60_range: Option<(f64, f64)>) -> Result<ScoreTable, InputError> {
    let files = find_mean_score_files(dir)?;
    let mut table = ScoreTable::default();

    for file in &files {
        if let Some((lo, hi)) = t60_range {
            if file.t60 < lo || file.t60 > hi {
                continue;
            }
        }
        match read_score_file(file) {
            Ok((records, dropped)) => {
                debug!(
                    "loaded {}: {} rows ({} dropped)",
                    file.path.display(),
                    records.len(),
                    dropped
                );
                table.records.extend(records);
                table.rows_dropped += dropped;
                table.files_read += 1;
            }
            Err(err) => {
                warn!("skipping {}: {}", file.path.display(), err);
                table.files_skipped += 1;
            }
        }
    }

    if table.is_empty() {
        warn!("no usable score rows under {}", dir.display());
    }
    table.duplicate_keys = count_duplicate_keys(&table.records);
    if table.duplicate_keys > 0 {
        warn!(
            "{} duplicate (t60, identifier) keys in {}; joins will multiply them",
            table.duplicate_keys,
            dir.display()
        );
    }
    Ok(table)
}

// Rows are read without a header; the header line the mean-file writer emits
// fails the numeric score parse and drops out like any other bad row.
fn read_score_file(file: &MeanScoreFile) -> Result<(Vec<ScoreRecord>, usize), InputError> {
    let reader = open_maybe_gz(&file.path)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in csv_reader.records() {
        let row = row?;
        let identifier = match row.get(0).map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
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
        records.push(ScoreRecord {
            t60: file.t60,
            identifier,
            score,
        });
    }
    Ok((records, dropped))
}

fn count_duplicate_keys(records: &[ScoreRecord]) -> usize {
    let mut seen: HashSet<(u64, &str)> = HashSet::with_capacity(records.len());
    let mut duplicates = 0usize;
    for record in records {
        if !seen.insert((record.t60.to_bits(), record.identifier.as_str())) {
            duplicates += 1;
        }
    }
    duplicates
}
