use std::collections::BTreeMap;
use std::path::Path;

use tracing::warn;

use crate::input::{InputError, find_mean_score_files, open_maybe_gz};

// Per-T60 sample vectors of the mean_score column, ascending by T60. These
// files carry a header, unlike the flat loader's view of the same data.
pub fn load_t60_groups(dir: &Path) -> Result<Vec<(f64, Vec<f64>)>, InputError> {
    let files = find_mean_score_files(dir)?;
    let mut groups: Vec<(f64, Vec<f64>)> = Vec::new();

    for file in &files {
        if groups.iter().any(|(t60, _)| t60.to_bits() == file.t60.to_bits()) {
            warn!(
                "duplicate T60 {} in {}; keeping the first file",
                file.stem,
                dir.display()
            );
            continue;
        }
        match read_column(&file.path, "mean_score") {
            Ok(values) if values.is_empty() => {
                warn!("no usable mean_score rows in {}", file.path.display());
            }
            Ok(values) => groups.push((file.t60, values)),
            Err(err) => warn!("skipping {}: {}", file.path.display(), err),
        }
    }
    Ok(groups)
}

#[derive(Debug, Clone)]
pub struct RirMeans {
    pub t60_label: String,
    pub t60: f64,
    pub by_rir: BTreeMap<String, f64>,
}

// (rir -> mean_score) per file, for the scatter view. Later rows win on a
// repeated rir.
pub fn load_rir_means(dir: &Path) -> Result<Vec<RirMeans>, InputError> {
    let files = find_mean_score_files(dir)?;
    let mut out = Vec::new();

    for file in &files {
        match read_rir_means(&file.path) {
            Ok(by_rir) if by_rir.is_empty() => {
                warn!("no usable rows in {}", file.path.display());
            }
            Ok(by_rir) => out.push(RirMeans {
                t60_label: file.stem.clone(),
                t60: file.t60,
                by_rir,
            }),
            Err(err) => warn!("skipping {}: {}", file.path.display(), err),
        }
    }
    Ok(out)
}

fn read_column(path: &Path, column: &str) -> Result<Vec<f64>, InputError> {
    let reader = open_maybe_gz(path)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let col = headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| {
            InputError::InvalidInput(format!("{}: no {} column", path.display(), column))
        })?;

    let mut values = Vec::new();
    let mut dropped = 0usize;
    for row in csv_reader.records() {
        let row = row?;
        match row.get(col).and_then(|s| s.trim().parse::<f64>().ok()) {
            Some(v) if v.is_finite() => values.push(v),
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!(
            "dropped {} non-numeric {} rows in {}",
            dropped,
            column,
            path.display()
        );
    }
    Ok(values)
}

fn read_rir_means(path: &Path) -> Result<BTreeMap<String, f64>, InputError> {
    let reader = open_maybe_gz(path)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let rir_col = headers
        .iter()
        .position(|h| h.trim() == "rir")
        .ok_or_else(|| InputError::InvalidInput(format!("{}: no rir column", path.display())))?;
    let score_col = headers
        .iter()
        .position(|h| h.trim() == "mean_score")
        .ok_or_else(|| {
            InputError::InvalidInput(format!("{}: no mean_score column", path.display()))
        })?;

    let mut by_rir = BTreeMap::new();
    for row in csv_reader.records() {
        let row = row?;
        let rir = match row.get(rir_col).map(str::trim) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => continue,
        };
        if let Some(score) = row.get(score_col).and_then(|s| s.trim().parse::<f64>().ok()) {
            if score.is_finite() {
                by_rir.insert(rir, score);
            }
        }
    }
    Ok(by_rir)
}
