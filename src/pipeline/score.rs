use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::input::audio::read_waveform;
use crate::input::{InputError, leaf_name, list_subdirs, list_wav_files};
use crate::metric::{MetricError, Scorer, prep};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("{rir_dir}: {n_clean} clean files vs {n_degraded} degraded files")]
    CountMismatch {
        rir_dir: String,
        n_clean: usize,
        n_degraded: usize,
    },
}

#[derive(Debug, Error)]
enum PairError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Metric(#[from] MetricError),
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub folders_done: usize,
    pub folders_failed: usize,
    pub pairs_scored: usize,
    pub pair_errors: usize,
}

#[derive(Debug, Default)]
struct FolderStats {
    scored: usize,
    errors: usize,
}

// One task per T60 folder; each task owns its output file outright, so the
// tasks share nothing and a failed folder never stops the others.
pub fn run_batch(
    clean_dir: &Path,
    degraded_base: &Path,
    out_dir: &Path,
    scorer: &dyn Scorer,
) -> Result<BatchReport, BatchError> {
    let clean_files = list_wav_files(clean_dir)?;
    if clean_files.is_empty() {
        warn!("no .wav files in clean folder {}", clean_dir.display());
    }
    let t60_dirs = list_subdirs(degraded_base)?;
    if t60_dirs.is_empty() {
        warn!("no T60 folders under {}", degraded_base.display());
    }
    std::fs::create_dir_all(out_dir)?;

    let results: Vec<(String, Result<FolderStats, BatchError>)> = t60_dirs
        .into_par_iter()
        .map(|t60_dir| {
            let name = leaf_name(&t60_dir);
            let outcome = score_t60_folder(&clean_files, &t60_dir, out_dir, scorer);
            (name, outcome)
        })
        .collect();

    let mut report = BatchReport::default();
    for (name, outcome) in results {
        match outcome {
            Ok(stats) => {
                report.folders_done += 1;
                report.pairs_scored += stats.scored;
                report.pair_errors += stats.errors;
            }
            Err(err) => {
                report.folders_failed += 1;
                error!("T60 folder {} failed: {}", name, err);
            }
        }
    }
    Ok(report)
}

fn score_t60_folder(
    clean_files: &[PathBuf],
    t60_dir: &Path,
    out_dir: &Path,
    scorer: &dyn Scorer,
) -> Result<FolderStats, BatchError> {
    let t60_name = leaf_name(t60_dir);
    let out_path = out_dir.join(format!("{}_{}_scores.csv", t60_name, scorer.id()));
    let rir_dirs = list_subdirs(t60_dir)?;
    let mut stats = FolderStats::default();

    for rir_dir in &rir_dirs {
        let rir_name = leaf_name(rir_dir);
        let degraded_files = list_wav_files(rir_dir)?;
        // Pairing is positional over sorted names; a count mismatch means the
        // corpus is broken and must fail before any pair is scored.
        if degraded_files.len() != clean_files.len() {
            return Err(BatchError::CountMismatch {
                rir_dir: rir_name,
                n_clean: clean_files.len(),
                n_degraded: degraded_files.len(),
            });
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&out_path)?;
        let mut writer = csv::Writer::from_writer(file);

        for (clean_path, degraded_path) in clean_files.iter().zip(&degraded_files) {
            let record_name = format!("{}/{}", rir_name, leaf_name(degraded_path));
            match score_pair(clean_path, degraded_path, scorer) {
                Ok(score) => {
                    writer.write_record([record_name.as_str(), score.to_string().as_str()])?;
                    info!("scored {}: {}={:.4}", record_name, scorer.id(), score);
                    stats.scored += 1;
                }
                Err(err) => {
                    let message = format!("Error: {}", err);
                    warn!("{}: {}", record_name, message);
                    writer.write_record([record_name.as_str(), message.as_str()])?;
                    stats.errors += 1;
                }
            }
        }
        writer.flush()?;
    }
    Ok(stats)
}

fn score_pair(
    clean_path: &Path,
    degraded_path: &Path,
    scorer: &dyn Scorer,
) -> Result<f64, PairError> {
    let clean = read_waveform(clean_path)?;
    let degraded = read_waveform(degraded_path)?;
    if clean.sample_rate != degraded.sample_rate {
        return Err(MetricError::SampleRateMismatch {
            clean: clean.sample_rate,
            degraded: degraded.sample_rate,
        }
        .into());
    }

    let sample_rate = degraded.sample_rate;
    let duration = degraded.duration_secs();
    let mut clean_samples = prep::align_to(&clean.samples, degraded.samples.len());
    let mut degraded_samples = degraded.samples;

    let policy = scorer.prep();
    if policy.normalize {
        clean_samples = prep::peak_normalize(&clean_samples)?;
        degraded_samples = prep::peak_normalize(&degraded_samples)?;
    }
    if policy.tile {
        let count = prep::repeat_count(duration);
        clean_samples = prep::tile(&clean_samples, count);
        degraded_samples = prep::tile(&degraded_samples, count);
    }

    Ok(scorer.score(&clean_samples, &degraded_samples, sample_rate)?)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/score.rs"]
mod tests;
