use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use thiserror::Error;
use tracing::warn;

pub mod audio;
pub mod groups;
pub mod scores;

pub const MEAN_SUFFIX: &str = "_mean_scores.csv";
pub const MEAN_SUFFIX_GZ: &str = "_mean_scores.csv.gz";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone)]
pub struct MeanScoreFile {
    pub path: PathBuf,
    pub stem: String,
    pub t60: f64,
}

pub fn find_mean_score_files(dir: &Path) -> Result<Vec<MeanScoreFile>, InputError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let Some(stem) = name
            .strip_suffix(MEAN_SUFFIX_GZ)
            .or_else(|| name.strip_suffix(MEAN_SUFFIX))
        else {
            continue;
        };
        match stem.parse::<f64>() {
            Ok(t60) if t60.is_finite() => files.push(MeanScoreFile {
                path: entry.path(),
                stem: stem.to_string(),
                t60,
            }),
            _ => warn!("skipping {}: file name has no parsable T60 prefix", name),
        }
    }
    files.sort_by(|a, b| {
        a.t60
            .partial_cmp(&b.t60)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.stem.cmp(&b.stem))
    });
    Ok(files)
}

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn list_wav_files(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        {
            files.push(path);
        }
    }
    files.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    Ok(files)
}

pub fn list_subdirs(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    Ok(dirs)
}

pub fn leaf_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
