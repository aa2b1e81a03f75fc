use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!(
        "reverbqc_test_{}_{}_{}",
        module_path!().replace("::", "_"),
        std::process::id(),
        id
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(path: &Path, contents: &str) {
    let mut f = BufWriter::new(File::create(path).unwrap());
    f.write_all(contents.as_bytes()).unwrap();
}

fn spec(path: &Path, label: &str) -> FolderSpec {
    FolderSpec {
        path: path.to_path_buf(),
        label: label.to_string(),
    }
}

#[test]
fn test_position_and_tick_label() {
    let axis = [0.4, 0.8];
    assert_eq!(position(&axis, 0.8), Some(1.0));
    assert_eq!(position(&axis, 0.5), None);

    assert_eq!(tick_label(&axis, 0.0), "0.40");
    assert_eq!(tick_label(&axis, 1.0), "0.80");
    assert_eq!(tick_label(&axis, 0.5), "");
    assert_eq!(tick_label(&axis, -1.0), "");
    assert_eq!(tick_label(&axis, 5.0), "");
}

#[test]
fn test_render_bands_writes_png() {
    let a_dir = make_temp_dir();
    let b_dir = make_temp_dir();
    let out = make_temp_dir().join("bands.png");
    write_file(
        &a_dir.join("0.4_mean_scores.csv"),
        "rir,mean_score,count\nroomA,0.8,2\nroomB,0.6,2\n",
    );
    write_file(
        &a_dir.join("0.8_mean_scores.csv"),
        "rir,mean_score,count\nroomA,0.5,2\nroomB,0.3,2\n",
    );
    // A single row leaves the std undefined; the point still draws.
    write_file(
        &b_dir.join("0.4_mean_scores.csv"),
        "rir,mean_score,count\nroomA,0.7,2\n",
    );

    render_bands(&[spec(&a_dir, "SNR"), spec(&b_dir, "EnvCorr")], &out, 2, 2, true).unwrap();

    let bytes = fs::read(&out).unwrap();
    assert!(bytes.len() > 8);
    assert_eq!(&bytes[..4], &[137, 80, 78, 71]);
}

#[test]
fn test_render_bands_without_whiskers() {
    let a_dir = make_temp_dir();
    let out = make_temp_dir().join("bands.png");
    write_file(
        &a_dir.join("0.4_mean_scores.csv"),
        "rir,mean_score,count\nroomA,0.8,2\nroomB,0.6,2\n",
    );

    render_bands(&[spec(&a_dir, "SNR")], &out, 2, 2, false).unwrap();
    assert!(out.exists());
}

#[test]
fn test_render_bands_requires_data() {
    let empty = make_temp_dir();
    let out = make_temp_dir().join("bands.png");
    let err = render_bands(&[spec(&empty, "SNR")], &out, 2, 2, true).unwrap_err();
    assert!(matches!(err, PlotError::NoData(_)));
}
