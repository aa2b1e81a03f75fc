use std::collections::BTreeMap;
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

fn means(label: &str, t60: f64, rirs: &[(&str, f64)]) -> RirMeans {
    RirMeans {
        t60_label: label.to_string(),
        t60,
        by_rir: BTreeMap::from_iter(rirs.iter().map(|&(r, v)| (r.to_string(), v))),
    }
}

#[test]
fn test_build_panel_pairs_common_keys() {
    let x_means = vec![
        means("0.4", 0.4, &[("roomA", 0.1), ("roomB", 0.2)]),
        means("1.2", 1.2, &[("roomA", 0.3)]),
    ];
    let y_means = vec![means("0.4", 0.4, &[("roomA", 0.9), ("roomC", 0.8)])];
    let folder = spec(Path::new("x"), "X");

    let panel = build_panel(&folder, &x_means, &y_means);
    assert_eq!(panel.label, "X");
    assert_eq!(panel.n_points, 1);
    assert_eq!(panel.series.len(), 1);
    assert_eq!(panel.series[0].0, "0.4");
    assert_eq!(panel.series[0].1, vec![(0.1, 0.9)]);
}

#[test]
fn test_render_scatter_writes_png() {
    let x_dir = make_temp_dir();
    let y_dir = make_temp_dir();
    let out = make_temp_dir().join("scatter.png");
    write_file(
        &x_dir.join("0.4_mean_scores.csv"),
        "rir,mean_score,count\nroomA,0.2,2\nroomB,0.4,2\n",
    );
    write_file(
        &x_dir.join("0.8_mean_scores.csv"),
        "rir,mean_score,count\nroomA,0.1,2\nroomB,0.3,2\n",
    );
    write_file(
        &y_dir.join("0.4_mean_scores.csv"),
        "rir,mean_score,count\nroomA,0.9,2\nroomB,0.7,2\n",
    );
    write_file(
        &y_dir.join("0.8_mean_scores.csv"),
        "rir,mean_score,count\nroomA,0.8,2\nroomB,0.6,2\n",
    );

    render_scatter(&[spec(&x_dir, "SNR")], &spec(&y_dir, "Listening"), &out, 3).unwrap();

    let bytes = fs::read(&out).unwrap();
    assert!(bytes.len() > 8);
    assert_eq!(&bytes[..4], &[137, 80, 78, 71]);
}

#[test]
fn test_render_scatter_needs_common_keys() {
    let x_dir = make_temp_dir();
    let y_dir = make_temp_dir();
    let out = make_temp_dir().join("scatter.png");
    write_file(
        &x_dir.join("0.4_mean_scores.csv"),
        "rir,mean_score,count\nroomA,0.2,2\n",
    );
    write_file(
        &y_dir.join("0.8_mean_scores.csv"),
        "rir,mean_score,count\nroomA,0.9,2\n",
    );

    let err =
        render_scatter(&[spec(&x_dir, "SNR")], &spec(&y_dir, "Listening"), &out, 3).unwrap_err();
    assert!(matches!(err, PlotError::NoData(_)));
    assert!(!out.exists());
}

#[test]
fn test_render_scatter_needs_y_data() {
    let x_dir = make_temp_dir();
    let y_dir = make_temp_dir();
    let out = make_temp_dir().join("scatter.png");
    write_file(
        &x_dir.join("0.4_mean_scores.csv"),
        "rir,mean_score,count\nroomA,0.2,2\n",
    );

    let err =
        render_scatter(&[spec(&x_dir, "SNR")], &spec(&y_dir, "Listening"), &out, 3).unwrap_err();
    assert!(matches!(err, PlotError::NoData(_)));
}
