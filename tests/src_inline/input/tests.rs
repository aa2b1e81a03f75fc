use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::Compression;
use flate2::write::GzEncoder;

use super::audio::read_waveform;
use super::scores::load_scores;
use super::{find_mean_score_files, leaf_name, list_subdirs, list_wav_files};

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

fn write_gz(path: &Path, contents: &str) {
    let file = File::create(path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(contents.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

fn write_wav_i16(path: &Path, sample_rate: u32, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

fn write_wav_f32_stereo(path: &Path, sample_rate: u32, frames: &[(f32, f32)]) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &(l, r) in frames {
        writer.write_sample(l).unwrap();
        writer.write_sample(r).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_find_mean_score_files_orders_and_filters() {
    let dir = make_temp_dir();
    write_file(&dir.join("1.2_mean_scores.csv"), "a,0.5\n");
    write_file(&dir.join("0.4_mean_scores.csv"), "a,0.5\n");
    write_gz(&dir.join("0.8_mean_scores.csv.gz"), "a,0.5\n");
    write_file(&dir.join("notes.txt"), "ignored\n");
    write_file(&dir.join("0.6_siib_scores.csv"), "a,0.5\n");
    write_file(&dir.join("x_mean_scores.csv"), "a,0.5\n");

    let files = find_mean_score_files(&dir).unwrap();
    let stems: Vec<&str> = files.iter().map(|f| f.stem.as_str()).collect();
    assert_eq!(stems, vec!["0.4", "0.8", "1.2"]);
    assert_eq!(files[1].t60, 0.8);
}

#[test]
fn test_load_scores_drops_header_and_nan_rows() {
    let dir = make_temp_dir();
    write_file(
        &dir.join("0.4_mean_scores.csv"),
        "rir,mean_score,count\nroom_a,0.71,5\nroom_b,nan,3\nroom_c,0.64,4\n",
    );

    let table = load_scores(&dir, None).unwrap();
    assert_eq!(table.records.len(), 2);
    assert_eq!(table.records[0].identifier, "room_a");
    assert_eq!(table.records[0].score, 0.71);
    assert_eq!(table.records[0].t60, 0.4);
    assert_eq!(table.rows_dropped, 2);
    assert_eq!(table.files_read, 1);
    assert_eq!(table.files_skipped, 0);
}

#[test]
fn test_load_scores_reads_gzip_like_plain() {
    let plain_dir = make_temp_dir();
    let gz_dir = make_temp_dir();
    let body = "rir,mean_score,count\nroom_a,0.71,5\nroom_b,0.62,5\n";
    write_file(&plain_dir.join("0.4_mean_scores.csv"), body);
    write_gz(&gz_dir.join("0.4_mean_scores.csv.gz"), body);

    let plain = load_scores(&plain_dir, None).unwrap();
    let gz = load_scores(&gz_dir, None).unwrap();
    assert_eq!(plain.records, gz.records);
}

#[test]
fn test_load_scores_range_is_inclusive() {
    let dir = make_temp_dir();
    for stem in ["0.4", "0.8", "1.2"] {
        write_file(&dir.join(format!("{stem}_mean_scores.csv")), "room_a,0.5\n");
    }

    let table = load_scores(&dir, Some((0.4, 0.8))).unwrap();
    let t60s: Vec<f64> = table.records.iter().map(|r| r.t60).collect();
    assert_eq!(t60s, vec![0.4, 0.8]);
}

#[test]
fn test_load_scores_skips_unreadable_file() {
    let dir = make_temp_dir();
    // .gz name over plain bytes; the decoder rejects it at read time.
    write_file(&dir.join("0.4_mean_scores.csv.gz"), "room_a,0.5\n");
    write_file(&dir.join("0.8_mean_scores.csv"), "room_a,0.5\n");

    let table = load_scores(&dir, None).unwrap();
    assert_eq!(table.files_skipped, 1);
    assert_eq!(table.files_read, 1);
    assert_eq!(table.records.len(), 1);
    assert_eq!(table.records[0].t60, 0.8);
}

#[test]
fn test_load_scores_counts_duplicate_keys() {
    let dir = make_temp_dir();
    write_file(
        &dir.join("0.4_mean_scores.csv"),
        "room_a,0.5\nroom_a,0.6\nroom_b,0.7\n",
    );

    let table = load_scores(&dir, None).unwrap();
    assert_eq!(table.records.len(), 3);
    assert_eq!(table.duplicate_keys, 1);
}

#[test]
fn test_list_wav_files_sorted_case_insensitive_ext() {
    let dir = make_temp_dir();
    write_file(&dir.join("b.wav"), "");
    write_file(&dir.join("a.WAV"), "");
    write_file(&dir.join("c.txt"), "");
    fs::create_dir_all(dir.join("sub")).unwrap();

    let files = list_wav_files(&dir).unwrap();
    let names: Vec<String> = files.iter().map(|p| leaf_name(p)).collect();
    assert_eq!(names, vec!["a.WAV", "b.wav"]);

    let dirs = list_subdirs(&dir).unwrap();
    assert_eq!(dirs.len(), 1);
    assert_eq!(leaf_name(&dirs[0]), "sub");
}

#[test]
fn test_read_waveform_int_scaling() {
    let dir = make_temp_dir();
    let path = dir.join("tone.wav");
    write_wav_i16(&path, 16000, &[0, 16384, -16384]);

    let wave = read_waveform(&path).unwrap();
    assert_eq!(wave.sample_rate, 16000);
    assert_eq!(wave.samples.len(), 3);
    assert_eq!(wave.samples[0], 0.0);
    assert!((wave.samples[1] - 0.5).abs() < 1e-3);
    assert!((wave.samples[2] + 0.5).abs() < 1e-3);
}

#[test]
fn test_read_waveform_downmixes_stereo() {
    let dir = make_temp_dir();
    let path = dir.join("stereo.wav");
    write_wav_f32_stereo(&path, 8000, &[(1.0, 0.0), (0.5, 0.5)]);

    let wave = read_waveform(&path).unwrap();
    assert_eq!(wave.samples, vec![0.5, 0.5]);
    assert!((wave.duration_secs() - 2.0 / 8000.0).abs() < 1e-12);
}
