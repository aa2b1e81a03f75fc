use std::path::PathBuf;

use plotters::style::RGBColor;
use thiserror::Error;

use crate::input::InputError;

pub mod bands;
pub mod scatter;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("no plottable data: {0}")]
    NoData(String),
    #[error("render error: {0}")]
    Render(String),
}

#[derive(Debug, Clone)]
pub struct FolderSpec {
    pub path: PathBuf,
    pub label: String,
}

// PATH=LABEL, or a bare PATH labeled by its folder name.
pub fn parse_folder_spec(s: &str) -> Result<FolderSpec, String> {
    match s.split_once('=') {
        Some((path, label)) if !path.is_empty() && !label.is_empty() => Ok(FolderSpec {
            path: PathBuf::from(path),
            label: label.to_string(),
        }),
        Some(_) => Err("expected PATH=LABEL".to_string()),
        None if !s.is_empty() => {
            let path = PathBuf::from(s);
            let label = crate::input::leaf_name(&path);
            let label = if label.is_empty() { s.to_string() } else { label };
            Ok(FolderSpec { path, label })
        }
        None => Err("expected PATH=LABEL".to_string()),
    }
}

const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

pub fn series_color(idx: usize) -> RGBColor {
    PALETTE[idx % PALETTE.len()]
}

pub fn grid_dims(n_panels: usize, columns: usize) -> (usize, usize) {
    let columns = columns.max(1);
    let cols = n_panels.min(columns).max(1);
    let rows = n_panels.div_ceil(cols).max(1);
    (rows, cols)
}

// 5% margin on each side; degenerate ranges get a fixed half-unit.
pub fn padded_range(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if min == max {
        return (min - 0.5, max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}
