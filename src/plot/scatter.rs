use std::error::Error;
use std::path::Path;

use plotters::prelude::*;
use tracing::{info, warn};

use crate::input::groups::{RirMeans, load_rir_means};
use crate::plot::{FolderSpec, PlotError, grid_dims, padded_range, series_color};

struct Panel {
    label: String,
    // One point series per T60 shared with the y folder, ascending by T60.
    series: Vec<(String, Vec<(f64, f64)>)>,
    n_points: usize,
}

pub fn render_scatter(
    x_folders: &[FolderSpec],
    y_folder: &FolderSpec,
    out_path: &Path,
    columns: usize,
) -> Result<(), PlotError> {
    let y_means = load_rir_means(&y_folder.path)?;
    if y_means.is_empty() {
        return Err(PlotError::NoData(format!(
            "no mean-score files under {}",
            y_folder.path.display()
        )));
    }

    let mut panels = Vec::new();
    for spec in x_folders {
        let x_means = load_rir_means(&spec.path)?;
        let panel = build_panel(spec, &x_means, &y_means);
        if panel.n_points == 0 {
            warn!(
                "no common (T60, rir) keys between {} and {}",
                spec.path.display(),
                y_folder.path.display()
            );
        }
        panels.push(panel);
    }
    if panels.iter().all(|p| p.n_points == 0) {
        return Err(PlotError::NoData(
            "no panel shares a (T60, rir) key with the y folder".to_string(),
        ));
    }

    render(out_path, &panels, &y_folder.label, columns)
        .map_err(|e| PlotError::Render(e.to_string()))?;
    info!("wrote {}", out_path.display());
    Ok(())
}

fn build_panel(spec: &FolderSpec, x_means: &[RirMeans], y_means: &[RirMeans]) -> Panel {
    let mut series = Vec::new();
    let mut n_points = 0usize;

    for xm in x_means {
        let Some(ym) = y_means
            .iter()
            .find(|ym| ym.t60.to_bits() == xm.t60.to_bits())
        else {
            continue;
        };
        let mut points = Vec::new();
        for (rir, x) in &xm.by_rir {
            if let Some(y) = ym.by_rir.get(rir) {
                points.push((*x, *y));
            }
        }
        if !points.is_empty() {
            n_points += points.len();
            series.push((xm.t60_label.clone(), points));
        }
    }

    Panel {
        label: spec.label.clone(),
        series,
        n_points,
    }
}

fn render(
    out_path: &Path,
    panels: &[Panel],
    y_label: &str,
    columns: usize,
) -> Result<(), Box<dyn Error>> {
    let (rows, cols) = grid_dims(panels.len(), columns);
    let width = cols as u32 * 500;
    let height = rows as u32 * 400;

    let root = BitMapBackend::new(out_path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((rows, cols));

    for (panel, area) in panels.iter().zip(areas.iter()) {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for (_, points) in &panel.series {
            for &(x, y) in points {
                x_min = x_min.min(x);
                x_max = x_max.max(x);
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        }
        let (x_lo, x_hi) = padded_range(x_min, x_max);
        let (y_lo, y_hi) = padded_range(y_min, y_max);

        let mut chart = ChartBuilder::on(area)
            .caption(&panel.label, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

        chart
            .configure_mesh()
            .x_desc(format!("{} (Scores)", panel.label))
            .y_desc(format!("{} (Scores)", y_label))
            .draw()?;

        for (idx, (t60_label, points)) in panel.series.iter().enumerate() {
            let color = series_color(idx);
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
                )?
                .label(format!("T60 {}", t60_label))
                .legend(move |(x, y)| Circle::new((x, y), 3, color.filled()));
        }

        if !panel.series.is_empty() {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/plot/scatter.rs"]
mod tests;
