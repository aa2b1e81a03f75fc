use std::error::Error;
use std::path::Path;

use plotters::prelude::*;
use tracing::{info, warn};

use crate::input::groups::load_t60_groups;
use crate::plot::{FolderSpec, PlotError, grid_dims, padded_range, series_color};
use crate::stats::{mean, sample_std};

struct BandSeries {
    label: String,
    // (t60, mean of mean_score, sample std; NaN below two rows)
    points: Vec<(f64, f64, f64)>,
}

pub fn render_bands(
    folders: &[FolderSpec],
    out_path: &Path,
    per_panel: usize,
    columns: usize,
    show_std: bool,
) -> Result<(), PlotError> {
    let mut series = Vec::new();
    for spec in folders {
        let groups = load_t60_groups(&spec.path)?;
        if groups.is_empty() {
            warn!(
                "no mean-score files under {}; skipping {}",
                spec.path.display(),
                spec.label
            );
            continue;
        }
        let points = groups
            .iter()
            .map(|(t60, values)| (*t60, mean(values), sample_std(values)))
            .collect();
        series.push(BandSeries {
            label: spec.label.clone(),
            points,
        });
    }
    if series.is_empty() {
        return Err(PlotError::NoData("every input folder is empty".to_string()));
    }

    // Categorical x axis over every T60 seen in any folder.
    let mut axis: Vec<f64> = Vec::new();
    for s in &series {
        for &(t60, _, _) in &s.points {
            if !axis.iter().any(|a| a.to_bits() == t60.to_bits()) {
                axis.push(t60);
            }
        }
    }
    axis.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let panels: Vec<&[BandSeries]> = series.chunks(per_panel.max(1)).collect();

    render(out_path, &panels, &axis, columns, show_std)
        .map_err(|e| PlotError::Render(e.to_string()))?;
    info!("wrote {}", out_path.display());
    Ok(())
}

fn render(
    out_path: &Path,
    panels: &[&[BandSeries]],
    axis: &[f64],
    columns: usize,
    show_std: bool,
) -> Result<(), Box<dyn Error>> {
    let (rows, cols) = grid_dims(panels.len(), columns);
    let width = cols as u32 * 600;
    let height = rows as u32 * 400;

    let root = BitMapBackend::new(out_path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((rows, cols));

    let x_hi = axis.len() as f64 - 0.5;

    for (panel, area) in panels.iter().zip(areas.iter()) {
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for s in panel.iter() {
            for &(_, m, sd) in &s.points {
                let sd = if show_std && sd.is_finite() { sd } else { 0.0 };
                y_min = y_min.min(m - sd);
                y_max = y_max.max(m + sd);
            }
        }
        let (y_lo, y_hi) = padded_range(y_min, y_max);

        let mut chart = ChartBuilder::on(area)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5..x_hi, y_lo..y_hi)?;

        chart
            .configure_mesh()
            .x_labels(axis.len())
            .x_label_formatter(&|x| tick_label(axis, *x))
            .x_desc("T60 (s)")
            .y_desc("Mean Scores")
            .draw()?;

        for (idx, s) in panel.iter().enumerate() {
            let color = series_color(idx);
            let line: Vec<(f64, f64)> = s
                .points
                .iter()
                .filter_map(|&(t60, m, _)| position(axis, t60).map(|p| (p, m)))
                .collect();

            chart
                .draw_series(LineSeries::new(line.clone(), &color))?
                .label(&s.label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            chart.draw_series(
                line.iter()
                    .map(|&(p, m)| Circle::new((p, m), 3, color.filled())),
            )?;

            if show_std {
                for &(t60, m, sd) in &s.points {
                    if !sd.is_finite() {
                        continue;
                    }
                    let Some(p) = position(axis, t60) else {
                        continue;
                    };
                    chart.draw_series(std::iter::once(PathElement::new(
                        vec![(p, m - sd), (p, m + sd)],
                        color,
                    )))?;
                    for y in [m - sd, m + sd] {
                        chart.draw_series(std::iter::once(PathElement::new(
                            vec![(p - 0.08, y), (p + 0.08, y)],
                            color,
                        )))?;
                    }
                }
            }
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn position(axis: &[f64], t60: f64) -> Option<f64> {
    axis.iter()
        .position(|a| a.to_bits() == t60.to_bits())
        .map(|i| i as f64)
}

fn tick_label(axis: &[f64], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    match axis.get(idx as usize) {
        Some(t60) => format!("{t60:.2}"),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/plot/bands.rs"]
mod tests;
