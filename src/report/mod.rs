use std::fmt::Write as _;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::model::MetricSummary;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn render_summary(summary: &MetricSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<26}{}", "Pearson correlation:", summary.pearson);
    let _ = writeln!(out, "{:<26}{}", "Kendall's Tau (tau-c):", summary.kendall_tau);
    let _ = writeln!(
        out,
        "{:<26}{}",
        "Kendall's Tau p-value:", summary.kendall_p_value
    );
    let _ = writeln!(out, "{:<26}{}", "RMSE:", summary.rmse);
    let _ = writeln!(
        out,
        "{:<26}{} (left-only {}, right-only {})",
        "Score pairs joined:", summary.n_pairs, summary.left_only_keys, summary.right_only_keys
    );
    out
}

pub fn print_summary(summary: &MetricSummary) {
    print!("{}", render_summary(summary));
}

pub fn write_summary_json(summary: &MetricSummary, path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    info!("wrote comparison summary to {}", path.display());
    Ok(())
}
