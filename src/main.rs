mod input;
mod metric;
mod model;
mod pipeline;
mod plot;
mod report;
mod stats;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::plot::{FolderSpec, parse_folder_spec};

#[derive(Parser)]
#[command(
    name = "reverbqc",
    about = "Metric scoring and statistics for reverberant speech corpora",
    version
)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score clean/degraded WAV pairs and write per-T60 score CSVs.
    Score(ScoreArgs),

    /// Collapse raw score CSVs into per-RIR mean files.
    Aggregate(AggregateArgs),

    /// Compare two metrics' mean scores: Pearson, Kendall tau-c, RMSE.
    Compare(CompareArgs),

    /// Levene variance test between two metrics per T60.
    Variance(VarianceArgs),

    /// Render comparison plots.
    Plot {
        #[command(subcommand)]
        action: PlotCmd,
    },
}

#[derive(Args)]
struct ScoreArgs {
    /// Folder of clean reference WAV files.
    #[arg(long)]
    clean: PathBuf,

    /// Base folder of T60 subfolders, each holding RIR subfolders of degraded WAVs.
    #[arg(long)]
    degraded: PathBuf,

    /// Output folder for <t60>_<metric>_scores.csv files.
    #[arg(long)]
    out: PathBuf,

    /// Metric to score with (snr, envcorr).
    #[arg(long)]
    metric: String,
}

#[derive(Args)]
struct AggregateArgs {
    /// Folder of raw <t60>_<metric>_scores.csv files.
    #[arg(long)]
    scores: PathBuf,

    /// Output folder for <t60>_mean_scores.csv files.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args)]
struct CompareArgs {
    /// Folder of <t60>_mean_scores.csv files for the first metric.
    #[arg(long)]
    left: PathBuf,

    /// Folder of <t60>_mean_scores.csv files for the second metric.
    #[arg(long)]
    right: PathBuf,

    /// Keep only T60 values at or above this bound.
    #[arg(long, requires = "t60_max")]
    t60_min: Option<f64>,

    /// Keep only T60 values at or below this bound.
    #[arg(long, requires = "t60_min")]
    t60_max: Option<f64>,

    /// Also write the summary as JSON to this path.
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Args)]
struct VarianceArgs {
    /// Folder of <t60>_mean_scores.csv files for the first metric.
    #[arg(long)]
    left: PathBuf,

    /// Folder of <t60>_mean_scores.csv files for the second metric.
    #[arg(long)]
    right: PathBuf,

    /// Output CSV path for the per-T60 Levene table.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Subcommand)]
enum PlotCmd {
    /// Scatter of per-RIR means, one panel per x folder, colored by T60.
    Scatter(ScatterArgs),

    /// Mean scores with std whiskers per T60, one line per folder.
    Bands(BandsArgs),
}

#[derive(Args)]
struct ScatterArgs {
    /// X-axis score folder as PATH=LABEL; repeatable, one panel each.
    #[arg(long = "x", value_parser = parse_folder_spec, required = true)]
    x_folders: Vec<FolderSpec>,

    /// Y-axis score folder as PATH=LABEL, shared by every panel.
    #[arg(long = "y", value_parser = parse_folder_spec)]
    y_folder: FolderSpec,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Panels per row.
    #[arg(long, default_value_t = 3)]
    columns: usize,
}

#[derive(Args)]
struct BandsArgs {
    /// Score folder as PATH=LABEL; repeatable.
    #[arg(long = "input", value_parser = parse_folder_spec, required = true)]
    inputs: Vec<FolderSpec>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Folders drawn per panel.
    #[arg(long, default_value_t = 2)]
    per_panel: usize,

    /// Panels per row.
    #[arg(long, default_value_t = 2)]
    columns: usize,

    /// Draw means only, without std whiskers.
    #[arg(long)]
    no_std: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Score(args) => run_score(args),
        Commands::Aggregate(args) => run_aggregate(args),
        Commands::Compare(args) => run_compare(args),
        Commands::Variance(args) => run_variance(args),
        Commands::Plot { action } => match action {
            PlotCmd::Scatter(args) => run_scatter(args),
            PlotCmd::Bands(args) => run_bands(args),
        },
    }
}

fn run_score(args: ScoreArgs) -> Result<(), String> {
    let scorer = metric::resolve(&args.metric).map_err(|e| e.to_string())?;
    let report = pipeline::score::run_batch(&args.clean, &args.degraded, &args.out, scorer.as_ref())
        .map_err(|e| e.to_string())?;
    println!(
        "scored {} pair(s) across {} T60 folder(s); {} pair error(s), {} folder failure(s)",
        report.pairs_scored, report.folders_done, report.pair_errors, report.folders_failed
    );
    if report.folders_failed > 0 {
        return Err(format!("{} T60 folder(s) failed", report.folders_failed));
    }
    Ok(())
}

fn run_aggregate(args: AggregateArgs) -> Result<(), String> {
    let report =
        pipeline::aggregate::aggregate_scores(&args.scores, &args.out).map_err(|e| e.to_string())?;
    println!(
        "wrote {} mean file(s); {} input file(s) skipped, {} row(s) dropped",
        report.files_written, report.files_skipped, report.rows_dropped
    );
    Ok(())
}

fn run_compare(args: CompareArgs) -> Result<(), String> {
    let t60_range = match (args.t60_min, args.t60_max) {
        (Some(lo), Some(hi)) if lo > hi => {
            return Err(format!("--t60-min {lo} exceeds --t60-max {hi}"));
        }
        (Some(lo), Some(hi)) => Some((lo, hi)),
        _ => None,
    };

    let summary = pipeline::compare::compare_folders(&args.left, &args.right, t60_range)
        .map_err(|e| e.to_string())?;
    report::print_summary(&summary);
    if let Some(path) = &args.summary {
        report::write_summary_json(&summary, path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn run_variance(args: VarianceArgs) -> Result<(), String> {
    let rows = pipeline::variance::variance_between_folders(&args.left, &args.right)
        .map_err(|e| e.to_string())?;
    pipeline::variance::write_levene_csv(&rows, &args.out).map_err(|e| e.to_string())?;
    Ok(())
}

fn run_scatter(args: ScatterArgs) -> Result<(), String> {
    plot::scatter::render_scatter(&args.x_folders, &args.y_folder, &args.out, args.columns)
        .map_err(|e| e.to_string())
}

fn run_bands(args: BandsArgs) -> Result<(), String> {
    plot::bands::render_bands(
        &args.inputs,
        &args.out,
        args.per_panel,
        args.columns,
        !args.no_std,
    )
    .map_err(|e| e.to_string())
}
