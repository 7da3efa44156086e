use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use mimic_dtw::{DEFAULT_FRAMES, DEFAULT_WINDOW_SIZE, GlobalWindow, ScoreMetric, SlidingDtw};
use mimic_io::{BatchScorer, ExperimentName, ModelName, ResultWriter, TrialLayout, TrialReader};

#[derive(Parser)]
#[command(name = "mimic")]
#[command(about = "Score recorded motion trials against model motions with sliding-window DTW")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Shared sliding-window DTW parameters.
#[derive(Args, Debug, Clone)]
struct DtwArgs {
    /// Sliding window size in samples (even sizes are narrowed by one)
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    window: usize,

    /// Amplitude weight: 1.0 compares positions only, 0.0 compares derivatives only
    #[arg(long, default_value_t = 0.5)]
    alpha: f64,

    /// Global window constraint: "none" or "sakoe-chiba" (defaults per metric;
    /// dtw-quaternion uses a Sakoe-Chiba band of factor 300, all else "none")
    #[arg(long)]
    band: Option<GlobalWindow>,

    /// Sakoe-Chiba band factor (defaults to half the shorter signal length)
    #[arg(long)]
    band_factor: Option<f64>,

    /// Z-normalize each axis before aligning
    #[arg(long, default_value_t = false)]
    normalize_signal: bool,

    /// Report the raw accumulated cost instead of the path-normalized distance
    #[arg(long, default_value_t = false)]
    raw_distance: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Score every trial file against its model file and write a wide CSV table
    Score {
        /// Directory holding `{model}.csv` files
        #[arg(long)]
        model_dir: PathBuf,

        /// Directory holding `{model}_Te{n}.csv` files
        #[arg(long)]
        test_dir: PathBuf,

        /// Model names, comma separated
        #[arg(long, value_delimiter = ',', default_value = "1")]
        models: Vec<String>,

        /// First trial number
        #[arg(long, default_value_t = 1)]
        first_trial: u32,

        /// Last trial number (inclusive)
        #[arg(long, default_value_t = 25)]
        last_trial: u32,

        /// Score metric: euclidean, dtw-euclidean, dtw-quaternion, dtw-path-length,
        /// trial-length, position-distance:<mode>, or motion-dot:<mode>
        #[arg(long, default_value = "dtw-euclidean")]
        metric: ScoreMetric,

        /// Resampling target for metrics that resample the test trial
        #[arg(long, default_value_t = DEFAULT_FRAMES)]
        frames: usize,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        dtw: DtwArgs,
    },

    /// Align one test recording with one model recording and write the path
    Align {
        /// Path to the model CSV file
        #[arg(long)]
        model: PathBuf,

        /// Path to the test CSV file
        #[arg(long)]
        test: PathBuf,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Include the local and accumulated cost matrices in the artifact
        #[arg(long, default_value_t = false)]
        matrices: bool,

        #[command(flatten)]
        dtw: DtwArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct ScoreOutput {
    experiment: String,
    metric: String,
    n_models: usize,
    n_trials: usize,
    n_scored: usize,
    failures: Vec<FailureOutput>,
    output: PathBuf,
}

#[derive(Serialize)]
struct FailureOutput {
    model: String,
    trial: Option<u32>,
    reason: String,
}

#[derive(Serialize)]
struct AlignOutput {
    experiment: String,
    distance: f64,
    distance_scale: &'static str,
    raw_distance: f64,
    path_length: usize,
    output: PathBuf,
}

/// Build the DTW configuration; `default_band` applies when `--band` is omitted.
fn build_dtw(args: &DtwArgs, default_band: GlobalWindow) -> Result<SlidingDtw> {
    let band = match (args.band, args.band_factor) {
        (Some(GlobalWindow::None), Some(_)) | (None, Some(_)) => {
            anyhow::bail!("--band-factor requires --band sakoe-chiba")
        }
        (Some(GlobalWindow::SakoeChiba { .. }), Some(factor)) => GlobalWindow::sakoe_chiba(factor),
        (Some(band), None) => band,
        (None, None) => default_band,
    };
    Ok(SlidingDtw::new(args.window)?
        .with_alpha(args.alpha)
        .with_global_window(band)
        .with_signal_normalization(args.normalize_signal)
        .with_distance_normalization(!args.raw_distance))
}

/// File stem used to label a recording in artifacts.
fn recording_label(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Score {
            model_dir,
            test_dir,
            models,
            first_trial,
            last_trial,
            metric,
            frames,
            experiment,
            output_dir,
            dtw,
        } => {
            if first_trial > last_trial {
                anyhow::bail!("--first-trial {first_trial} is after --last-trial {last_trial}");
            }
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let models = models
                .into_iter()
                .map(ModelName::new)
                .collect::<Result<Vec<_>, _>>()
                .context("invalid model name")?;
            let trials: Vec<u32> = (first_trial..=last_trial).collect();
            let dtw = build_dtw(&dtw, metric.default_global_window())?;

            let scorer = BatchScorer::new(TrialLayout::new(&model_dir, &test_dir), metric, dtw)
                .with_frames(frames);
            let report = scorer.run(&models, &trials);

            // Write CSV table
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let output = writer.write_scores(&report.table)?;

            // Build and print stdout summary
            let summary = ScoreOutput {
                experiment,
                metric: metric.to_string(),
                n_models: models.len(),
                n_trials: trials.len(),
                n_scored: report.table.n_scored(),
                failures: report
                    .failures
                    .into_iter()
                    .map(|f| FailureOutput {
                        model: f.model.to_string(),
                        trial: f.trial,
                        reason: f.reason,
                    })
                    .collect(),
                output,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Align {
            model,
            test,
            experiment,
            output_dir,
            matrices,
            dtw,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let dtw = build_dtw(&dtw, GlobalWindow::None)?;

            let reference = TrialReader::new(&model)
                .read()
                .context("failed to read model CSV")?;
            let trial = TrialReader::new(&test)
                .read()
                .context("failed to read test CSV")?;
            info!(model_frames = reference.len(), test_frames = trial.len(), "recordings loaded");

            let alignment = dtw
                .align(reference.positions(), trial.positions())
                .context("alignment failed")?;

            // Write JSON artifact
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let output = writer.write_alignment(
                &recording_label(&model),
                &recording_label(&test),
                &alignment,
                matrices,
            )?;

            let summary = AlignOutput {
                experiment,
                distance: alignment.distance.value(),
                distance_scale: alignment.distance.scale().as_str(),
                raw_distance: alignment.raw_distance(),
                path_length: alignment.path.len(),
                output,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
