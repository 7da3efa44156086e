//! Batch scoring of every (model, trial) recording pair on disk.

use mimic_dtw::{DEFAULT_FRAMES, ScoreMetric, SlidingDtw, Trajectory};
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::domain::{ModelName, ScoreTable, TrialLayout};
use crate::reader::TrialReader;

/// A (model, trial) pair that could not be scored.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialFailure {
    /// Model the trial was compared against.
    pub model: ModelName,
    /// Trial number; `None` when the model recording itself failed.
    pub trial: Option<u32>,
    /// Rendered error chain.
    pub reason: String,
}

/// Output of [`BatchScorer::run`].
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Scores, NaN where a pair could not be scored.
    pub table: ScoreTable,
    /// Every pair that fell back to NaN, in model then trial order.
    pub failures: Vec<TrialFailure>,
}

/// Scores trial recordings against their model recordings with one metric.
///
/// A missing or malformed file, or a failed comparison, records NaN for that
/// pair and the batch continues.
///
/// # Defaults
///
/// | Parameter | Default |
/// |-----------|---------|
/// | `frames`  | [`DEFAULT_FRAMES`] |
#[derive(Debug, Clone)]
pub struct BatchScorer {
    layout: TrialLayout,
    metric: ScoreMetric,
    dtw: SlidingDtw,
    frames: usize,
}

impl BatchScorer {
    pub fn new(layout: TrialLayout, metric: ScoreMetric, dtw: SlidingDtw) -> Self {
        Self {
            layout,
            metric,
            dtw,
            frames: DEFAULT_FRAMES,
        }
    }

    /// Set the resampling target for metrics that resample.
    #[must_use]
    pub fn with_frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }

    /// Score every trial number in `trials` against every model in `models`.
    ///
    /// Trials of one model are scored in parallel.
    #[instrument(skip_all, fields(metric = %self.metric, n_models = models.len(), n_trials = trials.len()))]
    pub fn run(&self, models: &[ModelName], trials: &[u32]) -> BatchReport {
        let mut table = ScoreTable::new(models.to_vec(), trials.to_vec());
        let mut failures = Vec::new();
        let needs_rotations = self.metric.needs_rotations();

        for (model_index, model) in models.iter().enumerate() {
            let model_path = self.layout.model_path(model);
            let reference = match TrialReader::new(&model_path)
                .require_rotations(needs_rotations)
                .read()
            {
                Ok(t) => t,
                Err(e) => {
                    warn!(model = %model, error = %e, "model recording unreadable; skipping its trials");
                    failures.push(TrialFailure {
                        model: model.clone(),
                        trial: None,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let outcomes: Vec<(u32, Result<f64, String>)> = trials
                .par_iter()
                .map(|&trial| (trial, self.score_trial(&reference, model, trial, needs_rotations)))
                .collect();

            for (trial, outcome) in outcomes {
                match outcome {
                    Ok(score) => table.record(trial, model_index, score),
                    Err(reason) => {
                        warn!(model = %model, trial, error = %reason, "trial recorded as NaN");
                        failures.push(TrialFailure {
                            model: model.clone(),
                            trial: Some(trial),
                            reason,
                        });
                    }
                }
            }
            info!(model = %model, "model scored");
        }

        info!(n_scored = table.n_scored(), n_failed = failures.len(), "batch complete");
        BatchReport { table, failures }
    }

    fn score_trial(
        &self,
        reference: &Trajectory,
        model: &ModelName,
        trial: u32,
        needs_rotations: bool,
    ) -> Result<f64, String> {
        let path = self.layout.trial_path(model, trial);
        let test = TrialReader::new(&path)
            .require_rotations(needs_rotations)
            .read()
            .map_err(|e| e.to_string())?;
        self.metric
            .evaluate(reference, &test, &self.dtw, self.frames)
            .map_err(|e| format!("{}: {e}", path.display()))
    }
}
