//! Domain types for mimic-io.

use std::path::{Path, PathBuf};

use crate::IoError;

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if !is_valid_name(&name) {
            return Err(IoError::InvalidName {
                kind: "experiment",
                name,
            });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a model recording. Doubles as the stem of its CSV file and the
/// prefix of its trial files, so it follows the same rules as [`ExperimentName`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelName(String);

impl ModelName {
    /// Parse and validate a model name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if !is_valid_name(&name) {
            return Err(IoError::InvalidName { kind: "model", name });
        }
        Ok(Self(name))
    }

    /// Return the model name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where model and trial recordings live.
///
/// Models are `{model_dir}/{model}.csv`; trial `n` of a model is
/// `{test_dir}/{model}_Te{n}.csv`.
#[derive(Debug, Clone)]
pub struct TrialLayout {
    model_dir: PathBuf,
    test_dir: PathBuf,
}

impl TrialLayout {
    pub fn new(model_dir: &Path, test_dir: &Path) -> Self {
        Self {
            model_dir: model_dir.to_path_buf(),
            test_dir: test_dir.to_path_buf(),
        }
    }

    /// Path of the model recording.
    #[must_use]
    pub fn model_path(&self, model: &ModelName) -> PathBuf {
        self.model_dir.join(format!("{model}.csv"))
    }

    /// Path of trial `trial` recorded against `model`.
    #[must_use]
    pub fn trial_path(&self, model: &ModelName, trial: u32) -> PathBuf {
        self.test_dir.join(format!("{model}_Te{trial}.csv"))
    }
}

/// Row label for trial `trial` in a score table.
#[must_use]
pub fn trial_label(trial: u32) -> String {
    format!("Test{trial}")
}

/// Wide score table: one row per trial number, one column per model.
///
/// Cells start as NaN ("no comparison") until a score is recorded.
#[derive(Debug, Clone)]
pub struct ScoreTable {
    models: Vec<ModelName>,
    trials: Vec<u32>,
    /// `scores[trial_index][model_index]`.
    scores: Vec<Vec<f64>>,
}

impl ScoreTable {
    pub fn new(models: Vec<ModelName>, trials: Vec<u32>) -> Self {
        let scores = vec![vec![f64::NAN; models.len()]; trials.len()];
        Self {
            models,
            trials,
            scores,
        }
    }

    /// Record `score` for `trial` under the model at `model_index`.
    ///
    /// Unknown trial numbers and out-of-range model indices are ignored.
    pub fn record(&mut self, trial: u32, model_index: usize, score: f64) {
        if let Some(row) = self.trials.iter().position(|&t| t == trial)
            && let Some(cell) = self.scores[row].get_mut(model_index)
        {
            *cell = score;
        }
    }

    /// Return the score for `trial` under the model at `model_index`.
    #[must_use]
    pub fn get(&self, trial: u32, model_index: usize) -> Option<f64> {
        let row = self.trials.iter().position(|&t| t == trial)?;
        self.scores[row].get(model_index).copied()
    }

    #[must_use]
    pub fn models(&self) -> &[ModelName] {
        &self.models
    }

    #[must_use]
    pub fn trials(&self) -> &[u32] {
        &self.trials
    }

    /// Iterate `(trial, scores)` rows in trial order.
    pub fn rows(&self) -> impl Iterator<Item = (u32, &[f64])> + '_ {
        self.trials
            .iter()
            .zip(&self.scores)
            .map(|(&t, row)| (t, row.as_slice()))
    }

    /// Number of cells holding a score (not NaN).
    #[must_use]
    pub fn n_scored(&self) -> usize {
        self.scores.iter().flatten().filter(|v| !v.is_nan()).count()
    }
}
