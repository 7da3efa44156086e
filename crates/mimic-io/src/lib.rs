//! File I/O, validation, and batch scoring for the mimic pipeline.

mod batch;
mod domain;
mod error;
mod reader;
mod writer;

pub use batch::{BatchReport, BatchScorer, TrialFailure};
pub use domain::{ExperimentName, ModelName, ScoreTable, TrialLayout, trial_label};
pub use error::IoError;
pub use reader::{POSITION_COLUMNS, ROTATION_COLUMNS, TrialReader};
pub use writer::ResultWriter;
