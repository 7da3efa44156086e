//! Per-trial scoring metrics comparing a test trajectory against a model.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::align::{
    AlignmentMode, Correspondence, MotionComparison, PositionComparison, RECOMPUTE_BAND_FACTOR,
    quaternion_alignment_score, sample_distance,
};
use crate::constraint::GlobalWindow;
use crate::dtw::SlidingDtw;
use crate::error::{ScoreError, SignalError};
use crate::resample::resample_to;
use crate::signal::Signal;

/// Frame count trials are resampled to by default.
pub const DEFAULT_FRAMES: usize = 720;

/// A recorded trial: 3-axis positions and, optionally, frame-synchronized
/// 4-axis orientation quaternions `(qx, qy, qz, qw)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    positions: Signal,
    rotations: Option<Signal>,
}

impl Trajectory {
    /// Create a trajectory from positions alone.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::AxisCount`] if `positions` does not have 3 axes.
    pub fn new(positions: Signal) -> Result<Self, SignalError> {
        positions.require_axes(3)?;
        Ok(Self {
            positions,
            rotations: None,
        })
    }

    /// Attach orientation quaternions.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::AxisCount`] if `rotations` does not have 4 axes,
    /// or [`SignalError::AxisLengthMismatch`] if its length differs from the
    /// positions.
    pub fn with_rotations(mut self, rotations: Signal) -> Result<Self, SignalError> {
        rotations.require_axes(4)?;
        if rotations.len() != self.positions.len() {
            return Err(SignalError::AxisLengthMismatch {
                axis: 0,
                expected: self.positions.len(),
                got: rotations.len(),
            });
        }
        self.rotations = Some(rotations);
        Ok(self)
    }

    /// The 3-axis position signal.
    #[must_use]
    pub fn positions(&self) -> &Signal {
        &self.positions
    }

    /// The orientation quaternions, if the trial carries them.
    #[must_use]
    pub fn rotations(&self) -> Option<&Signal> {
        self.rotations.as_ref()
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always `false`; a trajectory holds at least one frame.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Which score the batch driver computes for each (model, trial) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMetric {
    /// Resample the test trial, then take the mean same-time position distance.
    Euclidean,
    /// Mean position distance over every step of the DTW path.
    DtwEuclidean,
    /// Mean `|q_model . q_test|` along the position DTW path.
    DtwQuaternion,
    /// Path length after aligning the model with the resampled test trial.
    DtwPathLength,
    /// Frame count of the test trial.
    TrialLength,
    /// Position distance under a correspondence mode.
    PositionDistance(AlignmentMode),
    /// Motion-direction dot product under a correspondence mode.
    MotionDot(AlignmentMode),
}

impl ScoreMetric {
    /// Score `test` against `model`.
    ///
    /// `frames` is the resampling target for metrics that resample.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ScoreError::MissingRotation`] | `DtwQuaternion` on a trial without rotations |
    /// | [`ScoreError::Dtw`] | Alignment failed |
    /// | [`ScoreError::Align`] | The reduction rejected its inputs |
    #[instrument(skip(self, model, test, dtw), fields(metric = %self))]
    pub fn evaluate(
        &self,
        model: &Trajectory,
        test: &Trajectory,
        dtw: &SlidingDtw,
        frames: usize,
    ) -> Result<f64, ScoreError> {
        let (model_pos, test_pos) = (model.positions(), test.positions());
        let score = match *self {
            Self::Euclidean => {
                let resized = resample_to(test_pos, frames);
                let pairs = Correspondence::same_time(model_pos.len(), resized.len());
                mean_distance(model_pos, &resized, &pairs)
            }
            Self::DtwEuclidean => {
                let alignment = dtw.align(model_pos, test_pos)?;
                mean_distance(model_pos, test_pos, &Correspondence::along_path(&alignment.path))
            }
            Self::DtwQuaternion => {
                let missing = || ScoreError::MissingRotation {
                    metric: "dtw-quaternion",
                };
                let model_rot = model.rotations().ok_or_else(missing)?;
                let test_rot = test.rotations().ok_or_else(missing)?;
                quaternion_alignment_score(dtw, model_pos, model_rot, test_pos, test_rot)?
            }
            Self::DtwPathLength => {
                let resized = resample_to(test_pos, frames);
                dtw.align(model_pos, &resized)?.path.len() as f64
            }
            Self::TrialLength => test.len() as f64,
            Self::PositionDistance(mode) => PositionComparison::new(mode)?
                .with_dtw(*dtw)
                .euclidean_distance(model_pos, test_pos)?,
            Self::MotionDot(mode) => {
                let path = match mode {
                    AlignmentMode::DtwPath => Some(dtw.align(model_pos, test_pos)?.path),
                    _ => None,
                };
                MotionComparison::new(mode)
                    .with_dtw(*dtw)
                    .dot_product(model_pos, test_pos, path.as_ref())?
            }
        };
        debug!(score, "trial scored");
        Ok(score)
    }

    /// Global window to align with when the caller does not choose one.
    ///
    /// `DtwQuaternion` keeps a Sakoe-Chiba band of factor
    /// [`RECOMPUTE_BAND_FACTOR`]; every other metric is unconstrained.
    #[must_use]
    pub fn default_global_window(&self) -> GlobalWindow {
        match self {
            Self::DtwQuaternion => GlobalWindow::sakoe_chiba(RECOMPUTE_BAND_FACTOR),
            _ => GlobalWindow::None,
        }
    }

    /// Return true if the metric reads orientation columns.
    #[must_use]
    pub fn needs_rotations(&self) -> bool {
        matches!(self, Self::DtwQuaternion)
    }
}

fn mean_distance(a: &Signal, b: &Signal, pairs: &Correspondence) -> f64 {
    pairs
        .mean_score(|i, j| Some(sample_distance(a, i, b, j)))
        .unwrap_or(f64::NAN)
}

impl fmt::Display for ScoreMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Euclidean => f.write_str("euclidean"),
            Self::DtwEuclidean => f.write_str("dtw-euclidean"),
            Self::DtwQuaternion => f.write_str("dtw-quaternion"),
            Self::DtwPathLength => f.write_str("dtw-path-length"),
            Self::TrialLength => f.write_str("trial-length"),
            Self::PositionDistance(mode) => write!(f, "position-distance:{mode}"),
            Self::MotionDot(mode) => write!(f, "motion-dot:{mode}"),
        }
    }
}

impl FromStr for ScoreMetric {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ScoreError::UnknownMetric {
            metric: s.to_string(),
        };
        match s.split_once(':') {
            Some(("position-distance", mode)) => {
                Ok(Self::PositionDistance(mode.parse().map_err(|_| unknown())?))
            }
            Some(("motion-dot", mode)) => Ok(Self::MotionDot(mode.parse().map_err(|_| unknown())?)),
            Some(_) => Err(unknown()),
            None => match s {
                "euclidean" => Ok(Self::Euclidean),
                "dtw-euclidean" => Ok(Self::DtwEuclidean),
                "dtw-quaternion" => Ok(Self::DtwQuaternion),
                "dtw-path-length" => Ok(Self::DtwPathLength),
                "trial-length" => Ok(Self::TrialLength),
                _ => Err(unknown()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trajectory(n: usize, scale: f64) -> Trajectory {
        let samples: Vec<[f64; 3]> = (0..n)
            .map(|i| {
                let t = i as f64 * 0.3;
                [scale * t.sin(), scale * t.cos(), t]
            })
            .collect();
        Trajectory::new(Signal::from_samples(&samples).unwrap()).unwrap()
    }

    fn identity_rotations(n: usize) -> Signal {
        Signal::from_samples(&vec![[0.0, 0.0, 0.0, 1.0]; n]).unwrap()
    }

    #[test]
    fn metric_names_round_trip() {
        let metrics = [
            ScoreMetric::Euclidean,
            ScoreMetric::DtwEuclidean,
            ScoreMetric::DtwQuaternion,
            ScoreMetric::DtwPathLength,
            ScoreMetric::TrialLength,
            ScoreMetric::PositionDistance(AlignmentMode::RelativeTime),
            ScoreMetric::MotionDot(AlignmentMode::DtwCalc),
        ];
        for metric in metrics {
            assert_eq!(metric.to_string().parse::<ScoreMetric>().unwrap(), metric);
        }
    }

    #[test]
    fn rejects_unknown_metrics() {
        for bad in ["cosine", "motion-dot:sideways", "foo:same_time", ""] {
            assert!(
                matches!(bad.parse::<ScoreMetric>(), Err(ScoreError::UnknownMetric { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn identical_trials_score_perfectly() {
        let t = trajectory(40, 1.0);
        let dtw = SlidingDtw::new(4).unwrap();
        let score = |m: ScoreMetric| m.evaluate(&t, &t, &dtw, 40).unwrap();
        assert_eq!(score(ScoreMetric::Euclidean), 0.0);
        assert_eq!(score(ScoreMetric::DtwEuclidean), 0.0);
        assert_eq!(score(ScoreMetric::DtwPathLength), 40.0);
        assert_eq!(score(ScoreMetric::TrialLength), 40.0);
        assert_eq!(score(ScoreMetric::PositionDistance(AlignmentMode::SameTime)), 0.0);
        let dot = score(ScoreMetric::MotionDot(AlignmentMode::DtwPath));
        assert!((dot - 1.0).abs() < 1e-9);
    }

    #[test]
    fn distance_metrics_average_pair_distances() {
        let model = Trajectory::new(
            Signal::from_samples(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]).unwrap(),
        )
        .unwrap();
        let test = Trajectory::new(
            Signal::from_samples(&[[3.0, 4.0, 0.0], [4.0, 4.0, 0.0], [5.0, 4.0, 0.0]]).unwrap(),
        )
        .unwrap();
        let score = ScoreMetric::Euclidean
            .evaluate(&model, &test, &SlidingDtw::new(1).unwrap(), 3)
            .unwrap();
        assert!((score - 5.0).abs() < 1e-12);
    }

    #[test]
    fn euclidean_resamples_test_trial() {
        let model = trajectory(20, 1.0);
        let test = Trajectory::new(resample_to(model.positions(), 10)).unwrap();
        let dtw = SlidingDtw::default();
        let score = ScoreMetric::Euclidean.evaluate(&model, &test, &dtw, 20).unwrap();
        assert!(score.is_finite());
        let length = ScoreMetric::TrialLength.evaluate(&model, &test, &dtw, 20).unwrap();
        assert_eq!(length, 10.0);
    }

    #[test]
    fn quaternion_metric_needs_rotations() {
        let t = trajectory(20, 1.0);
        let dtw = SlidingDtw::new(3).unwrap();
        let result = ScoreMetric::DtwQuaternion.evaluate(&t, &t, &dtw, 20);
        assert!(matches!(result, Err(ScoreError::MissingRotation { .. })));

        let with_rot = t.clone().with_rotations(identity_rotations(20)).unwrap();
        let score = ScoreMetric::DtwQuaternion
            .evaluate(&with_rot, &with_rot, &dtw, 20)
            .unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn quaternion_metric_defaults_to_wide_band() {
        assert_eq!(
            ScoreMetric::DtwQuaternion.default_global_window(),
            GlobalWindow::SakoeChiba { factor: Some(300.0) }
        );
        for metric in [
            ScoreMetric::DtwEuclidean,
            ScoreMetric::DtwPathLength,
            ScoreMetric::MotionDot(AlignmentMode::DtwCalc),
        ] {
            assert_eq!(metric.default_global_window(), GlobalWindow::None);
        }
    }

    #[test]
    fn rotations_must_match_frame_count() {
        let t = trajectory(5, 1.0);
        assert!(matches!(
            t.with_rotations(identity_rotations(4)),
            Err(SignalError::AxisLengthMismatch { expected: 5, got: 4, .. })
        ));
    }

    #[test]
    fn position_metric_rejects_dot_product_modes() {
        let t = trajectory(20, 1.0);
        let result = ScoreMetric::PositionDistance(AlignmentMode::DtwPath).evaluate(
            &t,
            &t,
            &SlidingDtw::default(),
            20,
        );
        assert!(matches!(result, Err(ScoreError::Align(_))));
    }
}
