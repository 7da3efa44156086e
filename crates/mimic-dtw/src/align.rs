//! Alignment-based similarity reductions.
//!
//! Every reduction follows the same shape: establish a [`Correspondence`]
//! between sample indices of two signals (from a warping path, a fresh DTW
//! run, or a synthesized same-time / relative-time mapping), score each index
//! pair, and average the valid scores.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::constraint::GlobalWindow;
use crate::dtw::SlidingDtw;
use crate::error::{AlignError, DtwError};
use crate::motion::{MotionVectors, dot3, norm3};
use crate::path::WarpingPath;
use crate::signal::Signal;

/// How index correspondence between two signals is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignmentMode {
    /// Use a caller-supplied warping path.
    DtwPath,
    /// Recompute a warping path with sliding-window DTW.
    DtwCalc,
    /// Pair `i <-> i` up to the shorter length.
    SameTime,
    /// Resample the longer signal to the shorter length, then pair `i <-> i`.
    RelativeTime,
    /// Same-time pairing with raw (unnormalized) dot products.
    RawDotProductSameTime,
}

impl AlignmentMode {
    /// All modes, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::DtwPath,
        Self::DtwCalc,
        Self::SameTime,
        Self::RelativeTime,
        Self::RawDotProductSameTime,
    ];

    /// Stable tag used in configuration and reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DtwPath => "dtw_path",
            Self::DtwCalc => "dtw_calc",
            Self::SameTime => "same_time",
            Self::RelativeTime => "relative_time",
            Self::RawDotProductSameTime => "raw_dot_product_same_time",
        }
    }
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlignmentMode {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| AlignError::UnknownMode {
                mode: s.to_string(),
            })
    }
}

/// `round(linspace(0, len - 1, target))`: `target` indices spread evenly over
/// `0..len`, rounding halves to even.
#[must_use]
pub fn resample_indices(len: usize, target: usize) -> Vec<usize> {
    match target {
        0 => Vec::new(),
        1 => vec![0],
        _ => {
            let step = len.saturating_sub(1) as f64 / (target - 1) as f64;
            (0..target)
                .map(|k| (k as f64 * step).round_ties_even() as usize)
                .collect()
        }
    }
}

/// Ordered index pairs `(index_a, index_b)` between two signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correspondence(Vec<(usize, usize)>);

impl Correspondence {
    /// Pair `i <-> i` for `i < min(len_a, len_b)`.
    #[must_use]
    pub fn same_time(len_a: usize, len_b: usize) -> Self {
        Self((0..len_a.min(len_b)).map(|i| (i, i)).collect())
    }

    /// Compress the longer signal onto the shorter one's length with
    /// [`resample_indices`], then pair one-to-one.
    #[must_use]
    pub fn relative_time(len_a: usize, len_b: usize) -> Self {
        if len_a > len_b {
            Self(
                resample_indices(len_a, len_b)
                    .into_iter()
                    .enumerate()
                    .map(|(k, i)| (i, k))
                    .collect(),
            )
        } else {
            Self(
                resample_indices(len_b, len_a)
                    .into_iter()
                    .enumerate()
                    .map(|(k, j)| (k, j))
                    .collect(),
            )
        }
    }

    /// Every step of a warping path.
    #[must_use]
    pub fn along_path(path: &WarpingPath) -> Self {
        Self(path.steps().iter().map(|s| (s.a, s.b)).collect())
    }

    /// Every step of a warping path except the terminal one.
    #[must_use]
    pub fn along_path_without_last(path: &WarpingPath) -> Self {
        let mut pairs = Self::along_path(path);
        pairs.0.pop();
        pairs
    }

    /// Return the index pairs.
    #[must_use]
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.0
    }

    /// Return the number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Score every pair and average the results.
    ///
    /// Pairs for which `scorer` returns `None` or NaN are dropped rather
    /// than counted as zero. Returns `None` when nothing valid remains.
    pub fn mean_score<F>(&self, mut scorer: F) -> Option<f64>
    where
        F: FnMut(usize, usize) -> Option<f64>,
    {
        let (sum, count) = self
            .0
            .iter()
            .filter_map(|&(i, j)| scorer(i, j))
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        (count > 0).then(|| sum / count as f64)
    }

    /// Check that every pair indexes into signals of length `len_a` and `len_b`.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::PathOutOfBounds`] naming the last pair if any
    /// index is out of range.
    pub fn require_within(&self, len_a: usize, len_b: usize) -> Result<(), AlignError> {
        let out_of_range = self.0.iter().any(|&(i, j)| i >= len_a || j >= len_b);
        if let Some(&(end_a, end_b)) = self.0.last()
            && out_of_range
        {
            return Err(AlignError::PathOutOfBounds {
                end_a,
                end_b,
                len_a,
                len_b,
            });
        }
        Ok(())
    }
}

/// Require `path` to end at `(len_a - 1, len_b - 1)`.
fn require_path_fits(path: &WarpingPath, len_a: usize, len_b: usize) -> Result<(), AlignError> {
    match path.end() {
        Some(end) if end.a + 1 == len_a && end.b + 1 == len_b => Ok(()),
        end => {
            let (end_a, end_b) = end.map_or((0, 0), |s| (s.a, s.b));
            Err(AlignError::PathOutOfBounds {
                end_a,
                end_b,
                len_a,
                len_b,
            })
        }
    }
}

/// Euclidean distance between sample `i` of `a` and sample `j` of `b`.
pub(crate) fn sample_distance(a: &Signal, i: usize, b: &Signal, j: usize) -> f64 {
    a.axes()
        .iter()
        .zip(b.axes())
        .map(|(x, y)| (x[i] - y[j]).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Dot product between sample `i` of `a` and sample `j` of `b`.
fn sample_dot(a: &Signal, i: usize, b: &Signal, j: usize) -> f64 {
    a.axes().iter().zip(b.axes()).map(|(x, y)| x[i] * y[j]).sum()
}

fn require_same_axes(a: &Signal, b: &Signal) -> Result<(), AlignError> {
    if a.n_axes() == b.n_axes() {
        Ok(())
    } else {
        Err(DtwError::AxisCountMismatch {
            a: a.n_axes(),
            b: b.n_axes(),
        }
        .into())
    }
}

/// Mean Euclidean distance between paired positions along `path`.
///
/// The terminal path step is left out of the average. Returns NaN when the
/// path has a single step, since no pair remains.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`AlignError::Dtw`] | The signals differ in axis count |
/// | [`AlignError::PathOutOfBounds`] | `path` does not end at the last sample of both signals |
pub fn path_euclidean_distance(a: &Signal, b: &Signal, path: &WarpingPath) -> Result<f64, AlignError> {
    require_same_axes(a, b)?;
    require_path_fits(path, a.len(), b.len())?;
    let pairs = Correspondence::along_path_without_last(path);
    Ok(pairs
        .mean_score(|i, j| Some(sample_distance(a, i, b, j)))
        .unwrap_or(f64::NAN))
}

/// Mean absolute quaternion dot product `|q_a . q_b|` over `correspondence`.
///
/// Returns NaN when there are no pairs.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`AlignError::Signal`] | Either rotation signal lacks 4 axes |
/// | [`AlignError::PathOutOfBounds`] | A pair indexes past the end of a signal |
pub fn quaternion_score(
    rot_a: &Signal,
    rot_b: &Signal,
    correspondence: &Correspondence,
) -> Result<f64, AlignError> {
    rot_a.require_axes(4)?;
    rot_b.require_axes(4)?;
    correspondence.require_within(rot_a.len(), rot_b.len())?;
    Ok(correspondence
        .mean_score(|i, j| Some(sample_dot(rot_a, i, rot_b, j).abs()))
        .unwrap_or(f64::NAN))
}

/// Align two trials on position, then score their orientations along that
/// path with the mean absolute quaternion dot product.
///
/// Positions and rotations of each trial must be frame-synchronized.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`AlignError::FrameCountMismatch`] | Rotation and position lengths differ |
/// | [`AlignError::Signal`] | Rotations lack 4 axes |
/// | [`AlignError::Dtw`] | Position alignment failed |
#[instrument(skip_all, fields(len_a = pos_a.len(), len_b = pos_b.len()))]
pub fn quaternion_alignment_score(
    dtw: &SlidingDtw,
    pos_a: &Signal,
    rot_a: &Signal,
    pos_b: &Signal,
    rot_b: &Signal,
) -> Result<f64, AlignError> {
    for (pos, rot) in [(pos_a, rot_a), (pos_b, rot_b)] {
        if pos.len() != rot.len() {
            return Err(AlignError::FrameCountMismatch {
                positions: pos.len(),
                rotations: rot.len(),
            });
        }
    }
    let alignment = dtw.align(pos_a, pos_b)?;
    quaternion_score(rot_a, rot_b, &Correspondence::along_path(&alignment.path))
}

/// Sakoe-Chiba factor of [`default_recompute_dtw`].
pub const RECOMPUTE_BAND_FACTOR: f64 = 300.0;

/// DTW configuration used by [`AlignmentMode::DtwCalc`] unless overridden:
/// window 12, alpha 0.5, Sakoe-Chiba band with factor 300.
#[must_use]
pub fn default_recompute_dtw() -> SlidingDtw {
    SlidingDtw::default().with_global_window(GlobalWindow::sakoe_chiba(RECOMPUTE_BAND_FACTOR))
}

/// Compare the motion directions of two position signals.
///
/// Construct via [`MotionComparison::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter   | Default                     |
/// |-------------|-----------------------------|
/// | `normalize` | true (cosine similarity)    |
/// | `dtw`       | [`default_recompute_dtw`]   |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionComparison {
    mode: AlignmentMode,
    normalize: bool,
    dtw: SlidingDtw,
}

impl MotionComparison {
    /// Create a comparison for the given correspondence mode.
    #[must_use]
    pub fn new(mode: AlignmentMode) -> Self {
        Self {
            mode,
            normalize: true,
            dtw: default_recompute_dtw(),
        }
    }

    /// Divide each dot product by the product of the vector lengths.
    /// Ignored in [`AlignmentMode::RawDotProductSameTime`].
    #[must_use]
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set the DTW configuration used in [`AlignmentMode::DtwCalc`].
    #[must_use]
    pub fn with_dtw(mut self, dtw: SlidingDtw) -> Self {
        self.dtw = dtw;
        self
    }

    /// Return the correspondence mode.
    #[must_use]
    pub fn mode(&self) -> AlignmentMode {
        self.mode
    }

    /// Mean motion-direction dot product between `model` and `test` positions.
    ///
    /// Motion vectors are first differences with stationary frames collapsed.
    /// Pairs whose index falls outside either vector sequence are skipped;
    /// when normalizing, pairs with a zero-length vector are skipped too.
    /// Returns 0.0 if either side has no motion or no pair survives.
    ///
    /// `path` is required in [`AlignmentMode::DtwPath`] and ignored otherwise.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::MissingPath`] | `DtwPath` mode without `path` |
    /// | [`AlignError::Signal`] | A position signal lacks 3 axes |
    /// | [`AlignError::Dtw`] | `DtwCalc` alignment of the motion vectors failed |
    #[instrument(skip(self, model, test, path), fields(mode = %self.mode))]
    pub fn dot_product(
        &self,
        model: &Signal,
        test: &Signal,
        path: Option<&WarpingPath>,
    ) -> Result<f64, AlignError> {
        let model_vectors = MotionVectors::from_positions(model)?;
        let test_vectors = MotionVectors::from_positions(test)?;
        if model_vectors.is_empty() || test_vectors.is_empty() {
            debug!("no motion on one side");
            return Ok(0.0);
        }

        let correspondence = match self.mode {
            AlignmentMode::DtwPath => {
                Correspondence::along_path_without_last(path.ok_or(AlignError::MissingPath)?)
            }
            AlignmentMode::DtwCalc => {
                let alignment = self
                    .dtw
                    .align(&model_vectors.to_signal()?, &test_vectors.to_signal()?)?;
                Correspondence::along_path_without_last(&alignment.path)
            }
            AlignmentMode::SameTime | AlignmentMode::RawDotProductSameTime => {
                Correspondence::same_time(model_vectors.len(), test_vectors.len())
            }
            AlignmentMode::RelativeTime => {
                Correspondence::relative_time(model_vectors.len(), test_vectors.len())
            }
        };
        let normalize = self.normalize && self.mode != AlignmentMode::RawDotProductSameTime;
        debug!(pairs = correspondence.len(), normalize, "scoring motion pairs");

        let score = correspondence.mean_score(|i, j| {
            let u = model_vectors.get(i)?;
            let v = test_vectors.get(j)?;
            let dot = dot3(u, v);
            if !normalize {
                return Some(dot);
            }
            let (nu, nv) = (norm3(u), norm3(v));
            (nu > 0.0 && nv > 0.0).then(|| dot / (nu * nv))
        });
        Ok(score.unwrap_or(0.0))
    }
}

/// Compare two position signals by per-pair Euclidean distance.
///
/// Supports [`AlignmentMode::SameTime`], [`AlignmentMode::RelativeTime`], and
/// [`AlignmentMode::DtwCalc`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionComparison {
    mode: AlignmentMode,
    average: bool,
    dtw: SlidingDtw,
}

impl PositionComparison {
    /// Create a comparison for the given correspondence mode.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::UnsupportedMode`] for `DtwPath` and
    /// `RawDotProductSameTime`.
    pub fn new(mode: AlignmentMode) -> Result<Self, AlignError> {
        match mode {
            AlignmentMode::SameTime | AlignmentMode::RelativeTime | AlignmentMode::DtwCalc => {
                Ok(Self {
                    mode,
                    average: true,
                    dtw: default_recompute_dtw(),
                })
            }
            other => Err(AlignError::UnsupportedMode {
                mode: other.as_str(),
                reduction: "position distance",
            }),
        }
    }

    /// Return the mean distance (default) or, with `false`, the plain sum.
    #[must_use]
    pub fn with_average(mut self, average: bool) -> Self {
        self.average = average;
        self
    }

    /// Set the DTW configuration used in [`AlignmentMode::DtwCalc`].
    #[must_use]
    pub fn with_dtw(mut self, dtw: SlidingDtw) -> Self {
        self.dtw = dtw;
        self
    }

    /// Euclidean distance between corresponding positions.
    ///
    /// NaN pair distances are left out of the sum but still count toward the
    /// pair total. Every path step counts in `DtwCalc` mode.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::Dtw`] | Axis counts differ, or `DtwCalc` alignment failed |
    #[instrument(skip(self, model, test), fields(mode = %self.mode))]
    pub fn euclidean_distance(&self, model: &Signal, test: &Signal) -> Result<f64, AlignError> {
        require_same_axes(model, test)?;
        let correspondence = match self.mode {
            AlignmentMode::DtwCalc => {
                Correspondence::along_path(&self.dtw.align(model, test)?.path)
            }
            AlignmentMode::RelativeTime => Correspondence::relative_time(model.len(), test.len()),
            _ => Correspondence::same_time(model.len(), test.len()),
        };
        if correspondence.is_empty() {
            return Ok(0.0);
        }

        let total: f64 = correspondence
            .pairs()
            .iter()
            .map(|&(i, j)| sample_distance(model, i, test, j))
            .filter(|d| !d.is_nan())
            .sum();
        Ok(if self.average {
            total / correspondence.len() as f64
        } else {
            total
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(samples: &[[f64; 3]]) -> Signal {
        Signal::from_samples(samples).unwrap()
    }

    fn ramp(n: usize, direction: [f64; 3]) -> Signal {
        let samples: Vec<[f64; 3]> = (0..n)
            .map(|i| {
                let t = i as f64;
                [direction[0] * t, direction[1] * t, direction[2] * t]
            })
            .collect();
        positions(&samples)
    }

    #[test]
    fn mode_parse_round_trip() {
        for mode in AlignmentMode::ALL {
            assert_eq!(mode.as_str().parse::<AlignmentMode>().unwrap(), mode);
        }
    }

    #[test]
    fn mode_parse_rejects_unknown() {
        let result = "dtw".parse::<AlignmentMode>();
        assert!(matches!(result, Err(AlignError::UnknownMode { mode }) if mode == "dtw"));
    }

    #[test]
    fn resample_indices_matches_linspace() {
        assert_eq!(resample_indices(10, 4), vec![0, 3, 6, 9]);
        assert_eq!(resample_indices(5, 5), vec![0, 1, 2, 3, 4]);
        assert_eq!(resample_indices(7, 1), vec![0]);
        // linspace(0, 5, 3) = [0, 2.5, 5]; halves round to even
        assert_eq!(resample_indices(6, 3), vec![0, 2, 5]);
    }

    #[test]
    fn same_time_stops_at_shorter() {
        let c = Correspondence::same_time(5, 3);
        assert_eq!(c.pairs(), &[(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn relative_time_compresses_longer_side() {
        let c = Correspondence::relative_time(10, 4);
        assert_eq!(c.pairs(), &[(0, 0), (3, 1), (6, 2), (9, 3)]);
        let c = Correspondence::relative_time(4, 10);
        assert_eq!(c.pairs(), &[(0, 0), (1, 3), (2, 6), (3, 9)]);
    }

    #[test]
    fn mean_score_drops_missing_and_nan() {
        let c = Correspondence::same_time(4, 4);
        let mean = c.mean_score(|i, _| match i {
            0 => Some(1.0),
            1 => None,
            2 => Some(f64::NAN),
            _ => Some(3.0),
        });
        assert_eq!(mean, Some(2.0));
        assert_eq!(c.mean_score(|_, _| None), None);
    }

    #[test]
    fn path_distance_skips_terminal_step() {
        let a = positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        let b = positions(&[[0.0, 1.0, 0.0], [1.0, 3.0, 0.0], [2.0, 100.0, 0.0]]);
        let path = WarpingPath::from_indices(&[0, 1, 2], &[0, 1, 2]).unwrap();
        // pairs (0,0) -> 1, (1,1) -> 3; the terminal pair is excluded
        let d = path_euclidean_distance(&a, &b, &path).unwrap();
        assert!((d - 2.0).abs() < 1e-12);
    }

    #[test]
    fn path_distance_single_step_is_nan() {
        let a = positions(&[[0.0, 0.0, 0.0]]);
        let path = WarpingPath::from_indices(&[0], &[0]).unwrap();
        assert!(path_euclidean_distance(&a, &a, &path).unwrap().is_nan());
    }

    #[test]
    fn path_distance_rejects_path_from_other_signals() {
        let long = ramp(8, [1.0, 0.0, 0.0]);
        let short = ramp(4, [1.0, 0.0, 0.0]);
        let path = SlidingDtw::new(2).unwrap().align(&long, &long).unwrap().path;
        assert!(matches!(
            path_euclidean_distance(&short, &short, &path),
            Err(AlignError::PathOutOfBounds { end_a: 7, end_b: 7, len_a: 4, len_b: 4 })
        ));

        // a path that stops short of the signal ends is rejected too
        let partial = WarpingPath::from_indices(&[0, 1], &[0, 1]).unwrap();
        assert!(matches!(
            path_euclidean_distance(&short, &short, &partial),
            Err(AlignError::PathOutOfBounds { end_a: 1, end_b: 1, .. })
        ));
    }

    #[test]
    fn quaternion_score_uses_absolute_dot() {
        let qa = Signal::from_samples(&[[0.0, 0.0, 0.0, 1.0], [1.0, 0.0, 0.0, 0.0]]).unwrap();
        let qb = Signal::from_samples(&[[0.0, 0.0, 0.0, -1.0], [0.0, 1.0, 0.0, 0.0]]).unwrap();
        let s = quaternion_score(&qa, &qb, &Correspondence::same_time(2, 2)).unwrap();
        assert!((s - 0.5).abs() < 1e-12);
    }

    #[test]
    fn quaternion_score_rejects_out_of_range_pairs() {
        let pos = ramp(8, [1.0, 0.5, 0.0]);
        let rot = Signal::from_samples(&[[0.0, 0.0, 0.0, 1.0]; 4]).unwrap();
        let path = SlidingDtw::new(2).unwrap().align(&pos, &pos).unwrap().path;
        let result = quaternion_score(&rot, &rot, &Correspondence::along_path(&path));
        assert!(matches!(
            result,
            Err(AlignError::PathOutOfBounds { end_a: 7, end_b: 7, len_a: 4, len_b: 4 })
        ));
    }

    #[test]
    fn quaternion_alignment_reuses_position_path() {
        let pos = ramp(6, [1.0, 0.5, 0.0]);
        let rot = Signal::from_samples(&[[0.0, 0.0, 0.0, 1.0]; 6]).unwrap();
        let dtw = SlidingDtw::new(2).unwrap();
        let s = quaternion_alignment_score(&dtw, &pos, &rot, &pos, &rot).unwrap();
        assert!((s - 1.0).abs() < 1e-12);
    }

    #[test]
    fn quaternion_alignment_requires_synchronized_frames() {
        let pos = ramp(6, [1.0, 0.0, 0.0]);
        let rot = Signal::from_samples(&[[0.0, 0.0, 0.0, 1.0]; 5]).unwrap();
        let dtw = SlidingDtw::new(2).unwrap();
        let result = quaternion_alignment_score(&dtw, &pos, &rot, &pos, &rot);
        assert!(matches!(
            result,
            Err(AlignError::FrameCountMismatch { positions: 6, rotations: 5 })
        ));
    }

    #[test]
    fn motion_same_time_parallel_is_one() {
        let a = ramp(5, [1.0, 0.0, 0.0]);
        let b = ramp(3, [2.0, 0.0, 0.0]);
        let score = MotionComparison::new(AlignmentMode::SameTime)
            .dot_product(&a, &b, None)
            .unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn motion_raw_dot_ignores_normalization() {
        let a = ramp(4, [1.0, 0.0, 0.0]);
        let b = ramp(4, [3.0, 0.0, 0.0]);
        let score = MotionComparison::new(AlignmentMode::RawDotProductSameTime)
            .with_normalization(true)
            .dot_product(&a, &b, None)
            .unwrap();
        assert!((score - 3.0).abs() < 1e-12);
    }

    #[test]
    fn motion_opposite_directions_is_minus_one() {
        let a = ramp(4, [0.0, 1.0, 0.0]);
        let b = ramp(4, [0.0, -1.0, 0.0]);
        let score = MotionComparison::new(AlignmentMode::RelativeTime)
            .dot_product(&a, &b, None)
            .unwrap();
        assert!((score + 1.0).abs() < 1e-12);
    }

    #[test]
    fn motionless_side_scores_zero() {
        let a = ramp(5, [1.0, 0.0, 0.0]);
        let still = positions(&[[1.0, 1.0, 1.0]; 5]);
        for mode in AlignmentMode::ALL {
            let score = MotionComparison::new(mode).dot_product(&a, &still, None).unwrap();
            assert_eq!(score, 0.0, "mode {mode}");
        }
    }

    #[test]
    fn motion_dtw_path_requires_path() {
        let a = ramp(5, [1.0, 0.0, 0.0]);
        let result = MotionComparison::new(AlignmentMode::DtwPath).dot_product(&a, &a, None);
        assert!(matches!(result, Err(AlignError::MissingPath)));
    }

    #[test]
    fn motion_dtw_path_skips_out_of_range_pairs() {
        // 4 positions -> 3 motion vectors; path indices address positions
        let a = ramp(4, [1.0, 0.0, 0.0]);
        let path = WarpingPath::from_indices(&[0, 1, 2, 3, 3], &[0, 1, 2, 2, 3]).unwrap();
        let score = MotionComparison::new(AlignmentMode::DtwPath)
            .dot_product(&a, &a, Some(&path))
            .unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn motion_dtw_calc_on_identical_curves() {
        let samples: Vec<[f64; 3]> = (0..30)
            .map(|i| {
                let t = i as f64 * 0.2;
                [t.cos(), t.sin(), 0.1 * t]
            })
            .collect();
        let a = positions(&samples);
        let dtw = SlidingDtw::new(4).unwrap();
        let score = MotionComparison::new(AlignmentMode::DtwCalc)
            .with_dtw(dtw)
            .dot_product(&a, &a.clone(), None)
            .unwrap();
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn position_same_time_mean_and_total() {
        let a = positions(&[[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [9.0, 9.0, 9.0]]);
        let b = positions(&[[3.0, 4.0, 0.0], [0.0, 0.0, 1.0]]);
        let cmp = PositionComparison::new(AlignmentMode::SameTime).unwrap();
        assert!((cmp.euclidean_distance(&a, &b).unwrap() - 3.0).abs() < 1e-12);
        let total = cmp.with_average(false).euclidean_distance(&a, &b).unwrap();
        assert!((total - 6.0).abs() < 1e-12);
    }

    #[test]
    fn position_dtw_calc_identical_is_zero() {
        let a = ramp(8, [1.0, 2.0, 0.5]);
        let cmp = PositionComparison::new(AlignmentMode::DtwCalc)
            .unwrap()
            .with_dtw(SlidingDtw::new(3).unwrap());
        assert_eq!(cmp.euclidean_distance(&a, &a.clone()).unwrap(), 0.0);
    }

    #[test]
    fn position_rejects_dot_product_modes() {
        for mode in [AlignmentMode::DtwPath, AlignmentMode::RawDotProductSameTime] {
            assert!(matches!(
                PositionComparison::new(mode),
                Err(AlignError::UnsupportedMode { .. })
            ));
        }
    }
}
