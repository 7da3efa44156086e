//! Sliding-window multivariate DTW and alignment-based similarity scores.
//!
//! Pure math library with no I/O. Aligns two multivariate signals with a
//! Hamming-windowed amplitude/derivative cost, optionally inside a Sakoe-Chiba
//! band, and reduces the resulting correspondence to scalar scores: path
//! Euclidean distance, quaternion agreement, and motion-direction dot products.

mod align;
mod constraint;
mod distance;
mod dtw;
mod error;
mod kernel;
mod matrix;
mod motion;
mod path;
mod preprocess;
mod resample;
mod score;
mod signal;

pub use align::{
    AlignmentMode, Correspondence, MotionComparison, PositionComparison, RECOMPUTE_BAND_FACTOR,
    default_recompute_dtw, path_euclidean_distance, quaternion_alignment_score, quaternion_score,
    resample_indices,
};
pub use constraint::{DEFAULT_BAND_FRACTION, GlobalWindow, ParseGlobalWindowError, ResolvedWindow};
pub use distance::{DistanceScale, DtwDistance};
pub use dtw::{DEFAULT_WINDOW_SIZE, DtwAlignment, MAX_AXES, SlidingDtw};
pub use error::{AlignError, DtwError, ScoreError, SignalError};
pub use kernel::{CostKernel, hamming};
pub use matrix::CostMatrix;
pub use motion::{MotionVectors, STATIONARY_TOLERANCE, dot3, norm3};
pub use path::{WarpingPath, WarpingStep};
pub use preprocess::{derivative, mirror, normalize, normalize_signal};
pub use resample::resample_to;
pub use score::{DEFAULT_FRAMES, ScoreMetric, Trajectory};
pub use signal::Signal;
