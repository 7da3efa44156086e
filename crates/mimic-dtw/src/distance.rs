//! DTW distance newtype tagged with its normalization.

use std::cmp::Ordering;
use std::fmt;

/// How a [`DtwDistance`] was reduced from the terminal accumulated cost.
///
/// Raw and path-normalized distances are not interchangeable, so every
/// distance carries its scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceScale {
    /// Terminal accumulated cost, unchanged.
    Raw,
    /// Terminal accumulated cost divided by `len(path_a) + len(path_b)`.
    PathNormalized,
}

impl DistanceScale {
    /// Stable lowercase name, used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::PathNormalized => "path_normalized",
        }
    }
}

/// A non-negative DTW distance value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DtwDistance {
    value: f64,
    scale: DistanceScale,
}

impl DtwDistance {
    /// Reduce a terminal accumulated cost to a distance.
    ///
    /// With `normalize`, divides by `2 * path_len`, the summed lengths of the
    /// two index sequences of the warping path.
    pub(crate) fn from_accumulated(terminal: f64, path_len: usize, normalize: bool) -> Self {
        if normalize {
            Self {
                value: terminal / (2 * path_len) as f64,
                scale: DistanceScale::PathNormalized,
            }
        } else {
            Self {
                value: terminal,
                scale: DistanceScale::Raw,
            }
        }
    }

    /// Return the distance value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.value
    }

    /// Return how the value was normalized.
    #[must_use]
    pub fn scale(self) -> DistanceScale {
        self.scale
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.value.total_cmp(&other.value)
    }
}

impl fmt::Display for DtwDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.value)
    }
}
