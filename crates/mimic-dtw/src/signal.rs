//! Multivariate signal type with validation guarantees.

use crate::error::SignalError;

/// Owned, axis-major multivariate signal.
///
/// Guaranteed to have at least one axis, at least one sample, equal-length
/// axes, and all finite values when built through [`Signal::new`] or
/// [`Signal::from_samples`]. Positions use 3 axes (x, y, z) and orientation
/// quaternions use 4 axes (qx, qy, qz, qw).
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    axes: Vec<Vec<f64>>,
}

impl Signal {
    /// Create a signal from per-axis sample vectors.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SignalError::EmptySignal`] | No axes, or axis 0 has no samples |
    /// | [`SignalError::AxisLengthMismatch`] | Any axis differs in length from axis 0 |
    /// | [`SignalError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(axes: Vec<Vec<f64>>) -> Result<Self, SignalError> {
        let expected = axes.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(SignalError::EmptySignal);
        }
        for (axis, values) in axes.iter().enumerate() {
            if values.len() != expected {
                return Err(SignalError::AxisLengthMismatch {
                    axis,
                    expected,
                    got: values.len(),
                });
            }
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(SignalError::NonFiniteValue { axis, index });
            }
        }
        Ok(Self { axes })
    }

    /// Create a signal from sample-major fixed-size tuples, e.g. `[[x, y, z]; n]`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Signal::new`].
    pub fn from_samples<const D: usize>(samples: &[[f64; D]]) -> Result<Self, SignalError> {
        let axes = (0..D)
            .map(|k| samples.iter().map(|s| s[k]).collect())
            .collect();
        Self::new(axes)
    }

    /// Build a signal without validation. Used for derived data such as
    /// normalized signals, which may legitimately contain NaN.
    pub(crate) fn new_unchecked(axes: Vec<Vec<f64>>) -> Self {
        debug_assert!(!axes.is_empty());
        Self { axes }
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.axes[0].len()
    }

    /// Return true if the signal has no samples.
    ///
    /// Always `false` for signals built through the validating constructors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.axes.first().is_none_or(Vec::is_empty)
    }

    /// Return the number of axes.
    #[must_use]
    pub fn n_axes(&self) -> usize {
        self.axes.len()
    }

    /// Return the samples of one axis.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= n_axes()`.
    #[must_use]
    pub fn axis(&self, axis: usize) -> &[f64] {
        &self.axes[axis]
    }

    /// Return all axes.
    #[must_use]
    pub fn axes(&self) -> &[Vec<f64>] {
        &self.axes
    }

    /// Return the value of `axis` at sample `index`.
    #[must_use]
    pub fn value(&self, axis: usize, index: usize) -> f64 {
        self.axes[axis][index]
    }

    /// Check that the signal carries exactly `expected` axes.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::AxisCount`] on mismatch.
    pub fn require_axes(&self, expected: usize) -> Result<(), SignalError> {
        if self.n_axes() == expected {
            Ok(())
        } else {
            Err(SignalError::AxisCount {
                expected,
                got: self.n_axes(),
            })
        }
    }

    /// Return a new signal made of the samples at `indices`, in order.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        let axes = self
            .axes
            .iter()
            .map(|values| indices.iter().map(|&i| values[i]).collect())
            .collect();
        Self::new_unchecked(axes)
    }

    /// Consume and return the per-axis vectors.
    #[must_use]
    pub fn into_axes(self) -> Vec<Vec<f64>> {
        self.axes
    }
}

impl TryFrom<Vec<Vec<f64>>> for Signal {
    type Error = SignalError;

    fn try_from(axes: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::new(axes)
    }
}
