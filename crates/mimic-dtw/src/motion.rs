//! Frame-to-frame motion vectors derived from position signals.

use crate::error::SignalError;
use crate::signal::Signal;

/// Per-component tolerance below which a displacement counts as stationary.
pub const STATIONARY_TOLERANCE: f64 = 1e-8;

/// First-difference displacement vectors of a 3-D position signal with
/// stationary frames removed.
///
/// Each run of near-zero displacements collapses into the non-zero
/// displacement that ends it, so direction information survives while
/// stationary-frame noise is suppressed. Trailing stationary frames are
/// dropped; a signal that never moves yields an empty sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionVectors(Vec<[f64; 3]>);

impl MotionVectors {
    /// Derive motion vectors from a position signal.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::AxisCount`] if `positions` does not have 3 axes.
    pub fn from_positions(positions: &Signal) -> Result<Self, SignalError> {
        positions.require_axes(3)?;
        let (x, y, z) = (positions.axis(0), positions.axis(1), positions.axis(2));
        let vectors = (1..positions.len())
            .map(|i| [x[i] - x[i - 1], y[i] - y[i - 1], z[i] - z[i - 1]])
            .filter(|v| !is_stationary(v))
            .collect();
        Ok(Self(vectors))
    }

    /// Wrap already-computed displacement vectors, dropping stationary ones.
    #[must_use]
    pub fn from_displacements(displacements: &[[f64; 3]]) -> Self {
        Self(
            displacements
                .iter()
                .copied()
                .filter(|v| !is_stationary(v))
                .collect(),
        )
    }

    /// Return the number of motion vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if no motion remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the vectors as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[[f64; 3]] {
        &self.0
    }

    /// Return the vector at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&[f64; 3]> {
        self.0.get(index)
    }

    /// View the vectors as a 3-axis signal, e.g. to align them with DTW.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::EmptySignal`] if there are no vectors.
    pub fn to_signal(&self) -> Result<Signal, SignalError> {
        Signal::from_samples(&self.0)
    }
}

/// 3-D dot product.
#[must_use]
pub fn dot3(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Euclidean length of a 3-D vector.
#[must_use]
pub fn norm3(a: &[f64; 3]) -> f64 {
    dot3(a, a).sqrt()
}

fn is_stationary(v: &[f64; 3]) -> bool {
    v.iter().all(|c| c.abs() <= STATIONARY_TOLERANCE)
}
