//! Signal preparation: z-normalization, mirrored edge extension, and first differences.

use tracing::warn;

use crate::error::DtwError;
use crate::signal::Signal;

/// Z-normalize one axis to zero mean and unit variance.
///
/// Uses population standard deviation (divides by n, not n-1). A constant
/// axis has zero standard deviation and normalizes to all-NaN; this is not
/// special-cased.
#[must_use = "returns a new normalized vector; the input is unchanged"]
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    values.iter().map(|&x| (x - mean) / std).collect()
}

/// Z-normalize every axis of a signal independently.
///
/// Axes with zero variance come back as NaN and are reported with a warning;
/// a DTW run over such a signal fails with [`DtwError::NonFiniteCost`].
#[must_use = "returns a new normalized signal; the original is unchanged"]
pub fn normalize_signal(signal: &Signal) -> Signal {
    let axes: Vec<Vec<f64>> = signal
        .axes()
        .iter()
        .enumerate()
        .map(|(axis, values)| {
            let normalized = normalize(values);
            if normalized.iter().any(|v| v.is_nan()) {
                warn!(axis, len = values.len(), "zero-variance axis normalized to NaN");
            }
            normalized
        })
        .collect();
    Signal::new_unchecked(axes)
}

/// Extend a sequence by point reflection around its first and last samples.
///
/// Prepends `2*s[0] - s[k]` for `k = window_size..=1` and appends
/// `2*s[n-1] - s[n-1-k]` for `k = 1..=window_size`, giving length
/// `n + 2*window_size`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DtwError::WindowTooLarge`] | `window_size >= values.len()` |
pub fn mirror(values: &[f64], window_size: usize) -> Result<Vec<f64>, DtwError> {
    let n = values.len();
    if window_size >= n {
        return Err(DtwError::WindowTooLarge { window_size, len: n });
    }

    let first = values[0];
    let last = values[n - 1];
    let mut out = Vec::with_capacity(n + 2 * window_size);
    out.extend((1..=window_size).rev().map(|k| 2.0 * first - values[k]));
    out.extend_from_slice(values);
    out.extend((1..=window_size).map(|k| 2.0 * last - values[n - 1 - k]));
    Ok(out)
}

/// First differences `d[i] = x[i+1] - x[i]`. Output length is `len - 1`
/// (empty for inputs shorter than 2).
#[must_use]
pub fn derivative(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Mirrored amplitude and derivative axes for windowed cost evaluation.
///
/// Both parts have length `n + 2*window_size - 1`: the derivative of the
/// mirrored signal, and the mirrored signal with its final sample dropped so
/// that amplitude and derivative share indexing. Sample `i` of the original
/// signal sits at offset `i + window_size`.
#[derive(Debug, Clone)]
pub(crate) struct MirroredSignal {
    pub(crate) amplitude: Vec<Vec<f64>>,
    pub(crate) derivative: Vec<Vec<f64>>,
}

impl MirroredSignal {
    /// Mirror and differentiate every axis of `signal`.
    pub(crate) fn build(signal: &Signal, window_size: usize) -> Result<Self, DtwError> {
        let mut amplitude = Vec::with_capacity(signal.n_axes());
        let mut deriv = Vec::with_capacity(signal.n_axes());
        for values in signal.axes() {
            let mut extended = mirror(values, window_size)?;
            deriv.push(derivative(&extended));
            extended.pop();
            amplitude.push(extended);
        }
        Ok(Self {
            amplitude,
            derivative: deriv,
        })
    }

    /// Length of each mirrored axis.
    pub(crate) fn len(&self) -> usize {
        self.amplitude[0].len()
    }
}
