//! Fixed-length trajectory resampling.

use crate::signal::Signal;

/// Map `signal` onto exactly `target` samples.
///
/// - Equal length: returned unchanged.
/// - A single sample: tiled `target` times.
/// - Shorter than `target`: per-axis linear interpolation over evenly spaced
///   positions in `[0, 1]`.
/// - Longer than `target`: index decimation at `floor(linspace(0, len - 1, target))`.
///
/// A `target` of zero is treated as one.
#[must_use]
pub fn resample_to(signal: &Signal, target: usize) -> Signal {
    let target = target.max(1);
    let len = signal.len();
    if len == target {
        return signal.clone();
    }
    if len < 2 {
        let axes = signal.axes().iter().map(|v| vec![v[0]; target]).collect();
        return Signal::new_unchecked(axes);
    }
    if len < target {
        let axes = signal
            .axes()
            .iter()
            .map(|values| upsample(values, target))
            .collect();
        return Signal::new_unchecked(axes);
    }
    signal.select(&decimation_indices(len, target))
}

/// `floor(linspace(0, len - 1, target))`.
fn decimation_indices(len: usize, target: usize) -> Vec<usize> {
    if target == 1 {
        return vec![0];
    }
    let step = (len - 1) as f64 / (target - 1) as f64;
    (0..target)
        .map(|k| ((k as f64 * step) as usize).min(len - 1))
        .collect()
}

fn upsample(values: &[f64], target: usize) -> Vec<f64> {
    // source sample k sits at k / (len - 1) and output sample t at t / (target - 1)
    let last = (values.len() - 1) as f64;
    (0..target)
        .map(|t| {
            let x = t as f64 * last / (target - 1) as f64;
            let lo = (x.floor() as usize).min(values.len() - 2);
            let frac = x - lo as f64;
            values[lo] + (values[lo + 1] - values[lo]) * frac
        })
        .collect()
}
