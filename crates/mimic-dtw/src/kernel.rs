//! Hamming-tapered sliding-window local cost.

use crate::error::DtwError;
use crate::preprocess::MirroredSignal;

/// Symmetric Hamming window of length `n`: `0.54 - 0.46 cos(2 pi k / (n - 1))`.
///
/// Length 1 yields `[1.0]`; length 0 yields an empty window.
#[must_use]
pub fn hamming(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (n - 1) as f64;
            (0..n)
                .map(|k| 0.54 - 0.46 * (2.0 * std::f64::consts::PI * k as f64 / denom).cos())
                .collect()
        }
    }
}

/// Local cost between two windowed neighbourhoods, blending derivative
/// (shape) and amplitude differences:
///
/// `cost = (1 - alpha) * ||(dA - dB) * w|| + alpha * ||(A - B) * w||`
///
/// where `w` is a Hamming taper scaled to sum to 1 and each norm sums the
/// squared weighted differences over every active axis before the square root.
#[derive(Debug, Clone, PartialEq)]
pub struct CostKernel {
    taper: Vec<f64>,
    alpha: f64,
}

impl CostKernel {
    /// Build the kernel for a sliding window of `window_size` samples.
    ///
    /// An even window size is reduced by one so the taper stays symmetric
    /// around its centre sample.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ZeroWindow`] | `window_size` is zero |
    /// | [`DtwError::InvalidAlpha`] | `alpha` is outside `[0, 1]` or non-finite |
    pub fn new(window_size: usize, alpha: f64) -> Result<Self, DtwError> {
        if window_size == 0 {
            return Err(DtwError::ZeroWindow);
        }
        if !(0.0..=1.0).contains(&alpha) {
            return Err(DtwError::InvalidAlpha { alpha });
        }
        let width = if window_size % 2 == 0 {
            window_size - 1
        } else {
            window_size
        };
        let mut taper = hamming(width);
        let total: f64 = taper.iter().sum();
        for w in &mut taper {
            *w /= total;
        }
        Ok(Self { taper, alpha })
    }

    /// Effective (odd) window width.
    #[must_use]
    pub fn width(&self) -> usize {
        self.taper.len()
    }

    /// The normalized taper weights.
    #[must_use]
    pub fn taper(&self) -> &[f64] {
        &self.taper
    }

    /// The amplitude/derivative blend factor.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Cost between pre-extracted windows. Each slice in `amp_a`, `amp_b`,
    /// `der_a`, `der_b` is one axis and must have length [`width`][Self::width].
    ///
    /// # Panics
    ///
    /// Panics if the four slices disagree on axis count.
    #[must_use]
    pub fn window_cost(
        &self,
        amp_a: &[&[f64]],
        amp_b: &[&[f64]],
        der_a: &[&[f64]],
        der_b: &[&[f64]],
    ) -> f64 {
        assert!(
            amp_a.len() == amp_b.len() && der_a.len() == der_b.len() && amp_a.len() == der_a.len(),
            "window axis counts differ"
        );
        let amp_sq: f64 = amp_a
            .iter()
            .zip(amp_b)
            .map(|(x, y)| self.weighted_sq(x, y))
            .sum();
        let der_sq: f64 = der_a
            .iter()
            .zip(der_b)
            .map(|(x, y)| self.weighted_sq(x, y))
            .sum();
        self.blend(der_sq, amp_sq)
    }

    /// Cost for cell `(i, j)`, reading the windows centred on offset
    /// `i + width` of `a` and `j + width` of `b` directly from the mirrored data.
    pub(crate) fn local_cost(
        &self,
        a: &MirroredSignal,
        i: usize,
        b: &MirroredSignal,
        j: usize,
    ) -> f64 {
        let width = self.width();
        let half = width / 2;
        let start_a = i + width - half;
        let start_b = j + width - half;

        let mut amp_sq = 0.0;
        let mut der_sq = 0.0;
        for axis in 0..a.amplitude.len() {
            amp_sq += self.weighted_sq(
                &a.amplitude[axis][start_a..start_a + width],
                &b.amplitude[axis][start_b..start_b + width],
            );
            der_sq += self.weighted_sq(
                &a.derivative[axis][start_a..start_a + width],
                &b.derivative[axis][start_b..start_b + width],
            );
        }
        self.blend(der_sq, amp_sq)
    }

    fn weighted_sq(&self, x: &[f64], y: &[f64]) -> f64 {
        x.iter()
            .zip(y)
            .zip(&self.taper)
            .map(|((&p, &q), &w)| ((p - q) * w).powi(2))
            .sum()
    }

    fn blend(&self, der_sq: f64, amp_sq: f64) -> f64 {
        (1.0 - self.alpha) * der_sq.sqrt() + self.alpha * amp_sq.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;

    #[test]
    fn hamming_matches_reference_values() {
        let w = hamming(5);
        let expected = [0.08, 0.54, 1.0, 0.54, 0.08];
        for (got, want) in w.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "got {got}, want {want}");
        }
        assert_eq!(hamming(1), vec![1.0]);
        assert!(hamming(0).is_empty());
    }

    #[test]
    fn even_window_is_narrowed() {
        let k = CostKernel::new(12, 0.5).unwrap();
        assert_eq!(k.width(), 11);
        let k = CostKernel::new(7, 0.5).unwrap();
        assert_eq!(k.width(), 7);
    }

    #[test]
    fn even_window_reads_one_sample_early() {
        // a = [1, 2, 4, 7] mirrored by 2:
        //   amplitude  [-2, 0, 1, 2, 4, 7, 10]
        //   derivative [ 2, 1, 1, 2, 3, 3,  2]
        // window 2 narrows to width 1, so cell i reads offset i + 1
        // (sample i - 1), not the centred offset i + 2
        let a = Signal::new(vec![vec![1.0, 2.0, 4.0, 7.0]]).unwrap();
        let zero = Signal::new(vec![vec![0.0; 4]]).unwrap();
        let (ma, mz) = (
            MirroredSignal::build(&a, 2).unwrap(),
            MirroredSignal::build(&zero, 2).unwrap(),
        );
        let k = CostKernel::new(2, 0.5).unwrap();
        let costs: Vec<f64> = (0..4).map(|i| k.local_cost(&ma, i, &mz, 0)).collect();
        // 0.5 * |derivative| + 0.5 * |amplitude|
        let expected = [0.5, 1.0, 2.0, 3.5];
        for (got, want) in costs.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "got {costs:?}");
        }
    }

    #[test]
    fn taper_sums_to_one() {
        let k = CostKernel::new(9, 0.5).unwrap();
        let total: f64 = k.taper().iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_alpha_and_zero_window() {
        assert!(matches!(CostKernel::new(3, 1.5), Err(DtwError::InvalidAlpha { .. })));
        assert!(matches!(CostKernel::new(3, f64::NAN), Err(DtwError::InvalidAlpha { .. })));
        assert!(matches!(CostKernel::new(0, 0.5), Err(DtwError::ZeroWindow)));
    }

    #[test]
    fn window_cost_blends_terms() {
        // width 1, taper [1.0]
        // amplitude diff per axis: 3 and 4 -> norm 5
        // derivative diff: 1 -> norm 1
        let k = CostKernel::new(1, 0.25).unwrap();
        let (three, four, one, zero): (&[f64], &[f64], &[f64], &[f64]) = (&[3.0], &[4.0], &[1.0], &[0.0]);
        let cost = k.window_cost(&[three, four], &[zero, zero], &[one, zero], &[zero, zero]);
        assert!((cost - (0.75 * 1.0 + 0.25 * 5.0)).abs() < 1e-12);
    }

    #[test]
    fn alpha_extremes_select_one_term() {
        let amp_only = CostKernel::new(1, 1.0).unwrap();
        let der_only = CostKernel::new(1, 0.0).unwrap();
        let amp_a: &[f64] = &[2.0];
        let der_a: &[f64] = &[7.0];
        let zero: &[f64] = &[0.0];
        assert_eq!(amp_only.window_cost(&[amp_a], &[zero], &[der_a], &[zero]), 2.0);
        assert_eq!(der_only.window_cost(&[amp_a], &[zero], &[der_a], &[zero]), 7.0);
    }

    #[test]
    fn local_cost_of_identical_signals_is_zero() {
        let s = Signal::new(vec![vec![0.0, 1.0, 4.0, 9.0, 16.0, 25.0]]).unwrap();
        let m = MirroredSignal::build(&s, 3).unwrap();
        let k = CostKernel::new(3, 0.5).unwrap();
        for i in 0..s.len() {
            assert_eq!(k.local_cost(&m, i, &m, i), 0.0);
        }
        assert!(k.local_cost(&m, 0, &m, 5) > 0.0);
    }
}
