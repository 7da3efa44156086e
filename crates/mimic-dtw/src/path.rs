//! Warping path types for DTW alignment.

use crate::error::DtwError;
use crate::signal::Signal;

/// A single step in a DTW warping path, mapping index `a` in the first signal
/// to index `b` in the second signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarpingStep {
    /// Index in the first signal.
    pub a: usize,
    /// Index in the second signal.
    pub b: usize,
}

/// An ordered sequence of warping steps from `(0, 0)` to `(n-1, m-1)`.
///
/// Every step advances `a`, `b`, or both by exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpingPath(Vec<WarpingStep>);

impl WarpingPath {
    /// Create a new warping path from a vector of steps produced by traceback.
    pub(crate) fn new(steps: Vec<WarpingStep>) -> Self {
        debug_assert!(check_steps(&steps).is_ok());
        Self(steps)
    }

    /// Build a path from two parallel index sequences, e.g. one read back from
    /// a previous run.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::InvalidPath`] when the sequences differ in length,
    /// are empty, do not start at `(0, 0)`, or contain a step that moves
    /// backwards, skips an index, or stands still.
    pub fn from_indices(path_a: &[usize], path_b: &[usize]) -> Result<Self, DtwError> {
        if path_a.len() != path_b.len() {
            return Err(DtwError::InvalidPath {
                step: path_a.len().min(path_b.len()),
                reason: "index sequences differ in length",
            });
        }
        let steps: Vec<WarpingStep> = path_a
            .iter()
            .zip(path_b)
            .map(|(&a, &b)| WarpingStep { a, b })
            .collect();
        check_steps(&steps)?;
        Ok(Self(steps))
    }

    /// Return the warping steps as a slice.
    #[must_use]
    pub fn steps(&self) -> &[WarpingStep] {
        &self.0
    }

    /// Return the number of steps in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Indices into the first signal, one per step.
    #[must_use]
    pub fn path_a(&self) -> Vec<usize> {
        self.0.iter().map(|s| s.a).collect()
    }

    /// Indices into the second signal, one per step.
    #[must_use]
    pub fn path_b(&self) -> Vec<usize> {
        self.0.iter().map(|s| s.b).collect()
    }

    /// The last step, i.e. `(len_a - 1, len_b - 1)`.
    #[must_use]
    pub fn end(&self) -> Option<WarpingStep> {
        self.0.last().copied()
    }

    /// Warp `signal` (the second signal of the alignment) onto the first
    /// signal's time grid.
    ///
    /// Output sample `r` is the mean of every `signal` sample the path pairs
    /// with reference index `r`. Output length is `end().a + 1`.
    ///
    /// # Panics
    ///
    /// Panics if a path index exceeds the length of `signal`.
    #[must_use]
    pub fn project(&self, signal: &Signal) -> Signal {
        let out_len = self.end().map_or(0, |s| s.a + 1);
        let axes = signal
            .axes()
            .iter()
            .map(|values| {
                let mut sums = vec![0.0; out_len];
                let mut counts = vec![0usize; out_len];
                for step in &self.0 {
                    sums[step.a] += values[step.b];
                    counts[step.a] += 1;
                }
                sums.iter()
                    .zip(&counts)
                    .map(|(&s, &c)| s / c as f64)
                    .collect()
            })
            .collect();
        Signal::new_unchecked(axes)
    }
}

impl<'a> IntoIterator for &'a WarpingPath {
    type Item = &'a WarpingStep;
    type IntoIter = std::slice::Iter<'a, WarpingStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn check_steps(steps: &[WarpingStep]) -> Result<(), DtwError> {
    match steps.first() {
        None => {
            return Err(DtwError::InvalidPath {
                step: 0,
                reason: "path is empty",
            });
        }
        Some(first) if first.a != 0 || first.b != 0 => {
            return Err(DtwError::InvalidPath {
                step: 0,
                reason: "path must start at (0, 0)",
            });
        }
        Some(_) => {}
    }
    for (k, pair) in steps.windows(2).enumerate() {
        let (prev, next) = (pair[0], pair[1]);
        if next.a < prev.a || next.b < prev.b {
            return Err(DtwError::InvalidPath {
                step: k + 1,
                reason: "index decreases",
            });
        }
        let da = next.a - prev.a;
        let db = next.b - prev.b;
        if da > 1 || db > 1 {
            return Err(DtwError::InvalidPath {
                step: k + 1,
                reason: "index skips a sample",
            });
        }
        if da + db == 0 {
            return Err(DtwError::InvalidPath {
                step: k + 1,
                reason: "step does not advance",
            });
        }
    }
    Ok(())
}
