//! Sliding-window multivariate DTW.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::constraint::{GlobalWindow, ResolvedWindow};
use crate::distance::DtwDistance;
use crate::error::DtwError;
use crate::kernel::CostKernel;
use crate::matrix::CostMatrix;
use crate::path::{WarpingPath, WarpingStep};
use crate::preprocess::{MirroredSignal, normalize_signal};
use crate::signal::Signal;

/// Largest axis count the cost kernel accepts.
pub const MAX_AXES: usize = 3;

/// Sliding window size used by [`SlidingDtw::default`].
pub const DEFAULT_WINDOW_SIZE: usize = 12;

/// Immutable sliding-window DTW configuration. Thread-safe and copyable.
///
/// Construct via [`SlidingDtw::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter            | Default              |
/// |----------------------|----------------------|
/// | `alpha`              | 0.5                  |
/// | `normalize_signal`   | false                |
/// | `normalize_distance` | true                 |
/// | `global_window`      | [`GlobalWindow::None`] |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlidingDtw {
    window_size: usize,
    alpha: f64,
    normalize_signal: bool,
    normalize_distance: bool,
    global_window: GlobalWindow,
}

impl Default for SlidingDtw {
    /// Window [`DEFAULT_WINDOW_SIZE`] with the documented defaults.
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            alpha: 0.5,
            normalize_signal: false,
            normalize_distance: true,
            global_window: GlobalWindow::None,
        }
    }
}

impl SlidingDtw {
    /// Create a configuration with the given sliding window size.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ZeroWindow`] | `window_size` is zero |
    pub fn new(window_size: usize) -> Result<Self, DtwError> {
        if window_size == 0 {
            return Err(DtwError::ZeroWindow);
        }
        Ok(Self {
            window_size,
            ..Self::default()
        })
    }

    /// Set the amplitude weight. `1.0` compares amplitudes only, `0.0`
    /// compares first derivatives (shape) only. Checked when aligning.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Z-normalize every axis of both signals before aligning.
    #[must_use]
    pub fn with_signal_normalization(mut self, normalize: bool) -> Self {
        self.normalize_signal = normalize;
        self
    }

    /// Divide the terminal accumulated cost by the summed path sequence lengths.
    #[must_use]
    pub fn with_distance_normalization(mut self, normalize: bool) -> Self {
        self.normalize_distance = normalize;
        self
    }

    /// Set the global window constraint.
    #[must_use]
    pub fn with_global_window(mut self, global_window: GlobalWindow) -> Self {
        self.global_window = global_window;
        self
    }

    /// Return the sliding window size as configured (before odd narrowing).
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Return the amplitude weight.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Return the global window constraint.
    #[must_use]
    pub fn global_window(&self) -> GlobalWindow {
        self.global_window
    }

    /// Return whether signals are z-normalized before aligning.
    #[must_use]
    pub fn normalizes_signal(&self) -> bool {
        self.normalize_signal
    }

    /// Return whether the distance is divided by the path sequence lengths.
    #[must_use]
    pub fn normalizes_distance(&self) -> bool {
        self.normalize_distance
    }

    /// Align two signals.
    ///
    /// Builds the local cost matrix from mirrored, windowed amplitude and
    /// derivative differences, accumulates it with the three-predecessor
    /// recurrence, and traces the optimal path back from the terminal cell.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::AxisCountMismatch`] | Signals have different axis counts |
    /// | [`DtwError::TooManyAxes`] | More than [`MAX_AXES`] axes |
    /// | [`DtwError::WindowTooLarge`] | `window_size >= len` for either signal |
    /// | [`DtwError::InvalidAlpha`] | `alpha` outside `[0, 1]` |
    /// | [`DtwError::InvalidBandFactor`] | Sakoe-Chiba factor not positive |
    /// | [`DtwError::BandExcludesEndpoint`] | Band cannot reach `(len_a - 1, len_b - 1)` |
    /// | [`DtwError::NonFiniteCost`] | Terminal accumulated cost is NaN or infinite |
    #[instrument(skip(self, a, b), fields(len_a = a.len(), len_b = b.len(), window = self.window_size))]
    pub fn align(&self, a: &Signal, b: &Signal) -> Result<DtwAlignment, DtwError> {
        if a.n_axes() != b.n_axes() {
            return Err(DtwError::AxisCountMismatch {
                a: a.n_axes(),
                b: b.n_axes(),
            });
        }
        if a.n_axes() > MAX_AXES {
            return Err(DtwError::TooManyAxes { axes: a.n_axes() });
        }
        for len in [a.len(), b.len()] {
            if self.window_size >= len {
                return Err(DtwError::WindowTooLarge {
                    window_size: self.window_size,
                    len,
                });
            }
        }

        let window = self.global_window.resolve(a.len(), b.len())?;
        let kernel = CostKernel::new(self.window_size, self.alpha)?;
        debug!(?window, width = kernel.width(), "alignment configured");

        let (mirrored_a, mirrored_b) = if self.normalize_signal {
            (
                MirroredSignal::build(&normalize_signal(a), self.window_size)?,
                MirroredSignal::build(&normalize_signal(b), self.window_size)?,
            )
        } else {
            (
                MirroredSignal::build(a, self.window_size)?,
                MirroredSignal::build(b, self.window_size)?,
            )
        };

        let local_cost = build_cost_matrix(&kernel, &window, &mirrored_a, &mirrored_b, a.len(), b.len());
        let accumulated_cost = accumulate(&local_cost, &window);

        let terminal = accumulated_cost.last();
        if !terminal.is_finite() {
            return Err(DtwError::NonFiniteCost { value: terminal });
        }

        let path = WarpingPath::new(traceback(&accumulated_cost));
        let distance = DtwDistance::from_accumulated(terminal, path.len(), self.normalize_distance);
        debug!(path_len = path.len(), terminal, "alignment complete");

        Ok(DtwAlignment {
            distance,
            local_cost,
            accumulated_cost,
            path,
        })
    }
}

/// Output of [`SlidingDtw::align`].
#[derive(Debug, Clone)]
pub struct DtwAlignment {
    /// Terminal accumulated cost, optionally path-normalized.
    pub distance: DtwDistance,
    /// Local cost matrix `C` (`len_a x len_b`); out-of-band cells are `+inf`.
    pub local_cost: CostMatrix,
    /// Accumulated cost matrix (`(len_a + 1) x (len_b + 1)`) with an
    /// unreachable border row and column and `[0, 0] = 0`.
    pub accumulated_cost: CostMatrix,
    /// Optimal warping path from `(0, 0)` to `(len_a - 1, len_b - 1)`.
    pub path: WarpingPath,
}

impl DtwAlignment {
    /// The unnormalized DTW distance, `accumulated_cost[len_a, len_b]`.
    #[must_use]
    pub fn raw_distance(&self) -> f64 {
        self.accumulated_cost.last()
    }
}

/// Fill `C[i, j]` for every admissible cell. Rows are independent, so they
/// are computed in parallel; out-of-band cells stay `+inf`.
fn build_cost_matrix(
    kernel: &CostKernel,
    window: &ResolvedWindow,
    a: &MirroredSignal,
    b: &MirroredSignal,
    n: usize,
    m: usize,
) -> CostMatrix {
    debug!(n, m, mirrored_a = a.len(), mirrored_b = b.len(), "building cost matrix");
    let mut cost = CostMatrix::filled(n, m, f64::INFINITY);
    cost.as_mut_slice()
        .par_chunks_mut(m)
        .enumerate()
        .for_each(|(i, row)| {
            for j in window.column_range(i, m) {
                row[j] = kernel.local_cost(a, i, b, j);
            }
        });
    cost
}

/// Accumulate `ac[i+1, j+1] = C[i, j] + min(ac[i, j], ac[i, j+1], ac[i+1, j])`
/// in row-major order. Row 0 and column 0 are `+inf` except `ac[0, 0] = 0`.
fn accumulate(cost: &CostMatrix, window: &ResolvedWindow) -> CostMatrix {
    let (n, m) = cost.shape();
    let mut ac = CostMatrix::filled(n + 1, m + 1, f64::INFINITY);
    ac[(0, 0)] = 0.0;
    for i in 0..n {
        for j in window.column_range(i, m) {
            let best = ac[(i, j)].min(ac[(i, j + 1)]).min(ac[(i + 1, j)]);
            ac[(i + 1, j + 1)] = cost[(i, j)] + best;
        }
    }
    ac
}

/// Reconstruct the optimal path from `(n-1, m-1)` back to `(0, 0)`.
///
/// At each cell picks the smallest of the diagonal, vertical (`i - 1`), and
/// horizontal (`j - 1`) predecessors; ties resolve in that order. On the first
/// row or column only the in-bounds predecessor is considered.
fn traceback(ac: &CostMatrix) -> Vec<WarpingStep> {
    let mut i = ac.rows() - 2;
    let mut j = ac.cols() - 2;
    let mut path = vec![WarpingStep { a: i, b: j }];

    while i > 0 || j > 0 {
        if i == 0 {
            j -= 1;
        } else if j == 0 {
            i -= 1;
        } else {
            let diag = ac[(i, j)];
            let up = ac[(i, j + 1)];
            let left = ac[(i + 1, j)];
            if diag <= up && diag <= left {
                i -= 1;
                j -= 1;
            } else if up <= left {
                i -= 1;
            } else {
                j -= 1;
            }
        }
        path.push(WarpingStep { a: i, b: j });
    }

    path.reverse();
    path
}
