//! Error types for signal validation, DTW alignment, and similarity reductions.

/// Errors from signal construction and validation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Returned when a signal has no axes or no samples.
    #[error("signal must have at least one axis and one sample")]
    EmptySignal,

    /// Returned when the axes of a signal have different lengths.
    #[error("axis {axis} has {got} samples, expected {expected}")]
    AxisLengthMismatch {
        /// Index of the offending axis.
        axis: usize,
        /// Length of axis 0.
        expected: usize,
        /// Length of the offending axis.
        got: usize,
    },

    /// Returned when a signal contains NaN, infinity, or negative infinity.
    #[error("signal contains non-finite value on axis {axis} at index {index}")]
    NonFiniteValue {
        /// Axis of the first non-finite value found.
        axis: usize,
        /// Sample index of the first non-finite value found.
        index: usize,
    },

    /// Returned when a signal does not have the axis count an operation requires.
    #[error("expected a signal with {expected} axes, got {got}")]
    AxisCount {
        /// Required number of axes.
        expected: usize,
        /// Number of axes in the signal.
        got: usize,
    },
}

/// Errors from sliding-window DTW configuration and computation.
#[derive(Debug, thiserror::Error)]
pub enum DtwError {
    /// Returned when the sliding window size is zero.
    #[error("window size must be at least 1")]
    ZeroWindow,

    /// Returned when the window is not strictly shorter than a signal.
    ///
    /// Mirroring reflects `window_size` samples from each end, so every signal
    /// needs at least `window_size + 1` samples.
    #[error("window size {window_size} must be smaller than signal length {len}")]
    WindowTooLarge {
        /// Configured window size.
        window_size: usize,
        /// Length of the offending signal.
        len: usize,
    },

    /// Returned when the amplitude/derivative blend factor is outside `[0, 1]`.
    #[error("alpha must be a finite value in [0, 1], got {alpha}")]
    InvalidAlpha {
        /// The invalid blend factor.
        alpha: f64,
    },

    /// Returned when a Sakoe-Chiba band factor is not a positive finite number.
    #[error("band factor must be positive and finite, got {factor}")]
    InvalidBandFactor {
        /// The invalid band factor.
        factor: f64,
    },

    /// Returned when the band excludes the terminal cell, so no admissible path exists.
    #[error("band factor {factor} admits no path between lengths {len_a} and {len_b}")]
    BandExcludesEndpoint {
        /// Resolved band factor.
        factor: f64,
        /// Length of the first signal.
        len_a: usize,
        /// Length of the second signal.
        len_b: usize,
    },

    /// Returned when the two signals carry a different number of axes.
    #[error("signals have different axis counts: {a} vs {b}")]
    AxisCountMismatch {
        /// Axis count of the first signal.
        a: usize,
        /// Axis count of the second signal.
        b: usize,
    },

    /// Returned when a signal has more axes than the cost kernel supports.
    #[error("cost kernel supports 1 to 3 axes, got {axes}")]
    TooManyAxes {
        /// Axis count of the offending signal.
        axes: usize,
    },

    /// Returned when the accumulated cost at the terminal cell is NaN or infinite.
    ///
    /// Happens when signal normalization divides by a zero standard deviation.
    #[error("accumulated cost is not finite ({value}); no comparison possible")]
    NonFiniteCost {
        /// The terminal accumulated cost.
        value: f64,
    },

    /// Returned when caller-supplied path indices break the warping path invariants.
    #[error("invalid warping path at step {step}: {reason}")]
    InvalidPath {
        /// Index of the first offending step.
        step: usize,
        /// Which invariant was broken.
        reason: &'static str,
    },

    /// Wraps a signal validation error.
    #[error("invalid signal: {0}")]
    Signal(#[from] SignalError),
}

/// Errors from alignment-based similarity reductions.
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    /// Returned when an alignment mode string is not recognized.
    #[error(
        "unknown alignment mode \"{mode}\" (expected dtw_path, dtw_calc, same_time, relative_time, or raw_dot_product_same_time)"
    )]
    UnknownMode {
        /// The rejected mode string.
        mode: String,
    },

    /// Returned when `dtw_path` mode is requested without a warping path.
    #[error("a warping path must be supplied in dtw_path mode")]
    MissingPath,

    /// Returned when a reduction does not support the requested mode.
    #[error("mode {mode} is not supported by {reduction}")]
    UnsupportedMode {
        /// The requested mode.
        mode: &'static str,
        /// Name of the reduction.
        reduction: &'static str,
    },

    /// Returned when orientation samples are not frame-synchronized with positions.
    #[error("{positions} position frames but {rotations} rotation frames")]
    FrameCountMismatch {
        /// Number of position samples.
        positions: usize,
        /// Number of rotation samples.
        rotations: usize,
    },

    /// Returned when a warping path or correspondence does not fit the signals
    /// it is applied to.
    #[error("path ends at ({end_a}, {end_b}) but signals have {len_a} and {len_b} samples")]
    PathOutOfBounds {
        /// Last index into the first signal.
        end_a: usize,
        /// Last index into the second signal.
        end_b: usize,
        /// Length of the first signal.
        len_a: usize,
        /// Length of the second signal.
        len_b: usize,
    },

    /// Wraps a signal validation error.
    #[error("invalid signal: {0}")]
    Signal(#[from] SignalError),

    /// Wraps a DTW error raised while computing a correspondence.
    #[error("DTW error during alignment: {0}")]
    Dtw(#[from] DtwError),
}

/// Errors from trial scoring metrics.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    /// Returned when a metric string is not recognized.
    #[error("unknown score metric \"{metric}\"")]
    UnknownMetric {
        /// The rejected metric string.
        metric: String,
    },

    /// Returned when a metric needs orientation data the trial does not carry.
    #[error("metric {metric} requires rotation columns")]
    MissingRotation {
        /// Name of the metric.
        metric: &'static str,
    },

    /// Wraps a signal validation error.
    #[error("invalid signal: {0}")]
    Signal(#[from] SignalError),

    /// Wraps a DTW error.
    #[error("DTW error during scoring: {0}")]
    Dtw(#[from] DtwError),

    /// Wraps a reduction error.
    #[error("alignment error during scoring: {0}")]
    Align(#[from] AlignError),
}
