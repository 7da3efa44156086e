//! Global window constraints for the cost matrix.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::DtwError;

/// Fraction of the shorter signal used as the default Sakoe-Chiba factor.
pub const DEFAULT_BAND_FRACTION: f64 = 0.5;

/// Constraint on which cells of the cost matrix may lie on the warping path.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum GlobalWindow {
    /// No constraint; every cell is computed.
    #[default]
    None,

    /// Sakoe-Chiba band: cell `(i, j)` is admissible only if `|i - j| < factor`.
    ///
    /// A `None` factor resolves to `0.5 * min(len_a, len_b)` per signal pair.
    SakoeChiba {
        /// Band half-width, exclusive.
        factor: Option<f64>,
    },
}

impl GlobalWindow {
    /// Sakoe-Chiba band with an explicit factor.
    #[must_use]
    pub fn sakoe_chiba(factor: f64) -> Self {
        Self::SakoeChiba {
            factor: Some(factor),
        }
    }

    /// Resolve this window against a concrete signal pair.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidBandFactor`] | Factor is not positive and finite |
    /// | [`DtwError::BandExcludesEndpoint`] | `abs(len_a - len_b) >= factor`, so the terminal cell is unreachable |
    pub fn resolve(&self, len_a: usize, len_b: usize) -> Result<ResolvedWindow, DtwError> {
        match *self {
            Self::None => Ok(ResolvedWindow::Full),
            Self::SakoeChiba { factor } => {
                let factor =
                    factor.unwrap_or(DEFAULT_BAND_FRACTION * len_a.min(len_b) as f64);
                if !(factor.is_finite() && factor > 0.0) {
                    return Err(DtwError::InvalidBandFactor { factor });
                }
                if len_a.abs_diff(len_b) as f64 >= factor {
                    return Err(DtwError::BandExcludesEndpoint {
                        factor,
                        len_a,
                        len_b,
                    });
                }
                // |d| < f  <=>  |d| <= ceil(f) - 1 for integer d and f > 0.
                let radius = factor.ceil() as usize - 1;
                Ok(ResolvedWindow::Band { factor, radius })
            }
        }
    }
}

impl fmt::Display for GlobalWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::SakoeChiba { factor: None } => f.write_str("sakoe-chiba"),
            Self::SakoeChiba { factor: Some(x) } => write!(f, "sakoe-chiba({x})"),
        }
    }
}

/// Error returned when parsing an unrecognized global window name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown global window \"{0}\" (expected none or sakoe-chiba)")]
pub struct ParseGlobalWindowError(String);

impl FromStr for GlobalWindow {
    type Err = ParseGlobalWindowError;

    /// Parse `none` or `sakoe-chiba` (default factor). Any other name is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "sakoe-chiba" => Ok(Self::SakoeChiba { factor: None }),
            other => Err(ParseGlobalWindowError(other.to_string())),
        }
    }
}

/// A [`GlobalWindow`] bound to one signal pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedWindow {
    /// Every cell admissible.
    Full,
    /// Cells with `|i - j| <= radius` admissible (equivalently `|i - j| < factor`).
    Band {
        /// The resolved band factor.
        factor: f64,
        /// Largest admissible index offset.
        radius: usize,
    },
}

impl ResolvedWindow {
    /// Return true if cell `(i, j)` lies inside the window.
    #[must_use]
    pub fn admits(&self, i: usize, j: usize) -> bool {
        match self {
            Self::Full => true,
            Self::Band { radius, .. } => i.abs_diff(j) <= *radius,
        }
    }

    /// Return the admissible column range for `row` in a matrix with `n_cols` columns.
    #[must_use]
    pub fn column_range(&self, row: usize, n_cols: usize) -> Range<usize> {
        match self {
            Self::Full => 0..n_cols,
            Self::Band { radius, .. } => {
                let start = row.saturating_sub(*radius).min(n_cols);
                let end = (row + radius + 1).min(n_cols);
                start..end
            }
        }
    }
}
