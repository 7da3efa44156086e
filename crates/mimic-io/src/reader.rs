//! CSV trial reader with full input validation.

use std::path::{Path, PathBuf};

use mimic_dtw::{Signal, Trajectory};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Position columns, in axis order.
pub const POSITION_COLUMNS: [&str; 3] = ["PositionX", "PositionY", "PositionZ"];

/// Orientation quaternion columns, in axis order.
pub const ROTATION_COLUMNS: [&str; 4] = ["RotationQX", "RotationQY", "RotationQZ", "RotationQW"];

/// Reads one recorded trial from a CSV file.
///
/// Expected CSV format:
/// - Header row required; columns are located by name, in any order
/// - `PositionX`, `PositionY`, `PositionZ` are required
/// - `RotationQX`, `RotationQY`, `RotationQZ`, `RotationQW` are read when all
///   four are present, and required with [`TrialReader::require_rotations`]
/// - Other columns (timestamps, labels) are ignored
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | A required column is absent from the header |
/// | [`IoError::EmptyTrial`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row too short to reach a used column |
/// | [`IoError::NonFiniteValue`] | Used cell is NaN, Inf, or unparseable float |
pub struct TrialReader {
    path: PathBuf,
    require_rotations: bool,
}

impl TrialReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            require_rotations: false,
        }
    }

    /// Fail with [`IoError::MissingColumn`] unless all rotation columns exist.
    #[must_use]
    pub fn require_rotations(mut self, require: bool) -> Self {
        self.require_rotations = require;
        self
    }

    /// Read and validate the CSV file, returning a [`Trajectory`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Trajectory, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so a short row surfaces as InconsistentRowLength
        // rather than a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?.clone();
        let expected_cols = header.len();
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };

        let mut columns: Vec<(&'static str, usize)> = Vec::with_capacity(7);
        for name in POSITION_COLUMNS {
            let index = find(name).ok_or_else(|| IoError::MissingColumn {
                path: self.path.clone(),
                column: name,
            })?;
            columns.push((name, index));
        }
        let rotation_indices: Vec<Option<usize>> = ROTATION_COLUMNS.iter().map(|&n| find(n)).collect();
        let has_rotations = rotation_indices.iter().all(Option::is_some);
        if has_rotations {
            columns.extend(ROTATION_COLUMNS.into_iter().zip(rotation_indices.into_iter().flatten()));
        } else if self.require_rotations
            && let Some((name, _)) = ROTATION_COLUMNS
                .into_iter()
                .zip(&rotation_indices)
                .find(|(_, index)| index.is_none())
        {
            return Err(IoError::MissingColumn {
                path: self.path.clone(),
                column: name,
            });
        }
        debug!(expected_cols, has_rotations, "read CSV header");

        let mut axes: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;
            for (axis, &(column, col_index)) in columns.iter().enumerate() {
                let raw = record.get(col_index).ok_or_else(|| IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                })?;
                let value = raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| IoError::NonFiniteValue {
                        path: self.path.clone(),
                        row_index,
                        column,
                        raw: raw.to_string(),
                    })?;
                axes[axis].push(value);
            }
        }

        let n_frames = axes[0].len();
        if n_frames == 0 {
            return Err(IoError::EmptyTrial {
                path: self.path.clone(),
            });
        }

        let rotations = has_rotations.then(|| axes.split_off(POSITION_COLUMNS.len()));
        let invalid = |source| IoError::InvalidTrajectory {
            path: self.path.clone(),
            source,
        };
        let mut trajectory = Trajectory::new(Signal::new(axes).map_err(invalid)?).map_err(invalid)?;
        if let Some(rotations) = rotations {
            trajectory = trajectory
                .with_rotations(Signal::new(rotations).map_err(invalid)?)
                .map_err(invalid)?;
        }

        info!(n_frames, has_rotations, "trial loaded");
        Ok(trajectory)
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_positions_by_name() {
        let csv = "Time,PositionZ,PositionX,PositionY\n0.0,3,1,2\n0.1,6,4,5\n";
        let f = write_csv(csv);
        let t = TrialReader::new(f.path()).read().unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.positions().axis(0), &[1.0, 4.0]);
        assert_eq!(t.positions().axis(2), &[3.0, 6.0]);
        assert!(t.rotations().is_none());
    }

    #[test]
    fn read_rotations_when_present() {
        let csv = "PositionX,PositionY,PositionZ,RotationQX,RotationQY,RotationQZ,RotationQW\n\
                   0,0,0,0,0,0,1\n1,0,0,0,0.7071,0,0.7071\n";
        let f = write_csv(csv);
        let t = TrialReader::new(f.path()).require_rotations(true).read().unwrap();
        let q = t.rotations().unwrap();
        assert_eq!(q.n_axes(), 4);
        assert_eq!(q.axis(3), &[1.0, 0.7071]);
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let csv = "\u{feff}PositionX,PositionY,PositionZ\n1,2,3\n";
        let f = write_csv(csv);
        let t = TrialReader::new(f.path()).read().unwrap();
        assert_eq!(t.positions().axis(0), &[1.0]);
    }

    #[test]
    fn error_file_not_found() {
        let result = TrialReader::new(Path::new("/nonexistent/file.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_missing_position_column() {
        let f = write_csv("PositionX,PositionY\n1,2\n");
        let result = TrialReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::MissingColumn { column: "PositionZ", .. })
        ));
    }

    #[test]
    fn error_missing_required_rotation() {
        let f = write_csv("PositionX,PositionY,PositionZ,RotationQX,RotationQY,RotationQW\n1,2,3,0,0,1\n");
        let result = TrialReader::new(f.path()).require_rotations(true).read();
        assert!(matches!(
            result,
            Err(IoError::MissingColumn { column: "RotationQZ", .. })
        ));
    }

    #[test]
    fn error_empty_trial() {
        let f = write_csv("PositionX,PositionY,PositionZ\n");
        let result = TrialReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyTrial { .. })));
    }

    #[test]
    fn error_short_row() {
        let f = write_csv("PositionX,PositionY,PositionZ\n1,2,3\n4,5\n");
        let result = TrialReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength { row_index: 1, got: 2, .. })
        ));
    }

    #[test]
    fn error_non_finite_values() {
        for bad in ["NaN", "inf", "abc", ""] {
            let f = write_csv(&format!("PositionX,PositionY,PositionZ\n1,{bad},3\n"));
            let result = TrialReader::new(f.path()).read();
            assert!(
                matches!(result, Err(IoError::NonFiniteValue { column: "PositionY", .. })),
                "accepted {bad:?}"
            );
        }
    }
}
