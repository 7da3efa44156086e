//! Score table (CSV) and alignment artifact (JSON) writer.

use std::fs;
use std::path::{Path, PathBuf};

use mimic_dtw::{CostMatrix, DtwAlignment};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{ExperimentName, ScoreTable, trial_label};

/// UTF-8 byte order mark, so spreadsheet tools detect the encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes score tables and alignment artifacts for one experiment.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_scores.csv` and
/// `{experiment}_align.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write a score table to `{experiment}_scores.csv` and return its path.
    ///
    /// The file starts with a UTF-8 BOM, has header `Test,<model...>`, and one
    /// `Test{n}` row per trial. Unscored (NaN) cells are left empty.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_scores(&self, table: &ScoreTable) -> Result<PathBuf, IoError> {
        let path = self
            .output_dir
            .join(format!("{}_scores.csv", self.experiment.as_str()));
        let write_err = |source| IoError::WriteFile {
            path: path.clone(),
            source,
        };

        let mut wtr = csv::Writer::from_writer(UTF8_BOM.to_vec());
        let header = std::iter::once("Test").chain(table.models().iter().map(|m| m.as_str()));
        wtr.write_record(header)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        for (trial, scores) in table.rows() {
            let record = std::iter::once(trial_label(trial)).chain(scores.iter().map(|&v| format_score(v)));
            wtr.write_record(record)
                .map_err(|e| write_err(std::io::Error::other(e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| write_err(std::io::Error::other(e.to_string())))?;
        fs::write(&path, bytes).map_err(write_err)?;

        info!(
            path = %path.display(),
            n_trials = table.trials().len(),
            n_scored = table.n_scored(),
            "score table written"
        );
        Ok(path)
    }

    /// Write one alignment to `{experiment}_align.json` and return its path.
    ///
    /// With `include_matrices`, the local and accumulated cost matrices are
    /// embedded row by row; unreachable (infinite) cells become `null`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | The artifact cannot be encoded |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all, fields(model = %model, test = %test))]
    pub fn write_alignment(
        &self,
        model: &str,
        test: &str,
        alignment: &DtwAlignment,
        include_matrices: bool,
    ) -> Result<PathBuf, IoError> {
        let path = self
            .output_dir
            .join(format!("{}_align.json", self.experiment.as_str()));

        let artifact = AlignArtifact {
            experiment: self.experiment.as_str(),
            model,
            test,
            distance: alignment.distance.value(),
            distance_scale: alignment.distance.scale().as_str(),
            raw_distance: alignment.raw_distance(),
            path_length: alignment.path.len(),
            path_a: alignment.path.path_a(),
            path_b: alignment.path.path_b(),
            local_cost: include_matrices.then(|| matrix_rows(&alignment.local_cost)),
            accumulated_cost: include_matrices.then(|| matrix_rows(&alignment.accumulated_cost)),
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "alignment written");
        Ok(path)
    }
}

/// Shortest round-trip decimal for finite scores; empty for NaN.
fn format_score(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

fn matrix_rows(matrix: &CostMatrix) -> Vec<Vec<Option<f64>>> {
    matrix
        .iter_rows()
        .map(|row| row.iter().map(|&v| v.is_finite().then_some(v)).collect())
        .collect()
}

// ---------------------------------------------------------------------------
// Serialization structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct AlignArtifact<'a> {
    experiment: &'a str,
    model: &'a str,
    test: &'a str,
    distance: f64,
    distance_scale: &'static str,
    raw_distance: f64,
    path_length: usize,
    path_a: Vec<usize>,
    path_b: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    local_cost: Option<Vec<Vec<Option<f64>>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accumulated_cost: Option<Vec<Vec<Option<f64>>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelName;
    use mimic_dtw::{Signal, SlidingDtw};
    use tempfile::TempDir;

    fn alignment() -> DtwAlignment {
        let a = Signal::new(vec![vec![0.0, 1.0, 2.0, 3.0]]).unwrap();
        let b = Signal::new(vec![vec![0.0, 1.0, 3.0]]).unwrap();
        SlidingDtw::new(1).unwrap().align(&a, &b).unwrap()
    }

    #[test]
    fn write_scores_csv_layout() {
        let dir = TempDir::new().unwrap();
        let writer =
            ResultWriter::new(dir.path(), ExperimentName::new("run".into()).unwrap()).unwrap();
        let models = vec![
            ModelName::new("1".into()).unwrap(),
            ModelName::new("2".into()).unwrap(),
        ];
        let mut table = ScoreTable::new(models, vec![1, 2]);
        table.record(1, 0, 0.5);
        table.record(1, 1, 1.25);
        table.record(2, 1, 3.0);

        let path = writer.write_scores(&table).unwrap();
        assert_eq!(path, dir.path().join("run_scores.csv"));

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text, "Test,1,2\nTest1,0.5,1.25\nTest2,,3\n");
    }

    #[test]
    fn write_alignment_json_structure() {
        let dir = TempDir::new().unwrap();
        let writer =
            ResultWriter::new(dir.path(), ExperimentName::new("al".into()).unwrap()).unwrap();
        let path = writer.write_alignment("1", "1_Te3", &alignment(), false).unwrap();

        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["experiment"], "al");
        assert_eq!(content["test"], "1_Te3");
        assert_eq!(content["distance_scale"], "path_normalized");
        let len = content["path_length"].as_u64().unwrap() as usize;
        assert_eq!(content["path_a"].as_array().unwrap().len(), len);
        assert_eq!(content["path_b"].as_array().unwrap().len(), len);
        assert!(content.get("local_cost").is_none());
    }

    #[test]
    fn write_alignment_serializes_infinite_cells_as_null() {
        let dir = TempDir::new().unwrap();
        let writer =
            ResultWriter::new(dir.path(), ExperimentName::new("mx".into()).unwrap()).unwrap();
        let path = writer.write_alignment("a", "b", &alignment(), true).unwrap();

        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let acc = content["accumulated_cost"].as_array().unwrap();
        assert_eq!(acc.len(), 5);
        assert_eq!(acc[0][0], 0.0);
        assert!(acc[0][1].is_null());
        assert_eq!(content["local_cost"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn creates_missing_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        ResultWriter::new(&nested, ExperimentName::new("x".into()).unwrap()).unwrap();
        assert!(nested.is_dir());
    }
}
