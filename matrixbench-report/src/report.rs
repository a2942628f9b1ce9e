//! Report Data Structures
//!
//! One `ReportBlock` per (operation, payload type) pair, one `ReportRow` per
//! mechanism, in matrix order. Every renderer consumes these, so a missing
//! result or zero baseline fails the same way whatever the output format.

use matrixbench_core::{Job, Matrix, ResultsMap, group_title};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors while building or rendering a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No result for '{label}'")]
    MissingEntry { label: String },

    #[error("Baseline '{baseline}' has a mean of zero in '{title}'; ratios are undefined")]
    ZeroBaseline { title: String, baseline: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ratio table for one (operation, payload type) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBlock {
    /// `"<operation> <payload-type>"`
    pub title: String,
    /// Operation
    pub operation: String,
    /// Payload type
    pub payload_type: String,
    /// Mechanism every ratio is relative to
    pub baseline: String,
    /// One row per mechanism, in matrix order
    pub rows: Vec<ReportRow>,
}

/// One mechanism's line in a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Mechanism name
    pub mechanism: String,
    /// Mean elapsed time in microseconds
    pub mean_us: u64,
    /// `mean_us / baseline mean`
    pub ratio: f64,
    /// Whether this row is the baseline
    pub is_baseline: bool,
}

impl ReportRow {
    /// Ratio with two decimals, as shown in every format
    pub fn ratio_display(&self) -> String {
        format_ratio(self.ratio)
    }
}

/// Format a ratio with exactly two decimal places
pub fn format_ratio(ratio: f64) -> String {
    format!("{:.2}", ratio)
}

fn lookup(results: &ResultsMap, job: &Job) -> Result<u64, ReportError> {
    let label = job.label();
    match results.get(&label) {
        Some(&mean) => Ok(mean),
        None => Err(ReportError::MissingEntry { label }),
    }
}

/// Build a block for every (operation, payload type) pair in `matrix`.
///
/// Every mechanism must have a result, including the baseline, and the
/// baseline mean must be non-zero.
pub fn build_report(
    results: &ResultsMap,
    matrix: &Matrix,
) -> Result<Vec<ReportBlock>, ReportError> {
    let mut blocks = Vec::with_capacity(matrix.operations.len() * matrix.payload_types.len());

    for (operation, payload_type) in matrix.groups() {
        let title = group_title(operation, payload_type);

        let means = matrix
            .mechanisms
            .iter()
            .map(|mech| lookup(results, &Job::new(operation, payload_type, mech.as_str())))
            .collect::<Result<Vec<_>, _>>()?;

        let baseline_mean = lookup(
            results,
            &Job::new(operation, payload_type, matrix.baseline.as_str()),
        )?;
        if baseline_mean == 0 {
            return Err(ReportError::ZeroBaseline {
                title,
                baseline: matrix.baseline.clone(),
            });
        }

        let rows = matrix
            .mechanisms
            .iter()
            .zip(means)
            .map(|(mechanism, mean_us)| ReportRow {
                mechanism: mechanism.clone(),
                mean_us,
                ratio: mean_us as f64 / baseline_mean as f64,
                is_baseline: *mechanism == matrix.baseline,
            })
            .collect();

        blocks.push(ReportBlock {
            title,
            operation: operation.to_string(),
            payload_type: payload_type.to_string(),
            baseline: matrix.baseline.clone(),
            rows,
        });
    }

    tracing::debug!(blocks = blocks.len(), "built report");
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(entries: &[(&str, u64)]) -> ResultsMap {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_ratio_against_baseline() {
        let matrix = Matrix::new(&["Serialize"], &["LoginViewModel"], &["Default", "Jil"], "Default");
        let results = results(&[
            ("Serialize LoginViewModel Default", 100),
            ("Serialize LoginViewModel Jil", 50),
        ]);

        let blocks = build_report(&results, &matrix).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].title, "Serialize LoginViewModel");

        let jil = &blocks[0].rows[1];
        assert_eq!(jil.mechanism, "Jil");
        assert_eq!(jil.mean_us, 50);
        assert_eq!(jil.ratio_display(), "0.50");
        assert!(!jil.is_baseline);

        let default = &blocks[0].rows[0];
        assert!(default.is_baseline);
        assert_eq!(default.ratio_display(), "1.00");
    }

    #[test]
    fn test_baseline_ratio_is_always_one() {
        let matrix = Matrix::new(&["Deserialize"], &["Location"], &["Default"], "Default");
        for mean in [1, 3, 7, 999_983, u32::MAX as u64] {
            let results = results(&[("Deserialize Location Default", mean)]);
            let blocks = build_report(&results, &matrix).unwrap();
            assert_eq!(blocks[0].rows[0].ratio_display(), "1.00");
        }
    }

    #[test]
    fn test_missing_mechanism_is_an_error() {
        let matrix = Matrix::new(&["Serialize"], &["Location"], &["Jil", "Default"], "Default");
        let results = results(&[("Serialize Location Default", 100)]);

        match build_report(&results, &matrix) {
            Err(ReportError::MissingEntry { label }) => assert_eq!(label, "Serialize Location Jil"),
            other => panic!("expected MissingEntry, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_baseline_is_an_error() {
        let matrix = Matrix::new(&["Serialize"], &["Location"], &["Jil"], "Default");
        let results = results(&[("Serialize Location Jil", 100)]);

        match build_report(&results, &matrix) {
            Err(ReportError::MissingEntry { label }) => {
                assert_eq!(label, "Serialize Location Default")
            }
            other => panic!("expected MissingEntry, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_baseline_is_an_error() {
        let matrix = Matrix::new(&["Serialize"], &["Location"], &["Jil", "Default"], "Default");
        let results = results(&[
            ("Serialize Location Default", 0),
            ("Serialize Location Jil", 10),
        ]);

        assert!(matches!(
            build_report(&results, &matrix),
            Err(ReportError::ZeroBaseline { .. })
        ));
    }

    #[test]
    fn test_format_ratio_rounds() {
        assert_eq!(format_ratio(1.0), "1.00");
        assert_eq!(format_ratio(2.0 / 3.0), "0.67");
        assert_eq!(format_ratio(12.345_6), "12.35");
    }
}
