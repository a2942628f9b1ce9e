#![warn(missing_docs)]
//! matrixbench Core - Job Model and Process Plumbing
//!
//! This crate provides the pieces the runner is built from:
//! - `Job` and `Matrix` describing the operation × payload × mechanism grid
//! - `BenchProcess` capability for invoking the external benchmark program
//! - `Reset` capability for best-effort environment cleanup between samples
//! - Integer mean over repeated samples

mod matrix;
mod process;
mod reset;

pub use matrix::{Job, Matrix, MatrixError, group_title};
pub use process::{
    BenchProcess, CommandProcess, ProcessError, RawOutput, parse_elapsed_micros,
};
pub use reset::{EnvironmentReset, NoopReset, Reset};

use std::collections::BTreeMap;

/// Mean elapsed time per job label, in microseconds.
///
/// Ordered by label so persisted files are deterministic.
pub type ResultsMap = BTreeMap<String, u64>;

/// Arithmetic mean of samples using integer division.
///
/// Returns `None` for an empty slice.
pub fn integer_mean(samples: &[u64]) -> Option<u64> {
    if samples.is_empty() {
        return None;
    }
    let total: u128 = samples.iter().map(|&s| s as u128).sum();
    Some((total / samples.len() as u128) as u64)
}
