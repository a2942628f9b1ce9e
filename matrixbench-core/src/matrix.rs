//! Benchmark Matrix
//!
//! The grid of jobs to run: every operation × payload type × mechanism,
//! plus the mechanism that every ratio is measured against.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Problems with a matrix definition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    /// One of the three dimensions has no entries
    #[error("Matrix dimension '{0}' is empty")]
    EmptyDimension(&'static str),

    /// The baseline mechanism is not one of the mechanisms
    #[error("Baseline mechanism '{baseline}' is not in mechanisms [{mechanisms}]")]
    BaselineNotInMechanisms {
        /// Configured baseline
        baseline: String,
        /// Comma-separated mechanisms
        mechanisms: String,
    },
}

/// One (operation, payload type, mechanism) combination
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Job {
    /// Operation, e.g. `Serialize`
    pub operation: String,
    /// Payload type, e.g. `LoginViewModel`
    pub payload_type: String,
    /// Mechanism under test, e.g. `Jil`
    pub mechanism: String,
}

impl Job {
    /// Create a job from its three coordinates
    pub fn new(
        operation: impl Into<String>,
        payload_type: impl Into<String>,
        mechanism: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            payload_type: payload_type.into(),
            mechanism: mechanism.into(),
        }
    }

    /// Results key: `"<operation> <payload-type> <mechanism>"`
    pub fn label(&self) -> String {
        format!("{} {} {}", self.operation, self.payload_type, self.mechanism)
    }

    /// Arguments passed to the benchmark program.
    ///
    /// The program expects mechanism before payload type, which is not the
    /// label order.
    pub fn args(&self) -> [&str; 3] {
        [&self.operation, &self.mechanism, &self.payload_type]
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.operation, self.payload_type, self.mechanism)
    }
}

/// Title shared by every job of one (operation, payload type) pair
pub fn group_title(operation: &str, payload_type: &str) -> String {
    format!("{} {}", operation, payload_type)
}

/// The dimensions of a benchmark run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    /// Operations, outermost loop
    pub operations: Vec<String>,
    /// Payload types, middle loop
    pub payload_types: Vec<String>,
    /// Mechanisms, innermost loop and report row order
    pub mechanisms: Vec<String>,
    /// Mechanism whose mean denominates every ratio
    pub baseline: String,
}

impl Matrix {
    /// Build a matrix from string slices
    pub fn new(
        operations: &[&str],
        payload_types: &[&str],
        mechanisms: &[&str],
        baseline: &str,
    ) -> Self {
        let owned = |xs: &[&str]| -> Vec<String> { xs.iter().map(|s| s.to_string()).collect() };
        Self {
            operations: owned(operations),
            payload_types: owned(payload_types),
            mechanisms: owned(mechanisms),
            baseline: baseline.to_string(),
        }
    }

    /// Check that every dimension is populated and the baseline is a mechanism
    pub fn validate(&self) -> Result<(), MatrixError> {
        if self.operations.is_empty() {
            return Err(MatrixError::EmptyDimension("operations"));
        }
        if self.payload_types.is_empty() {
            return Err(MatrixError::EmptyDimension("payload_types"));
        }
        if self.mechanisms.is_empty() {
            return Err(MatrixError::EmptyDimension("mechanisms"));
        }
        if !self.mechanisms.contains(&self.baseline) {
            return Err(MatrixError::BaselineNotInMechanisms {
                baseline: self.baseline.clone(),
                mechanisms: self.mechanisms.join(", "),
            });
        }
        Ok(())
    }

    /// Number of jobs in the matrix
    pub fn len(&self) -> usize {
        self.operations.len() * self.payload_types.len() * self.mechanisms.len()
    }

    /// Whether the matrix has no jobs
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (operation, payload type) pairs in run order
    pub fn groups(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.operations.iter().flat_map(move |op| {
            self.payload_types
                .iter()
                .map(move |ty| (op.as_str(), ty.as_str()))
        })
    }

    /// All jobs, operation-major then payload type then mechanism
    pub fn jobs(&self) -> impl Iterator<Item = Job> + '_ {
        self.groups().flat_map(move |(op, ty)| {
            self.mechanisms
                .iter()
                .map(move |mech| Job::new(op, ty, mech.as_str()))
        })
    }

    /// Keep only the listed entries of each dimension.
    ///
    /// An empty selection leaves that dimension unchanged. Unknown names are
    /// kept as given so the caller can benchmark ad-hoc values. Repeated
    /// names are kept once, at their first position.
    pub fn narrowed(
        &self,
        operations: &[String],
        payload_types: &[String],
        mechanisms: &[String],
    ) -> Self {
        let pick = |all: &Vec<String>, wanted: &[String]| {
            if wanted.is_empty() {
                all.clone()
            } else {
                let mut picked: Vec<String> = Vec::with_capacity(wanted.len());
                for name in wanted {
                    if !picked.contains(name) {
                        picked.push(name.clone());
                    }
                }
                picked
            }
        };
        Self {
            operations: pick(&self.operations, operations),
            payload_types: pick(&self.payload_types, payload_types),
            mechanisms: pick(&self.mechanisms, mechanisms),
            baseline: self.baseline.clone(),
        }
    }
}
