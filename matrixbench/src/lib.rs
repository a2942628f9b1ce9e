#![warn(missing_docs)]
//! # matrixbench
//!
//! Benchmark automation for programs that time themselves.
//!
//! matrixbench invokes an external benchmark program once per
//! (operation, payload type, mechanism) combination, several times each,
//! and records the integer mean of the microsecond timings it prints:
//! - **Environment Reset**: build directories deleted and the runtime killed before every sample
//! - **Matrix Runner**: sequential, blocking, no retry; a bad timing aborts the run
//! - **Results Store**: flat JSON object of `"<operation> <payload-type> <mechanism>"` → µs
//! - **Ratio Report**: one table per (operation, payload type), every mechanism against a baseline
//!
//! ## Quick Start
//!
//! ```ignore
//! use matrixbench::prelude::*;
//!
//! let matrix = Matrix::new(&["Serialize"], &["Location"], &["Default", "Jil"], "Default");
//! let process = CommandProcess::new("dotnet").with_args(["run", "Benchmarks"]);
//! let reset = EnvironmentReset::new(["bin", "obj"], Some("dotnet".to_string()));
//!
//! let summary = MatrixRunner::new(process, reset, 10).run_and_save(&matrix, "results.json")?;
//! print!("{}", render_report(&summary.results, &matrix, OutputFormat::Table)?);
//! ```

// Re-export core types
pub use matrixbench_core::{
    BenchProcess, CommandProcess, EnvironmentReset, Job, Matrix, MatrixError, NoopReset,
    ProcessError, RawOutput, Reset, ResultsMap, group_title, integer_mean, parse_elapsed_micros,
};

// Re-export report types
pub use matrixbench_report::{
    OutputFormat, ReportBlock, ReportError, ReportRow, StoreError, build_report, format_ratio,
    generate_csv_report, generate_json_report, generate_table_report, load_results,
    render_report, save_results,
};

// Re-export runner and configuration
pub use matrixbench_cli::{JobOutcome, MatrixConfig, MatrixRunner, RunError, RunSummary};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BenchProcess, CommandProcess, EnvironmentReset, Matrix, MatrixRunner, OutputFormat,
        Reset, ResultsMap, load_results, render_report, save_results,
    };
}

/// Run the matrixbench CLI.
///
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     matrixbench::run()
/// }
/// ```
pub use matrixbench_cli::run;
