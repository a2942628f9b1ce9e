#![warn(missing_docs)]
//! matrixbench Report - Persistence and Ratio Tables
//!
//! Stores results as a flat JSON object and renders them as:
//! - Table (pipe-delimited, markdown-style, one block per operation/payload)
//! - JSON (machine-readable report blocks)
//! - CSV (spreadsheet-compatible)

mod csv;
mod json;
mod report;
mod store;
mod table;

pub use csv::generate_csv_report;
pub use json::generate_json_report;
pub use report::{ReportBlock, ReportError, ReportRow, build_report, format_ratio};
pub use store::{StoreError, load_results, save_results};
pub use table::{TableWidths, format_block, generate_table_report};

use matrixbench_core::{Matrix, ResultsMap};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Ratio tables for the terminal
    #[default]
    Table,
    /// JSON report blocks
    Json,
    /// CSV for spreadsheets
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" | "human" | "markdown" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Build the report for `matrix` and render it in `format`
pub fn render_report(
    results: &ResultsMap,
    matrix: &Matrix,
    format: OutputFormat,
) -> Result<String, ReportError> {
    let blocks = build_report(results, matrix)?;
    let output = match format {
        OutputFormat::Table => generate_table_report(&blocks),
        OutputFormat::Json => generate_json_report(&blocks)?,
        OutputFormat::Csv => generate_csv_report(&blocks),
    };
    Ok(output)
}
