//! JSON Output

use crate::report::ReportBlock;

/// Generate a prettified JSON report.
///
/// Serializes the report blocks, including raw ratios, for downstream tools.
pub fn generate_json_report(blocks: &[ReportBlock]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(blocks)
}
