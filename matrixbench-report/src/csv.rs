//! CSV Output

use crate::report::ReportBlock;

/// Quote a field if it contains a delimiter, quote or newline
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Generate a CSV report with one line per mechanism per block
pub fn generate_csv_report(blocks: &[ReportBlock]) -> String {
    let mut output = String::from("operation,payload_type,mechanism,mean_us,ratio\n");

    for block in blocks {
        for row in &block.rows {
            output.push_str(&format!(
                "{},{},{},{},{}\n",
                escape(&block.operation),
                escape(&block.payload_type),
                escape(&row.mechanism),
                row.mean_us,
                row.ratio_display()
            ));
        }
    }

    output
}
