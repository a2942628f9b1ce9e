//! Table Output
//!
//! Pipe-delimited tables, one per report block:
//!
//! ```text
//! Serialize LoginViewModel
//!
//! | Test    | Mean (us) | Ratio |
//! |---------|-----------|-------|
//! | Default | 100       | 1.00  |
//! | Jil     | 50        | 0.50  |
//! ```
//!
//! Cells are left-aligned and space padded. Columns grow to fit their widest
//! cell, so nothing is truncated.

use crate::report::ReportBlock;

const TEST_HEADER: &str = "Test";
const MEAN_HEADER: &str = "Mean (us)";
const RATIO_HEADER: &str = "Ratio";

/// Column widths for one block, excluding the one-space margins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableWidths {
    /// Mechanism name column
    pub test: usize,
    /// Mean column
    pub mean: usize,
    /// Ratio column
    pub ratio: usize,
}

impl TableWidths {
    /// Widths that fit the headers and every cell of `block`
    pub fn for_block(block: &ReportBlock) -> Self {
        let test = block
            .rows
            .iter()
            .map(|r| r.mechanism.len())
            .chain(std::iter::once(TEST_HEADER.len()))
            .max()
            .unwrap_or(TEST_HEADER.len());
        let mean = block
            .rows
            .iter()
            .map(|r| r.mean_us.to_string().len())
            .chain(std::iter::once(MEAN_HEADER.len()))
            .max()
            .unwrap_or(MEAN_HEADER.len());
        let ratio = block
            .rows
            .iter()
            .map(|r| r.ratio_display().len())
            .chain(std::iter::once(RATIO_HEADER.len()))
            .max()
            .unwrap_or(RATIO_HEADER.len());

        Self { test, mean, ratio }
    }

    fn row(&self, test: &str, mean: &str, ratio: &str) -> String {
        format!(
            "| {:<tw$} | {:<mw$} | {:<rw$} |",
            test,
            mean,
            ratio,
            tw = self.test,
            mw = self.mean,
            rw = self.ratio
        )
    }

    fn separator(&self) -> String {
        format!(
            "|{}|{}|{}|",
            "-".repeat(self.test + 2),
            "-".repeat(self.mean + 2),
            "-".repeat(self.ratio + 2)
        )
    }
}

/// Format one block: title, blank line, header, separator, rows
pub fn format_block(block: &ReportBlock) -> String {
    let widths = TableWidths::for_block(block);
    let mut output = String::new();

    output.push_str(&block.title);
    output.push_str("\n\n");

    output.push_str(&widths.row(TEST_HEADER, MEAN_HEADER, RATIO_HEADER));
    output.push('\n');
    output.push_str(&widths.separator());
    output.push('\n');

    for row in &block.rows {
        output.push_str(&widths.row(
            &row.mechanism,
            &row.mean_us.to_string(),
            &row.ratio_display(),
        ));
        output.push('\n');
    }

    output
}

/// Format every block under a `Summary` heading, separated by blank lines
pub fn generate_table_report(blocks: &[ReportBlock]) -> String {
    let mut output = String::new();

    output.push_str("Summary\n");
    output.push_str(&"=".repeat("Summary".len()));
    output.push_str("\n\n");

    for block in blocks {
        output.push_str(&format_block(block));
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportRow;

    fn row(mechanism: &str, mean_us: u64, baseline: u64) -> ReportRow {
        ReportRow {
            mechanism: mechanism.to_string(),
            mean_us,
            ratio: mean_us as f64 / baseline as f64,
            is_baseline: mean_us == baseline,
        }
    }

    fn block(rows: Vec<ReportRow>) -> ReportBlock {
        ReportBlock {
            title: "Serialize LoginViewModel".to_string(),
            operation: "Serialize".to_string(),
            payload_type: "LoginViewModel".to_string(),
            baseline: "Default".to_string(),
            rows,
        }
    }

    #[test]
    fn test_format_block_exact() {
        let b = block(vec![row("Default", 100, 100), row("Jil", 50, 100)]);
        let expected = "\
Serialize LoginViewModel

| Test    | Mean (us) | Ratio |
|---------|-----------|-------|
| Default | 100       | 1.00  |
| Jil     | 50        | 0.50  |
";
        assert_eq!(format_block(&b), expected);
    }

    #[test]
    fn test_widths_at_least_headers() {
        let b = block(vec![row("A", 1, 1)]);
        let w = TableWidths::for_block(&b);
        assert_eq!(w.test, "Test".len());
        assert_eq!(w.mean, "Mean (us)".len());
        assert_eq!(w.ratio, "Ratio".len());
    }

    #[test]
    fn test_widths_grow_to_fit_cells() {
        let b = block(vec![
            row("AOT_LoadConverters", 12_345_678_901, 100),
            row("Default", 100, 100),
        ]);
        let w = TableWidths::for_block(&b);
        assert_eq!(w.test, "AOT_LoadConverters".len());
        assert_eq!(w.mean, "12345678901".len());
        // 123456789.01
        assert_eq!(w.ratio, 12);

        // every table line has the same width
        let text = format_block(&b);
        let lines: Vec<_> = text.lines().skip(2).collect();
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }

    #[test]
    fn test_table_report_layout() {
        let blocks = vec![
            block(vec![row("Default", 100, 100)]),
            block(vec![row("Default", 200, 200)]),
        ];
        let text = generate_table_report(&blocks);
        assert!(text.starts_with("Summary\n=======\n\nSerialize LoginViewModel\n\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("|-")).count(), 2);
        assert!(text.ends_with("| 1.00  |\n\n"));
    }
}
