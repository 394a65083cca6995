//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and provides
//! a plain text implementation with table formatting capabilities.

use crate::{
    error::{AppError, Result},
    models::Report,
    types::{Endpoint, ProbeOutcome},
};
use std::fmt::Write as _;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format the ranked entries as a table
    fn format_report_table(&self, report: &Report) -> Result<String>;

    /// Format the recommended source, or the absence of one
    fn format_recommendation(&self, report: &Report) -> Result<String>;

    /// Format run totals
    fn format_summary(&self, report: &Report) -> Result<String>;

    /// Format the configured sources without probing them
    fn format_source_list(&self, endpoints: &[Endpoint]) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Show the URL column and timing details
    pub verbose_mode: bool,
    /// Show table borders
    pub table_borders: bool,
    /// Maximum width of any one column
    pub max_column_width: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            table_borders: true,
            max_column_width: 60,
        }
    }
}

/// Text alignment options
#[derive(Debug, Clone, Copy)]
pub enum Alignment {
    Left,
    Right,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: &'static str,
    pub alignment: Alignment,
}

impl Column {
    pub const fn left(header: &'static str) -> Self {
        Self { header, alignment: Alignment::Left }
    }

    pub const fn right(header: &'static str) -> Self {
        Self { header, alignment: Alignment::Right }
    }
}

/// Row data for table formatting
pub type RowData = Vec<String>;

/// Columns of the report table for the given verbosity
pub fn report_columns(verbose: bool) -> Vec<Column> {
    let mut columns = vec![
        Column::right("#"),
        Column::left("Source"),
        Column::right("Latency (ms)"),
    ];
    if verbose {
        columns.push(Column::left("URL"));
    }
    columns
}

/// Uncolored cell text for one ranked entry
pub fn report_row(rank: usize, outcome: &ProbeOutcome, verbose: bool) -> RowData {
    let mut row = vec![
        rank.to_string(),
        outcome.endpoint.name.clone(),
        latency_cell(outcome),
    ];
    if verbose {
        row.push(outcome.endpoint.address.to_string());
    }
    row
}

/// Latency with two decimals, or `FAILED`
pub fn latency_cell(outcome: &ProbeOutcome) -> String {
    match outcome.latency_ms() {
        Some(ms) => format!("{:.2}", ms),
        None => "FAILED".to_string(),
    }
}

/// Widest cell per column, bounded by `max_width`
pub fn column_widths(columns: &[Column], rows: &[RowData], max_width: usize) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            rows.iter()
                .filter_map(|row| row.get(idx))
                .map(|cell| display_width(cell))
                .fold(display_width(column.header), usize::max)
                .min(max_width)
        })
        .collect()
}

/// Terminal columns taken by `text`; CJK characters count as two
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Pad text to exactly `width` columns, cutting it short with `…` if wider
pub fn align_text(text: &str, width: usize, alignment: Alignment) -> String {
    let text = if display_width(text) > width {
        truncate_with_ellipsis(text, width)
    } else {
        text.to_string()
    };

    let padding = " ".repeat(width.saturating_sub(display_width(&text)));
    match alignment {
        Alignment::Left => format!("{}{}", text, padding),
        Alignment::Right => format!("{}{}", padding, text),
    }
}

fn truncate_with_ellipsis(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }

    let budget = width - 1;
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

pub(crate) fn fmt_error(e: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format output: {}", e))
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    /// Create a table with the given columns and data
    fn create_table(&self, columns: &[Column], rows: &[RowData]) -> String {
        let widths = column_widths(columns, rows, self.options.max_column_width);
        let borders = self.options.table_borders;
        let mut output = String::new();

        let headers: RowData = columns.iter().map(|c| c.header.to_string()).collect();

        if borders {
            output.push_str(&create_horizontal_border(&widths));
            output.push('\n');
        }
        output.push_str(&self.create_row(&headers, &widths, columns));
        output.push('\n');
        if borders {
            output.push_str(&create_horizontal_border(&widths));
            output.push('\n');
        }

        for row in rows {
            output.push_str(&self.create_row(row, &widths, columns));
            output.push('\n');
        }

        if borders {
            output.push_str(&create_horizontal_border(&widths));
        }

        output.trim_end().to_string()
    }

    fn create_row(&self, data: &[String], widths: &[usize], columns: &[Column]) -> String {
        let borders = self.options.table_borders;
        let mut row = String::new();

        if borders {
            row.push('|');
        }

        for ((cell, &width), column) in data.iter().zip(widths).zip(columns) {
            if borders {
                row.push(' ');
            }
            row.push_str(&align_text(cell, width, column.alignment));
            if borders {
                row.push_str(" |");
            } else {
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }
}

/// Create horizontal border for table
pub fn create_horizontal_border(widths: &[usize]) -> String {
    let mut border = String::new();

    if !widths.is_empty() {
        border.push('+');
        for &width in widths {
            border.push_str(&"-".repeat(width + 2));
            border.push('+');
        }
    }

    border
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(display_width(title) + 4);

        writeln!(output, "{}", border).map_err(fmt_error)?;
        writeln!(output, "  {}  ", title).map_err(fmt_error)?;
        write!(output, "{}", border).map_err(fmt_error)?;

        Ok(output)
    }

    fn format_report_table(&self, report: &Report) -> Result<String> {
        if report.is_empty() {
            return Ok("No sources were probed.".to_string());
        }

        let verbose = self.options.verbose_mode;
        let columns = report_columns(verbose);
        let rows: Vec<RowData> = report
            .entries
            .iter()
            .enumerate()
            .map(|(idx, outcome)| report_row(idx + 1, outcome, verbose))
            .collect();

        Ok(self.create_table(&columns, &rows))
    }

    fn format_recommendation(&self, report: &Report) -> Result<String> {
        let mut output = String::new();

        match report.best() {
            Some(best) => {
                write!(
                    output,
                    "Recommended: {} ({}) at {} ms",
                    best.endpoint.name,
                    best.endpoint.address,
                    latency_cell(best)
                )
                .map_err(fmt_error)?;
            }
            None => {
                write!(output, "No source responded successfully; nothing to recommend.")
                    .map_err(fmt_error)?;
            }
        }

        Ok(output)
    }

    fn format_summary(&self, report: &Report) -> Result<String> {
        let mut output = String::new();

        write!(
            output,
            "Probed {} sources in {:.0} ms: {} succeeded, {} failed",
            report.len(),
            report.total_duration.as_secs_f64() * 1000.0,
            report.success_count(),
            report.failure_count()
        )
        .map_err(fmt_error)?;

        if self.options.verbose_mode {
            write!(
                output,
                "\nStarted {}, completed {}",
                report.started_at.format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                report.completed_at.format("%Y-%m-%d %H:%M:%S%.3f UTC")
            )
            .map_err(fmt_error)?;
        }

        Ok(output)
    }

    fn format_source_list(&self, endpoints: &[Endpoint]) -> Result<String> {
        let columns = [Column::left("Source"), Column::left("URL")];
        let rows: Vec<RowData> = endpoints
            .iter()
            .map(|e| vec![e.name.clone(), e.address.to_string()])
            .collect();

        Ok(self.create_table(&columns, &rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn endpoint(name: &str) -> Endpoint {
        Endpoint::parse(name, &format!("http://{}.example.com", name)).unwrap()
    }

    fn sample_report() -> Report {
        let now = Utc::now();
        Report::new(
            vec![
                ProbeOutcome::success(endpoint("fast"), Duration::from_micros(12_346)),
                ProbeOutcome::success(endpoint("slower"), Duration::from_millis(250)),
                ProbeOutcome::failure(endpoint("down")),
            ],
            Duration::from_millis(260),
            now,
            now,
        )
    }

    fn plain(verbose: bool) -> PlainFormatter {
        PlainFormatter::new(FormattingOptions {
            enable_color: false,
            verbose_mode: verbose,
            ..Default::default()
        })
    }

    #[test]
    fn test_align_text() {
        assert_eq!(align_text("ab", 4, Alignment::Left), "ab  ");
        assert_eq!(align_text("ab", 4, Alignment::Right), "  ab");
        assert_eq!(align_text("abcdef", 3, Alignment::Left), "ab…");
        assert_eq!(align_text("abc", 3, Alignment::Left), "abc");
    }

    #[test]
    fn test_align_text_counts_wide_characters() {
        assert_eq!(display_width("高速站点(nju)"), 13);
        assert_eq!(align_text("高速", 6, Alignment::Left), "高速  ");
        // A wide character that does not fit leaves a padding column
        assert_eq!(align_text("高速站点", 4, Alignment::Left), "高… ");
    }

    #[test]
    fn test_long_url_is_marked_as_truncated() {
        let long = format!("http://{}.example.com", "m".repeat(80));
        let cell = align_text(&long, 60, Alignment::Left);

        assert_eq!(display_width(&cell), 60);
        assert!(cell.ends_with('…'));
        assert!(cell.starts_with("http://mmm"));
    }

    #[test]
    fn test_table_with_wide_labels_keeps_rows_aligned() {
        let now = Utc::now();
        let endpoint = |name: &str, host: &str| {
            Endpoint::parse(name, &format!("http://{}.example.com", host)).unwrap()
        };
        let report = Report::new(
            vec![
                ProbeOutcome::success(endpoint("高速站点(nju.edu.cn)", "nju"), Duration::from_millis(12)),
                ProbeOutcome::failure(endpoint("原始站点(ghcr.io)", "ghcr")),
            ],
            Duration::from_millis(20),
            now,
            now,
        );

        let table = plain(false).format_report_table(&report).unwrap();
        let widths: Vec<usize> = table.lines().map(display_width).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{:?}", widths);
    }

    #[test]
    fn test_latency_cell() {
        let report = sample_report();
        assert_eq!(latency_cell(&report.entries[0]), "12.35");
        assert_eq!(latency_cell(&report.entries[2]), "FAILED");
    }

    #[test]
    fn test_header() {
        let header = plain(false).format_header("Results").unwrap();
        assert_eq!(header, "===========\n  Results  \n===========");
    }

    #[test]
    fn test_report_table_rows_in_rank_order() {
        let table = plain(false).format_report_table(&sample_report()).unwrap();
        let lines: Vec<&str> = table.lines().collect();

        // border, header, border, 3 rows, border
        assert_eq!(lines.len(), 7);
        assert!(lines[1].contains("Latency (ms)"));
        assert!(lines[3].contains("fast") && lines[3].contains("12.35"));
        assert!(lines[4].contains("slower") && lines[4].contains("250.00"));
        assert!(lines[5].contains("down") && lines[5].contains("FAILED"));
        assert!(!table.contains("URL"));
        assert!(!table.contains('\x1b'));
    }

    #[test]
    fn test_verbose_table_has_url_column() {
        let table = plain(true).format_report_table(&sample_report()).unwrap();
        assert!(table.contains("URL"));
        assert!(table.contains("http://fast.example.com/"));
    }

    #[test]
    fn test_empty_report_table() {
        let now = Utc::now();
        let report = Report::new(Vec::new(), Duration::ZERO, now, now);
        assert_eq!(plain(false).format_report_table(&report).unwrap(), "No sources were probed.");
    }

    #[test]
    fn test_recommendation() {
        let text = plain(false).format_recommendation(&sample_report()).unwrap();
        assert_eq!(text, "Recommended: fast (http://fast.example.com/) at 12.35 ms");

        let now = Utc::now();
        let none = Report::new(
            vec![ProbeOutcome::failure(endpoint("down"))],
            Duration::from_millis(1),
            now,
            now,
        );
        let text = plain(false).format_recommendation(&none).unwrap();
        assert!(text.contains("nothing to recommend"));
    }

    #[test]
    fn test_summary() {
        let text = plain(false).format_summary(&sample_report()).unwrap();
        assert_eq!(text, "Probed 3 sources in 260 ms: 2 succeeded, 1 failed");
        assert!(plain(true).format_summary(&sample_report()).unwrap().contains("Started"));
    }

    #[test]
    fn test_source_list() {
        let text = plain(false)
            .format_source_list(&[endpoint("a"), endpoint("b")])
            .unwrap();
        assert!(text.contains("http://a.example.com/"));
        assert!(text.contains("| b "));
    }
}
