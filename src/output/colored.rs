//! Colored formatter implementation with terminal color support
//!
//! Cells are padded before color is applied so ANSI escapes never
//! disturb column alignment.

use super::formatter::{
    align_text, column_widths, create_horizontal_border, display_width, fmt_error, latency_cell,
    report_columns, report_row, Column, FormattingOptions, OutputFormatter, RowData,
};
use crate::{
    error::Result,
    models::Report,
    types::{Endpoint, PerformanceLevel},
};
use colored::*;
use std::fmt::Write as _;

/// Terminal color for a performance level
pub fn performance_color(level: PerformanceLevel) -> Color {
    match level {
        PerformanceLevel::Excellent => Color::Green,
        PerformanceLevel::Good => Color::Cyan,
        PerformanceLevel::Fair => Color::Yellow,
        PerformanceLevel::Poor => Color::Magenta,
        PerformanceLevel::VeryPoor => Color::Red,
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub error: Color,
    pub info: Color,
    pub muted: Color,
    pub border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            error: Color::Red,
            info: Color::Cyan,
            muted: Color::BrightBlack,
            border: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        Self {
            options,
            color_scheme,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    /// Apply bold formatting if colors are enabled
    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    /// Bold and colored if colors are enabled
    fn emphasize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.bold().color(color)
        } else {
            text.normal()
        }
    }

    fn border_line(&self, widths: &[usize]) -> ColoredString {
        self.colorize(&create_horizontal_border(widths), self.color_scheme.border)
    }

    fn separator(&self) -> ColoredString {
        self.colorize("|", self.color_scheme.border)
    }

    /// Join already padded and colored cells into one bordered line
    fn join_cells(&self, cells: &[String]) -> String {
        let sep = self.separator();
        let mut line = sep.to_string();
        for cell in cells {
            line.push_str(&format!(" {} {}", cell, sep));
        }
        line
    }

    fn header_line(&self, columns: &[Column], widths: &[usize]) -> String {
        let cells: Vec<String> = columns
            .iter()
            .zip(widths)
            .map(|(column, &width)| {
                self.bold(&align_text(column.header, width, column.alignment))
                    .to_string()
            })
            .collect();
        self.join_cells(&cells)
    }

    /// Color one padded report row: fastest success green, failures red
    fn colored_report_row(
        &self,
        rank: usize,
        row: &RowData,
        columns: &[Column],
        widths: &[usize],
        latency_ms: Option<f64>,
    ) -> String {
        let cells: Vec<String> = row
            .iter()
            .zip(columns.iter().zip(widths))
            .enumerate()
            .map(|(idx, (cell, (column, &width)))| {
                let padded = align_text(cell, width, column.alignment);
                match (idx, latency_ms) {
                    (1, Some(_)) if rank == 1 => {
                        self.emphasize(&padded, self.color_scheme.success).to_string()
                    }
                    (2, Some(ms)) => self
                        .colorize(&padded, performance_color(PerformanceLevel::from_latency_ms(ms)))
                        .to_string(),
                    (2, None) => self.colorize(&padded, self.color_scheme.error).to_string(),
                    (3, _) => self.colorize(&padded, self.color_scheme.muted).to_string(),
                    _ => padded,
                }
            })
            .collect();
        self.join_cells(&cells)
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "═".repeat(display_width(title) + 4);

        writeln!(output, "{}", self.colorize(&border, self.color_scheme.header)).map_err(fmt_error)?;
        writeln!(output, "  {}  ", self.emphasize(title, self.color_scheme.header)).map_err(fmt_error)?;
        write!(output, "{}", self.colorize(&border, self.color_scheme.header)).map_err(fmt_error)?;

        Ok(output)
    }

    fn format_report_table(&self, report: &Report) -> Result<String> {
        if report.is_empty() {
            return Ok(self
                .colorize("No sources were probed.", self.color_scheme.muted)
                .to_string());
        }

        let verbose = self.options.verbose_mode;
        let columns = report_columns(verbose);
        let rows: Vec<RowData> = report
            .entries
            .iter()
            .enumerate()
            .map(|(idx, outcome)| report_row(idx + 1, outcome, verbose))
            .collect();
        let widths = column_widths(&columns, &rows, self.options.max_column_width);

        let mut output = String::new();
        writeln!(output, "{}", self.border_line(&widths)).map_err(fmt_error)?;
        writeln!(output, "{}", self.header_line(&columns, &widths)).map_err(fmt_error)?;
        writeln!(output, "{}", self.border_line(&widths)).map_err(fmt_error)?;

        for (idx, (row, outcome)) in rows.iter().zip(&report.entries).enumerate() {
            let line = self.colored_report_row(idx + 1, row, &columns, &widths, outcome.latency_ms());
            writeln!(output, "{}", line).map_err(fmt_error)?;
        }

        write!(output, "{}", self.border_line(&widths)).map_err(fmt_error)?;

        Ok(output)
    }

    fn format_recommendation(&self, report: &Report) -> Result<String> {
        let mut output = String::new();

        match report.best() {
            Some(best) => {
                let level = best
                    .latency_ms()
                    .map(PerformanceLevel::from_latency_ms)
                    .unwrap_or(PerformanceLevel::VeryPoor);
                write!(
                    output,
                    "{} {} ({}) at {} ms [{}]",
                    self.bold("Recommended:"),
                    self.emphasize(&best.endpoint.name, self.color_scheme.success),
                    self.colorize(best.endpoint.address.as_str(), self.color_scheme.info),
                    self.colorize(&latency_cell(best), performance_color(level)),
                    level.description()
                )
                .map_err(fmt_error)?;
            }
            None => {
                write!(
                    output,
                    "{}",
                    self.colorize(
                        "No source responded successfully; nothing to recommend.",
                        self.color_scheme.error
                    )
                )
                .map_err(fmt_error)?;
            }
        }

        Ok(output)
    }

    fn format_summary(&self, report: &Report) -> Result<String> {
        let mut output = String::new();

        let failed = report.failure_count().to_string();
        let failed = if report.failure_count() > 0 {
            self.colorize(&failed, self.color_scheme.error)
        } else {
            failed.normal()
        };

        write!(
            output,
            "Probed {} sources in {:.0} ms: {} succeeded, {} failed",
            report.len(),
            report.total_duration.as_secs_f64() * 1000.0,
            self.colorize(&report.success_count().to_string(), self.color_scheme.success),
            failed
        )
        .map_err(fmt_error)?;

        if self.options.verbose_mode {
            let timing = format!(
                "Started {}, completed {} ({:.1}% success)",
                report.started_at.format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                report.completed_at.format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                report.success_rate()
            );
            write!(output, "\n{}", self.colorize(&timing, self.color_scheme.muted)).map_err(fmt_error)?;
        }

        Ok(output)
    }

    fn format_source_list(&self, endpoints: &[Endpoint]) -> Result<String> {
        let columns = [Column::left("Source"), Column::left("URL")];
        let rows: Vec<RowData> = endpoints
            .iter()
            .map(|e| vec![e.name.clone(), e.address.to_string()])
            .collect();
        let widths = column_widths(&columns, &rows, self.options.max_column_width);

        let mut output = String::new();
        writeln!(output, "{}", self.border_line(&widths)).map_err(fmt_error)?;
        writeln!(output, "{}", self.header_line(&columns, &widths)).map_err(fmt_error)?;
        writeln!(output, "{}", self.border_line(&widths)).map_err(fmt_error)?;
        for row in &rows {
            let cells = vec![
                self.bold(&align_text(&row[0], widths[0], columns[0].alignment)).to_string(),
                self.colorize(&align_text(&row[1], widths[1], columns[1].alignment), self.color_scheme.info)
                    .to_string(),
            ];
            writeln!(output, "{}", self.join_cells(&cells)).map_err(fmt_error)?;
        }
        write!(output, "{}", self.border_line(&widths)).map_err(fmt_error)?;

        Ok(output)
    }
}
