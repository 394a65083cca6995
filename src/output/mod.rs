//! Output formatting and display system
//!
//! This module renders a ranked report either as colored or plain text
//! tables, or as JSON for scripts.

mod colored;
mod formatter;

pub use self::colored::{performance_color, ColorScheme, ColoredFormatter};
pub use self::formatter::{
    display_width, Alignment, Column, FormattingOptions, OutputFormatter, PlainFormatter, RowData,
};

use crate::{
    error::Result,
    models::{Report, ReportSummary},
    types::Endpoint,
};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            ..Default::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, false)
    }
}

/// Main output coordinator that handles all report display
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
}

impl OutputCoordinator {
    /// Create a new output coordinator with the specified formatter
    pub fn new(formatter: Box<dyn OutputFormatter>) -> Self {
        Self { formatter }
    }

    /// Render header, ranked table, recommendation and totals
    pub fn display_report(&self, report: &Report) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.formatter.format_header("Mirror Latency Results")?);
        output.push_str("\n\n");

        output.push_str(&self.formatter.format_report_table(report)?);
        output.push_str("\n\n");

        output.push_str(&self.formatter.format_recommendation(report)?);
        output.push('\n');

        output.push_str(&self.formatter.format_summary(report)?);

        Ok(output)
    }

    /// Render the configured sources
    pub fn display_sources(&self, endpoints: &[Endpoint]) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.formatter.format_header("Configured Sources")?);
        output.push_str("\n\n");
        output.push_str(&self.formatter.format_source_list(endpoints)?);

        Ok(output)
    }
}

/// Render a report as pretty-printed JSON
pub fn render_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ReportSummary::from(report))?)
}
