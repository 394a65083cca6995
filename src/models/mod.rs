//! Data models and structures for the mirror latency tester

pub mod config;
pub mod report;

// Re-export main model types
pub use config::{Config, SourceSpec};
pub use report::{Report, ReportSummary};
