//! Mirror Latency Tester
//!
//! Concurrently probes a list of container registry mirrors with HEAD
//! requests, ranks them by response latency with failures last, and
//! recommends the fastest one that answered.

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod prober;
pub mod types;

// Re-export commonly used types
pub use coordinator::{rank, Coordinator};
pub use error::{AppError, Result};
pub use models::{Config, Report, ReportSummary};
pub use output::{
    ColoredFormatter, OutputCoordinator, OutputFormatter, OutputFormatterFactory, PlainFormatter,
};
pub use prober::{HttpProber, Prober};
pub use types::{Endpoint, Headers, ProbeOutcome, ProbeResult};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata recorded by `build.rs`
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Browser-like agent; several mirrors reject requests without one
    pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";

    /// Built-in ghcr.io mirrors, probed in this order.
    /// Labels mark each entry as a fast mirror (高速站点) or the origin (原始站点).
    pub const DEFAULT_SOURCES: &[(&str, &str)] = &[
        ("高速站点(nju.edu.cn)", "http://ghcr.nju.edu.cn"),
        ("高速站点(hassbus)", "http://ghcr.hassbus.cn"),
        ("高速站点(fashgh)", "http://ghcr.fashgh.com"),
        ("高速站点(fastgh)", "http://fastgh.me"),
        ("高速站点(linkos)", "http://ghcr.linkos.top"),
        ("高速站点(haospeed)", "http://ghcr.haospeed.com"),
        ("高速站点(tonbcr)", "http://ghcr.tonb.icu"),
        ("原始站点(ghcr.io)", "http://ghcr.io"),
    ];

    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Hard ceiling on probes in flight
    pub const MAX_CONCURRENCY_LIMIT: usize = 64;
}
