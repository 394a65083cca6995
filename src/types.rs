//! Type definitions shared by the prober, coordinator and presentation layer

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Header mapping applied verbatim to every outgoing probe
pub type Headers = BTreeMap<String, String>;

/// A named, addressable mirror to be latency-tested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Human-readable label, unique within one run
    pub name: String,
    /// Absolute http or https address
    pub address: Url,
}

impl Endpoint {
    /// Build an endpoint from an already parsed address
    pub fn new<S: Into<String>>(name: S, address: Url) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }

    /// Parse and validate an endpoint address
    pub fn parse(name: &str, address: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Source name cannot be empty"));
        }

        let parsed = Url::parse(address.trim())
            .map_err(|e| AppError::validation(format!("Invalid URL for source '{}': {}", name, e)))?;

        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(AppError::validation(format!(
                    "Unsupported URL scheme '{}' for source '{}' (expected http or https)",
                    scheme, name
                )))
            }
        }

        if parsed.host_str().is_none() {
            return Err(AppError::validation(format!("URL for source '{}' must have a host", name)));
        }

        Ok(Self::new(name, parsed))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

/// Classified result of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeResult {
    /// A response with an acceptable status arrived after `latency_ms`
    Success { latency_ms: f64 },
    /// Transport error, timeout or unacceptable status; the cause is not kept
    Failure,
}

/// Outcome of probing one endpoint during one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub endpoint: Endpoint,
    pub result: ProbeResult,
}

impl ProbeOutcome {
    /// Create a successful outcome from a measured duration
    pub fn success(endpoint: Endpoint, latency: Duration) -> Self {
        Self {
            endpoint,
            result: ProbeResult::Success {
                latency_ms: latency.as_secs_f64() * 1000.0,
            },
        }
    }

    /// Create a failed outcome
    pub fn failure(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            result: ProbeResult::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.result, ProbeResult::Success { .. })
    }

    /// Latency in milliseconds, if the probe succeeded
    pub fn latency_ms(&self) -> Option<f64> {
        match self.result {
            ProbeResult::Success { latency_ms } => Some(latency_ms),
            ProbeResult::Failure => None,
        }
    }

    /// Ranking key: failures rank as if their latency were infinite
    pub fn rank_key(&self) -> f64 {
        self.latency_ms().unwrap_or(f64::INFINITY)
    }

    /// Total order used for ranking
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.rank_key().total_cmp(&other.rank_key())
    }
}

/// Why a probe failed. Only the prober sees this; it is logged and then
/// collapsed into `ProbeResult::Failure`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// Connection, DNS, TLS or protocol error
    #[error("transport failure: {0}")]
    Transport(String),

    /// No response within the allotted time
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// A response arrived with a status outside [200, 400)
    #[error("unacceptable status code {0}")]
    Status(u16),
}

impl ProbeError {
    /// Short label for structured log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Status(_) => "status",
        }
    }
}

/// Latency classification used for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLevel {
    Excellent,  // < 50ms
    Good,       // 50-100ms
    Fair,       // 100-300ms
    Poor,       // 300-1000ms
    VeryPoor,   // > 1000ms
}

impl PerformanceLevel {
    /// Determine performance level from latency in milliseconds
    pub fn from_latency_ms(latency_ms: f64) -> Self {
        if latency_ms < 50.0 {
            Self::Excellent
        } else if latency_ms < 100.0 {
            Self::Good
        } else if latency_ms < 300.0 {
            Self::Fair
        } else if latency_ms < 1000.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}
