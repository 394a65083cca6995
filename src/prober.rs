//! Single-endpoint latency probe
//!
//! A probe issues one HEAD request and times it from just before the request
//! is sent until the response head arrives. Every failure mode is folded into
//! `ProbeResult::Failure`; nothing propagates to the caller.

use crate::{
    error::{AppError, Result},
    logging::{LogLevel, Logger},
    types::{Endpoint, Headers, ProbeError, ProbeOutcome},
};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    redirect, Client,
};
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Lower bound (inclusive) of the accepted status range
pub const MIN_ACCEPTED_STATUS: u16 = 200;
/// Upper bound (exclusive) of the accepted status range
pub const MAX_ACCEPTED_STATUS: u16 = 400;

/// Whether a status code counts as a working endpoint: 2xx and 3xx
pub fn is_acceptable_status(status: u16) -> bool {
    (MIN_ACCEPTED_STATUS..MAX_ACCEPTED_STATUS).contains(&status)
}

/// Measures the latency of one endpoint
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `endpoint` once, bounded by `timeout`, sending `headers` verbatim.
    /// Must not panic and must always return an outcome.
    async fn probe(&self, endpoint: &Endpoint, timeout: Duration, headers: &Headers) -> ProbeOutcome;
}

/// Prober backed by a reqwest client
pub struct HttpProber {
    client: Client,
    logger: Logger,
}

impl HttpProber {
    /// Create a prober with a quiet logger
    pub fn new() -> Result<Self> {
        let mut logger = Logger::new("PROBER");
        logger.set_level(LogLevel::Warn);
        Self::with_logger(logger)
    }

    /// Create a prober that reports failure causes through `logger`
    pub fn with_logger(logger: Logger) -> Result<Self> {
        // Redirects are not followed: a 3xx answer already proves the mirror is up.
        // Idle connections are not kept so every probe pays its own connect cost.
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, logger })
    }

    /// Time a HEAD request, classifying the failure cause
    pub async fn measure(
        &self,
        endpoint: &Endpoint,
        request_timeout: Duration,
        headers: &Headers,
    ) -> std::result::Result<Duration, ProbeError> {
        let header_map = build_header_map(headers)?;

        let request = self
            .client
            .head(endpoint.address.clone())
            .headers(header_map)
            .timeout(request_timeout);

        let start = Instant::now();
        let sent = timeout(request_timeout, request.send()).await;
        let elapsed = start.elapsed();

        let response = match sent {
            Err(_) => return Err(ProbeError::Timeout(request_timeout)),
            Ok(Err(e)) if e.is_timeout() => return Err(ProbeError::Timeout(request_timeout)),
            Ok(Err(e)) => return Err(ProbeError::Transport(e.to_string())),
            Ok(Ok(response)) => response,
        };

        let status = response.status().as_u16();
        if is_acceptable_status(status) {
            Ok(elapsed)
        } else {
            Err(ProbeError::Status(status))
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, endpoint: &Endpoint, timeout: Duration, headers: &Headers) -> ProbeOutcome {
        match self.measure(endpoint, timeout, headers).await {
            Ok(latency) => {
                self.logger
                    .debug("Probe succeeded")
                    .field("endpoint", &endpoint.name)
                    .field("latency_ms", latency.as_secs_f64() * 1000.0)
                    .log()
                    .await;
                ProbeOutcome::success(endpoint.clone(), latency)
            }
            Err(cause) => {
                self.logger
                    .debug("Probe failed")
                    .field("endpoint", &endpoint.name)
                    .field("url", endpoint.address.as_str())
                    .field("cause", cause.kind())
                    .field("detail", cause.to_string())
                    .log()
                    .await;
                ProbeOutcome::failure(endpoint.clone())
            }
        }
    }
}

fn build_header_map(headers: &Headers) -> std::result::Result<HeaderMap, ProbeError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ProbeError::Transport(format!("invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ProbeError::Transport(format!("invalid header value for '{}': {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}
