//! Configuration data model and validation

use crate::types::{AppError, Endpoint, Headers, Result};
use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Upper bound for `timeout_seconds`
pub const MAX_TIMEOUT_SECONDS: u64 = 300;

/// A configured source before validation: display name plus raw URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub url: String,
}

impl SourceSpec {
    pub fn new<N: Into<String>, U: Into<String>>(name: N, url: U) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Parse a `name=url` pair as accepted by `--source` and `SOURCES`
pub fn parse_source_spec(raw: &str) -> Result<SourceSpec> {
    let (name, url) = raw
        .split_once('=')
        .ok_or_else(|| AppError::config(format!("Invalid source '{}': expected NAME=URL", raw)))?;

    let name = name.trim();
    let url = url.trim();
    if name.is_empty() || url.is_empty() {
        return Err(AppError::config(format!("Invalid source '{}': name and URL are required", raw)));
    }

    Ok(SourceSpec::new(name, url))
}

/// Parse a `Name:value` pair as accepted by `--header` and `EXTRA_HEADERS`
pub fn parse_header_spec(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| AppError::config(format!("Invalid header '{}': expected NAME:VALUE", raw)))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::config(format!("Invalid header '{}': name cannot be empty", raw)));
    }

    Ok((name.to_string(), value.trim().to_string()))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ordered list of sources to probe
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceSpec>,

    /// Per-probe timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// User-Agent sent with every probe; `None` sends none
    #[serde(default = "default_user_agent")]
    pub user_agent: Option<String>,

    /// Additional request headers
    #[serde(default)]
    pub extra_headers: Vec<(String, String)>,

    /// Bound on concurrent probes; `None` means one worker per source
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Upgrade http:// sources to https:// before probing
    #[serde(default)]
    pub use_https: bool,

    /// Exit non-zero when no source succeeds
    #[serde(default)]
    pub fail_if_none: bool,

    /// Render the report as JSON
    #[serde(default)]
    pub json_output: bool,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            timeout_seconds: default_timeout_secs(),
            user_agent: default_user_agent(),
            extra_headers: Vec::new(),
            max_concurrency: None,
            use_https: false,
            fail_if_none: false,
            json_output: false,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(AppError::config("At least one source must be configured"));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if !seen.insert(source.name.as_str()) {
                return Err(AppError::config(format!("Duplicate source name: {}", source.name)));
            }
        }

        // Parsing doubles as URL validation
        self.endpoints()?;

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(AppError::config(format!(
                "Timeout cannot exceed {} seconds",
                MAX_TIMEOUT_SECONDS
            )));
        }

        if let Some(limit) = self.max_concurrency {
            if limit == 0 || limit > crate::defaults::MAX_CONCURRENCY_LIMIT {
                return Err(AppError::config(format!(
                    "Concurrency must be between 1 and {}, got: {}",
                    crate::defaults::MAX_CONCURRENCY_LIMIT,
                    limit
                )));
            }
        }

        for (name, value) in self.headers() {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| AppError::config(format!("Invalid header name '{}': {}", name, e)))?;
            HeaderValue::from_str(&value)
                .map_err(|e| AppError::config(format!("Invalid value for header '{}': {}", name, e)))?;
        }

        Ok(())
    }

    /// Build validated endpoints in configuration order
    pub fn endpoints(&self) -> Result<Vec<Endpoint>> {
        self.sources
            .iter()
            .map(|source| {
                let mut endpoint = Endpoint::parse(&source.name, &source.url)?;
                if self.use_https && endpoint.address.scheme() == "http" {
                    endpoint.address.set_scheme("https").map_err(|_| {
                        AppError::config(format!("Cannot switch source '{}' to https", source.name))
                    })?;
                }
                Ok(endpoint)
            })
            .collect()
    }

    /// Header mapping sent with every probe
    ///
    /// Names compare case-insensitively; a later header replaces an earlier
    /// one with the same name, keeping the later spelling.
    pub fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        if let Some(ref user_agent) = self.user_agent {
            insert_header(&mut headers, "User-Agent", user_agent);
        }
        for (name, value) in &self.extra_headers {
            insert_header(&mut headers, name, value);
        }
        headers
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        self.merge_from_lookup(|key| std::env::var(key).ok())
    }

    /// Merge values from an arbitrary key lookup using the environment variable names
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(timeout) = lookup("REQUEST_TIMEOUT") {
            self.timeout_seconds = timeout.trim().parse().map_err(|e| {
                AppError::config(format!("Invalid REQUEST_TIMEOUT value '{}': {}", timeout, e))
            })?;
        }

        if let Some(sources) = lookup("SOURCES") {
            self.sources = split_list(&sources)
                .map(parse_source_spec)
                .collect::<Result<Vec<_>>>()?;
        }

        if let Some(user_agent) = lookup("USER_AGENT") {
            let user_agent = user_agent.trim();
            self.user_agent = if user_agent.is_empty() {
                None
            } else {
                Some(user_agent.to_string())
            };
        }

        if let Some(headers) = lookup("EXTRA_HEADERS") {
            self.extra_headers = split_list(&headers)
                .map(parse_header_spec)
                .collect::<Result<Vec<_>>>()?;
        }

        if let Some(limit) = lookup("MAX_CONCURRENCY") {
            let limit: usize = limit.trim().parse().map_err(|e| {
                AppError::config(format!("Invalid MAX_CONCURRENCY value '{}': {}", limit, e))
            })?;
            self.max_concurrency = Some(limit);
        }

        if let Some(use_https) = lookup("USE_HTTPS") {
            self.use_https = use_https.trim().parse().map_err(|e| {
                AppError::config(format!("Invalid USE_HTTPS value '{}': {}", use_https, e))
            })?;
        }

        if let Some(enable_color) = lookup("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse().map_err(|e| {
                AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e))
            })?;
        }

        Ok(())
    }
}

fn insert_header(headers: &mut Headers, name: &str, value: &str) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

// Default value functions for serde
fn default_sources() -> Vec<SourceSpec> {
    crate::defaults::DEFAULT_SOURCES
        .iter()
        .map(|&(name, url)| SourceSpec::new(name, url))
        .collect()
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_user_agent() -> Option<String> {
    Some(crate::defaults::DEFAULT_USER_AGENT.to_string())
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
