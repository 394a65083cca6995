//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::models::config::{parse_header_spec, parse_source_spec, MAX_TIMEOUT_SECONDS};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file if it exists; variables already set win
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Mirror Latency Tester Configuration
#
# Values here act as defaults and are overridden by command-line arguments.
# Variables already present in the process environment take precedence
# over this file.

# Sources to probe as comma-separated NAME=URL pairs.
# Replaces the built-in mirror list entirely.
# SOURCES=nju=http://ghcr.nju.edu.cn,origin=http://ghcr.io

# Per-probe timeout in seconds (1-300)
# REQUEST_TIMEOUT=10

# User-Agent sent with every probe. Set it empty to send none.
# USER_AGENT=Mozilla/5.0 (Windows NT 10.0; Win64; x64)

# Extra headers as comma-separated NAME:VALUE pairs
# EXTRA_HEADERS=Accept:*/*

# Maximum number of probes in flight (1-64). Unset means one per source.
# MAX_CONCURRENCY=8

# Upgrade http:// sources to https:// (true/false)
# USE_HTTPS=false

# Enable colored output (true/false)
# ENABLE_COLOR=true

# Example configurations:
#
# Compare two private mirrors over TLS with a short timeout:
# SOURCES=office=http://registry.office.lan,cloud=http://registry.example.com
# USE_HTTPS=true
# REQUEST_TIMEOUT=3
#
# Probe slowly on a constrained link:
# MAX_CONCURRENCY=2
"#
        .to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        let content = Self::create_example_env_content();
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "SOURCES" => {
                for entry in split_entries(value) {
                    let source = parse_source_spec(entry)?;
                    url::Url::parse(&source.url).map_err(|e| {
                        AppError::config(format!("Invalid SOURCES entry '{}': {}", entry, e))
                    })?;
                }
            }
            "EXTRA_HEADERS" => {
                for entry in split_entries(value) {
                    parse_header_spec(entry)?;
                }
            }
            "REQUEST_TIMEOUT" => {
                let timeout: u64 = value.trim().parse().map_err(|e| {
                    AppError::config(format!("Invalid REQUEST_TIMEOUT value '{}': {}", value, e))
                })?;
                if timeout == 0 || timeout > MAX_TIMEOUT_SECONDS {
                    return Err(AppError::config(format!(
                        "REQUEST_TIMEOUT must be between 1 and {}, got: {}",
                        MAX_TIMEOUT_SECONDS, timeout
                    )));
                }
            }
            "MAX_CONCURRENCY" => {
                let limit: usize = value.trim().parse().map_err(|e| {
                    AppError::config(format!("Invalid MAX_CONCURRENCY value '{}': {}", value, e))
                })?;
                if limit == 0 || limit > crate::defaults::MAX_CONCURRENCY_LIMIT {
                    return Err(AppError::config(format!(
                        "MAX_CONCURRENCY must be between 1 and {}, got: {}",
                        crate::defaults::MAX_CONCURRENCY_LIMIT,
                        limit
                    )));
                }
            }
            "USE_HTTPS" | "ENABLE_COLOR" => {
                value
                    .trim()
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            _ => {
                // USER_AGENT accepts any value; unknown keys are ignored
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("SOURCES", "Comma-separated NAME=URL sources to probe", "nju=http://ghcr.nju.edu.cn,origin=http://ghcr.io"),
            ("REQUEST_TIMEOUT", "Per-probe timeout in seconds (1-300)", "10"),
            ("USER_AGENT", "User-Agent header, empty for none", "Mozilla/5.0"),
            ("EXTRA_HEADERS", "Comma-separated NAME:VALUE headers", "Accept:*/*"),
            ("MAX_CONCURRENCY", "Maximum probes in flight (1-64)", "8"),
            ("USE_HTTPS", "Upgrade http:// sources to https://", "false"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<18} {}\n", var, description));
            help.push_str(&format!("  {:<18} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Check an env file and return one warning per malformed line, or `None` if absent
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::io(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut warnings = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                if let Err(e) = Self::validate_env_var(key.trim(), value.trim()) {
                    warnings.push(format!("Line '{}': {}", line, e));
                }
            }
        }

        Ok(Some(warnings))
    }
}

fn split_entries(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}
