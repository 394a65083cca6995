//! Configuration checks that produce warnings rather than errors

use crate::{
    error::Result,
    models::Config,
    types::Endpoint,
};

/// Configuration validator with advisory rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Run the hard checks of `Config::validate`, then collect advisory warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_endpoints(&config.endpoints()?));
        warnings.extend(Self::validate_probe_settings(config));

        Ok(warnings)
    }

    fn validate_endpoints(endpoints: &[Endpoint]) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for endpoint in endpoints {
            let address = &endpoint.address;

            if address.path() != "/" && !address.path().is_empty() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!(
                        "Source '{}' includes path '{}'; the probe measures that resource, not the host root",
                        endpoint.name,
                        address.path()
                    ),
                ));
            }

            if address.query().is_some() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("Source '{}' includes query parameters, which may affect caching", endpoint.name),
                ));
            }

            if let Some(url::Host::Ipv4(ip)) = address.host() {
                if ip.is_private() || ip.is_loopback() {
                    warnings.push(ValidationWarning::new(
                        ValidationLevel::Info,
                        format!("Source '{}' targets a private/local network", endpoint.name),
                    ));
                }
            }
        }

        warnings
    }

    fn validate_probe_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.timeout_seconds < 2 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Timeout of {}s is very short; distant mirrors may be reported as failed",
                    config.timeout_seconds
                ),
            ));
        } else if config.timeout_seconds > 30 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Timeout of {}s means an unreachable mirror stalls the run that long", config.timeout_seconds),
            ));
        }

        if let Some(limit) = config.max_concurrency {
            if limit < config.sources.len() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!(
                        "Concurrency {} is below the {} configured sources; probes will queue",
                        limit,
                        config.sources.len()
                    ),
                ));
            }
        }

        if config.user_agent.is_none() && !config.headers().keys().any(|k| k.eq_ignore_ascii_case("user-agent")) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "No User-Agent is sent; some mirrors reject such requests".to_string(),
            ));
        }

        warnings
    }
}

/// Validation warning with severity level
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

/// Validation severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationLevel::Info => "INFO",
            ValidationLevel::Warning => "WARNING",
        }
    }
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        if use_color {
            use colored::Colorize;
            let tag = match self.level {
                ValidationLevel::Info => self.level.as_str().cyan(),
                ValidationLevel::Warning => self.level.as_str().yellow(),
            };
            format!("[{}] {}", tag, self.message)
        } else {
            format!("[{}] {}", self.level.as_str(), self.message)
        }
    }
}

/// Convenience function for comprehensive validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
