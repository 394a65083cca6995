//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Config,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        // .env values land in the process environment without overriding it
        self.load_env_file()?;

        self.build_from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from defaults, a variable lookup and the CLI arguments
    pub fn build_from_lookup<F>(&self, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        config.merge_from_lookup(lookup)?;

        self.apply_cli_overrides(&mut config)?;

        config.validate()?;

        Ok(config)
    }

    fn load_env_file(&self) -> Result<()> {
        EnvManager::load_env_file(self.cli.debug)?;

        if self.cli.debug {
            if let Some(warnings) = EnvManager::check_env_file(std::path::Path::new(".env"))? {
                for warning in warnings {
                    eprintln!("Warning: {}", warning);
                }
            }
        }

        Ok(())
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(timeout) = self.cli.timeout {
            config.timeout_seconds = timeout;
        }

        // --source replaces the list wholesale, whatever SOURCES said
        let sources = self.cli.parsed_sources()?;
        if !sources.is_empty() {
            config.sources = sources;
        }

        if let Some(ref user_agent) = self.cli.user_agent {
            config.user_agent = Some(user_agent.clone());
        }
        if self.cli.no_user_agent {
            config.user_agent = None;
        }

        // Appended after EXTRA_HEADERS so a repeated name takes the CLI value
        config.extra_headers.extend(self.cli.parsed_headers()?);

        if let Some(limit) = self.cli.concurrency {
            config.max_concurrency = Some(limit);
        }

        if self.cli.https {
            config.use_https = true;
        }

        if self.cli.color {
            config.enable_color = true;
        } else if self.cli.no_color {
            config.enable_color = false;
        }

        // CLI-only flags
        config.fail_if_none = self.cli.fail_if_none;
        config.json_output = self.cli.json;
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
            eprintln!(
                "Final config: sources={}, timeout={}s, concurrency={:?}, https={}",
                config.sources.len(),
                config.timeout_seconds,
                config.max_concurrency,
                config.use_https
            );
        }

        Ok(())
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    let parser = ConfigParser::new(cli);
    parser.parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    let names: Vec<&str> = config.sources.iter().map(|s| s.name.as_str()).collect();
    summary.push(format!("Sources ({}): {}", names.len(), names.join(", ")));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!(
        "User-Agent: {}",
        config.user_agent.as_deref().unwrap_or("(none)")
    ));
    summary.push(format!("Extra Headers: {}", config.extra_headers.len()));
    summary.push(format!(
        "Concurrency: {}",
        config
            .max_concurrency
            .map(|n| n.to_string())
            .unwrap_or_else(|| "one per source".to_string())
    ));
    summary.push(format!("HTTPS: {}", config.use_https));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
