//! Command-line interface

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::models::config::{parse_header_spec, parse_source_spec, SourceSpec};

/// Mirror Latency Tester - find the fastest working container registry mirror
#[derive(Parser, Debug, Clone)]
#[command(name = "mlt")]
#[command(version, about, long_about = None)]
#[command(after_long_help = crate::config::EnvManager::display_env_help())]
pub struct Cli {
    /// Per-probe timeout in seconds [default: 10]
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// Source to probe as NAME=URL (repeatable, replaces the built-in mirror list)
    #[arg(long = "source", value_name = "NAME=URL", action = ArgAction::Append)]
    pub sources: Vec<String>,

    /// User-Agent header sent with every probe
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Send no User-Agent header
    #[arg(long)]
    pub no_user_agent: bool,

    /// Extra request header as NAME:VALUE (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE", action = ArgAction::Append)]
    pub headers: Vec<String>,

    /// Maximum number of probes in flight [default: one per source]
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Upgrade http:// sources to https://
    #[arg(long)]
    pub https: bool,

    /// Exit with status 2 when no source succeeds
    #[arg(long)]
    pub fail_if_none: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Print the configured sources and exit
    #[arg(long)]
    pub list_sources: bool,

    /// Write an example .env file to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub write_env_example: Option<PathBuf>,
}

impl Cli {
    /// Validate CLI arguments for conflicts and malformed values
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.user_agent.is_some() && self.no_user_agent {
            return Err("Cannot specify both --user-agent and --no-user-agent".to_string());
        }

        self.parsed_sources().map_err(|e| e.to_string())?;
        self.parsed_headers().map_err(|e| e.to_string())?;

        Ok(())
    }

    /// Sources given with `--source`, in command-line order
    pub fn parsed_sources(&self) -> crate::Result<Vec<SourceSpec>> {
        self.sources.iter().map(|raw| parse_source_spec(raw)).collect()
    }

    /// Headers given with `--header`, in command-line order
    pub fn parsed_headers(&self) -> crate::Result<Vec<(String, String)>> {
        self.headers.iter().map(|raw| parse_header_spec(raw)).collect()
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Parse a timeout in whole seconds
fn parse_duration(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > crate::models::config::MAX_TIMEOUT_SECONDS {
                Err(format!(
                    "Duration cannot exceed {} seconds",
                    crate::models::config::MAX_TIMEOUT_SECONDS
                ))
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_defaults() {
        let cli = Cli::parse_from(["mlt"]);
        assert_eq!(cli.timeout, None);
        assert!(cli.sources.is_empty());
        assert!(cli.headers.is_empty());
        assert_eq!(cli.concurrency, None);
        assert!(!cli.https);
        assert!(!cli.json);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from([
            "mlt",
            "--timeout", "5",
            "--source", "a=http://a.example.com",
            "--source", "b=https://b.example.com",
            "--user-agent", "probe/1.0",
            "-H", "Accept:*/*",
            "--concurrency", "2",
            "--https",
            "--fail-if-none",
            "--json",
            "--no-color",
            "--verbose",
            "--debug",
        ]);

        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.sources.len(), 2);
        assert_eq!(cli.user_agent.as_deref(), Some("probe/1.0"));
        assert_eq!(cli.headers, vec!["Accept:*/*".to_string()]);
        assert_eq!(cli.concurrency, Some(2));
        assert!(cli.https);
        assert!(cli.fail_if_none);
        assert!(cli.json);
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert!(cli.debug);
        assert!(cli.validate().is_ok());

        let sources = cli.parsed_sources().unwrap();
        assert_eq!(sources[0], SourceSpec::new("a", "http://a.example.com"));
        assert_eq!(sources[1].name, "b");
    }

    #[test]
    fn test_timeout_value_parser() {
        assert!(Cli::try_parse_from(["mlt", "--timeout", "0"]).is_err());
        assert!(Cli::try_parse_from(["mlt", "--timeout", "301"]).is_err());
        assert!(Cli::try_parse_from(["mlt", "--timeout", "+5"]).is_err());
        assert!(Cli::try_parse_from(["mlt", "--timeout", "0x10"]).is_err());
        assert!(Cli::try_parse_from(["mlt", "--timeout", "300"]).is_ok());
    }

    #[test]
    fn test_conflicting_flags() {
        let cli = Cli::parse_from(["mlt", "--color", "--no-color"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["mlt", "--user-agent", "x", "--no-user-agent"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_malformed_source_and_header() {
        let cli = Cli::parse_from(["mlt", "--source", "no-equals-sign"]);
        assert!(cli.validate().unwrap_err().contains("NAME=URL"));

        let cli = Cli::parse_from(["mlt", "--header", "no-colon"]);
        assert!(cli.validate().unwrap_err().contains("NAME:VALUE"));
    }

    #[test]
    fn test_forced_colors() {
        assert!(Cli::parse_from(["mlt", "--color"]).use_colors());
        assert!(!Cli::parse_from(["mlt", "--no-color"]).use_colors());
    }
}
