//! Mirror Latency Tester - Main CLI Application
//!
//! Probes every configured registry mirror once, prints the ranked
//! results and recommends the fastest working mirror.

use clap::Parser;
use mirror_latency_tester::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config, EnvManager},
    coordinator::Coordinator,
    error::{AppError, Result},
    logging::Logger,
    output::{render_json, OutputCoordinator, OutputFormatterFactory},
    prober::HttpProber,
    BUILD_TIME, GIT_COMMIT, PKG_NAME, TARGET_TRIPLE, VERSION,
};
use std::process;

/// Exit status when `--fail-if-none` is set and nothing answered
const EXIT_NO_WORKING_SOURCE: i32 = 2;

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();
    let use_color = cli.use_colors();

    match run_application(cli).await {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}", e.format_for_console(use_color));

            // Print suggestions for common errors
            print_error_suggestions(&e);

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic; returns the process exit status
async fn run_application(cli: Cli) -> Result<i32> {
    cli.validate().map_err(AppError::config)?;

    if cli.debug {
        eprintln!("{} v{} ({})", PKG_NAME, VERSION, GIT_COMMIT.unwrap_or("unknown commit"));
        eprintln!("Built {} for {}", BUILD_TIME, TARGET_TRIPLE);
        eprintln!("Debug mode enabled");
    }

    if let Some(ref path) = cli.write_env_example {
        EnvManager::save_example_env_file(path)?;
        println!("Wrote example configuration to {}", path.display());
        return Ok(0);
    }

    let use_color = cli.use_colors();
    let list_sources = cli.list_sources;

    // Load and validate configuration
    let config = load_config(cli)?;
    let use_color = use_color && config.enable_color;
    colored::control::set_override(use_color);

    let warnings = validate_config(&config)?;
    if config.verbose || config.debug {
        for warning in &warnings {
            eprintln!("{}", warning.format(use_color));
        }
    }

    if config.debug {
        eprintln!("{}", display_config_summary(&config));
    }

    let endpoints = config.endpoints()?;
    let formatter = OutputFormatterFactory::create_formatter(use_color, config.verbose);
    let output = OutputCoordinator::new(formatter);

    if list_sources {
        println!("{}", output.display_sources(&endpoints)?);
        return Ok(0);
    }

    let mut logger = Logger::with_config("MLT", &config);
    logger.set_color(use_color);

    let prober = HttpProber::with_logger(logger.clone())?;
    let coordinator = Coordinator::new(prober)
        .with_max_concurrency(config.max_concurrency)
        .with_logger(logger);

    if !config.json_output {
        println!(
            "Probing {} sources (timeout {}s)...\n",
            endpoints.len(),
            config.timeout_seconds
        );
    }

    let report = coordinator
        .run(&endpoints, config.timeout(), &config.headers())
        .await;

    if config.json_output {
        println!("{}", render_json(&report)?);
    } else {
        println!("{}", output.display_report(&report)?);
    }

    if config.fail_if_none && report.recommendation().is_none() {
        return Ok(EXIT_NO_WORKING_SOURCE);
    }

    Ok(0)
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) | AppError::Parse(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format (see --write-env-example)");
            eprintln!("  - Sources are NAME=URL with an http:// or https:// URL");
            eprintln!("  - Headers are NAME:VALUE");
            eprintln!("  - Timeout must be 1-300 seconds, concurrency 1-64");
        }
        AppError::Network(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check that the TLS backend is available on this system");
            eprintln!("  - Verify proxy and firewall settings");
        }
        AppError::Io(_) => {
            eprintln!();
            eprintln!("I/O help:");
            eprintln!("  - Check that the target directory exists and is writable");
        }
        _ => {}
    }
}
