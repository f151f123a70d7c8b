//! confctl - command-line front end for the configuration resolver

use anyhow::{Context, Result};
use clap::Parser;
use config::{ConfigLoader, LoggingConfig, Settings};
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod cli;

use app::Application;
use cli::Cli;

fn main() -> Result<()> {
    // Load .env file if it exists
    let dotenv_result = dotenv::dotenv();

    let cli = Cli::parse();
    let settings = effective_settings(&cli)?;

    init_logging(&settings.logging)?;

    match dotenv_result {
        Ok(path) => debug!("Loaded environment variables from {}", path.display()),
        Err(e) if !e.not_found() => warn!("Could not load .env file: {}", e),
        Err(_) => {}
    }

    let app = Application::new(settings).context("Failed to initialize resolver")?;
    let output = app.run(&cli.command)?;
    println!("{}", output);

    Ok(())
}

/// Settings file (or environment) overridden by command-line flags
fn effective_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.settings {
        Some(path) => ConfigLoader::load(path).context("Failed to load settings")?,
        None => ConfigLoader::load_from_env().context("Failed to load settings from environment")?,
    };

    settings
        .files
        .extend(cli.files.iter().map(|p| p.display().to_string()));
    if let Some(prefix) = &cli.prefix {
        settings.environment_prefix = prefix.clone();
    }
    if cli.no_env_layer {
        settings.environment_layer = false;
    }

    Ok(settings)
}

/// Initialize logging; `RUST_LOG` takes precedence over the configured level
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so command output stays clean
    match logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
    }

    debug!("Logging initialized (level: {}, format: {})", logging.level, logging.format);
    Ok(())
}
