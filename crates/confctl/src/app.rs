//! Application wiring: settings, store and resolver

use crate::cli::Command;
use anyhow::{Context, Result};
use config::{ConfigLoader, ConfigValidator, Settings};
use resolver::Resolver;
use tracing::info;
use types::KeyForm;

/// Resolver built from the effective settings
pub struct Application {
    settings: Settings,
    resolver: Resolver,
}

impl Application {
    /// Create a new application instance
    pub fn new(settings: Settings) -> Result<Self> {
        let store = ConfigLoader::build_store(&settings)
            .context("Failed to build configuration store")?;

        let resolver = Resolver::new(store).with_prefix(settings.environment_prefix.clone());
        info!(
            "Resolver ready (prefix: {}, files: {})",
            settings.environment_prefix,
            settings.files.len()
        );

        Ok(Self { settings, resolver })
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Execute `command` and return its output
    pub fn run(&self, command: &Command) -> Result<String> {
        match command {
            Command::Get { key, format: None } => self
                .resolver
                .get_value(key)
                .with_context(|| format!("Failed to read '{}'", key)),
            Command::Get { key, format: Some(format) } => {
                let value: serde_json::Value = self
                    .resolver
                    .get_value_as(key, *format)
                    .with_context(|| format!("Failed to decode '{}'", key))?;
                serde_json::to_string_pretty(&value).context("Failed to render value")
            }
            Command::Resolve { text } => self
                .resolver
                .resolve(text)
                .context("Failed to resolve text"),
            Command::Normalize { key, env } => {
                let form = if *env { KeyForm::Environment } else { KeyForm::Lookup };
                self.resolver
                    .normalize_key(key, form)
                    .with_context(|| format!("Failed to normalize '{}'", key))
            }
            Command::Env { name } => self
                .resolver
                .environment_value(name)
                .with_context(|| format!("Failed to read environment variable '{}'", name)),
            Command::Check => {
                let report = ConfigValidator::validate(&self.settings);
                let mut lines = vec![report.summary()];
                lines.extend(
                    report
                        .errors
                        .iter()
                        .map(|i| format!("error: {}: {}", i.field, i.message)),
                );
                lines.extend(
                    report
                        .warnings
                        .iter()
                        .map(|i| format!("warning: {}: {}", i.field, i.message)),
                );
                Ok(lines.join("\n"))
            }
        }
    }
}
