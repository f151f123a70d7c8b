//! Configuration loader implementation

use crate::schema::Settings;
use crate::store::FigmentStore;
use crate::validation::ConfigValidator;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Json, Toml, Yaml},
    Figment,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use types::ConfigError;

/// Prefix of the environment variables overriding [`Settings`]
pub const SETTINGS_ENV_PREFIX: &str = "CONFRES_";

/// Separator marking nesting in environment variable names (`SS_DB__HOST`)
pub const ENV_NESTING_SEPARATOR: &str = "__";

/// Configuration loader for the resolver's own settings
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from file and environment variables
    pub fn load<P: AsRef<Path>>(settings_path: P) -> Result<Settings> {
        let settings_path = settings_path.as_ref();

        // Check if settings file exists
        if !settings_path.exists() {
            return Err(ConfigError::FileNotFound {
                path: settings_path.display().to_string(),
            }
            .into());
        }

        let settings: Settings = Figment::new()
            .merge(Yaml::file(settings_path))
            // Override with environment variables (prefixed with CONFRES_)
            .merge(Env::prefixed(SETTINGS_ENV_PREFIX).split(ENV_NESTING_SEPARATOR))
            .extract()
            .context("Failed to parse settings")?;

        Self::validate(&settings)?;

        Ok(settings)
    }

    /// Load settings from environment variables and defaults only
    pub fn load_from_env() -> Result<Settings> {
        let settings: Settings = Figment::new()
            .merge(Env::prefixed(SETTINGS_ENV_PREFIX).split(ENV_NESTING_SEPARATOR))
            .extract()
            .context("Failed to parse settings from environment")?;

        Self::validate(&settings)?;
        Ok(settings)
    }

    /// Load settings from string (for testing)
    pub fn load_from_str(yaml_content: &str) -> Result<Settings> {
        let settings: Settings = Figment::new()
            .merge(Yaml::string(yaml_content))
            .extract()
            .context("Failed to parse settings from string")?;

        Self::validate(&settings)?;
        Ok(settings)
    }

    /// Reject settings whose validation report carries errors
    fn validate(settings: &Settings) -> Result<()> {
        let report = ConfigValidator::validate(settings);

        for warning in &report.warnings {
            warn!("{}: {}", warning.field, warning.message);
        }

        if let Some(issue) = report.errors.first() {
            return Err(ConfigError::ValidationError {
                field: issue.field.clone(),
                message: issue.message.clone(),
            }
            .into());
        }

        Ok(())
    }

    /// Build the configuration store described by `settings`
    pub fn build_store(settings: &Settings) -> Result<FigmentStore> {
        let mut loader = StoreLoader::new().files(&settings.files);
        if settings.environment_layer {
            loader = loader.environment(&settings.environment_prefix);
        }
        loader.build()
    }

    /// Create example settings file
    pub fn create_example<P: AsRef<Path>>(path: P) -> Result<()> {
        let settings = Settings::default();
        let yaml_content = serde_yaml::to_string(&settings)
            .context("Failed to serialize default settings")?;

        std::fs::write(path.as_ref(), yaml_content)
            .context("Failed to write example settings file")?;

        Ok(())
    }
}

/// Supported configuration file types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Json,
    Yaml,
    Toml,
}

impl FileKind {
    /// Detect the file type from its extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let name = path.as_ref().to_string_lossy().trim().to_ascii_lowercase();
        if name.ends_with(".json") {
            Some(FileKind::Json)
        } else if name.ends_with(".yaml") || name.ends_with(".yml") {
            Some(FileKind::Yaml)
        } else if name.ends_with(".toml") {
            Some(FileKind::Toml)
        } else {
            None
        }
    }
}

/// Builds a [`FigmentStore`] from files, in-memory documents and the environment
///
/// Sources are merged in the order they are added; the environment layer is
/// always merged last.
#[derive(Debug)]
pub struct StoreLoader {
    figment: Figment,
    environment_prefix: Option<String>,
    loaded: Vec<PathBuf>,
}

impl Default for StoreLoader {
    fn default() -> Self {
        Self {
            figment: Figment::new(),
            environment_prefix: None,
            loaded: Vec::new(),
        }
    }
}

impl StoreLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configuration file; missing or unsupported files are skipped
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let requested = path.as_ref();

        let Some(resolved) = locate(requested) else {
            warn!("Configuration file not found, skipping: {}", requested.display());
            return self;
        };

        let Some(kind) = FileKind::from_path(&resolved) else {
            warn!(
                "Unsupported configuration file type, skipping: {}",
                resolved.display()
            );
            return self;
        };

        debug!("Adding {:?} configuration file: {}", kind, resolved.display());
        self.figment = match kind {
            FileKind::Json => self.figment.merge(Json::file(&resolved)),
            FileKind::Yaml => self.figment.merge(Yaml::file(&resolved)),
            FileKind::Toml => self.figment.merge(Toml::file(&resolved)),
        };
        self.loaded.push(resolved);
        self
    }

    /// Add several configuration files in order
    pub fn files<I, P>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths.into_iter().fold(self, |loader, path| loader.file(path))
    }

    /// Add an in-memory YAML document
    pub fn yaml_str(mut self, content: &str) -> Self {
        self.figment = self.figment.merge(Yaml::string(content));
        self
    }

    /// Add an in-memory JSON document
    pub fn json_str(mut self, content: &str) -> Self {
        self.figment = self.figment.merge(Json::string(content));
        self
    }

    /// Merge environment variables carrying `prefix` on top of every other source
    pub fn environment(mut self, prefix: &str) -> Self {
        self.environment_prefix = Some(prefix.to_string());
        self
    }

    /// Files that were found and merged so far
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded
    }

    /// Merge every source into a store
    ///
    /// Environment names are lowercased by figment, so the environment layer
    /// overrides file keys that match ignoring case.
    pub fn build(self) -> Result<FigmentStore> {
        let mut store = FigmentStore::from_figment(&self.figment)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(prefix) = &self.environment_prefix {
            let layer = Figment::from(Env::prefixed(prefix).split(ENV_NESTING_SEPARATOR))
                .extract::<serde_json::Value>()
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            debug!("Merging environment layer (prefix: {})", prefix);
            store.overlay(layer);
        }

        info!("Configuration store built from {} file(s)", self.loaded.len());
        Ok(store)
    }
}

/// Find `path` as given, or relative to the running executable's directory
pub fn locate(path: &Path) -> Option<PathBuf> {
    if path.exists() {
        return Some(path.to_path_buf());
    }

    let exe_dir = std::env::current_exe().ok()?.parent()?.to_path_buf();
    let candidate = exe_dir.join(path);
    candidate.exists().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ConfigStore;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.environment_prefix, "SS_");
        assert!(settings.files.is_empty());
        assert!(settings.environment_layer);
    }

    #[test]
    fn test_load_from_string() {
        let yaml_content = r#"
environment_prefix: "APP_"
files:
  - "base.json"
  - "local.yaml"
logging:
  level: "debug"
"#;

        let settings = ConfigLoader::load_from_str(yaml_content).unwrap();
        assert_eq!(settings.environment_prefix, "APP_");
        assert_eq!(settings.files.len(), 2);
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.logging.format, "pretty");
    }

    #[test]
    fn test_validation_errors() {
        let result = ConfigLoader::load_from_str("environment_prefix: \"\"\n");
        assert!(result.is_err());

        let result = ConfigLoader::load_from_str("logging:\n  level: loud\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConfigLoader::load("/definitely/not/here/settings.yaml");
        assert!(result.is_err());
    }

    #[test]
    fn test_create_example() {
        let temp_file = NamedTempFile::new().unwrap();
        ConfigLoader::create_example(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("environment_prefix:"));
        assert!(content.contains("logging:"));
    }

    #[test]
    fn test_file_kind() {
        assert_eq!(FileKind::from_path("a.JSON "), Some(FileKind::Json));
        assert_eq!(FileKind::from_path("a.yml"), Some(FileKind::Yaml));
        assert_eq!(FileKind::from_path("a.toml"), Some(FileKind::Toml));
        assert_eq!(FileKind::from_path("a.xml"), None);
    }

    #[test]
    fn test_later_files_override_earlier() {
        let base = temp_file(".json", r#"{"app": {"name": "base", "port": 80}}"#);
        let local = temp_file(".yaml", "app:\n  port: 8080\n");

        let loader = StoreLoader::new().files([base.path(), local.path()]);
        assert_eq!(loader.loaded_files().len(), 2);

        let store = loader.build().unwrap();
        assert_eq!(store.get("app:name").as_deref(), Some("base"));
        assert_eq!(store.get("app:port").as_deref(), Some("8080"));
    }

    #[test]
    fn test_missing_and_unsupported_files_are_skipped() {
        let xml = temp_file(".xml", "<app><name>x</name></app>");

        let loader = StoreLoader::new()
            .file("/definitely/not/here/config.json")
            .file(xml.path())
            .yaml_str("app:\n  name: inline\n");
        assert!(loader.loaded_files().is_empty());

        let store = loader.build().unwrap();
        assert_eq!(store.get("app:name").as_deref(), Some("inline"));
    }

    #[test]
    fn test_malformed_file_fails_build() {
        let broken = temp_file(".json", "{ not json");
        let result = StoreLoader::new().file(broken.path()).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_environment_layer_overrides_files() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("app.yaml", "db:\n  host: filehost\n  port: 5432\n")?;
            jail.set_env("TESTAPP_DB__HOST", "envhost");

            let store = StoreLoader::new()
                .file("app.yaml")
                .environment("TESTAPP_")
                .build()
                .map_err(|e| e.to_string())?;

            assert_eq!(store.get("db:host").as_deref(), Some("envhost"));
            assert_eq!(store.get("db:port").as_deref(), Some("5432"));
            Ok(())
        });
    }

    #[test]
    fn test_environment_layer_matches_file_keys_ignoring_case() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("app.yaml", "Database:\n  Host: filehost\n  Port: 1\n")?;
            jail.set_env("TESTAPP_DATABASE__HOST", "envhost");

            let store = StoreLoader::new()
                .file("app.yaml")
                .environment("TESTAPP_")
                .build()
                .map_err(|e| e.to_string())?;

            assert_eq!(store.get("Database:Host").as_deref(), Some("envhost"));
            assert_eq!(store.get("database:host").as_deref(), Some("envhost"));
            assert_eq!(store.get("Database:Port").as_deref(), Some("1"));
            Ok(())
        });
    }

    #[test]
    fn test_dotted_file_keys_stay_flat() {
        let file = temp_file(".json", r#"{"app.name": "svc", "app": {"port": 1}}"#);
        let store = StoreLoader::new().file(file.path()).build().unwrap();
        assert_eq!(store.get("app.name").as_deref(), Some("svc"));
        assert_eq!(store.get("app:port").as_deref(), Some("1"));
    }

    #[test]
    fn test_settings_env_override() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("settings.yaml", "environment_prefix: FILE_\n")?;
            jail.set_env("CONFRES_ENVIRONMENT_PREFIX", "ENV_");
            jail.set_env("CONFRES_LOGGING__FORMAT", "json");

            let settings = ConfigLoader::load("settings.yaml").map_err(|e| e.to_string())?;
            assert_eq!(settings.environment_prefix, "ENV_");
            assert_eq!(settings.logging.format, "json");
            Ok(())
        });
    }
}
