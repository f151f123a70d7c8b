//! Configuration validation utilities

use crate::loader::FileKind;
use crate::schema::Settings;

/// Settings validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate complete settings
    pub fn validate(settings: &Settings) -> ValidationReport {
        let mut report = ValidationReport::new();

        // Validate the environment prefix
        Self::validate_prefix(settings, &mut report);

        // Validate configuration files
        Self::validate_files(settings, &mut report);

        // Validate logging configuration
        Self::validate_logging(settings, &mut report);

        report
    }

    fn validate_prefix(settings: &Settings, report: &mut ValidationReport) {
        let prefix = &settings.environment_prefix;

        if prefix.is_empty() {
            report.add_error("environment_prefix", "Environment prefix cannot be empty");
            return;
        }

        if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            report.add_error(
                "environment_prefix",
                &format!(
                    "Environment prefix '{}' may only contain ASCII letters, digits and '_'",
                    prefix
                ),
            );
        }

        if !prefix.ends_with('_') {
            report.add_warning(
                "environment_prefix",
                &format!("Environment prefix '{}' does not end with '_'", prefix),
            );
        }
    }

    fn validate_files(settings: &Settings, report: &mut ValidationReport) {
        for file in &settings.files {
            if file.trim().is_empty() {
                report.add_error("files", "Configuration file path cannot be empty");
                continue;
            }

            if FileKind::from_path(file).is_none() {
                report.add_warning(
                    "files",
                    &format!("Unsupported configuration file type, it will be skipped: {}", file),
                );
            }
        }
    }

    fn validate_logging(settings: &Settings, report: &mut ValidationReport) {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&settings.logging.level.as_str()) {
            report.add_error(
                "logging.level",
                &format!(
                    "Invalid log level: {}. Valid levels: {:?}",
                    settings.logging.level, valid_levels
                ),
            );
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&settings.logging.format.as_str()) {
            report.add_error(
                "logging.format",
                &format!(
                    "Invalid log format: {}. Valid formats: {:?}",
                    settings.logging.format, valid_formats
                ),
            );
        }
    }
}

/// Validation report containing errors and warnings
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// A validation issue (error or warning)
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn summary(&self) -> String {
        format!("Validation: {} errors, {} warnings", self.errors.len(), self.warnings.len())
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let report = ConfigValidator::validate(&Settings::default());
        assert!(report.is_valid());
        assert!(!report.has_warnings());
        assert_eq!(report.summary(), "Validation: 0 errors, 0 warnings");
    }

    #[test]
    fn test_prefix_rules() {
        let mut settings = Settings::default();
        settings.environment_prefix = String::new();
        assert!(ConfigValidator::validate(&settings).has_errors());

        settings.environment_prefix = "MY-APP_".to_string();
        let report = ConfigValidator::validate(&settings);
        assert_eq!(report.errors[0].field, "environment_prefix");

        settings.environment_prefix = "APP".to_string();
        let report = ConfigValidator::validate(&settings);
        assert!(report.is_valid());
        assert!(report.has_warnings());
    }

    #[test]
    fn test_unsupported_file_is_a_warning() {
        let mut settings = Settings::default();
        settings.files = vec!["app.json".to_string(), "legacy.xml".to_string()];
        let report = ConfigValidator::validate(&settings);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("legacy.xml"));
    }

    #[test]
    fn test_logging_rules() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        settings.logging.format = "xml".to_string();
        let report = ConfigValidator::validate(&settings);
        assert_eq!(report.errors.len(), 2);
    }
}
