//! TOML configuration file support.
//!
//! Settings that rarely change between runs can live in a config file instead
//! of flags:
//!
//! ```toml
//! # lipidcalc.toml
//! [calculation]
//! coefficient = 500.0
//! rows_per_slot = 25
//! slots_per_pattern = 4
//! derive_missing_references = false
//!
//! [export]
//! unavailable_marker = "N/A"
//! include_nist_ratio_sheet = true
//! ```
//!
//! Command-line flags override file values, which override the defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use lipidcalc::calc::EngineSettings;
use lipidcalc::report::ExportSettings;

/// Root configuration structure for lipidcalc.toml files.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Engine settings.
    #[serde(default)]
    pub calculation: CalculationConfig,

    /// Output settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// `[calculation]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalculationConfig {
    /// Run-wide Agilent coefficient.
    pub coefficient: Option<f64>,

    /// Consecutive compound rows per NIST slot.
    pub rows_per_slot: Option<usize>,

    /// NIST slots per pattern.
    pub slots_per_pattern: Option<u32>,

    /// Fall back to measured NIST columns for missing table entries.
    pub derive_missing_references: Option<bool>,
}

/// `[export]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Text written for unavailable cells.
    pub unavailable_marker: Option<String>,

    /// Write the measured "NIST Ratios" sheet when present.
    pub include_nist_ratio_sheet: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load the file if one was given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Engine settings from the file, with the coefficient flag taking precedence.
    pub fn engine_settings(&self, coefficient: Option<f64>, derive_missing_references: bool) -> EngineSettings {
        let mut settings = EngineSettings::default();
        let calc = &self.calculation;
        if let Some(value) = coefficient.or(calc.coefficient) {
            settings.coefficient = value;
        }
        if let Some(rows) = calc.rows_per_slot {
            settings.slot_layout.rows_per_slot = rows;
        }
        if let Some(slots) = calc.slots_per_pattern {
            settings.slot_layout.slots_per_pattern = slots;
        }
        settings.derive_missing_references =
            derive_missing_references || calc.derive_missing_references.unwrap_or(false);
        settings
    }

    /// Export settings from the file, with the marker flag taking precedence.
    pub fn export_settings(&self, unavailable_marker: Option<String>) -> ExportSettings {
        let mut settings = ExportSettings::default();
        if let Some(marker) = unavailable_marker.or_else(|| self.export.unavailable_marker.clone()) {
            settings.unavailable_marker = marker;
        }
        if let Some(include) = self.export.include_nist_ratio_sheet {
            settings.include_nist_ratio_sheet = include;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [calculation]
            coefficient = 250.0
            rows_per_slot = 50
            slots_per_pattern = 2
            derive_missing_references = true

            [export]
            unavailable_marker = "-"
            include_nist_ratio_sheet = false
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.calculation.coefficient, Some(250.0));
        assert_eq!(config.calculation.rows_per_slot, Some(50));
        assert_eq!(config.calculation.slots_per_pattern, Some(2));
        assert_eq!(config.calculation.derive_missing_references, Some(true));
        assert_eq!(config.export.unavailable_marker.as_deref(), Some("-"));
        assert_eq!(config.export.include_nist_ratio_sheet, Some(false));

        let settings = config.engine_settings(None, false);
        assert_eq!(settings.coefficient, 250.0);
        assert_eq!(settings.slot_layout.rows_per_slot, 50);
        assert!(settings.derive_missing_references);
    }

    #[test]
    fn test_flags_override_file() {
        let config = Config::from_str("[calculation]\ncoefficient = 250.0\n[export]\nunavailable_marker = \"-\"").unwrap();
        assert_eq!(config.engine_settings(Some(1000.0), false).coefficient, 1000.0);
        assert_eq!(config.export_settings(Some("n/a".to_string())).unavailable_marker, "n/a");
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        let settings = config.engine_settings(None, false);
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(config.export_settings(None), ExportSettings::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_str("[calculation]\ncoeficient = 1.0").is_err());
    }
}
