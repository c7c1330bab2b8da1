//! Serializable estimator configuration (TOML).
//!
//! Every field has a default, so an empty file (or no file) is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How equal times are ordered against the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieRule {
    /// Every ranking counts strictly faster times + 1, so a tie places ahead.
    #[default]
    Unified,
    /// Overall counts strictly faster + 1; gender and division take the first
    /// index whose time is >= the candidate (ties place behind), or the
    /// cohort size when every time is faster.
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Histogram bin count.
    pub bins: usize,
    /// Upper quantile of the binning range; slower finishers are left off the chart.
    pub trim_quantile: f64,
    pub tie_rule: TieRule,
    /// Pointer travel (px) before a press counts as a real drag.
    pub drag_threshold_px: f64,
    /// Idle seconds after a drag before the hint cue pulses again.
    pub hint_idle_secs: u64,
    /// Default results source: a file path or an http(s) URL.
    pub source: Option<String>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            bins: 80,
            trim_quantile: 0.98,
            tie_rule: TieRule::Unified,
            drag_threshold_px: 4.0,
            hint_idle_secs: 10,
            source: None,
        }
    }
}

impl EstimatorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bins == 0 {
            return Err(ConfigError::Invalid("bins must be at least 1".into()));
        }
        if !(self.trim_quantile > 0.0 && self.trim_quantile <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "trim_quantile must be in (0, 1], got {}",
                self.trim_quantile
            )));
        }
        if !self.drag_threshold_px.is_finite() || self.drag_threshold_px < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "drag_threshold_px must be >= 0, got {}",
                self.drag_threshold_px
            )));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = EstimatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EstimatorConfig::default());
        assert_eq!(config.bins, 80);
        assert_eq!(config.tie_rule, TieRule::Unified);
    }

    #[test]
    fn partial_file_overrides() {
        let config = EstimatorConfig::from_toml_str(
            r#"
            bins = 40
            tie_rule = "legacy"
            source = "results.csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.bins, 40);
        assert_eq!(config.tie_rule, TieRule::Legacy);
        assert_eq!(config.source.as_deref(), Some("results.csv"));
        assert_eq!(config.trim_quantile, 0.98);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            EstimatorConfig::from_toml_str("bins = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EstimatorConfig::from_toml_str("trim_quantile = 1.5"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EstimatorConfig::from_toml_str("tie_rule = \"sideways\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = EstimatorConfig {
            bins: 60,
            ..EstimatorConfig::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(EstimatorConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EstimatorConfig::load(Path::new("/nonexistent/finishline.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
