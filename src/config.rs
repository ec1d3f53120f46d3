use crate::constants;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Configuration for a processor run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Records per batch. Advisory: used by the batching loop, not the coordinator.
    pub batch_size: usize,
    /// Deadline for a whole batch
    #[serde(alias = "timeout")]
    pub timeout_seconds: f64,
    pub validation_rules: ValidationRules,
    /// Ordered step names; duplicates are applied twice
    pub processing_steps: Vec<String>,
    /// What to do with step names the registry does not know
    pub unknown_steps: UnknownStepPolicy,
    /// Pause inserted before each step; 0 only yields to the scheduler
    pub step_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub min_value: f64,
    pub max_value: f64,
    pub required_tags: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownStepPolicy {
    /// Drop unknown names from the plan with a warning
    #[default]
    Skip,
    /// Refuse to build a processor
    Error,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: 100,
            timeout_seconds: 30.0,
            validation_rules: ValidationRules::default(),
            processing_steps: constants::get_supported_steps()
                .into_iter()
                .map(String::from)
                .collect(),
            unknown_steps: UnknownStepPolicy::Skip,
            step_delay_ms: 10,
        }
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_value: 0.0,
            max_value: 1000.0,
            required_tags: ["source", "type"].into_iter().map(String::from).collect(),
        }
    }
}

impl Config {
    /// Load a configuration file, overlaying it on the built-in defaults.
    ///
    /// `.json` files are read as JSON; anything else is read as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = if is_json {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };
        Ok(config)
    }

    /// Load a configuration file, falling back to defaults when the file is
    /// missing or cannot be parsed.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to load config {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Reject values that make a run meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be positive".to_string()));
        }
        if !self.timeout_seconds.is_finite() || self.timeout_seconds <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "timeout_seconds must be a positive number, got {}",
                self.timeout_seconds
            )));
        }
        if Duration::try_from_secs_f64(self.timeout_seconds).is_err() {
            return Err(ConfigError::Invalid(format!(
                "timeout_seconds {} does not fit in a duration",
                self.timeout_seconds
            )));
        }
        let rules = &self.validation_rules;
        if rules.min_value.is_nan() || rules.max_value.is_nan() || rules.min_value > rules.max_value {
            return Err(ConfigError::Invalid(format!(
                "validation range [{}, {}] is empty",
                rules.min_value, rules.max_value
            )));
        }
        Ok(())
    }

    /// Batch deadline. Out-of-range values saturate; `validate` rejects them first.
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds).unwrap_or(Duration::MAX)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_config(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(
            config.processing_steps,
            vec!["validate", "normalize", "categorize", "enrich"]
        );
        assert!(config.validation_rules.required_tags.contains("source"));
        assert!(config.validation_rules.required_tags.contains("type"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_overlays_defaults() {
        let file = temp_config(
            ".toml",
            r#"
batch_size = 10
processing_steps = ["normalize", "enrich"]

[validation_rules]
max_value = 500.0
"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.timeout_seconds, 30.0);
        assert_eq!(config.processing_steps, vec!["normalize", "enrich"]);
        assert_eq!(config.validation_rules.max_value, 500.0);
        assert_eq!(config.validation_rules.min_value, 0.0);
        assert_eq!(config.validation_rules.required_tags.len(), 2);
    }

    #[test]
    fn test_json_config() {
        let file = temp_config(
            ".json",
            r#"{"timeout_seconds": 2.5, "unknown_steps": "error", "validation_rules": {"required_tags": []}}"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(2500));
        assert_eq!(config.unknown_steps, UnknownStepPolicy::Error);
        assert!(config.validation_rules.required_tags.is_empty());
    }

    #[test]
    fn test_json_timeout_key_alias() {
        let file = temp_config(".json", r#"{"batch_size": 5, "timeout": 4.0}"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.timeout_seconds, 4.0);
        assert_eq!(config.timeout(), Duration::from_secs(4));
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let missing = Path::new("/definitely/not/here/pipeline.toml");
        assert_eq!(Config::load_or_default(Some(missing)), Config::default());

        let broken = temp_config(".toml", "batch_size = \"lots\"");
        assert_eq!(Config::load_or_default(Some(broken.path())), Config::default());

        assert_eq!(Config::load_or_default(None), Config::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.timeout_seconds = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.timeout_seconds = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.timeout_seconds = 1e20;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert_eq!(config.timeout(), Duration::MAX);

        let mut config = Config::default();
        config.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.validation_rules.min_value = 10.0;
        config.validation_rules.max_value = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip_of_effective_config() {
        let rendered = Config::default().to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
