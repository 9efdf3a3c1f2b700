//! CLI configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via --config or FSMHDL_CONFIG, both
//!    resolved by the CLI parser)
//! 3. Environment variables

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which checks `check` enforces.
    pub analysis: AnalysisConfig,
    /// Output formatting.
    pub output: OutputConfig,
    /// REPL settings.
    pub repl: ReplConfig,
}

impl Config {
    /// Loads configuration from `path` if given, then applies environment
    /// variable overrides and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Self::default();

        // Load from file if specified
        if let Some(path) = path {
            config = Self::from_file(path)?;
            tracing::debug!(path = %path.display(), "loaded config file");
        }

        // Apply environment variable overrides
        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        self.analysis.apply_overrides(&lookup);
        self.output.apply_overrides(&lookup);
        self.repl.apply_overrides(&lookup);
    }

    /// Rejects settings that cannot work together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;
        self.repl.validate()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Checks run by `check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Fail when outgoing conditions of a state overlap or leave gaps.
    pub per_state_checks: bool,
    /// Also fail when the whole transition set is not exclusive and exhaustive.
    pub whole_set_checks: bool,
    /// Fail when no state is marked default.
    pub require_default: bool,
    /// Fail on unreachable or unexitable states.
    pub reachability: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            per_state_checks: true,
            whole_set_checks: false,
            require_default: true,
            reachability: true,
        }
    }
}

impl AnalysisConfig {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("FSMHDL_PER_STATE_CHECKS").as_deref().and_then(parse_flag) {
            self.per_state_checks = v;
        }
        if let Some(v) = lookup("FSMHDL_WHOLE_SET_CHECKS").as_deref().and_then(parse_flag) {
            self.whole_set_checks = v;
        }
        if let Some(v) = lookup("FSMHDL_REQUIRE_DEFAULT").as_deref().and_then(parse_flag) {
            self.require_default = v;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // Whole-set analysis is a stricter form of the per-state checks.
        if self.whole_set_checks && !self.per_state_checks {
            return Err(ConfigError::ValidationError(
                "whole_set_checks requires per_state_checks".to_string(),
            ));
        }
        Ok(())
    }
}

/// Output format for reports and exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// When to color terminal output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color: ColorMode,
}

impl OutputConfig {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(format) = lookup("FSMHDL_FORMAT") {
            if let Ok(parsed) = format.parse() {
                self.format = parsed;
            }
        }

        if let Some(color) = lookup("FSMHDL_COLOR") {
            match color.to_ascii_lowercase().as_str() {
                "auto" => self.color = ColorMode::Auto,
                "always" => self.color = ColorMode::Always,
                "never" => self.color = ColorMode::Never,
                other => match parse_flag(other) {
                    Some(true) => self.color = ColorMode::Always,
                    Some(false) => self.color = ColorMode::Never,
                    None => {}
                },
            }
        }
    }

    /// Applies the color mode to the `colored` crate's global switch.
    pub fn apply_color(&self) {
        match self.color {
            ColorMode::Auto => colored::control::unset_override(),
            ColorMode::Always => colored::control::set_override(true),
            ColorMode::Never => colored::control::set_override(false),
        }
    }
}

/// REPL configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// History file; defaults to `~/.fsmhdl_history`.
    pub history_file: Option<PathBuf>,
    /// Maximum history entries kept.
    pub max_history: usize,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            history_file: None,
            max_history: 1000,
        }
    }
}

impl ReplConfig {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("FSMHDL_HISTORY") {
            self.history_file = Some(PathBuf::from(path));
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history == 0 {
            return Err(ConfigError::ValidationError(
                "repl.max_history must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the history file location.
    pub fn history_path(&self) -> PathBuf {
        match &self.history_file {
            Some(path) => path.clone(),
            None => home::home_dir()
                .map(|h| h.join(".fsmhdl_history"))
                .unwrap_or_else(|| ".fsmhdl_history".into()),
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::ValidationError(msg) => {
                write!(f, "configuration validation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analysis.per_state_checks);
        assert!(!config.analysis.whole_set_checks);
        assert!(config.analysis.require_default);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.output.color, ColorMode::Auto);
        assert_eq!(config.repl.max_history, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = Config::default();
        config.output.format = OutputFormat::Yaml;
        config.repl.history_file = Some(PathBuf::from("/tmp/history"));
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fsmhdl.yaml");
        std::fs::write(&path, "output:\n  format: json\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.analysis.per_state_checks);
    }

    #[test]
    fn test_load_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fsmhdl.yaml");
        let mut config = Config::default();
        config.analysis.require_default = false;
        std::fs::write(&path, serde_yaml::to_string(&config).unwrap()).unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert!(matches!(
            Config::from_file(&missing),
            Err(ConfigError::IoError(..))
        ));

        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "output:\n  format: pdf\n").unwrap();
        let err = Config::from_file(&bad).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(..)));
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(overrides(&[
            ("FSMHDL_FORMAT", "YAML"),
            ("FSMHDL_COLOR", "0"),
            ("FSMHDL_PER_STATE_CHECKS", "true"),
            ("FSMHDL_WHOLE_SET_CHECKS", "1"),
            ("FSMHDL_REQUIRE_DEFAULT", "off"),
            ("FSMHDL_HISTORY", "/tmp/h"),
        ]));

        assert_eq!(config.output.format, OutputFormat::Yaml);
        assert_eq!(config.output.color, ColorMode::Never);
        assert!(config.analysis.whole_set_checks);
        assert!(!config.analysis.require_default);
        assert_eq!(config.repl.history_path(), PathBuf::from("/tmp/h"));
    }

    #[test]
    fn test_unparseable_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(overrides(&[
            ("FSMHDL_FORMAT", "pdf"),
            ("FSMHDL_COLOR", "sometimes"),
            ("FSMHDL_REQUIRE_DEFAULT", "maybe"),
        ]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.analysis.per_state_checks = false;
        config.analysis.whole_set_checks = true;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = Config::default();
        config.repl.max_history = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_reads_only_the_given_path() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.repl.max_history, 1000);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fsmhdl.yaml");
        std::fs::write(&path, "repl:\n  max_history: 5\n").unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap().repl.max_history, 5);
    }

    #[test]
    fn test_default_history_path() {
        let path = ReplConfig::default().history_path();
        assert!(path.ends_with(".fsmhdl_history"));
    }
}
