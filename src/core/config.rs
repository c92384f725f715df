//! Configuration management for promflat.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - CLI argument overrides
//! - Validation and defaults

use crate::core::{PromflatError, Result, TagSet};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete configuration for promflat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Agent-wide settings
    pub agent: AgentConfig,
    /// Host statistics input
    pub system: SystemConfig,
    /// Prometheus textfile input
    pub textfile: TextfileConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// Agent-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Default collection interval for inputs without their own
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Labels added to every sample that does not already carry them
    pub labels: TagSet,
    /// Output format of the console writer
    pub output: OutputFormat,
}

/// Host statistics input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Whether the input is registered at all
    pub enabled: bool,
    /// Interval override
    #[serde(with = "humantime_serde")]
    pub interval: Option<Duration>,
    /// Gather the number of logged-in users
    pub collect_user_number: bool,
}

/// Prometheus textfile input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextfileConfig {
    /// Whether the input is registered at all
    pub enabled: bool,
    /// Interval override
    #[serde(with = "humantime_serde")]
    pub interval: Option<Duration>,
    /// Exposition files read on every cycle
    pub paths: Vec<PathBuf>,
    /// Prefix prepended to metric names that do not already start with it.
    /// Joined with `_`, so `node` turns `cpu` into `node_cpu`.
    pub name_prefix: String,
    /// Labels attached to every sample read from these files
    pub labels: TagSet,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
}

/// Console writer output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line
    Json,
    /// `timestamp name{labels} value`
    Text,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            interval: Duration::from_secs(15),
            labels: TagSet::new(),
            output: OutputFormat::Text,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            enabled: true,
            interval: None,
            collect_user_number: false,
        }
    }
}

impl Default for TextfileConfig {
    fn default() -> Self {
        TextfileConfig {
            enabled: false,
            interval: None,
            paths: Vec::new(),
            name_prefix: String::new(),
            labels: TagSet::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.agent.interval.is_zero() {
            return Err(PromflatError::config("agent.interval must be greater than 0"));
        }

        if self.system.interval.is_some_and(|d| d.is_zero()) {
            return Err(PromflatError::config("system.interval must be greater than 0"));
        }

        if self.textfile.interval.is_some_and(|d| d.is_zero()) {
            return Err(PromflatError::config("textfile.interval must be greater than 0"));
        }

        if self.textfile.enabled && self.textfile.paths.is_empty() {
            return Err(PromflatError::config(
                "textfile input is enabled but no paths are configured",
            ));
        }

        if !self.system.enabled && !self.textfile.enabled {
            return Err(PromflatError::config("at least one input must be enabled"));
        }

        Ok(())
    }

    /// Effective interval of the system input
    pub fn system_interval(&self) -> Duration {
        self.system.interval.unwrap_or(self.agent.interval)
    }

    /// Effective interval of the textfile input
    pub fn textfile_interval(&self) -> Duration {
        self.textfile.interval.unwrap_or(self.agent.interval)
    }

    /// Default location of the configuration file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("promflat").join("config.yaml"))
            .unwrap_or_else(|| PathBuf::from("~/.config/promflat/config.yaml"))
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| PromflatError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Set the default collection interval
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.agent.interval = interval;
        self
    }

    /// Add a global label
    pub fn label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.agent.labels.insert(name.into(), value.into());
        self
    }

    /// Set the console output format
    pub fn output(mut self, output: OutputFormat) -> Self {
        self.config.agent.output = output;
        self
    }

    /// Enable or disable the system input
    pub fn system(mut self, enabled: bool) -> Self {
        self.config.system.enabled = enabled;
        self
    }

    /// Enable user counting in the system input
    pub fn collect_user_number(mut self, enabled: bool) -> Self {
        self.config.system.collect_user_number = enabled;
        self
    }

    /// Add a textfile path, enabling the textfile input
    pub fn textfile_path(mut self, path: PathBuf) -> Self {
        self.config.textfile.enabled = true;
        self.config.textfile.paths.push(path);
        self
    }

    /// Set the textfile name prefix
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.textfile.name_prefix = prefix.into();
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
