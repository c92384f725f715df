//! Command-line interface for promflat.
//!
//! Just run `promflat` to collect host statistics every 15 seconds
//! and print them to stdout.

use crate::agent::Agent;
use crate::core::{Config, ConfigBuilder, OutputFormat, PromflatError, Result};
use crate::export::ConsoleWriter;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Host statistics collector and Prometheus exposition flattener
#[derive(Parser, Debug)]
#[command(name = "promflat")]
#[command(version, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Configuration file path (default: ~/.config/promflat/config.yaml)
    #[arg(short, long, env = "PROMFLAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Default collection interval, e.g. `15s` or `1m`
    #[arg(long, env = "PROMFLAT_INTERVAL", value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Output format: text or json
    #[arg(long, env = "PROMFLAT_OUTPUT")]
    pub output: Option<OutputFormat>,

    /// Exposition file to read, may be repeated
    #[arg(long = "textfile", env = "PROMFLAT_TEXTFILE")]
    pub textfiles: Vec<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, env = "PROMFLAT_DEBUG")]
    pub debug: bool,

    /// Gather every input once, print the samples and exit
    #[arg(long)]
    pub test: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,

    /// Show version information
    #[arg(short = 'V', long = "show-version")]
    pub version: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Config file
    /// 3. Defaults (lowest priority)
    pub async fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        let config_path = match &self.config {
            Some(path) => path.clone(),
            None => {
                let default_path = Config::default_path();
                if !default_path.exists() {
                    return self.build_config_from_args(builder);
                }
                default_path
            },
        };

        match tokio::fs::read_to_string(&config_path).await {
            Ok(content) => {
                builder = builder.from_yaml(&content)?;
                tracing::info!("Loaded configuration from: {:?}", config_path);
            },
            Err(e) if self.config.is_some() => {
                return Err(PromflatError::config(format!(
                    "Failed to read config file {:?}: {}",
                    config_path, e
                )));
            },
            Err(_) => {
                tracing::debug!("No config file found at {:?}, using defaults", config_path);
            },
        }

        self.build_config_from_args(builder)
    }

    fn build_config_from_args(&self, mut builder: ConfigBuilder) -> Result<Config> {
        if let Some(interval) = self.interval {
            builder = builder.interval(interval);
        }
        if let Some(output) = self.output {
            builder = builder.output(output);
        }
        for path in &self.textfiles {
            builder = builder.textfile_path(path.clone());
        }

        builder.debug(self.debug).build()
    }

    /// Log filter directive: `--debug` first, then `PROMFLAT_LOG_LEVEL`,
    /// then `logging.level` from the configuration.
    fn log_level(&self, env_level: Option<String>, config: &Config) -> String {
        if self.debug {
            return "debug".to_string();
        }
        env_level.unwrap_or_else(|| config.logging.level.as_str().to_string())
    }

    /// Initialize logging based on configuration.
    ///
    /// `RUST_LOG`, when set, overrides every other source.
    pub fn init_logging(&self, config: &Config) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let log_level = self.log_level(std::env::var("PROMFLAT_LOG_LEVEL").ok(), config);
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

        // samples go to stdout, logs to stderr
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact();

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| PromflatError::config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

/// Execute the promflat agent.
pub async fn execute(cli: Cli) -> Result<()> {
    if cli.version {
        println!("promflat {}", env!("CARGO_PKG_VERSION"));
        println!("Host statistics collector and Prometheus exposition flattener");
        return Ok(());
    }

    let config = cli.load_config().await?;
    cli.init_logging(&config)?;
    tracing::debug!("Configuration loaded, default interval {:?}", config.agent.interval);

    if cli.check_config {
        config.validate()?;
        println!("Configuration is valid!");
        println!("  Interval: {:?}", config.agent.interval);
        println!("  System input: {}", config.system.enabled);
        println!("  Textfiles: {}", config.textfile.paths.len());
        return Ok(());
    }

    let writer = Arc::new(ConsoleWriter::stdout(config.agent.output));
    let agent = Agent::from_config(&config, writer).await?;

    if cli.test {
        let count = agent.run_once().await?;
        tracing::info!("Gathered {} samples", count);
        return Ok(());
    }

    agent.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> Cli {
        Cli {
            config: None,
            interval: None,
            output: None,
            textfiles: Vec::new(),
            debug: false,
            test: false,
            check_config: false,
            version: false,
        }
    }

    #[test]
    fn test_cli_overrides() {
        let mut cli = cli();
        cli.interval = Some(Duration::from_secs(30));
        cli.output = Some(OutputFormat::Json);
        cli.textfiles.push(PathBuf::from("/tmp/app.prom"));
        cli.debug = true;

        let config = cli.build_config_from_args(ConfigBuilder::new()).unwrap();
        assert_eq!(config.agent.interval, Duration::from_secs(30));
        assert_eq!(config.agent.output, OutputFormat::Json);
        assert!(config.textfile.enabled);
        assert!(config.debug);
    }

    #[test]
    fn test_parse_from_args() {
        let cli = Cli::try_parse_from([
            "promflat",
            "--interval",
            "1m",
            "--output",
            "json",
            "--textfile",
            "a.prom",
            "--textfile",
            "b.prom",
            "--test",
        ])
        .unwrap();

        assert_eq!(cli.interval, Some(Duration::from_secs(60)));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.textfiles.len(), 2);
        assert!(cli.test);
    }

    #[test]
    fn test_log_level_precedence() {
        let yaml = "logging:\n  level: warn\n";
        let config = ConfigBuilder::new().from_yaml(yaml).unwrap().build().unwrap();

        let mut cli = cli();
        assert_eq!(cli.log_level(None, &config), "warn");
        assert_eq!(cli.log_level(Some("trace".to_string()), &config), "trace");

        cli.debug = true;
        assert_eq!(cli.log_level(Some("trace".to_string()), &config), "debug");
        assert_eq!(cli.log_level(None, &Config::default()), "debug");
    }

    #[tokio::test]
    async fn test_missing_explicit_config_fails() {
        let mut cli = cli();
        cli.config = Some(PathBuf::from("/nonexistent/promflat/config.yaml"));
        let err = cli.load_config().await.unwrap_err();
        assert_eq!(err.category(), "config");
    }
}
