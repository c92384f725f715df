//! Configuration system tests.

use promflat::core::{Config, ConfigBuilder, OutputFormat};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.agent.interval, Duration::from_secs(15));
    assert_eq!(config.agent.output, OutputFormat::Text);
    assert!(config.system.enabled);
    assert!(!config.textfile.enabled);
}

#[test]
fn test_config_builder() {
    let config = ConfigBuilder::new()
        .interval(Duration::from_secs(5))
        .output(OutputFormat::Json)
        .label("ident", "db-02")
        .system(false)
        .textfile_path(PathBuf::from("/var/lib/promflat/db.prom"))
        .build()
        .unwrap();

    assert_eq!(config.agent.interval, Duration::from_secs(5));
    assert_eq!(config.agent.output, OutputFormat::Json);
    assert!(!config.system.enabled);
    assert!(config.textfile.enabled);
    assert_eq!(config.textfile.paths.len(), 1);
}

#[test]
fn test_yaml_config() {
    let yaml = r#"
agent:
  interval: 30s
system:
  enabled: false
textfile:
  enabled: true
  name_prefix: "batch"
  labels:
    source: cron
  paths:
    - /tmp/a.prom
    - /tmp/b.prom
"#;

    let config = ConfigBuilder::new().from_yaml(yaml).unwrap().build().unwrap();
    assert_eq!(config.textfile_interval(), Duration::from_secs(30));
    assert_eq!(config.textfile.name_prefix, "batch");
    assert_eq!(config.textfile.labels.get("source").map(String::as_str), Some("cron"));
    assert_eq!(config.textfile.paths.len(), 2);
}

#[test]
fn test_invalid_yaml_config() {
    let result = ConfigBuilder::new().from_yaml("agent: [not, a, map]");
    assert!(result.is_err());
}

#[test]
fn test_validation_errors() {
    let result = ConfigBuilder::new().interval(Duration::ZERO).build();
    assert!(result.is_err());

    let yaml = "textfile:\n  enabled: true\n";
    let result = ConfigBuilder::new().from_yaml(yaml).unwrap().build();
    assert!(result.is_err());
}
