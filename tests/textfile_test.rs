//! Agent cycles over textfile inputs.

mod common;

use common::{tags, CollectingWriter};
use promflat::agent::Agent;
use promflat::core::{ConfigBuilder, SampleList};
use promflat::inputs::textfile::TextfileInput;
use promflat::inputs::{Input, InputRegistry};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

const NODE_METRICS: &str = r#"# HELP node_filesystem_avail_bytes Available bytes.
# TYPE node_filesystem_avail_bytes gauge
node_filesystem_avail_bytes{mountpoint="/"} 1.2e+10
# TYPE job_duration_seconds summary
job_duration_seconds{quantile="0.5"} 4.2
job_duration_seconds{quantile="0.9"} 9.1
job_duration_seconds_sum 120
job_duration_seconds_count 20
"#;

fn write_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_textfile_input_gathers_all_families() {
    let file = write_file(NODE_METRICS);
    let input = TextfileInput::new(
        Duration::from_secs(60),
        vec![file.path().to_path_buf()],
        String::new(),
        tags(&[("source", "cron")]),
    );

    let list = SampleList::new();
    input.gather(&list).await.unwrap();
    let samples = list.drain();

    // 1 gauge + 2 quantiles + sum + count
    assert_eq!(samples.len(), 5);
    assert!(samples
        .iter()
        .all(|s| s.labels.get("source").map(String::as_str) == Some("cron")));

    let avail = samples
        .iter()
        .find(|s| s.name == "node_filesystem_avail_bytes")
        .unwrap();
    assert_eq!(avail.value, 1.2e10);
    assert_eq!(avail.labels.get("mountpoint").map(String::as_str), Some("/"));
}

#[tokio::test]
async fn test_broken_file_does_not_stop_other_files() {
    let good = write_file("# TYPE up gauge\nup 1\n");
    let bad = write_file("# TYPE up sometype\nup 1\n");
    let input = TextfileInput::new(
        Duration::from_secs(60),
        vec![
            bad.path().to_path_buf(),
            PathBuf::from("/nonexistent/promflat.prom"),
            good.path().to_path_buf(),
        ],
        "batch".to_string(),
        tags(&[]),
    );

    let list = SampleList::new();
    input.gather(&list).await.unwrap();
    let samples = list.drain();

    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].name, "batch_up");
}

#[tokio::test]
async fn test_agent_run_once_from_config() {
    let file = write_file(NODE_METRICS);
    let config = ConfigBuilder::new()
        .system(false)
        .label("ident", "web-01")
        .textfile_path(file.path().to_path_buf())
        .name_prefix("node")
        .build()
        .unwrap();

    let writer = Arc::new(CollectingWriter::default());
    let agent = Agent::from_config(&config, writer.clone()).await.unwrap();
    assert_eq!(agent.input_names(), vec!["textfile"]);

    let count = agent.run_once().await.unwrap();
    let samples = writer.samples();
    assert_eq!(count, 5);
    assert_eq!(samples.len(), 5);

    assert!(samples.iter().all(|s| s.timestamp.is_some()));
    assert!(samples
        .iter()
        .all(|s| s.labels.get("ident").map(String::as_str) == Some("web-01")));
    assert!(samples.iter().any(|s| s.name == "node_filesystem_avail_bytes"));
    assert!(samples.iter().any(|s| s.name == "node_job_duration_seconds_count"));
}

#[tokio::test]
async fn test_registry_rejects_duplicate_names() {
    let mut registry = InputRegistry::new();
    let make = || {
        Box::new(TextfileInput::new(
            Duration::from_secs(1),
            Vec::new(),
            String::new(),
            tags(&[]),
        ))
    };
    registry.register(make()).unwrap();
    assert!(registry.register(make()).is_err());
    assert_eq!(registry.len(), 1);
}
