//! Prometheus exposition files read from disk.

use crate::core::{Result, SampleList, TagSet};
use crate::inputs::Input;
use crate::metrics::{expand_record, make_labels};
use crate::receiver::parse_exposition;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

const INPUT_NAME: &str = "textfile";

/// Input flattening the metrics of a set of `.prom` files
pub struct TextfileInput {
    interval: Duration,
    paths: Vec<PathBuf>,
    name_prefix: String,
    labels: TagSet,
}

impl TextfileInput {
    pub fn new(
        interval: Duration,
        paths: Vec<PathBuf>,
        name_prefix: String,
        labels: TagSet,
    ) -> Self {
        Self {
            interval,
            paths,
            name_prefix,
            labels,
        }
    }

    /// Parse and expand one file. Returns the number of samples added.
    pub async fn gather_file(&self, path: &Path, samples: &SampleList) -> Result<usize> {
        let text = tokio::fs::read_to_string(path).await?;
        let families = parse_exposition(&text)?;

        let before = samples.len();
        for family in &families {
            for record in &family.metrics {
                let tags = make_labels(record, &self.labels);
                expand_record(&self.name_prefix, record, &tags, &family.name, None, samples);
            }
        }
        Ok(samples.len().saturating_sub(before))
    }
}

#[async_trait]
impl Input for TextfileInput {
    fn name(&self) -> &str {
        INPUT_NAME
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn init(&mut self) -> Result<()> {
        for path in &self.paths {
            if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                tracing::warn!("textfile {:?} does not exist yet", path);
            }
        }
        Ok(())
    }

    async fn gather(&self, samples: &SampleList) -> Result<()> {
        for path in &self.paths {
            match self.gather_file(path, samples).await {
                Ok(count) => tracing::trace!("read {} samples from {:?}", count, path),
                Err(e) => tracing::warn!("skipping textfile {:?}: {}", path, e),
            }
        }
        Ok(())
    }
}
