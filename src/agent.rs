//! Agent composition root.
//!
//! Owns the registered inputs and the writer, and runs one collection loop
//! per input until shutdown.

use crate::core::{Config, PromflatError, Result, Sample, SampleList, TagSet};
use crate::export::Writer;
use crate::inputs::{Input, InputRegistry};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// The running collection agent
pub struct Agent {
    inputs: Vec<Arc<dyn Input>>,
    writer: Arc<dyn Writer>,
    labels: Arc<TagSet>,
}

impl Agent {
    /// Build the agent from configuration, initializing every enabled input
    pub async fn from_config(config: &Config, writer: Arc<dyn Writer>) -> Result<Self> {
        let registry = InputRegistry::from_config(config)?;
        Self::with_registry(registry, writer, config.agent.labels.clone()).await
    }

    /// Build the agent from an explicit registry
    pub async fn with_registry(
        mut registry: InputRegistry,
        writer: Arc<dyn Writer>,
        labels: TagSet,
    ) -> Result<Self> {
        registry.init_all().await?;
        tracing::info!("Initialized inputs: {}", registry.names().join(", "));

        Ok(Self {
            inputs: registry.into_inputs().into_iter().map(Arc::from).collect(),
            writer,
            labels: Arc::new(labels),
        })
    }

    /// Names of the inputs this agent polls
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|i| i.name()).collect()
    }

    /// Gather every input once and write the result. Returns the number of
    /// samples written.
    pub async fn run_once(&self) -> Result<usize> {
        let mut total = 0;
        for input in &self.inputs {
            total += collect(input.as_ref(), &self.labels, self.writer.as_ref()).await?;
        }
        Ok(total)
    }

    /// Poll every input on its own interval until ctrl-c
    pub async fn run(self) -> Result<()> {
        let mut handles = Vec::with_capacity(self.inputs.len());

        for input in &self.inputs {
            let input = Arc::clone(input);
            let writer = Arc::clone(&self.writer);
            let labels = Arc::clone(&self.labels);

            handles.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(input.interval());
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    match collect(input.as_ref(), &labels, writer.as_ref()).await {
                        Ok(count) => {
                            tracing::debug!("input '{}' wrote {} samples", input.name(), count)
                        },
                        Err(e) if e.is_recoverable() => {
                            tracing::warn!("input '{}' cycle failed: {}", input.name(), e)
                        },
                        Err(e) => {
                            tracing::error!("input '{}' cycle failed: {}", input.name(), e)
                        },
                    }
                }
            }));
        }

        tracing::info!("promflat running with {} inputs", handles.len());

        let shutdown = tokio::signal::ctrl_c().await;
        if let Err(e) = shutdown {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        tracing::info!("Received shutdown signal, stopping...");

        stop(handles).await
    }
}

/// Abort the collection tasks and wait for them to finish. A task that
/// panicked before shutdown is reported as an error.
async fn stop(handles: Vec<JoinHandle<()>>) -> Result<()> {
    for handle in &handles {
        handle.abort();
    }

    let mut result = Ok(());
    for handle in handles {
        match handle.await {
            Err(e) if !e.is_cancelled() => {
                tracing::error!("collection task failed: {}", e);
                if result.is_ok() {
                    result = Err(PromflatError::from(e));
                }
            },
            _ => {},
        }
    }
    result
}

/// Run one cycle of a single input
async fn collect(input: &dyn Input, labels: &TagSet, writer: &dyn Writer) -> Result<usize> {
    let list = SampleList::new();
    input.gather(&list).await?;

    let mut samples = list.drain();
    finalize(&mut samples, Utc::now(), labels);
    writer.write(&samples)?;
    Ok(samples.len())
}

/// Stamp samples without a timestamp with the cycle time and add the global
/// labels the samples do not already carry.
pub fn finalize(samples: &mut [Sample], now: DateTime<Utc>, labels: &TagSet) {
    for sample in samples.iter_mut() {
        if sample.timestamp.is_none() {
            sample.timestamp = Some(now);
        }
        for (name, value) in labels {
            sample
                .labels
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Collecting(Mutex<Vec<Sample>>);

    impl Writer for Collecting {
        fn write(&self, samples: &[Sample]) -> Result<()> {
            self.0.lock().extend_from_slice(samples);
            Ok(())
        }
    }

    struct Static;

    #[async_trait]
    impl Input for Static {
        fn name(&self) -> &str {
            "static"
        }

        fn interval(&self) -> Duration {
            Duration::from_secs(60)
        }

        async fn gather(&self, samples: &SampleList) -> Result<()> {
            let mut labels = TagSet::new();
            labels.insert("ident".to_string(), "own".to_string());
            samples.push_back(Sample::new("a", 1.0, &labels));
            samples.push_back(
                Sample::new("b", 2.0, &TagSet::new()).with_time(DateTime::from_timestamp(10, 0)),
            );
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Input for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn interval(&self) -> Duration {
            Duration::from_secs(60)
        }

        async fn gather(&self, _samples: &SampleList) -> Result<()> {
            Err(PromflatError::gather("failing", "no data"))
        }
    }

    #[test]
    fn test_finalize() {
        let now = DateTime::from_timestamp(1_000, 0).unwrap();
        let mut labels = TagSet::new();
        labels.insert("ident".to_string(), "global".to_string());
        labels.insert("region".to_string(), "eu".to_string());

        let mut own = TagSet::new();
        own.insert("ident".to_string(), "own".to_string());
        let mut samples = vec![
            Sample::new("a", 1.0, &own),
            Sample::new("b", 1.0, &TagSet::new()).with_time(DateTime::from_timestamp(5, 0)),
        ];
        finalize(&mut samples, now, &labels);

        assert_eq!(samples[0].timestamp, Some(now));
        assert_eq!(samples[0].labels.get("ident").map(String::as_str), Some("own"));
        assert_eq!(samples[0].labels.get("region").map(String::as_str), Some("eu"));
        assert_eq!(samples[1].timestamp.map(|t| t.timestamp()), Some(5));
        assert_eq!(samples[1].labels.get("ident").map(String::as_str), Some("global"));
    }

    #[tokio::test]
    async fn test_run_once() {
        let mut registry = InputRegistry::new();
        registry.register(Box::new(Static)).unwrap();
        let writer = Arc::new(Collecting::default());

        let mut labels = TagSet::new();
        labels.insert("ident".to_string(), "global".to_string());
        let agent = Agent::with_registry(registry, writer.clone(), labels).await.unwrap();

        assert_eq!(agent.input_names(), vec!["static"]);
        assert_eq!(agent.run_once().await.unwrap(), 2);

        let written = writer.0.lock();
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|s| s.timestamp.is_some()));
        assert_eq!(written[0].labels.get("ident").map(String::as_str), Some("own"));
        assert_eq!(written[1].labels.get("ident").map(String::as_str), Some("global"));
    }

    #[tokio::test]
    async fn test_stop_cancels_running_tasks() {
        let pending = tokio::spawn(std::future::pending::<()>());
        let done = tokio::spawn(async {});
        assert!(stop(vec![pending, done]).await.is_ok());
    }

    #[tokio::test]
    async fn test_stop_reports_panicked_task() {
        let panicked = tokio::spawn(async {
            panic!("collector crashed");
        });
        while !panicked.is_finished() {
            tokio::task::yield_now().await;
        }

        let pending = tokio::spawn(std::future::pending::<()>());
        let err = stop(vec![panicked, pending]).await.unwrap_err();
        assert_eq!(err.category(), "async");
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_run_once_propagates_gather_error() {
        let mut registry = InputRegistry::new();
        registry.register(Box::new(Failing)).unwrap();
        let agent = Agent::with_registry(registry, Arc::new(Collecting::default()), TagSet::new())
            .await
            .unwrap();

        let err = agent.run_once().await.unwrap_err();
        assert_eq!(err.category(), "gather");
    }
}
