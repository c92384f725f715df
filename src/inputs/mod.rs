//! Metric inputs and their registry.
//!
//! An input gathers samples once per interval into the sample list it is
//! handed. Inputs are registered explicitly by the agent at startup; nothing
//! registers itself.

pub mod system;
pub mod textfile;

use crate::core::{Config, PromflatError, Result, Sample, SampleList, TagSet};
use crate::metrics::build_metric;
use async_trait::async_trait;
use std::time::Duration;

pub use system::{HostProbe, HostStats, SysinfoProbe, SystemInput};
pub use textfile::TextfileInput;

/// A source of samples polled by the agent
#[async_trait]
pub trait Input: Send + Sync {
    /// Unique name, also used as the metric name prefix where applicable
    fn name(&self) -> &str;

    /// Time between two gathers
    fn interval(&self) -> Duration;

    /// Called once before the first gather
    async fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Gather one cycle of samples into `samples`
    async fn gather(&self, samples: &SampleList) -> Result<()>;
}

/// Strongly typed statistics that flatten into named numeric fields
pub trait ToFields {
    /// Field name and value pairs, absent fields omitted
    fn fields(&self) -> Vec<(&'static str, f64)>;
}

/// Turn typed fields into samples named `<prefix>_<field>`.
///
/// Non-finite values are dropped.
pub fn samples_from_fields<T: ToFields + ?Sized>(
    prefix: &str,
    record: &T,
    tags: &TagSet,
) -> Vec<Sample> {
    record
        .fields()
        .into_iter()
        .filter(|(_, value)| value.is_finite())
        .map(|(field, value)| Sample::new(build_metric(prefix, field, ""), value, tags))
        .collect()
}

/// Inputs known to the agent, in registration order
#[derive(Default)]
pub struct InputRegistry {
    inputs: Vec<Box<dyn Input>>,
}

impl InputRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry of built-in inputs enabled in `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new();

        if config.system.enabled {
            registry.register(Box::new(SystemInput::new(
                config.system_interval(),
                config.system.collect_user_number,
                Box::new(SysinfoProbe),
            )))?;
        }

        if config.textfile.enabled {
            registry.register(Box::new(TextfileInput::new(
                config.textfile_interval(),
                config.textfile.paths.clone(),
                config.textfile.name_prefix.clone(),
                config.textfile.labels.clone(),
            )))?;
        }

        Ok(registry)
    }

    /// Add an input, rejecting a second input with the same name
    pub fn register(&mut self, input: Box<dyn Input>) -> Result<()> {
        if self.inputs.iter().any(|i| i.name() == input.name()) {
            return Err(PromflatError::DuplicateInput(input.name().to_string()));
        }
        tracing::debug!("Registered input '{}' every {:?}", input.name(), input.interval());
        self.inputs.push(input);
        Ok(())
    }

    /// Names of the registered inputs
    pub fn names(&self) -> Vec<&str> {
        self.inputs.iter().map(|i| i.name()).collect()
    }

    /// Number of registered inputs
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Whether no input is registered
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Initialize every input, failing on the first error
    pub async fn init_all(&mut self) -> Result<()> {
        for input in &mut self.inputs {
            input.init().await?;
        }
        Ok(())
    }

    /// Hand the inputs over to the caller
    pub fn into_inputs(self) -> Vec<Box<dyn Input>> {
        self.inputs
    }
}
