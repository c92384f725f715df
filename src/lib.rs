//! Promflat - host statistics collector and Prometheus exposition flattener.
//!
//! Promflat gathers host load statistics and reads Prometheus text
//! exposition files, flattening every metric family into plain
//! `name{labels} value` samples.
//!
//! # Features
//!
//! - **Shape Flattening**: Summaries and histograms expand into one sample
//!   per quantile or bucket plus `_sum` and `_count`
//! - **Name Prefixing**: Optional prefix applied to metric names that lack it
//! - **Host Statistics**: Load averages, normalized load, CPU count, uptime
//!   and logged-in users
//! - **Zero Configuration**: Works out of the box with sensible defaults
//!
//! # Architecture
//!
//! Promflat is built with a modular architecture:
//! - `metrics`: Metric records and the flattening expanders
//! - `receiver`: Prometheus text exposition parser
//! - `inputs`: Pluggable sources of samples
//! - `export`: Sample writers
//! - `agent`: Collection loop
//! - `cli`: Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use promflat::agent::Agent;
//! use promflat::core::Config;
//! use promflat::export::ConsoleWriter;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let writer = Arc::new(ConsoleWriter::stdout(config.agent.output));
//!     let agent = Agent::from_config(&config, writer).await?;
//!     agent.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod agent;
pub mod cli;
pub mod core;
pub mod export;
pub mod inputs;
pub mod metrics;
pub mod receiver;

// Re-export core types for convenience
pub use crate::core::{Config, Result};
