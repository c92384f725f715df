//! Core types shared by every part of promflat.
//!
//! This module contains the flat sample model, configuration and
//! the error type used throughout the agent.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, OutputFormat};
pub use error::{PromflatError, Result};
pub use types::{Sample, SampleList, TagSet};
