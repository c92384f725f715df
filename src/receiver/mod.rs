//! Decoding of metric data received by the agent.
//!
//! Only the Prometheus text exposition format is understood; it is read
//! from files by the textfile input.

pub mod exposition;

pub use exposition::parse_exposition;
