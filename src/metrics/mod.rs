//! Translation of Prometheus metric shapes into flat samples.
//!
//! Gauges, counters and untyped metrics become one sample each, a summary
//! with Q quantiles becomes Q+2 samples and a histogram with B buckets
//! becomes B+3 samples.

pub mod expand;
pub mod naming;
pub mod time;
pub mod types;

pub use expand::{
    expand_record, handle_gauge_counter, handle_histogram, handle_summary, make_labels,
    scalar_fields,
};
pub use naming::{build_metric, format_float, resolve_prefix};
pub use time::{metric_time, TimeFn};
pub use types::{
    Histogram, HistogramBucket, Label, MetricFamily, MetricKind, MetricRecord, MetricShape,
    MetricValue, Quantile, Summary,
};
