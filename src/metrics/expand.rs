//! Expansion of decoded metric records into flat samples.
//!
//! Every expander pushes its samples to the front of the list in
//! construction order, so the list reads them back newest first:
//! a summary yields `quantiles (reversed), sum, count`.

use crate::core::{Sample, SampleList, TagSet};
use crate::metrics::naming::{build_metric, format_float, resolve_prefix};
use crate::metrics::time::{resolve_time_fn, TimeFn};
use crate::metrics::types::{MetricRecord, MetricShape, MetricValue};

/// Label carrying a summary quantile
pub const QUANTILE_LABEL: &str = "quantile";
/// Label carrying a histogram bucket upper bound
pub const BUCKET_LABEL: &str = "le";
/// Bound of the implicit all-inclusive bucket
pub const INF_BOUND: &str = "+Inf";

/// Caller tags overridden by the record's own labels.
pub fn make_labels(record: &MetricRecord, tags: &TagSet) -> TagSet {
    let mut labels = tags.clone();
    for label in &record.labels {
        labels.insert(label.name.clone(), label.value.clone());
    }
    labels
}

/// Extract the value of a gauge, counter or untyped record.
///
/// NaN values are dropped. Summaries and histograms have no scalar value.
pub fn scalar_fields(record: &MetricRecord, metric_name: &str) -> Vec<(String, f64)> {
    let value = match record.value {
        MetricValue::Gauge(v) | MetricValue::Counter(v) | MetricValue::Untyped(v) => v,
        MetricValue::Summary(_) | MetricValue::Histogram(_) => return Vec::new(),
    };
    if value.is_nan() {
        return Vec::new();
    }
    vec![(metric_name.to_string(), value)]
}

/// Expand a summary into `count`, `sum` and one sample per quantile.
pub fn handle_summary(
    default_prefix: &str,
    record: &MetricRecord,
    tags: &TagSet,
    metric_name: &str,
    time_fn: Option<TimeFn>,
    samples: &SampleList,
) {
    let MetricValue::Summary(summary) = &record.value else {
        return;
    };
    let prefix = resolve_prefix(default_prefix, metric_name);
    let ts = resolve_time_fn(time_fn)(record.timestamp_ms);

    let mut out = Vec::with_capacity(summary.quantiles.len() + 2);
    out.push(
        Sample::new(
            build_metric(prefix, metric_name, "count"),
            summary.sample_count as f64,
            tags,
        )
        .with_time(ts),
    );
    out.push(
        Sample::new(build_metric(prefix, metric_name, "sum"), summary.sample_sum, tags)
            .with_time(ts),
    );

    let name = build_metric(prefix, metric_name, "");
    for q in &summary.quantiles {
        out.push(
            Sample::new(name.clone(), q.value, tags)
                .with_label(QUANTILE_LABEL, format_float(q.quantile))
                .with_time(ts),
        );
    }

    samples.push_front_many(out);
}

/// Expand a histogram into `count`, `sum`, the `+Inf` bucket and one
/// sample per declared bucket.
///
/// Buckets are emitted in declared order; they are neither sorted nor
/// checked for monotonicity.
pub fn handle_histogram(
    default_prefix: &str,
    record: &MetricRecord,
    tags: &TagSet,
    metric_name: &str,
    time_fn: Option<TimeFn>,
    samples: &SampleList,
) {
    let MetricValue::Histogram(histogram) = &record.value else {
        return;
    };
    let prefix = resolve_prefix(default_prefix, metric_name);
    let ts = resolve_time_fn(time_fn)(record.timestamp_ms);
    let count = histogram.sample_count as f64;

    let mut out = Vec::with_capacity(histogram.buckets.len() + 3);
    out.push(Sample::new(build_metric(prefix, metric_name, "count"), count, tags).with_time(ts));
    out.push(
        Sample::new(build_metric(prefix, metric_name, "sum"), histogram.sample_sum, tags)
            .with_time(ts),
    );

    let name = build_metric(prefix, metric_name, "bucket");
    out.push(
        Sample::new(name.clone(), count, tags)
            .with_label(BUCKET_LABEL, INF_BOUND)
            .with_time(ts),
    );
    for bucket in &histogram.buckets {
        out.push(
            Sample::new(name.clone(), bucket.cumulative_count as f64, tags)
                .with_label(BUCKET_LABEL, format_float(bucket.upper_bound))
                .with_time(ts),
        );
    }

    samples.push_front_many(out);
}

/// Expand a gauge, counter or untyped record into at most one sample.
pub fn handle_gauge_counter(
    default_prefix: &str,
    record: &MetricRecord,
    tags: &TagSet,
    metric_name: &str,
    time_fn: Option<TimeFn>,
    samples: &SampleList,
) {
    let fields = scalar_fields(record, metric_name);
    if fields.is_empty() {
        return;
    }
    let ts = resolve_time_fn(time_fn)(record.timestamp_ms);

    samples.push_front_many(fields.into_iter().map(|(field, value)| {
        let name = build_metric(resolve_prefix(default_prefix, &field), &field, "");
        Sample::new(name, value, tags).with_time(ts)
    }));
}

/// Expand a record with the expander matching its shape.
pub fn expand_record(
    default_prefix: &str,
    record: &MetricRecord,
    tags: &TagSet,
    metric_name: &str,
    time_fn: Option<TimeFn>,
    samples: &SampleList,
) {
    match record.value.shape() {
        MetricShape::Scalar => {
            handle_gauge_counter(default_prefix, record, tags, metric_name, time_fn, samples)
        },
        MetricShape::Summary => {
            handle_summary(default_prefix, record, tags, metric_name, time_fn, samples)
        },
        MetricShape::Histogram => {
            handle_histogram(default_prefix, record, tags, metric_name, time_fn, samples)
        },
    }
}
