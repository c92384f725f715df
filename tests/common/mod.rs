//! Common test utilities and fixtures.

#![allow(dead_code)]

use parking_lot::Mutex;
use promflat::core::{Result, Sample, TagSet};
use promflat::export::Writer;
use promflat::metrics::{
    Histogram, HistogramBucket, MetricRecord, MetricValue, Quantile, Summary,
};

/// Writer keeping everything it receives.
#[derive(Default)]
pub struct CollectingWriter {
    samples: Mutex<Vec<Sample>>,
}

impl CollectingWriter {
    pub fn samples(&self) -> Vec<Sample> {
        self.samples.lock().clone()
    }
}

impl Writer for CollectingWriter {
    fn write(&self, samples: &[Sample]) -> Result<()> {
        self.samples.lock().extend_from_slice(samples);
        Ok(())
    }
}

pub fn tags(pairs: &[(&str, &str)]) -> TagSet {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn summary(count: u64, sum: f64, quantiles: &[(f64, f64)]) -> MetricRecord {
    MetricRecord::new(MetricValue::Summary(Summary {
        sample_count: count,
        sample_sum: sum,
        quantiles: quantiles
            .iter()
            .map(|&(quantile, value)| Quantile { quantile, value })
            .collect(),
    }))
}

pub fn histogram(count: u64, sum: f64, buckets: &[(f64, u64)]) -> MetricRecord {
    MetricRecord::new(MetricValue::Histogram(Histogram {
        sample_count: count,
        sample_sum: sum,
        buckets: buckets
            .iter()
            .map(|&(upper_bound, cumulative_count)| HistogramBucket {
                upper_bound,
                cumulative_count,
            })
            .collect(),
    }))
}

/// `(name, label value)` pairs in list order, for compact ordering checks.
pub fn names_with(samples: &[Sample], label: &str) -> Vec<(String, Option<String>)> {
    samples
        .iter()
        .map(|s| (s.name.clone(), s.labels.get(label).cloned()))
        .collect()
}
