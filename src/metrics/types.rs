//! Decoded Prometheus metric records.
//!
//! A record is one labeled series of one metric family, already typed
//! and timestamped by the parser.

/// Name/value label pair as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Target fraction and observed value of a summary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantile {
    pub quantile: f64,
    pub value: f64,
}

/// Upper bound and cumulative count of a histogram
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBucket {
    pub upper_bound: f64,
    pub cumulative_count: u64,
}

/// Quantile-bearing summary payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub sample_count: u64,
    pub sample_sum: f64,
    pub quantiles: Vec<Quantile>,
}

/// Bucketed histogram payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    pub sample_count: u64,
    pub sample_sum: f64,
    /// Declared buckets, expected sorted by upper bound. The implicit
    /// `+Inf` bucket is not part of this list.
    pub buckets: Vec<HistogramBucket>,
}

/// Payload of a metric record, one variant per Prometheus type
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// Point-in-time measurement
    Gauge(f64),
    /// Monotonically increasing counter
    Counter(f64),
    /// Value of unknown type
    Untyped(f64),
    /// Client-side quantiles
    Summary(Summary),
    /// Cumulative buckets
    Histogram(Histogram),
}

/// Shape of a metric record, selecting its expander
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricShape {
    Scalar,
    Summary,
    Histogram,
}

impl MetricValue {
    /// Which expander handles this payload
    pub fn shape(&self) -> MetricShape {
        match self {
            MetricValue::Gauge(_) | MetricValue::Counter(_) | MetricValue::Untyped(_) => {
                MetricShape::Scalar
            },
            MetricValue::Summary(_) => MetricShape::Summary,
            MetricValue::Histogram(_) => MetricShape::Histogram,
        }
    }
}

/// One decoded series
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub labels: Vec<Label>,
    /// Milliseconds since the epoch, 0 or negative when absent
    pub timestamp_ms: i64,
    pub value: MetricValue,
}

impl MetricRecord {
    pub fn new(value: MetricValue) -> Self {
        Self {
            labels: Vec::new(),
            timestamp_ms: 0,
            value,
        }
    }

    pub fn with_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push(Label::new(name, value));
        self
    }

    pub fn with_timestamp_ms(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }
}

/// Declared type of a metric family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Summary,
    Histogram,
    Untyped,
}

impl MetricKind {
    /// Parse the type token of a `# TYPE` line
    pub fn from_type_token(token: &str) -> Option<Self> {
        match token {
            "counter" => Some(MetricKind::Counter),
            "gauge" => Some(MetricKind::Gauge),
            "summary" => Some(MetricKind::Summary),
            "histogram" => Some(MetricKind::Histogram),
            "untyped" => Some(MetricKind::Untyped),
            _ => None,
        }
    }
}

/// All series of one metric name
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub help: Option<String>,
    pub kind: MetricKind,
    pub metrics: Vec<MetricRecord>,
}
