use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// Label name to label value mapping attached to a sample
pub type TagSet = BTreeMap<String, String>;

/// The flat unit emitted to writers: one name, one value, one timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Final metric name
    pub name: String,
    /// Sample value
    pub value: f64,
    /// Observation time, `None` when the source carried no timestamp
    pub timestamp: Option<DateTime<Utc>>,
    /// Final tag set
    pub labels: TagSet,
}

impl Sample {
    /// Creates a sample with the given labels and no timestamp
    pub fn new(name: impl Into<String>, value: f64, labels: &TagSet) -> Self {
        Self {
            name: name.into(),
            value,
            timestamp: None,
            labels: labels.clone(),
        }
    }

    /// Adds one label, replacing any existing value for the same name
    pub fn with_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(name.into(), value.into());
        self
    }

    /// Sets the observation time
    pub fn with_time(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.labels.is_empty() {
            f.write_str("{")?;
            for (i, (name, value)) in self.labels.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}={:?}", name, value)?;
            }
            f.write_str("}")?;
        }
        write!(f, " {}", self.value)
    }
}

/// Ordered sample collection shared by the inputs of one collection cycle.
///
/// Internally synchronized, so several inputs may append to the same list
/// from different tasks. Readers only ever drain it.
#[derive(Debug, Default)]
pub struct SampleList {
    inner: Mutex<VecDeque<Sample>>,
}

impl SampleList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a sample at the front
    pub fn push_front(&self, sample: Sample) {
        self.inner.lock().push_front(sample);
    }

    /// Append a sample at the back
    pub fn push_back(&self, sample: Sample) {
        self.inner.lock().push_back(sample);
    }

    /// Insert several samples at the front, each one ahead of the previous
    pub fn push_front_many<I>(&self, samples: I)
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut inner = self.inner.lock();
        for sample in samples {
            inner.push_front(sample);
        }
    }

    /// Number of queued samples
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the list holds no samples
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Take every queued sample, front to back, leaving the list empty
    pub fn drain(&self) -> Vec<Sample> {
        let mut inner = self.inner.lock();
        inner.drain(..).collect()
    }
}
