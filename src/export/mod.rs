//! Sample writers.
//!
//! A writer receives the drained samples of one collection cycle.

use crate::core::{OutputFormat, PromflatError, Result, Sample};
use parking_lot::Mutex;
use std::io::Write;

/// Destination of flattened samples
pub trait Writer: Send + Sync {
    /// Write one cycle worth of samples
    fn write(&self, samples: &[Sample]) -> Result<()>;
}

/// Writes one line per sample to stdout or any other byte sink
pub struct ConsoleWriter {
    format: OutputFormat,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleWriter {
    /// Writer printing to stdout
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, Box::new(std::io::stdout()))
    }

    /// Writer printing to `out`
    pub fn new(format: OutputFormat, out: Box<dyn Write + Send>) -> Self {
        Self {
            format,
            out: Mutex::new(out),
        }
    }

    fn format_line(&self, sample: &Sample) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string(sample)?),
            OutputFormat::Text => {
                let ts = sample
                    .timestamp
                    .map(|t| t.timestamp().to_string())
                    .unwrap_or_else(|| "-".to_string());
                Ok(format!("{} {}", ts, sample))
            },
        }
    }
}

impl Writer for ConsoleWriter {
    fn write(&self, samples: &[Sample]) -> Result<()> {
        let mut out = self.out.lock();
        for sample in samples {
            let line = self.format_line(sample)?;
            writeln!(out, "{}", line).map_err(|e| PromflatError::write(e.to_string()))?;
        }
        out.flush().map_err(|e| PromflatError::write(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TagSet;
    use chrono::DateTime;
    use std::sync::Arc;

    /// Shared buffer so the test can read what the writer produced
    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    fn sample() -> Sample {
        let mut labels = TagSet::new();
        labels.insert("le".to_string(), "+Inf".to_string());
        Sample::new("h_bucket", 3.0, &labels).with_time(DateTime::from_timestamp(1_700_000_000, 0))
    }

    #[test]
    fn test_text_output() {
        let buffer = Buffer::default();
        let writer = ConsoleWriter::new(OutputFormat::Text, Box::new(buffer.clone()));
        writer
            .write(&[sample(), Sample::new("up", 1.0, &TagSet::new())])
            .unwrap();

        assert_eq!(
            buffer.contents(),
            "1700000000 h_bucket{le=\"+Inf\"} 3\n- up 1\n"
        );
    }

    #[test]
    fn test_json_output() {
        let buffer = Buffer::default();
        let writer = ConsoleWriter::new(OutputFormat::Json, Box::new(buffer.clone()));
        writer.write(&[sample()]).unwrap();

        let value: serde_json::Value = serde_json::from_str(buffer.contents().trim()).unwrap();
        assert_eq!(value["name"], "h_bucket");
        assert_eq!(value["value"], 3.0);
        assert_eq!(value["labels"]["le"], "+Inf");
        assert!(value["timestamp"].is_string());
    }
}
