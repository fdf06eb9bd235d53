//! JSON Lines telemetry sink
//!
//! Writes one JSON object per record, newline-terminated, to any
//! `std::io::Write`. Unavailable values are written as `null`:
//!
//! ```text
//! {"temperature_c":26.2,"humidity_pct":50.3,"pressure_hpa":1007.7,"gas_resistance_ohm":232979.0,"iaq_score":null}
//! ```
//!
//! ## Example
//!
//! ```rust
//! use airguard_connectors::JsonLinesSink;
//! use airguard_core::{TelemetryRecord, TelemetrySink};
//!
//! let mut sink = JsonLinesSink::new(Vec::new());
//! sink.publish(&TelemetryRecord {
//!     temperature_c: 21.0,
//!     humidity_pct: 40.0,
//!     pressure_hpa: Some(1013.2),
//!     gas_resistance_ohm: None,
//!     iaq_score: None,
//! })?;
//!
//! assert_eq!(sink.stats().records_published, 1);
//! # Ok::<(), airguard_connectors::SinkError>(())
//! ```

use std::io::Write;

use airguard_core::{TelemetryRecord, TelemetrySink};
use thiserror::Error;

/// Sink failures
#[derive(Debug, Error)]
pub enum SinkError {
    /// Record could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying writer failed
    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Publishing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SinkStats {
    /// Records written successfully
    pub records_published: u64,
    /// Records that failed to encode or write
    pub records_failed: u64,
    /// Bytes written, newlines included
    pub bytes_written: u64,
}

/// Newline-delimited JSON over a writer
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    stats: SinkStats,
}

impl<W: Write> JsonLinesSink<W> {
    /// Sink writing to `writer`
    pub fn new(writer: W) -> Self {
        Self { writer, stats: SinkStats::default() }
    }

    /// Statistics so far
    pub fn stats(&self) -> &SinkStats {
        &self.stats
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, record: &TelemetryRecord) -> Result<usize, SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        Ok(line.len())
    }
}

impl<W: Write> TelemetrySink for JsonLinesSink<W> {
    type Error = SinkError;

    fn publish(&mut self, record: &TelemetryRecord) -> Result<(), SinkError> {
        match self.write_line(record) {
            Ok(len) => {
                self.stats.records_published += 1;
                self.stats.bytes_written += len as u64;
                Ok(())
            }
            Err(e) => {
                self.stats.records_failed += 1;
                log::warn!("telemetry record dropped: {}", e);
                Err(e)
            }
        }
    }
}
