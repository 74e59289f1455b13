// Position traces logged by the overhead tracker
//
// Provides:
// - Trace / NormalizedTrace sample containers
// - Log parsing (strict or lenient, `;` / tab / whitespace delimited)
// - End-to-end metrics: average speed and straightness

pub mod metrics;
pub mod parser;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use metrics::{
    average_speed, linear_fit, normalize, straightness, LinearFit, MetricsError, StraightnessForm,
    TraceMetrics,
};
pub use parser::{parse, parse_file, Delimiter, ParseMode, ParseOptions};

/// One tracker sample: time in seconds, position in centimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub x: f64,
    pub y: f64,
}

impl Sample {
    pub fn new(time: f64, x: f64, y: f64) -> Self {
        Self { time, x, y }
    }
}

/// Error types for reading and validating traces
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed data on line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("Timestamp went backwards on line {line}: {current} after {previous}")]
    TimeWentBackwards {
        line: usize,
        previous: f64,
        current: f64,
    },
}

/// Raw samples as logged, timestamps non-decreasing
///
/// Produced by `parse`, which rejects or drops samples that go back in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trace {
    samples: Vec<Sample>,
}

impl Trace {
    /// Only the parser builds traces; it has already enforced ordering
    pub(crate) fn from_ordered(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl AsRef<[Sample]> for Trace {
    fn as_ref(&self) -> &[Sample] {
        &self.samples
    }
}

/// Trace shifted so the first sample sits at the origin
///
/// Only `normalize` produces this type, so `samples()[0]` is always
/// `(t0, 0.0, 0.0)` for a non-empty trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedTrace {
    samples: Vec<Sample>,
}

impl NormalizedTrace {
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// (time, x) pairs for plotting
    pub fn x_series(&self) -> Vec<(f64, f64)> {
        self.samples.iter().map(|s| (s.time, s.x)).collect()
    }

    /// (time, y) pairs for plotting
    pub fn y_series(&self) -> Vec<(f64, f64)> {
        self.samples.iter().map(|s| (s.time, s.y)).collect()
    }

    /// (x, y) trajectory
    pub fn path(&self) -> Vec<(f64, f64)> {
        self.samples.iter().map(|s| (s.x, s.y)).collect()
    }
}

impl AsRef<[Sample]> for NormalizedTrace {
    fn as_ref(&self) -> &[Sample] {
        &self.samples
    }
}
