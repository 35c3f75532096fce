use serde::{Deserialize, Serialize};

/// One point of the per-commit performance series used for charting and
/// for the consistency score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    /// Milliseconds since the session started.
    pub timestamp_ms: u64,
    /// Pace of the word that was just committed.
    pub wpm: f64,
    /// Running word accuracy at this commit, 0-100.
    pub accuracy: f64,
}

impl PerformanceSnapshot {
    pub fn new(timestamp_ms: u64, wpm: f64, accuracy: f64) -> Self {
        Self {
            timestamp_ms,
            wpm,
            accuracy,
        }
    }

    /// Seconds since start, for chart axes.
    pub fn t(&self) -> f64 {
        self.timestamp_ms as f64 / 1000.0
    }
}

impl From<PerformanceSnapshot> for (f64, f64) {
    fn from(p: PerformanceSnapshot) -> Self {
        (p.t(), p.wpm)
    }
}
