use serde::{Deserialize, Serialize};

use crate::time_series::PerformanceSnapshot;
use crate::util::coefficient_of_variation;

/// One committed attempt. `history[i]` is the attempt at plan token `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordHistoryEntry {
    pub token: String,
    pub typed: String,
    pub correct: bool,
    /// Milliseconds since the session started.
    pub time_ms: u64,
    /// Pace of this single attempt, see [`instantaneous_wpm`].
    pub wpm: f64,
}

impl WordHistoryEntry {
    pub fn typed_len(&self) -> usize {
        self.typed.chars().count()
    }
}

/// Derived session statistics. Always recomputed, never stored as ground truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypingStats {
    pub wpm: f64,
    pub raw_wpm: f64,
    pub accuracy: f64,
    /// Typed length of every correct entry.
    pub correct_chars: usize,
    /// Typed length of every incorrect entry, not just its wrong positions.
    pub incorrect_chars: usize,
    pub elapsed_seconds: f64,
    pub consistency: f64,
    pub history: Vec<WordHistoryEntry>,
    pub performance_data: Vec<PerformanceSnapshot>,
}

/// Words-per-minute pace of one attempt that took `now_ms - previous_ms`.
/// Zero when no time passed.
pub fn instantaneous_wpm(previous_ms: u64, now_ms: u64) -> f64 {
    match now_ms.saturating_sub(previous_ms) {
        0 => 0.0,
        interval => 60_000.0 / interval as f64,
    }
}

/// Percentage, or 0 when there is nothing to divide by.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Per-commit series rebuilt from history: each entry's pace plus the running
/// word accuracy at that commit.
pub fn performance_series(history: &[WordHistoryEntry]) -> Vec<PerformanceSnapshot> {
    history
        .iter()
        .scan(0usize, |correct, entry| {
            if entry.correct {
                *correct += 1;
            }
            Some(*correct)
        })
        .zip(history)
        .enumerate()
        .map(|(i, (correct, entry))| {
            PerformanceSnapshot::new(entry.time_ms, entry.wpm, percentage(correct, i + 1))
        })
        .collect()
}

/// Pace uniformity in `[0, 100]`, higher is steadier.
///
/// With `cv` the coefficient of variation of the snapshot WPM values, the score
/// is `100 * (1 - tanh(cv + cv^3/3 + cv^5/5))`. Fewer than two snapshots, or an
/// all-zero series, score 100.
pub fn consistency(snapshots: &[PerformanceSnapshot]) -> f64 {
    if snapshots.len() < 2 {
        return 100.0;
    }
    let wpms: Vec<f64> = snapshots.iter().map(|s| s.wpm).collect();
    match coefficient_of_variation(&wpms) {
        Some(cv) if cv.is_finite() => {
            let spread = cv + cv.powi(3) / 3.0 + cv.powi(5) / 5.0;
            (100.0 * (1.0 - spread.tanh())).clamp(0.0, 100.0)
        }
        _ => 100.0,
    }
}

/// Statistics for `history` after `elapsed_secs`, with the performance series
/// rebuilt from the history itself.
pub fn compute_stats(history: &[WordHistoryEntry], elapsed_secs: f64) -> TypingStats {
    let series = performance_series(history);
    compute_stats_with_series(history, &series, elapsed_secs)
}

/// Statistics for `history` using an already recorded snapshot series.
pub fn compute_stats_with_series(
    history: &[WordHistoryEntry],
    snapshots: &[PerformanceSnapshot],
    elapsed_secs: f64,
) -> TypingStats {
    let committed = history.len();
    let correct_words = history.iter().filter(|entry| entry.correct).count();

    let (correct_chars, incorrect_chars) =
        history
            .iter()
            .fold((0, 0), |(correct, incorrect), entry| {
                if entry.correct {
                    (correct + entry.typed_len(), incorrect)
                } else {
                    (correct, incorrect + entry.typed_len())
                }
            });

    let elapsed_secs = if elapsed_secs.is_finite() && elapsed_secs > 0.0 {
        elapsed_secs
    } else {
        0.0
    };
    let per_minute = |count: usize| {
        if elapsed_secs == 0.0 {
            0.0
        } else {
            count as f64 / (elapsed_secs / 60.0)
        }
    };

    TypingStats {
        wpm: per_minute(correct_words),
        raw_wpm: per_minute(committed),
        accuracy: percentage(correct_words, committed),
        correct_chars,
        incorrect_chars,
        elapsed_seconds: elapsed_secs,
        consistency: consistency(snapshots),
        history: history.to_vec(),
        performance_data: snapshots.to_vec(),
    }
}
