// Library surface: the typing-test engine. The binary in main.rs is a thin
// line-oriented driver over it.
pub mod app_dirs;
pub mod bot;
pub mod clock;
pub mod comparator;
pub mod config;
pub mod engine;
pub mod error;
pub mod language;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod time_series;
pub mod typing_policy;
pub mod util;

pub use engine::{SessionView, TypingSession};
pub use error::{Error, Result};
pub use session::{Language, Phase, SessionConfig, TestMode, WordLength, WordMode};
pub use stats::{compute_stats, TypingStats, WordHistoryEntry};

/// Timer cadence in milliseconds.
pub const TICK_RATE_MS: u64 = 1000;
