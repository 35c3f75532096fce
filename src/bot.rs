//! Simulated typist for `bot` mode.
//!
//! The bot drives a [`TypingSession`] through the same controlled-input path a
//! human goes through, moving a [`ManualClock`] forward by its own pace instead
//! of waiting on wall time.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::clock::ManualClock;
use crate::engine::TypingSession;
use crate::stats::TypingStats;
use crate::typing_policy::apply_input_change;

/// Shortest time the bot spends on one token.
const MIN_TOKEN_SECS: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Target words per minute.
    pub speed: f64,
    /// Percentage of characters typed correctly.
    pub accuracy: f64,
    /// Percentage of pace uniformity; 100 types every token at the same pace.
    pub consistency: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            speed: 60.0,
            accuracy: 95.0,
            consistency: 90.0,
        }
    }
}

impl BotConfig {
    /// Probability that any single non-whitespace character is mistyped.
    pub fn error_rate(&self) -> f64 {
        shortfall(self.accuracy)
    }

    /// Fraction of the base interval the pace may drift by, either way.
    pub fn jitter(&self) -> f64 {
        shortfall(self.consistency)
    }

    /// Seconds per token at the target speed.
    pub fn base_interval_secs(&self) -> f64 {
        if self.speed.is_finite() {
            60.0 / self.speed.max(1.0)
        } else {
            60.0
        }
    }
}

/// `(100 - percent) / 100` in `[0, 1]`; a non-finite percent counts as 100.
fn shortfall(percent: f64) -> f64 {
    if percent.is_finite() {
        ((100.0 - percent) / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Bot {
    config: BotConfig,
}

impl Bot {
    pub fn new(config: BotConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Type the session's plan until it is exhausted or time runs out.
    ///
    /// `clock` must be the clock `session` was built with. Each token is
    /// typed, the clock advanced by one paced interval, the timer ticked, and
    /// only then is the separator pressed, so nothing is committed after
    /// expiry.
    pub fn play<R: Rng + ?Sized>(
        &self,
        session: &mut TypingSession,
        clock: &ManualClock,
        rng: &mut R,
    ) -> TypingStats {
        tracing::debug!(
            speed = self.config.speed,
            accuracy = self.config.accuracy,
            consistency = self.config.consistency,
            "bot started"
        );

        while !session.is_terminal() {
            let Some(token) = session.current_token() else {
                break;
            };
            let separator = token.kind().separator();
            let typed = self.mistype(token.text(), rng);

            if !apply_input_change(session, &typed) {
                break;
            }
            clock.advance(Duration::from_secs_f64(self.next_interval(rng)));
            let elapsed = session.elapsed_secs();
            session.on_timer_tick(elapsed);
            if session.is_terminal() {
                break;
            }
            apply_input_change(session, &format!("{typed}{separator}"));
        }

        let stats = session.stats();
        tracing::debug!(wpm = stats.wpm, accuracy = stats.accuracy, "bot finished");
        stats
    }

    fn next_interval<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let base = self.config.base_interval_secs();
        let drift = base * self.config.jitter() * rng.gen_range(-1.0..=1.0);
        (base + drift).max(MIN_TOKEN_SECS)
    }

    fn mistype<R: Rng + ?Sized>(&self, target: &str, rng: &mut R) -> String {
        let error_rate = self.config.error_rate();
        target
            .chars()
            .map(|c| {
                if !c.is_whitespace() && rng.gen_bool(error_rate) {
                    wrong_char(c, rng)
                } else {
                    c
                }
            })
            .collect()
    }
}

/// A lowercase letter guaranteed to differ from `c`.
fn wrong_char<R: Rng + ?Sized>(c: char, rng: &mut R) -> char {
    let pick = |i: u8| char::from(b'a' + i % 26);
    if c.is_ascii_lowercase() {
        let offset = rng.gen_range(1..26);
        pick(c as u8 - b'a' + offset)
    } else {
        pick(rng.gen_range(0..26))
    }
}
