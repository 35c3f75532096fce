//! The session state machine: `Idle -> Running -> Terminal`, plus restart.
//!
//! A [`TypingSession`] exclusively owns its plan and [`SessionState`]. Every
//! operation is synchronous and total: an operation requested in the wrong
//! phase is a no-op that returns `false`, never an error.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::mem;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::comparator::{classify, is_token_correct, CharClassification};
use crate::error::Result;
use crate::language::{ContentProvider, Token};
use crate::session::{Phase, SessionConfig, SessionState};
use crate::stats::{compute_stats_with_series, instantaneous_wpm, percentage, TypingStats, WordHistoryEntry};
use crate::time_series::PerformanceSnapshot;

/// What a renderer needs on every frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub current_index: usize,
    pub current_input: String,
    pub is_running: bool,
    pub phase: Phase,
}

#[derive(Debug)]
pub struct TypingSession {
    config: SessionConfig,
    provider: ContentProvider,
    rng: StdRng,
    clock: Box<dyn Clock>,
    plan: Vec<Token>,
    state: SessionState,
}

impl TypingSession {
    /// Session over the built-in corpora, seeded from OS entropy, on the system clock.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let provider = ContentProvider::builtin()?;
        Ok(Self::from_parts(
            config,
            provider,
            StdRng::from_entropy(),
            Box::new(SystemClock::new()),
        ))
    }

    /// Like [`TypingSession::new`] but with a reproducible plan sequence.
    pub fn with_seed(config: SessionConfig, seed: u64) -> Result<Self> {
        let provider = ContentProvider::builtin()?;
        Ok(Self::from_parts(
            config,
            provider,
            StdRng::seed_from_u64(seed),
            Box::new(SystemClock::new()),
        ))
    }

    pub fn from_parts(
        config: SessionConfig,
        provider: ContentProvider,
        mut rng: StdRng,
        clock: Box<dyn Clock>,
    ) -> Self {
        let plan = provider.generate(
            &config.word_mode,
            config.word_length,
            config.language,
            &mut rng,
        );
        Self {
            config,
            provider,
            rng,
            clock,
            plan,
            state: SessionState::default(),
        }
    }

    /// Swap the time source. Only meaningful before `start()`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn plan(&self) -> &[Token] {
        &self.plan
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.state.phase == Phase::Terminal
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn current_input(&self) -> &str {
        &self.state.current_input
    }

    pub fn history(&self) -> &[WordHistoryEntry] {
        &self.state.history
    }

    /// The token being typed, if the plan is not exhausted.
    pub fn current_token(&self) -> Option<&Token> {
        self.plan.get(self.state.current_index)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            current_index: self.state.current_index,
            current_input: self.state.current_input.clone(),
            is_running: self.state.is_running(),
            phase: self.state.phase,
        }
    }

    /// Live classification of the active token against the buffer.
    pub fn current_classification(&self) -> Vec<CharClassification> {
        self.current_token()
            .map(|token| classify(token.text(), &self.state.current_input))
            .unwrap_or_default()
    }

    /// Time since `start()`; frozen once the session is terminal.
    pub fn elapsed(&self) -> Duration {
        match (self.state.started_at, self.state.ended_at) {
            (Some(started), Some(ended)) => ended.saturating_sub(started),
            (Some(started), None) => self.clock.now().saturating_sub(started),
            _ => Duration::ZERO,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Seconds left according to the last timer tick.
    pub fn seconds_remaining(&self) -> f64 {
        (self.config.mode.duration_secs() as f64 - self.state.timer_elapsed_secs).max(0.0)
    }

    pub fn stats(&self) -> TypingStats {
        compute_stats_with_series(
            &self.state.history,
            &self.state.snapshots,
            self.elapsed_secs(),
        )
    }

    /// `Idle -> Running`. An empty plan goes straight to `Terminal`.
    pub fn start(&mut self) -> bool {
        if self.state.phase != Phase::Idle {
            return false;
        }
        self.state.started_at = Some(self.clock.now());
        self.state.phase = Phase::Running;
        tracing::info!(
            mode = %self.config.mode,
            word_mode = %self.config.word_mode,
            tokens = self.plan.len(),
            "session started"
        );

        if self.plan.is_empty() {
            self.finish("empty plan");
        } else {
            self.seed_indentation();
        }
        true
    }

    /// Replace the active buffer verbatim. Classification happens on read.
    pub fn update_input(&mut self, buffer: &str) -> bool {
        if self.state.phase != Phase::Running {
            tracing::debug!(phase = %self.state.phase, "input ignored");
            return false;
        }
        buffer.clone_into(&mut self.state.current_input);
        true
    }

    /// Record the active buffer as the attempt at the current token and advance.
    pub fn commit_current_token(&mut self) -> bool {
        if self.state.phase != Phase::Running {
            tracing::debug!(phase = %self.state.phase, "commit ignored");
            return false;
        }
        let Some(token) = self.plan.get(self.state.current_index) else {
            return false;
        };

        let time_ms = self.elapsed().as_millis() as u64;
        let previous_ms = self.state.history.last().map_or(0, |entry| entry.time_ms);
        let typed = mem::take(&mut self.state.current_input);
        let correct = is_token_correct(token.text(), &typed);
        let wpm = instantaneous_wpm(previous_ms, time_ms);

        tracing::debug!(
            index = self.state.current_index,
            token = token.text(),
            typed = %typed,
            correct,
            time_ms,
            "token committed"
        );

        self.state.history.push(WordHistoryEntry {
            token: token.text().to_string(),
            typed,
            correct,
            time_ms,
            wpm,
        });
        let correct_words = self.state.history.iter().filter(|e| e.correct).count();
        self.state.snapshots.push(PerformanceSnapshot::new(
            time_ms,
            wpm,
            percentage(correct_words, self.state.history.len()),
        ));
        self.state.current_index += 1;

        if self.state.current_index == self.plan.len() {
            self.finish("plan exhausted");
        } else {
            self.seed_indentation();
        }
        true
    }

    /// External timer cadence. Expires the session once the mode's duration
    /// has been reached.
    pub fn on_timer_tick(&mut self, elapsed_secs: f64) -> bool {
        if self.state.phase != Phase::Running {
            return false;
        }
        self.state.timer_elapsed_secs = elapsed_secs.max(0.0);
        if self.seconds_remaining() <= 0.0 {
            self.expire();
        }
        true
    }

    /// Time is up. The partially typed token is left uncommitted.
    pub fn expire(&mut self) -> bool {
        if self.state.phase != Phase::Running {
            return false;
        }
        self.finish("timer expired");
        true
    }

    /// Discard all state and draw a fresh plan. Allowed in every phase.
    pub fn restart(&mut self) {
        let plan = self.provider.generate(
            &self.config.word_mode,
            self.config.word_length,
            self.config.language,
            &mut self.rng,
        );
        tracing::debug!(from = %self.state.phase, tokens = plan.len(), "session restarted");
        self.plan = plan;
        self.state = SessionState::default();
    }

    /// Restart with different settings.
    pub fn reconfigure(&mut self, config: SessionConfig) {
        self.config = config;
        self.restart();
    }

    fn finish(&mut self, reason: &str) {
        self.state.ended_at = Some(self.clock.now());
        self.state.phase = Phase::Terminal;
        tracing::info!(
            reason,
            committed = self.state.history.len(),
            elapsed_secs = self.elapsed_secs(),
            "session finished"
        );
    }

    /// Lines begin with their indentation already in the buffer.
    fn seed_indentation(&mut self) {
        self.state.current_input = self
            .current_token()
            .map(|token| token.indentation().to_string())
            .unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::comparator::CharClass;
    use crate::language::{Corpus, TokenKind};
    use crate::session::{Language, TestMode, WordLength, WordMode};
    use assert_matches::assert_matches;

    fn words_session(clock: &ManualClock) -> TypingSession {
        let config = SessionConfig::new(
            TestMode::Thirty,
            WordMode::Normal,
            WordLength::Short,
            Language::English,
        );
        TypingSession::with_seed(config, 1).unwrap().with_clock(clock.clone())
    }

    fn code_session(clock: &ManualClock) -> TypingSession {
        let config = SessionConfig::new(
            TestMode::Sixty,
            WordMode::code("python"),
            WordLength::Mixed,
            Language::English,
        );
        TypingSession::with_seed(config, 2).unwrap().with_clock(clock.clone())
    }

    fn type_current(session: &mut TypingSession) {
        let target = session.current_token().unwrap().text().to_string();
        session.update_input(&target);
        session.commit_current_token();
    }

    #[test]
    fn test_new_session_is_idle() {
        let clock = ManualClock::new();
        let session = words_session(&clock);

        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.plan().len(), 10);
        assert_eq!(session.elapsed_secs(), 0.0);
        assert_eq!(
            session.view(),
            SessionView {
                current_index: 0,
                current_input: String::new(),
                is_running: false,
                phase: Phase::Idle,
            }
        );
    }

    #[test]
    fn test_update_input_before_start_is_ignored() {
        let clock = ManualClock::new();
        let mut session = words_session(&clock);
        let before = session.state().clone();

        assert!(!session.update_input("the"));
        assert!(!session.commit_current_token());
        assert!(!session.expire());
        assert!(!session.on_timer_tick(5.0));
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn test_start_only_from_idle() {
        let clock = ManualClock::new();
        let mut session = words_session(&clock);

        assert!(session.start());
        assert_eq!(session.phase(), Phase::Running);
        assert!(!session.start());
    }

    #[test]
    fn test_update_input_replaces_buffer_verbatim() {
        let clock = ManualClock::new();
        let mut session = words_session(&clock);
        session.start();

        session.update_input("th");
        session.update_input("t");
        assert_eq!(session.current_input(), "t");
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_commits_keep_history_in_step_with_index() {
        let clock = ManualClock::new();
        let mut session = words_session(&clock);
        session.start();

        for n in 1..=4 {
            clock.advance(Duration::from_millis(500));
            type_current(&mut session);
            assert_eq!(session.history().len(), n);
            assert_eq!(session.current_index(), n);
            assert!(session.current_input().is_empty());
        }

        let first = session.history()[0].clone();
        type_current(&mut session);
        assert_eq!(session.history()[0], first);
        assert_eq!(session.state().snapshots.len(), 5);
    }

    #[test]
    fn test_commit_records_time_pace_and_correctness() {
        let clock = ManualClock::new();
        let mut session = words_session(&clock);
        session.start();

        clock.advance(Duration::from_millis(1_000));
        type_current(&mut session);

        clock.advance(Duration::from_millis(500));
        session.update_input("zzz");
        session.commit_current_token();

        let history = session.history();
        assert!(history[0].correct);
        assert_eq!(history[0].time_ms, 1_000);
        assert_eq!(history[0].wpm, 60.0);
        assert!(!history[1].correct);
        assert_eq!(history[1].typed, "zzz");
        assert_eq!(history[1].time_ms, 1_500);
        assert_eq!(history[1].wpm, 120.0);

        let snapshots = &session.state().snapshots;
        assert_eq!(snapshots[0].accuracy, 100.0);
        assert_eq!(snapshots[1].accuracy, 50.0);
    }

    #[test]
    fn test_exhausting_plan_terminates() {
        let clock = ManualClock::new();
        let mut session = words_session(&clock);
        session.start();

        while !session.is_terminal() {
            clock.advance(Duration::from_millis(250));
            type_current(&mut session);
        }

        assert_eq!(session.current_index(), session.plan().len());
        assert_eq!(session.history().len(), session.plan().len());
        assert!(session.current_token().is_none());
        assert!(!session.update_input("more"));
        assert!(!session.commit_current_token());

        let stats = session.stats();
        assert_eq!(stats.accuracy, 100.0);
        assert_eq!(stats.elapsed_seconds, 2.5);
        assert_eq!(stats.wpm, 240.0);
    }

    #[test]
    fn test_expiry_does_not_commit_partial_token() {
        let clock = ManualClock::new();
        let mut session = words_session(&clock);
        session.start();

        clock.advance(Duration::from_secs(2));
        type_current(&mut session);
        session.update_input("hal");
        assert!(session.expire());

        assert_eq!(session.phase(), Phase::Terminal);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.current_index(), 1);

        let before = session.state().clone();
        assert!(!session.update_input("half"));
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn test_elapsed_freezes_when_terminal() {
        let clock = ManualClock::new();
        let mut session = words_session(&clock);
        session.start();
        clock.advance(Duration::from_secs(3));
        session.expire();
        clock.advance(Duration::from_secs(30));

        assert_eq!(session.elapsed_secs(), 3.0);
        assert_eq!(session.stats().elapsed_seconds, 3.0);
    }

    #[test]
    fn test_timer_tick_expires_at_duration() {
        let clock = ManualClock::new();
        let mut session = words_session(&clock);
        session.start();

        assert!(session.on_timer_tick(29.0));
        assert_eq!(session.seconds_remaining(), 1.0);
        assert_eq!(session.phase(), Phase::Running);

        session.on_timer_tick(30.0);
        assert_eq!(session.phase(), Phase::Terminal);
        assert_eq!(session.seconds_remaining(), 0.0);
    }

    #[test]
    fn test_stats_mid_session() {
        let clock = ManualClock::new();
        let mut session = words_session(&clock);
        session.start();
        clock.advance(Duration::from_secs(15));
        type_current(&mut session);
        clock.advance(Duration::from_secs(15));

        let stats = session.stats();
        assert_eq!(stats.elapsed_seconds, 30.0);
        assert_eq!(stats.wpm, 2.0);
        assert_eq!(stats.history.len(), 1);
        assert_eq!(stats.performance_data.len(), 1);
    }

    #[test]
    fn test_restart_from_any_phase() {
        let clock = ManualClock::new();
        let mut session = words_session(&clock);

        session.restart();
        assert_eq!(session.phase(), Phase::Idle);

        session.start();
        clock.advance(Duration::from_secs(1));
        type_current(&mut session);
        session.restart();
        assert_eq!(session.state(), &SessionState::default());
        assert_eq!(session.plan().len(), 10);

        session.start();
        session.expire();
        session.restart();
        session.restart();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.history().is_empty());
        assert!(session.start());
    }

    #[test]
    fn test_restart_draws_a_fresh_plan() {
        let clock = ManualClock::new();
        let mut session = words_session(&clock);
        let mut plans = vec![session.plan().to_vec()];
        for _ in 0..5 {
            session.restart();
            plans.push(session.plan().to_vec());
        }
        plans.dedup();
        assert!(plans.len() > 1);
    }

    #[test]
    fn test_code_mode_seeds_indentation() {
        let clock = ManualClock::new();
        let mut session = code_session(&clock);
        session.start();

        loop {
            let token = session.current_token().unwrap().clone();
            assert_eq!(token.kind(), TokenKind::Line);
            assert_eq!(session.current_input(), token.indentation());

            let body = token.text().trim_start();
            let mut typed = session.current_input().to_string();
            typed.push_str(body);
            session.update_input(&typed);
            session.commit_current_token();

            if session.is_terminal() {
                break;
            }
        }
        assert!(session.history().iter().all(|e| e.correct));
    }

    #[test]
    fn test_pre_seeded_indentation_counts_as_typed() {
        let clock = ManualClock::new();
        let mut session = code_session(&clock);
        session.start();
        while session.current_token().unwrap().indent_depth() == 0 {
            type_current(&mut session);
        }
        let token = session.current_token().unwrap().clone();
        let typed = format!("{}{}", session.current_input(), token.text().trim_start());
        session.update_input(&typed);
        session.commit_current_token();

        let entry = session.history().last().unwrap();
        assert!(entry.correct);
        assert_eq!(entry.typed_len(), token.char_len());
        assert_eq!(session.stats().correct_chars, session.history().iter().map(|e| e.typed_len()).sum::<usize>());
    }

    #[test]
    fn test_current_classification() {
        let clock = ManualClock::new();
        let mut session = words_session(&clock);
        session.start();
        let target = session.current_token().unwrap().text().to_string();

        session.update_input(&format!("{target}!"));
        let classes = session.current_classification();
        assert_eq!(classes.len(), target.chars().count() + 1);
        assert_matches!(classes.last().map(|c| c.class), Some(CharClass::Extra));
    }

    #[test]
    fn test_empty_plan_terminates_on_start() {
        let clock = ManualClock::new();
        let config = SessionConfig::new(
            TestMode::Fifteen,
            WordMode::code("cobol"),
            WordLength::Mixed,
            Language::English,
        );
        let mut session = TypingSession::with_seed(config, 0).unwrap().with_clock(clock.clone());

        assert!(session.plan().is_empty());
        assert!(session.start());
        assert_eq!(session.phase(), Phase::Terminal);
        assert!(!session.commit_current_token());
        assert_eq!(session.stats().consistency, 100.0);
    }

    #[test]
    fn test_reconfigure_switches_plan_shape() {
        let clock = ManualClock::new();
        let mut session = words_session(&clock);
        session.reconfigure(SessionConfig::new(
            TestMode::Sixty,
            WordMode::code("java"),
            WordLength::Mixed,
            Language::English,
        ));
        assert!(session.plan().iter().all(|t| t.kind() == TokenKind::Line));
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn test_from_parts_with_custom_corpus() {
        let corpus = Corpus::from_json(
            r#"{ "default": "english", "languages": { "english": { "short": ["a"], "medium": [], "long": [] } } }"#,
            "{}",
        )
        .unwrap();
        let clock = ManualClock::new();
        let mut session = TypingSession::from_parts(
            SessionConfig::default(),
            ContentProvider::new(corpus),
            StdRng::seed_from_u64(0),
            Box::new(clock.clone()),
        );
        session.start();
        clock.advance(Duration::from_secs(6));
        session.update_input("a");
        session.commit_current_token();

        assert!(session.is_terminal());
        assert_eq!(session.stats().wpm, 10.0);
    }
}
