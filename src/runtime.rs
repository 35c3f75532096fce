use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::engine::TypingSession;
use crate::typing_policy::apply_input_change;
use crate::TICK_RATE_MS;

/// Inbound events from the presentation layer and the timer.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// The full, current contents of the input buffer.
    InputChange(String),
    Commit,
    Tick,
    Expire,
    /// The restart shortcut (tab+enter); accepted in every phase.
    Restart,
}

/// Source of session events.
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError>;
}

/// Events pushed through an mpsc channel, from another thread or a test.
pub struct ChannelEventSource {
    rx: Receiver<SessionEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<SessionEvent>) -> Self {
        Self { rx }
    }

    pub fn channel() -> (Sender<SessionEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_RATE_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to one tick interval. Yields the next event, `Tick` on
    /// timeout, or `None` once every sender is gone.
    pub fn step(&self) -> Option<SessionEvent> {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) => Some(SessionEvent::Tick),
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Route one event to the matching session operation. Returns whether the
/// session changed.
pub fn dispatch(session: &mut TypingSession, event: SessionEvent) -> bool {
    match event {
        SessionEvent::InputChange(buffer) => apply_input_change(session, &buffer),
        SessionEvent::Commit => session.commit_current_token(),
        SessionEvent::Tick => {
            let elapsed = session.elapsed_secs();
            session.on_timer_tick(elapsed)
        }
        SessionEvent::Expire => session.expire(),
        SessionEvent::Restart => {
            session.restart();
            true
        }
    }
}
