use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Unified event type consumed by the stopwatch loop
#[derive(Clone, Debug)]
pub enum StopwatchEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<StopwatchEvent, RecvTimeoutError>;
}

/// Production event source reading from the terminal via crossterm
pub struct CrosstermEventSource {
    rx: Receiver<StopwatchEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => tx.send(StopwatchEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => tx.send(StopwatchEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<StopwatchEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Event source fed from a channel, for headless runs and tests
pub struct ChannelEventSource {
    rx: Receiver<StopwatchEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<StopwatchEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<StopwatchEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Advances one event or tick at a time
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

    /// Blocks up to one tick interval; yields Tick on timeout
    pub fn step(&self) -> StopwatchEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => StopwatchEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(self.ticker.interval());
                StopwatchEvent::Tick
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopwatchState {
    Ready,
    Running { started: Instant },
    Stopped { elapsed: Duration },
    Cancelled,
}

/// Times a single breathing phase: the first start key begins timing, the
/// next one stops it. Esc, `q` or Ctrl-C cancel.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    state: StopwatchState,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            state: StopwatchState::Ready,
        }
    }

    pub fn state(&self) -> StopwatchState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            StopwatchState::Stopped { .. } | StopwatchState::Cancelled
        )
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.state {
            StopwatchState::Ready | StopwatchState::Cancelled => Duration::ZERO,
            StopwatchState::Running { started } => now.saturating_duration_since(started),
            StopwatchState::Stopped { elapsed } => elapsed,
        }
    }

    /// The measured duration, once stopped
    pub fn result(&self) -> Option<Duration> {
        match self.state {
            StopwatchState::Stopped { elapsed } => Some(elapsed),
            _ => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press || self.is_finished() {
            return;
        }

        let cancel = matches!(key.code, KeyCode::Esc | KeyCode::Char('q'))
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'));
        if cancel {
            self.state = StopwatchState::Cancelled;
            return;
        }

        if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
            self.state = match self.state {
                StopwatchState::Ready => StopwatchState::Running { started: now },
                StopwatchState::Running { started } => StopwatchState::Stopped {
                    elapsed: now.saturating_duration_since(started),
                },
                other => other,
            };
        }
    }
}

/// Drive a stopwatch until it is stopped or cancelled. `on_update` is called
/// after every event with the current stopwatch and elapsed time.
pub fn run<E, T, F>(runner: &Runner<E, T>, mut on_update: F) -> Option<Duration>
where
    E: EventSource,
    T: Ticker,
    F: FnMut(&Stopwatch, Duration),
{
    let mut stopwatch = Stopwatch::new();

    while !stopwatch.is_finished() {
        let event = runner.step();
        let now = Instant::now();
        if let StopwatchEvent::Key(key) = event {
            stopwatch.handle_key(key, now);
        }
        on_update(&stopwatch, stopwatch.elapsed(now));
    }

    stopwatch.result()
}
