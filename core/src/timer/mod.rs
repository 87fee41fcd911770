//! Stopwatch / countdown state machine
//!
//! ```text
//!   Idle ──start──► Running ──stop──► Idle
//!     │                ▲
//!     └──countdown─────┘   (start instant in the future: CountingDown)
//! ```
//!
//! The engine only does arithmetic on epoch milliseconds handed to it; the
//! controller owns the clock and the display loop.

mod clock;

pub use clock::{Clock, SystemClock};

use actnotes_types::formatting::format_timer;

/// Default lead time of a countdown, just under five seconds
pub const COUNTDOWN_LEAD_MS: i64 = 4_999;

/// `start_epoch_ms == 0` means not started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerState {
    pub start_epoch_ms: i64,
    pub running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    Idle,
    Running,
    /// Running, but the start instant has not been reached yet
    CountingDown,
}

#[derive(Debug, Clone)]
pub struct TimerEngine {
    state: TimerState,
    countdown_lead_ms: i64,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(COUNTDOWN_LEAD_MS)
    }
}

impl TimerEngine {
    pub fn new(countdown_lead_ms: i64) -> Self {
        Self {
            state: TimerState::default(),
            countdown_lead_ms,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Start, or resume without moving the start instant
    pub fn start(&mut self, now_ms: i64) {
        if self.state.start_epoch_ms == 0 {
            self.state.start_epoch_ms = now_ms;
        }
        self.state.running = true;
    }

    pub fn stop(&mut self) {
        self.state = TimerState::default();
    }

    /// Run with the start instant `countdown_lead_ms` in the future
    pub fn countdown(&mut self, now_ms: i64) {
        self.state.start_epoch_ms = now_ms + self.countdown_lead_ms;
        self.state.running = true;
    }

    pub fn mode(&self, now_ms: i64) -> TimerMode {
        if !self.state.running {
            TimerMode::Idle
        } else if now_ms < self.state.start_epoch_ms {
            TimerMode::CountingDown
        } else {
            TimerMode::Running
        }
    }

    /// Milliseconds since the start instant; negative while counting down.
    /// `None` when idle.
    pub fn elapsed(&self, now_ms: i64) -> Option<i64> {
        self.state
            .running
            .then(|| now_ms - self.state.start_epoch_ms)
    }

    /// Display text at `now_ms`. Idle shows zero.
    pub fn display(&self, now_ms: i64) -> String {
        format_timer(self.elapsed(now_ms).unwrap_or(0))
    }
}
