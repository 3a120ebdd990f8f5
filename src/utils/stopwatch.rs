use crate::utils::Clock;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Accumulates elapsed time across start/stop intervals.
///
/// Only the accumulated total is serialized; a running interval is not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StopWatch {
    elapsed: Duration,
    #[serde(skip)]
    started_at: Option<Duration>,
}

impl StopWatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_elapsed(elapsed: Duration) -> Self {
        Self {
            elapsed,
            started_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn start(&mut self, clock: &dyn Clock) {
        if self.started_at.is_none() {
            self.started_at = Some(clock.now());
        }
    }

    pub fn stop(&mut self, clock: &dyn Clock) {
        if let Some(start) = self.started_at.take() {
            self.elapsed += clock.now().saturating_sub(start);
        }
    }

    /// Total time, including the interval in progress.
    pub fn elapsed(&self, clock: &dyn Clock) -> Duration {
        match self.started_at {
            Some(start) => self.elapsed + clock.now().saturating_sub(start),
            None => self.elapsed,
        }
    }

    /// Total of the finished intervals only.
    pub fn recorded(&self) -> Duration {
        self.elapsed
    }

    pub fn add(&mut self, duration: Duration) {
        self.elapsed += duration;
    }

    /// Drops the recorded total but keeps a running interval going.
    pub fn reset_elapsed(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.started_at = None;
    }
}
