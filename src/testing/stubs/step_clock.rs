use crate::utils::Clock;
use std::cell::Cell;
use std::time::Duration;

/// A clock that moves forward by a fixed step every time it is read.
#[derive(Debug, Clone)]
pub struct StepClock {
    step: Duration,
    now: Cell<Duration>,
}

impl StepClock {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            now: Cell::new(Duration::ZERO),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> Duration {
        let now = self.now.get() + self.step;
        self.now.set(now);
        now
    }
}
