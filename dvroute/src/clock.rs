use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::framework::Clock;

/// Wall clock, measured from the moment it was created
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// A clock that only moves when told to. Clones share the same time, so one handle can drive every router in a simulation.
#[derive(Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.time.set(self.time.get() + by);
    }

    /// time never moves backwards, earlier values are ignored
    pub fn set(&self, to: Duration) {
        if to > self.time.get() {
            self.time.set(to);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.time.get()
    }
}
