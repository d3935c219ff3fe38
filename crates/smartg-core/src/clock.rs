use std::cell::Cell;

use chrono::{DateTime, Duration, Local};

/// Wall-clock seam so ticks can be stepped deterministically.
pub trait Clock: Send {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Returns `start`, then advances by `step` on every call.
#[derive(Debug)]
pub struct SteppingClock {
    next: Cell<DateTime<Local>>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: DateTime<Local>, step: Duration) -> Self {
        Self { next: Cell::new(start), step }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Local> {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}
