//! Auto-refresh deadline, polled by the UI loop.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RefreshTimer {
    period: Duration,
    next_due: Instant,
}

impl RefreshTimer {
    pub fn start(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: now + period,
        }
    }

    pub fn from_minutes(minutes: u32, now: Instant) -> Self {
        Self::start(Duration::from_secs(u64::from(minutes) * 60), now)
    }

    /// Change the period and count it from `now`
    pub fn restart(&mut self, period: Duration, now: Instant) {
        self.period = period;
        self.next_due = now + period;
    }

    /// True once per elapsed period; the next deadline is counted from `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.period;
        true
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }
}
