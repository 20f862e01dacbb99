//! Deadline-based periodic timer.
//!
//! The timer never sleeps. Its owner asks when it is next due, waits by
//! whatever means it has, and then polls it with the current instant.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicTimer {
    period: Duration,
    /// Next firing instant; `None` while disarmed
    next_due: Option<Instant>,
}

impl PeriodicTimer {
    /// Disarmed timer with the given period. A zero period is raised to 1 ms.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Arm the timer one period from `now`. Returns `false` and leaves the
    /// schedule untouched if it is already armed.
    pub fn arm(&mut self, now: Instant) -> bool {
        if self.next_due.is_some() {
            return false;
        }
        self.next_due = Some(now + self.period);
        true
    }

    /// Disarm. Returns whether the timer was armed.
    pub fn disarm(&mut self) -> bool {
        self.next_due.take().is_some()
    }

    /// Change the period. An armed timer is rescheduled one new period from
    /// `now`.
    pub fn set_period(&mut self, period: Duration, now: Instant) {
        self.period = period.max(Duration::from_millis(1));
        if self.next_due.is_some() {
            self.next_due = Some(now + self.period);
        }
    }

    /// Consume one firing if the timer is due at `now`.
    ///
    /// The next deadline advances by one period. If the owner fell more than
    /// a period behind, the schedule restarts from `now` instead of
    /// replaying missed firings.
    pub fn fire(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        let next = due + self.period;
        self.next_due = Some(if next <= now { now + self.period } else { next });
        true
    }

    /// Time left until the next firing, zero if overdue.
    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn fires_once_per_period() {
        let t0 = Instant::now();
        let mut timer = PeriodicTimer::new(100 * MS);
        assert!(!timer.fire(t0 + 500 * MS));

        assert!(timer.arm(t0));
        assert!(!timer.fire(t0 + 99 * MS));
        assert!(timer.fire(t0 + 100 * MS));
        assert!(!timer.fire(t0 + 150 * MS));
        assert!(timer.fire(t0 + 200 * MS));
        assert_eq!(timer.next_due(), Some(t0 + 300 * MS));
    }

    #[test]
    fn arm_is_idempotent() {
        let t0 = Instant::now();
        let mut timer = PeriodicTimer::new(100 * MS);
        assert!(timer.arm(t0));
        assert!(!timer.arm(t0 + 50 * MS));
        assert_eq!(timer.next_due(), Some(t0 + 100 * MS));
    }

    #[test]
    fn late_poll_does_not_burst() {
        let t0 = Instant::now();
        let mut timer = PeriodicTimer::new(100 * MS);
        timer.arm(t0);
        assert!(timer.fire(t0 + 1000 * MS));
        assert!(!timer.fire(t0 + 1000 * MS));
        assert_eq!(timer.next_due(), Some(t0 + 1100 * MS));
    }

    #[test]
    fn reschedule_uses_new_period() {
        let t0 = Instant::now();
        let mut timer = PeriodicTimer::new(1000 * MS);
        timer.arm(t0);
        timer.set_period(200 * MS, t0 + 300 * MS);
        assert_eq!(timer.next_due(), Some(t0 + 500 * MS));
        assert_eq!(timer.time_until(t0 + 450 * MS), Some(50 * MS));

        timer.disarm();
        timer.set_period(300 * MS, t0);
        assert!(!timer.is_armed());
    }
}
