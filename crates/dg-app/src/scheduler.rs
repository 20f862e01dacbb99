//! Tick and jog-repeat scheduling decisions.
//!
//! `TickScheduler` owns the two deadlines of a live session and decides what
//! is due at a given instant. It holds no simulation state and never sleeps,
//! so it can be driven by an injected clock.

use std::time::{Duration, Instant};

use dg_controls::{JogConfig, JogDirection};
use tracing::{debug, info};

use crate::timer::PeriodicTimer;

/// Work due at a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    /// Advance the simulation one tick.
    Tick,
    /// Apply one hold-repeat jog step.
    JogRepeat(JogDirection),
}

#[derive(Debug, Clone)]
pub struct TickScheduler {
    tick: PeriodicTimer,
    jog: PeriodicTimer,
    held: Option<JogDirection>,
}

impl TickScheduler {
    pub fn new(tick_period_ms: u64, jog: &JogConfig) -> Self {
        Self {
            tick: PeriodicTimer::new(Duration::from_millis(tick_period_ms)),
            jog: PeriodicTimer::new(Duration::from_millis(jog.repeat_interval_ms)),
            held: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.tick.is_armed()
    }

    /// Start ticking. Idempotent: a running scheduler keeps its deadline.
    pub fn start(&mut self, now: Instant) -> bool {
        let started = self.tick.arm(now);
        if started {
            info!(period_ms = self.tick.period().as_millis() as u64, "tick scheduler started");
        } else {
            debug!("start ignored, scheduler already running");
        }
        started
    }

    /// Cancel the tick deadline. Nothing ticks after this returns.
    pub fn stop(&mut self) -> bool {
        let stopped = self.tick.disarm();
        if stopped {
            info!("tick scheduler stopped");
        }
        stopped
    }

    /// Replace the tick period; a running timer is rescheduled from `now`.
    pub fn set_tick_period(&mut self, period_ms: u64, now: Instant) {
        self.tick.set_period(Duration::from_millis(period_ms), now);
        info!(period_ms, running = self.is_running(), "tick period changed");
    }

    /// Begin a jog hold. The caller applies the press step itself; repeats
    /// start one interval later. Independent of the tick timer.
    pub fn press_jog(&mut self, direction: JogDirection, now: Instant) {
        if self.held != Some(direction) {
            self.jog.disarm();
        }
        self.held = Some(direction);
        self.jog.arm(now);
    }

    /// End the jog hold, if any.
    pub fn release_jog(&mut self) {
        if self.held.take().is_some() {
            self.jog.disarm();
            debug!("jog released");
        }
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.tick.next_due(), self.jog.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Time left until the earliest deadline, `None` when idle.
    pub fn timeout(&self, now: Instant) -> Option<Duration> {
        self.next_deadline().map(|due| due.saturating_duration_since(now))
    }

    /// Collect the actions due at `now`. Jog repeats are reported before the
    /// tick so a tick observes the latest manual target.
    pub fn poll(&mut self, now: Instant) -> Vec<ScheduledAction> {
        let mut due = Vec::new();
        if let Some(direction) = self.held {
            if self.jog.fire(now) {
                due.push(ScheduledAction::JogRepeat(direction));
            }
        }
        if self.tick.fire(now) {
            due.push(ScheduledAction::Tick);
        }
        due
    }
}
