//! ClockPoller: two-state machine driving alarm activation.
//!
//! The poller runs on a coarse fixed interval (1..=30s) and compares the
//! wall clock at minute granularity. Contract: an alarm fires at most once
//! per matched minute, never early, and never while another alarm is
//! ringing. Tolerating up to one interval of lateness is the price of
//! polling; it is robust to clock changes and sleep/wake.

use crate::alarm::Alarm;
use crate::registry::AlarmRegistry;
use crate::time::ClockTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Ringing,
}

#[derive(Debug, Clone)]
pub struct ClockPoller {
    state: PollerState,
}

impl Default for ClockPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPoller {
    pub fn new() -> Self {
        Self {
            state: PollerState::Idle,
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn is_ringing(&self) -> bool {
        self.state == PollerState::Ringing
    }

    /// One tick of the polling loop.
    ///
    /// While Idle: remove and return at most one due alarm, transitioning
    /// to Ringing. The removal is synchronous with the match: the caller
    /// receives an alarm that is already gone from the registry.
    /// While Ringing: a no-op regardless of what the registry holds.
    pub fn tick(&mut self, registry: &mut AlarmRegistry, now: ClockTime) -> Option<Alarm> {
        if self.state == PollerState::Ringing {
            return None;
        }
        let due = registry.take_due(now)?;
        self.state = PollerState::Ringing;
        Some(due)
    }

    /// The active session resolved (dismiss or snooze); matching resumes
    /// on the next tick.
    pub fn resolve(&mut self) {
        self.state = PollerState::Idle;
    }
}
