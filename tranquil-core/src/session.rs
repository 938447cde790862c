//! AlarmSession: lifecycle of the single currently-ringing alarm.
//!
//! States: None -> Ringing -> None. At most one session exists at a time;
//! the poller refuses to trigger while one is active. Resolution produces
//! the follow-up effects as data (`SnoozeOutcome`), so the caller can run
//! re-registration and the joke fetch independently; failure of one never
//! blocks the other.

use crate::alarm::{Alarm, SoundSource};
use crate::time::ClockTime;

/// The triggered alarm plus its sound source, resolved once at entry.
/// The registry no longer holds this alarm; the session owns the only copy.
#[derive(Debug, Clone)]
pub struct RingingAlarm {
    pub alarm: Alarm,
    pub sound: SoundSource,
}

/// Input contract for the external joke-generation call. Carries the
/// description as it was before the snooze annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JokeRequest {
    pub alarm_description: String,
}

#[derive(Debug, Clone)]
pub struct SnoozeOutcome {
    /// New alarm to insert into the registry (fresh id, now + N minutes).
    pub replacement: Alarm,
    /// Independent side effect; may complete after the session is long gone.
    pub joke: JokeRequest,
}

#[derive(Debug, Default)]
pub struct AlarmSession {
    current: Option<RingingAlarm>,
}

impl AlarmSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ringing(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&RingingAlarm> {
        self.current.as_ref()
    }

    /// Enter Ringing with the triggering alarm. Resolves the sound source
    /// once; playback is the caller's concern, and playback failure does
    /// not end the session.
    pub fn begin(&mut self, alarm: Alarm) -> &RingingAlarm {
        let sound = alarm.resolve_sound();
        self.current.insert(RingingAlarm { alarm, sound })
    }

    /// Dismiss: clear the session, returning the alarm that was ringing.
    /// No further side effects.
    pub fn dismiss(&mut self) -> Option<Alarm> {
        self.current.take().map(|r| r.alarm)
    }

    /// Snooze: clear the session immediately (the poller may resume
    /// matching) and describe the two follow-ups. Returns None when
    /// nothing is ringing.
    pub fn snooze(
        &mut self,
        new_id: impl Into<String>,
        now: ClockTime,
        minutes: u32,
    ) -> Option<SnoozeOutcome> {
        let ringing = self.current.take()?;
        let joke = JokeRequest {
            alarm_description: ringing.alarm.description.clone(),
        };
        let replacement = ringing.alarm.snoozed(new_id, now, minutes);
        Some(SnoozeOutcome { replacement, joke })
    }
}
