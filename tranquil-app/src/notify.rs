//! Notification dispatch across the foreground/background boundary.
//!
//! The background delivery worker runs in a separate, independently-
//! scheduled process and may be terminated between dispatch and click, so
//! everything needed to act on a click travels inside the notification
//! payload; nothing is assumed to survive in worker memory.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tranquil_core::Alarm;

pub const ACTION_DISMISS: &str = "dismiss";
pub const ACTION_SNOOZE_PREFIX: &str = "snooze";

pub const NOTIFICATION_ICON: &str = "/tranquil_icon.png";

/// Data embedded in a system notification. Enough to rebuild the alarm on
/// a snooze click with no registry state: the original is already consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub alarm_id: String,
    pub description: String,
    pub sound_src: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub icon: String,
    /// Tag is the alarm or task id; deletion closes notifications by tag.
    pub tag: String,
    /// Present for alarm notifications; plain reminders carry none.
    pub payload: Option<NotificationPayload>,
    pub actions: Vec<NotificationAction>,
    /// Due alarms must be explicitly resolved, never auto-expired.
    pub require_interaction: bool,
}

/// Click relay from the worker. `action` is None for a plain body click;
/// `payload` is None for notifications that never carried one.
#[derive(Debug, Clone)]
pub struct WorkerEvent {
    pub action: Option<String>,
    pub payload: Option<NotificationPayload>,
}

/// The out-of-process delivery collaborator, message-based only.
pub trait DeliveryWorker {
    fn ready(&self) -> bool;
    fn show_notification(&self, req: NotificationRequest) -> Result<()>;
    /// Opaque handles for outstanding notifications carrying `tag`.
    fn notifications_by_tag(&self, tag: &str) -> Vec<String>;
    fn close_notification(&self, handle: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// App is foregrounded: the caller opens an in-page alarm session.
    Foreground,
    /// Handed to the worker as a system notification.
    Background,
    /// Permission absent, worker not ready, or display failed. Silent
    /// degradation; the alarm is simply not delivered out-of-app.
    Skipped,
}

/// Parse a click action: `"snooze"` (legacy, 5 minutes) or `"snooze-<m>"`.
pub fn parse_snooze_action(action: &str) -> Option<u32> {
    if action == ACTION_SNOOZE_PREFIX {
        return Some(5);
    }
    let minutes = action.strip_prefix("snooze-")?;
    minutes.parse().ok().filter(|m| *m > 0)
}

pub struct NotificationDispatcher<W> {
    worker: W,
    permission_granted: bool,
    alarm_title: String,
    snooze_presets: Vec<u32>,
}

impl<W: DeliveryWorker> NotificationDispatcher<W> {
    pub fn new(worker: W, alarm_title: impl Into<String>, snooze_presets: Vec<u32>) -> Self {
        Self {
            worker,
            permission_granted: false,
            alarm_title: alarm_title.into(),
            snooze_presets,
        }
    }

    pub fn set_permission(&mut self, granted: bool) {
        self.permission_granted = granted;
    }

    pub fn permission_granted(&self) -> bool {
        self.permission_granted
    }

    pub fn worker(&self) -> &W {
        &self.worker
    }

    /// Deliver a due alarm through exactly one path, decided by a single
    /// synchronously-checked foreground flag: an in-page session when
    /// foregrounded, a worker notification otherwise.
    pub fn dispatch(&self, alarm: &Alarm, foreground: bool) -> DispatchOutcome {
        if foreground {
            return DispatchOutcome::Foreground;
        }
        if !self.permission_granted {
            debug!("notification permission absent; skipping background delivery");
            return DispatchOutcome::Skipped;
        }
        if !self.worker.ready() {
            debug!("delivery worker not ready; skipping background delivery");
            return DispatchOutcome::Skipped;
        }

        let payload = NotificationPayload {
            alarm_id: alarm.id.clone(),
            description: alarm.description.clone(),
            sound_src: alarm.resolve_sound().as_str().to_string(),
        };

        let mut actions: Vec<NotificationAction> = self
            .snooze_presets
            .iter()
            .map(|m| NotificationAction {
                action: format!("snooze-{m}"),
                title: format!("Snooze {m} min"),
            })
            .collect();
        actions.push(NotificationAction {
            action: ACTION_DISMISS.to_string(),
            title: "Dismiss".to_string(),
        });

        let req = NotificationRequest {
            title: self.alarm_title.clone(),
            body: alarm.description.clone(),
            icon: NOTIFICATION_ICON.to_string(),
            tag: alarm.id.clone(),
            payload: Some(payload),
            actions,
            require_interaction: true,
        };

        match self.worker.show_notification(req) {
            Ok(()) => DispatchOutcome::Background,
            Err(e) => {
                warn!("background notification failed: {e:#}");
                DispatchOutcome::Skipped
            }
        }
    }

    /// Plain informational notification: no payload, no actions, and it
    /// may auto-expire. Same silent degradation as
    /// [`dispatch`](Self::dispatch) when permission is absent or the
    /// worker is down. Returns whether anything was shown.
    pub fn remind(
        &self,
        title: impl Into<String>,
        body: impl Into<String>,
        tag: impl Into<String>,
    ) -> bool {
        if !self.permission_granted || !self.worker.ready() {
            return false;
        }
        let req = NotificationRequest {
            title: title.into(),
            body: body.into(),
            icon: NOTIFICATION_ICON.to_string(),
            tag: tag.into(),
            payload: None,
            actions: Vec::new(),
            require_interaction: false,
        };
        match self.worker.show_notification(req) {
            Ok(()) => true,
            Err(e) => {
                warn!("reminder notification failed: {e:#}");
                false
            }
        }
    }

    /// Close any outstanding notification tagged with an alarm id. Called
    /// when that alarm is deleted. Failures are logged, never retried.
    pub fn cancel_for(&self, tag: &str) {
        if !self.worker.ready() {
            return;
        }
        for handle in self.worker.notifications_by_tag(tag) {
            if let Err(e) = self.worker.close_notification(&handle) {
                warn!("closing notification {handle} for '{tag}' failed: {e:#}");
            }
        }
    }
}
