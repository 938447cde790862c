//! Application runtime: wires the store-backed collections, the clock
//! poller, the alarm session, dispatch, audio, and the AI boundary into
//! one component graph constructed at startup.
//!
//! Everything runs on a single logical thread of control: ticks, user
//! actions, and async completions are serialized onto the owner's loop.
//! AI calls never run inline; they are queued on the flow worker and the
//! results come back through [`App::handle_flow_event`], so a slow
//! provider can never stall a tick or a dismiss. Methods take the
//! relevant time explicitly so hosts and tests drive the clock;
//! `clock_now` is the wall-clock convenience.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use tranquil_core::{
    Alarm, AlarmRegistry, AlarmSession, AlarmSound, ClockPoller, ClockTime, PollerState, Priority,
    SoundSource, Task, apply_scores, items_for, purge_completed_before,
};

use crate::audio::{AudioSession, AudioSink};
use crate::config::Config;
use crate::flows::{FlowEvent, FlowFetch};
use crate::notify::{
    ACTION_DISMISS, DeliveryWorker, DispatchOutcome, NotificationDispatcher, WorkerEvent,
    parse_snooze_action,
};
use crate::store::{KEY_ALARMS, KEY_LANGUAGE, KEY_TASKS, Store};

const ALARM_TITLE: &str = "Time to wake up!";
const MOTIVATION_FALLBACK: &str = "Great job!";
const REMINDER_TITLE: &str = "Task Reminder";
const REMINDER_LEAD_MINUTES: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hinglish,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "english"),
            Language::Hinglish => write!(f, "hinglish"),
        }
    }
}

/// A user-visible transient notice. The host renders these however it
/// likes; the app only queues them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: Option<String>,
    pub destructive: bool,
}

impl Toast {
    fn info(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            destructive: false,
        }
    }

    fn detail(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            destructive: false,
        }
    }

    fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            destructive: true,
        }
    }
}

pub struct App<W, S> {
    store: Store,
    config: Config,

    tasks: Vec<Task>,
    registry: AlarmRegistry,
    poller: ClockPoller,
    session: AlarmSession,
    dispatcher: NotificationDispatcher<W>,
    alarm_audio: AudioSession<S>,
    joke_audio: AudioSession<S>,

    language: Language,
    foreground: bool,
    flow_tx: mpsc::UnboundedSender<FlowFetch>,
    next_joke_id: u64,
    toasts: Vec<Toast>,
}

impl<W: DeliveryWorker, S: AudioSink> App<W, S> {
    /// Load persisted state and build the component graph. Runs the daily
    /// purge: tasks completed before today's local midnight are dropped
    /// and the pruned collection is written back. `flow_tx` feeds the
    /// background AI worker (see [`crate::flows::spawn_worker`]).
    pub fn load(
        mut store: Store,
        config: Config,
        worker: W,
        alarm_sink: S,
        joke_sink: S,
        flow_tx: mpsc::UnboundedSender<FlowFetch>,
        now: DateTime<Utc>,
    ) -> Self {
        let language: Language = store.get(KEY_LANGUAGE).unwrap_or_default();

        let raw_tasks: Vec<Task> = store.get(KEY_TASKS).unwrap_or_default();
        let raw_len = raw_tasks.len();
        let day_start = local_day_start(config.tz().ok(), now);
        let tasks = purge_completed_before(raw_tasks, day_start);
        if tasks.len() != raw_len {
            debug!("purged {} stale completed tasks", raw_len - tasks.len());
            store.set(KEY_TASKS, &tasks);
        }

        let alarms: Vec<Alarm> = store.get(KEY_ALARMS).unwrap_or_default();

        let dispatcher = NotificationDispatcher::new(
            worker,
            ALARM_TITLE,
            config.alarms.usable_snooze_presets(),
        );

        Self {
            store,
            config,
            tasks,
            registry: AlarmRegistry::from_alarms(alarms),
            poller: ClockPoller::new(),
            session: AlarmSession::new(),
            dispatcher,
            alarm_audio: AudioSession::new(alarm_sink),
            joke_audio: AudioSession::new(joke_sink),
            language,
            foreground: true,
            flow_tx,
            next_joke_id: 0,
            toasts: Vec::new(),
        }
    }

    // --- accessors ------------------------------------------------------

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn alarms(&self) -> &[Alarm] {
        self.registry.list()
    }

    pub fn poller_state(&self) -> PollerState {
        self.poller.state()
    }

    pub fn ringing(&self) -> Option<&Alarm> {
        self.session.current().map(|r| &r.alarm)
    }

    pub fn is_joke_playing(&self) -> bool {
        self.joke_audio.is_playing()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.store.set(KEY_LANGUAGE, &language);
    }

    pub fn snooze_presets(&self) -> Vec<u32> {
        self.config.alarms.usable_snooze_presets()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.config.alarms.clamped_interval_secs())
    }

    pub fn set_foreground(&mut self, foreground: bool) {
        self.foreground = foreground;
    }

    pub fn set_notification_permission(&mut self, granted: bool) {
        self.dispatcher.set_permission(granted);
        if granted {
            self.toast(Toast::info("Notifications enabled!"));
        } else {
            self.toast(Toast::error(
                "Notifications not enabled.",
                "You might miss your alarms!",
            ));
        }
    }

    pub fn drain_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    /// Current wall-clock minute in the configured timezone.
    pub fn clock_now(&self) -> ClockTime {
        let now = Utc::now();
        match self.config.tz() {
            Ok(tz) => ClockTime::from_datetime(&now.with_timezone(&tz)),
            Err(_) => ClockTime::from_datetime(&now),
        }
    }

    // --- tasks ----------------------------------------------------------

    pub fn create_task(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        deadline: DateTime<Utc>,
        priority: Priority,
        duration_minutes: Option<i32>,
        now: DateTime<Utc>,
    ) -> String {
        let id = new_id();
        let mut task = Task::new(id.clone(), name, deadline).with_priority(priority);
        task.description = description;
        task.duration_minutes = duration_minutes;

        let name = task.name.clone();
        self.remind_deadline(&task, now);
        self.tasks.push(task);
        self.persist_tasks();
        self.toast(Toast::detail("Task created!", name));
        id
    }

    /// Replace an existing task wholesale (edit-form semantics).
    pub fn update_task(&mut self, updated: Task, now: DateTime<Utc>) -> bool {
        let Some(slot) = self.tasks.iter_mut().find(|t| t.id == updated.id) else {
            return false;
        };
        *slot = updated;
        let slot = slot.clone();
        self.remind_deadline(&slot, now);
        self.persist_tasks();
        self.toast(Toast::info("Task updated!"));
        true
    }

    pub fn delete_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return false;
        }
        self.persist_tasks();
        self.toast(Toast::info("Task deleted"));
        true
    }

    /// Flip completion. Completing a task queues a motivation fetch on the
    /// flow worker; the completion toast arrives with the result (or the
    /// canned fallback). The toggle itself never touches the network.
    pub fn toggle_complete(&mut self, id: &str, completed: bool, now: DateTime<Utc>) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        task.set_completed(completed, now);
        let name = task.name.clone();
        let description = task.description.clone().unwrap_or_default();
        self.persist_tasks();

        if completed {
            let fetch = FlowFetch::Motivation {
                task_name: name,
                task_description: format!("{description} {}", self.language_note()),
            };
            if self.flow_tx.send(fetch).is_err() {
                debug!("flow worker unavailable; using canned motivation");
                self.toast(Toast::detail("Task completed!", MOTIVATION_FALLBACK));
            }
        }
        true
    }

    /// Queue today's open tasks for the prioritization flow. Scores come
    /// back through [`Self::handle_flow_event`] and are written back by
    /// name; failure surfaces as a toast and scores stay as-is.
    pub fn prioritize_today(&mut self, now: DateTime<Utc>) {
        let tz = self.config.tz().ok();
        let today: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| !t.completed && same_local_day(t.deadline, now, tz))
            .cloned()
            .collect();

        if today.is_empty() {
            self.toast(Toast::detail(
                "No tasks for today",
                "Add a task before prioritizing.",
            ));
            return;
        }

        let items = items_for(&today, &self.language_note());
        if self.flow_tx.send(FlowFetch::Prioritize { items }).is_err() {
            warn!("flow worker unavailable; prioritization skipped");
            self.toast(Toast::error(
                "AI error",
                "Could not prioritize tasks. Try again later.",
            ));
        }
    }

    // --- alarms ---------------------------------------------------------

    pub fn create_alarm(
        &mut self,
        description: impl Into<String>,
        time: ClockTime,
        sound: AlarmSound,
        custom_sound_data_uri: Option<String>,
    ) -> String {
        let id = new_id();
        let mut alarm = Alarm::new(id.clone(), description, time, sound);
        alarm.custom_sound_data_uri = custom_sound_data_uri;

        self.toast(Toast::detail(
            "Alarm set!",
            format!("{} at {}", alarm.description, alarm.time),
        ));
        self.registry.add(alarm);
        self.persist_alarms();
        id
    }

    pub fn update_alarm(&mut self, id: &str, alarm: Alarm) -> bool {
        if !self.registry.update(id, alarm) {
            return false;
        }
        self.persist_alarms();
        self.toast(Toast::info("Alarm updated!"));
        true
    }

    /// Delete an alarm. Any outstanding system notification tagged with
    /// the id is closed first (best effort, logged on failure).
    pub fn delete_alarm(&mut self, id: &str) -> bool {
        self.dispatcher.cancel_for(id);
        if self.registry.remove(id).is_none() {
            return false;
        }
        self.persist_alarms();
        self.toast(Toast::info("Alarm deleted"));
        true
    }

    // --- the polling loop and session lifecycle --------------------------

    /// One tick of the clock poller. At most one alarm activates per tick,
    /// and none while one is already ringing.
    pub fn tick(&mut self, now: ClockTime) {
        let Some(alarm) = self.poller.tick(&mut self.registry, now) else {
            return;
        };
        // The match already removed the alarm; persist before any
        // dispatch step can yield.
        self.persist_alarms();

        match self.dispatcher.dispatch(&alarm, self.foreground) {
            DispatchOutcome::Foreground => {
                let src = self.session.begin(alarm).sound.as_str().to_string();
                self.alarm_audio.play(&src, true);
            }
            DispatchOutcome::Background => {
                // No in-app session: resolution arrives as a worker click.
                self.poller.resolve();
            }
            DispatchOutcome::Skipped => {
                self.poller.resolve();
            }
        }
    }

    /// Dismiss the ringing alarm: stop the sound, clear the session.
    pub fn dismiss(&mut self) {
        self.alarm_audio.stop();
        if self.session.dismiss().is_some() {
            self.poller.resolve();
        }
    }

    /// Snooze the ringing alarm. Re-registration and the joke fetch run
    /// independently; a joke failure never blocks the replacement alarm.
    /// A zero-minute snooze is rejected (the alarm keeps ringing): the
    /// replacement would land in the current minute and re-fire on the
    /// very next tick.
    pub fn snooze(&mut self, minutes: u32, now: ClockTime) {
        if minutes == 0 {
            debug!("ignoring zero-minute snooze");
            return;
        }
        self.alarm_audio.stop();
        let Some(outcome) = self.session.snooze(new_id(), now, minutes) else {
            return;
        };
        self.poller.resolve();

        let ring_at = outcome.replacement.time;
        self.registry.add(outcome.replacement);
        self.persist_alarms();
        self.toast(Toast::detail(
            format!("Alarm snoozed for {minutes} minutes"),
            format!("Will ring again at {ring_at}"),
        ));

        self.request_joke(outcome.joke.alarm_description);
    }

    /// Stop joke playback early.
    pub fn stop_joke(&mut self) {
        self.joke_audio.stop();
    }

    /// A flow fetch settled. Joke audio plays once even if the session
    /// that requested it is long dismissed; every failure is a notice,
    /// never a fault.
    pub fn handle_flow_event(&mut self, event: FlowEvent) {
        match event {
            FlowEvent::Motivation { message } => {
                self.toast(Toast::detail("Task completed!", message));
            }
            FlowEvent::MotivationFailed { message } => {
                warn!("motivation call failed: {message}");
                self.toast(Toast::detail("Task completed!", MOTIVATION_FALLBACK));
            }
            FlowEvent::Scores { scores } => {
                let updated = apply_scores(&mut self.tasks, &scores);
                self.persist_tasks();
                self.toast(Toast::detail(
                    "Tasks prioritized!",
                    format!("{updated} tasks scored."),
                ));
            }
            FlowEvent::ScoresFailed { message } => {
                warn!("prioritization failed: {message}");
                self.toast(Toast::error(
                    "AI error",
                    "Could not prioritize tasks. Try again later.",
                ));
            }
            FlowEvent::JokeAudio { data_uri, .. } => {
                self.joke_audio.play(&data_uri, false);
            }
            FlowEvent::JokeFailed { message, .. } => {
                warn!("joke fetch failed: {message}");
                self.toast(Toast::error("Error", "Failed to play snooze joke"));
            }
        }
    }

    /// A click relayed from the background delivery worker. The worker has
    /// no memory of the dispatch, so the payload alone must suffice.
    pub fn handle_worker_event(&mut self, event: WorkerEvent, now: ClockTime) {
        match event.action.as_deref() {
            Some(ACTION_DISMISS) => {
                // The alarm was consumed at dispatch; nothing left to do.
            }
            Some(action) => {
                let Some(minutes) = parse_snooze_action(action) else {
                    debug!("unknown worker action: {action}");
                    return;
                };
                let Some(payload) = event.payload else {
                    debug!("snooze click without alarm payload; ignoring");
                    return;
                };
                let (sound, custom_uri) = SoundSource::from_resolved(&payload.sound_src);
                let base = Alarm {
                    id: payload.alarm_id,
                    description: payload.description.clone(),
                    time: now,
                    sound,
                    custom_sound_data_uri: custom_uri,
                };
                let replacement = base.snoozed(new_id(), now, minutes);
                let ring_at = replacement.time;
                self.registry.add(replacement);
                self.persist_alarms();
                self.toast(Toast::detail(
                    format!("Alarm snoozed for {minutes} minutes"),
                    format!("Will ring again at {ring_at}"),
                ));
                self.request_joke(payload.description);
            }
            None => {
                // Plain body click focuses the app.
                self.foreground = true;
            }
        }
    }

    // --- internals --------------------------------------------------------

    /// Mirror of the legacy reminder behavior: a task created or edited
    /// with a deadline more than the lead time away gets a plain system
    /// notification right away.
    fn remind_deadline(&self, task: &Task, now: DateTime<Utc>) {
        if task.deadline - chrono::Duration::minutes(REMINDER_LEAD_MINUTES) <= now {
            return;
        }
        self.dispatcher.remind(
            REMINDER_TITLE,
            format!(
                "Your task \"{}\" is due in {REMINDER_LEAD_MINUTES} minutes!",
                task.name
            ),
            &task.id,
        );
    }

    fn request_joke(&mut self, alarm_description: String) {
        self.next_joke_id += 1;
        let fetch = FlowFetch::Joke {
            request_id: self.next_joke_id,
            alarm_description: format!("{alarm_description} {}", self.language_note()),
        };
        if self.flow_tx.send(fetch).is_err() {
            debug!("flow worker unavailable; skipping joke");
        }
    }

    fn language_note(&self) -> String {
        format!("(in {})", self.language)
    }

    fn persist_tasks(&mut self) {
        self.store.set(KEY_TASKS, &self.tasks);
    }

    fn persist_alarms(&mut self) {
        self.store.set(KEY_ALARMS, &self.registry.list().to_vec());
    }

    fn toast(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Midnight of the current local day, as a UTC instant. Falls back to the
/// UTC calendar day when the local midnight is ambiguous (DST) or the
/// timezone is unknown.
fn local_day_start(tz: Option<Tz>, now: DateTime<Utc>) -> DateTime<Utc> {
    if let Some(tz) = tz {
        let midnight = now.with_timezone(&tz).date_naive().and_time(NaiveTime::MIN);
        if let Some(local) = tz.from_local_datetime(&midnight).earliest() {
            return local.with_timezone(&Utc);
        }
    }
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn same_local_day(a: DateTime<Utc>, b: DateTime<Utc>, tz: Option<Tz>) -> bool {
    match tz {
        Some(tz) => a.with_timezone(&tz).date_naive() == b.with_timezone(&tz).date_naive(),
        None => a.date_naive() == b.date_naive(),
    }
}
