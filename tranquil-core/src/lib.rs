//! tranquil-core: domain types and alarm-scheduling logic for Tranquil.
//!
//! Everything here is deterministic and IO-free: the app layer injects
//! wall-clock times and executes the side effects these types describe.

pub mod alarm;
pub mod poller;
pub mod prioritize;
pub mod registry;
pub mod session;
pub mod task;
pub mod time;

pub use alarm::{Alarm, AlarmSound, SoundSource, SNOOZE_SUFFIX};
pub use poller::{ClockPoller, PollerState};
pub use prioritize::{PrioritizeItem, PrioritizedTask, apply_scores, items_for};
pub use registry::AlarmRegistry;
pub use session::{AlarmSession, JokeRequest, RingingAlarm, SnoozeOutcome};
pub use task::{Priority, Task, purge_completed_before};
pub use time::ClockTime;
