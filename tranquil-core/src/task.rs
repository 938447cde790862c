//! Task model and completion bookkeeping.
//!
//! Persisted JSON keeps the camelCase field names the stored `tasks`
//! collection has always used, so existing data loads unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub priority: Priority,
    /// Estimated minutes.
    #[serde(default, rename = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Set only by the external prioritization call; absent until first run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>, deadline: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            deadline,
            priority: Priority::Medium,
            duration_minutes: None,
            completed: false,
            completed_at: None,
            priority_score: None,
            reasoning: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_duration(mut self, minutes: i32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    /// Flip completion state. `completed_at` is set exactly when the flag
    /// transitions to true and cleared when it transitions back.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        self.completed = completed;
        self.completed_at = if completed { Some(now) } else { None };
    }
}

/// Daily garbage collection: drop tasks completed before the start of the
/// current calendar day. Idempotent; tasks completed today always survive.
pub fn purge_completed_before(tasks: Vec<Task>, day_start: DateTime<Utc>) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|t| {
            if !t.completed {
                return true;
            }
            match t.completed_at {
                Some(at) => at >= day_start,
                // Completed with no timestamp shouldn't happen; keep it
                // rather than silently dropping user data.
                None => true,
            }
        })
        .collect()
}
