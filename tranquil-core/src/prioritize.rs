//! Contracts for the external prioritization call, and score write-back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Priority, Task};

/// One task as the prioritization prompt sees it.
#[derive(Debug, Clone, Serialize)]
pub struct PrioritizeItem {
    pub name: String,
    pub description: String,
    /// ISO-8601 deadline.
    pub deadline: DateTime<Utc>,
    pub priority: Priority,
}

/// One scored task as the provider returns it. The wire contract carries
/// no id, so matching back to tasks is by name.
#[derive(Debug, Clone, Deserialize)]
pub struct PrioritizedTask {
    pub name: String,
    #[serde(rename = "priorityScore")]
    pub priority_score: f64,
    pub reasoning: String,
}

/// Project tasks into the request contract. `annotation` is appended to
/// each description (the app passes a language hint like `"(in english)"`).
pub fn items_for(tasks: &[Task], annotation: &str) -> Vec<PrioritizeItem> {
    tasks
        .iter()
        .map(|t| PrioritizeItem {
            name: t.name.clone(),
            description: match &t.description {
                Some(d) => format!("{d} {annotation}"),
                None => annotation.to_string(),
            },
            deadline: t.deadline,
            priority: t.priority,
        })
        .collect()
}

/// Write scores back onto tasks, matching by name.
///
/// Known limitation: the wire contract has no id, so two tasks sharing a
/// name both receive the same score. Returns the number of tasks updated.
pub fn apply_scores(tasks: &mut [Task], scores: &[PrioritizedTask]) -> usize {
    let mut updated = 0;
    for task in tasks.iter_mut() {
        if let Some(scored) = scores.iter().find(|s| s.name == task.name) {
            task.priority_score = Some(scored.priority_score);
            task.reasoning = Some(scored.reasoning.clone());
            updated += 1;
        }
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(id: &str, name: &str) -> Task {
        let deadline = Utc.with_ymd_and_hms(2026, 3, 1, 17, 0, 0).unwrap();
        Task::new(id, name, deadline)
    }

    fn scored(name: &str, score: f64) -> PrioritizedTask {
        PrioritizedTask {
            name: name.to_string(),
            priority_score: score,
            reasoning: format!("because {name}"),
        }
    }

    #[test]
    fn scores_land_on_matching_tasks_only() {
        let mut tasks = vec![task("t1", "write report"), task("t2", "buy milk")];
        let n = apply_scores(&mut tasks, &[scored("write report", 8.5)]);

        assert_eq!(n, 1);
        assert_eq!(tasks[0].priority_score, Some(8.5));
        assert!(tasks[1].priority_score.is_none());
        assert!(tasks[1].reasoning.is_none());
    }

    // Name-based join: two tasks with the same name but different ids both
    // get updated. This pins the ambiguity down rather than hiding it; the
    // wire contract would need an id field to do better.
    #[test]
    fn duplicate_names_update_every_match() {
        let mut tasks = vec![task("t1", "call mom"), task("t2", "call mom")];
        let n = apply_scores(&mut tasks, &[scored("call mom", 6.0)]);

        assert_eq!(n, 2);
        assert_eq!(tasks[0].priority_score, Some(6.0));
        assert_eq!(tasks[1].priority_score, Some(6.0));
    }

    #[test]
    fn items_carry_annotation() {
        let tasks = vec![
            task("t1", "a").with_description("desc"),
            task("t2", "b"),
        ];
        let items = items_for(&tasks, "(in hinglish)");
        assert_eq!(items[0].description, "desc (in hinglish)");
        assert_eq!(items[1].description, "(in hinglish)");
    }
}
