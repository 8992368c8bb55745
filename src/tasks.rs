//! Task status mapping and conversation-level task selection.

use crate::conversation::Turn;
use crate::errors::{StudioError, StudioResult};
use a2a_types::TaskState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Status label carried by a task-linked turn.
///
/// Labels outside the known set are kept verbatim in [`TaskStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum TaskStatus {
    Submitted,
    Working,
    InputRequired,
    Completed,
    Cancelled,
    Failed,
    Rejected,
    AuthRequired,
    Unknown,
    Other(String),
}

const IN_PROGRESS: &str = "In Progress";

impl TaskStatus {
    pub fn label(&self) -> &str {
        match self {
            TaskStatus::Submitted => "Submitted",
            TaskStatus::Working => "Working",
            TaskStatus::InputRequired => "Input Required",
            TaskStatus::Completed => "Completed",
            TaskStatus::Cancelled => "Cancelled",
            TaskStatus::Failed => "Failed",
            TaskStatus::Rejected => "Rejected",
            TaskStatus::AuthRequired => "Auth Required",
            TaskStatus::Unknown => "Unknown",
            TaskStatus::Other(label) => label,
        }
    }

    /// Status given to a user turn routed to an open task.
    pub fn in_progress() -> Self {
        TaskStatus::Other(IN_PROGRESS.to_string())
    }

    pub fn from_protocol(state: &TaskState) -> Self {
        match state {
            TaskState::Submitted => TaskStatus::Submitted,
            TaskState::Working => TaskStatus::Working,
            TaskState::InputRequired => TaskStatus::InputRequired,
            TaskState::Completed => TaskStatus::Completed,
            TaskState::Canceled => TaskStatus::Cancelled,
            TaskState::Failed => TaskStatus::Failed,
            TaskState::Rejected => TaskStatus::Rejected,
            TaskState::AuthRequired => TaskStatus::AuthRequired,
            TaskState::Unknown => TaskStatus::Unknown,
            TaskState::Other(raw) => TaskStatus::Other(raw.clone()),
        }
    }

    /// Map a wire string (`input-required`) or display label (`Input Required`).
    pub fn from_label(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "submitted" => TaskStatus::Submitted,
            "working" => TaskStatus::Working,
            "inputrequired" => TaskStatus::InputRequired,
            "completed" => TaskStatus::Completed,
            "cancelled" | "canceled" => TaskStatus::Cancelled,
            "failed" => TaskStatus::Failed,
            "rejected" => TaskStatus::Rejected,
            "authrequired" => TaskStatus::AuthRequired,
            "unknown" => TaskStatus::Unknown,
            _ => TaskStatus::Other(raw.to_string()),
        }
    }

    /// Whether a task whose latest turn carries this status accepts new messages.
    pub fn is_available(&self) -> bool {
        let status = match self {
            TaskStatus::Other(raw) => TaskStatus::from_label(raw),
            known => known.clone(),
        };
        !matches!(
            status,
            TaskStatus::Completed
                | TaskStatus::Cancelled
                | TaskStatus::Failed
                | TaskStatus::Rejected
                | TaskStatus::AuthRequired
                | TaskStatus::Unknown
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.label().to_string()
    }
}

/// Guess a status from reply text when the agent reported none.
pub fn detect_status_from_text(text: &str) -> TaskStatus {
    let upper = text.to_uppercase();
    if upper.contains("COMPLETED") {
        TaskStatus::Completed
    } else if upper.contains("FAILED") {
        TaskStatus::Failed
    } else if upper.contains("CANCELLED") {
        TaskStatus::Cancelled
    } else {
        TaskStatus::Completed
    }
}

/// A task that can receive the next user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableTask {
    pub task_id: String,
    pub status: TaskStatus,
    pub last_updated: DateTime<Utc>,
}

/// Open tasks, most recently updated first.
///
/// Each task is represented by its latest turn. Turns with equal timestamps
/// are ordered by their position in the log.
pub fn available_tasks(turns: &[Turn]) -> Vec<AvailableTask> {
    let mut latest: HashMap<&str, (usize, &Turn)> = HashMap::new();
    for (index, turn) in turns.iter().enumerate() {
        let Some(link) = &turn.task else { continue };
        latest
            .entry(link.task_id.as_str())
            .and_modify(|entry| {
                if turn.timestamp >= entry.1.timestamp {
                    *entry = (index, turn);
                }
            })
            .or_insert((index, turn));
    }

    let mut open: Vec<(usize, &Turn)> = latest
        .into_values()
        .filter(|(_, turn)| turn.task.as_ref().is_some_and(|l| l.status.is_available()))
        .collect();
    open.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp).then(b.0.cmp(&a.0)));

    open.into_iter()
        .filter_map(|(_, turn)| {
            turn.task.as_ref().map(|link| AvailableTask {
                task_id: link.task_id.clone(),
                status: link.status.clone(),
                last_updated: turn.timestamp,
            })
        })
        .collect()
}

/// Turns linked to `task_id`, in log order.
pub fn task_turns<'a>(turns: &'a [Turn], task_id: &str) -> Vec<&'a Turn> {
    turns
        .iter()
        .filter(|t| t.task.as_ref().is_some_and(|l| l.task_id == task_id))
        .collect()
}

/// Tracks which open task new user messages are routed to.
#[derive(Debug, Default)]
pub struct TaskTracker {
    selected: Option<String>,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Re-derive the selection from the log and return the open tasks.
    ///
    /// With nothing selected the most recent open task is chosen; a selection
    /// that is no longer open falls back the same way, or to none.
    pub fn refresh(&mut self, turns: &[Turn]) -> Vec<AvailableTask> {
        let available = available_tasks(turns);
        let still_open = self
            .selected
            .as_deref()
            .is_some_and(|id| available.iter().any(|t| t.task_id == id));

        if !still_open {
            let next = available.first().map(|t| t.task_id.clone());
            if next != self.selected {
                tracing::debug!(from = ?self.selected, to = ?next, "task selection changed");
            }
            self.selected = next;
        }
        available
    }

    /// Route subsequent messages to `task_id`, which must be open.
    pub fn select(&mut self, task_id: &str, turns: &[Turn]) -> StudioResult<()> {
        if !available_tasks(turns).iter().any(|t| t.task_id == task_id) {
            return Err(StudioError::InvalidInput {
                reason: format!("Task '{}' is not open", task_id),
            });
        }
        self.selected = Some(task_id.to_string());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}
