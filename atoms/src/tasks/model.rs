use serde::{Deserialize, Serialize};

/// Scheduling rule for a task, created with it
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Recurrence {
    pub kind: String, // "none" | "daily" | "weekly" | "monthly"
    /// Weekdays the task recurs on, 0 = Sunday .. 6 = Saturday
    #[serde(default)]
    pub weekdays: Vec<u8>,
}

/// Task domain model - a choreable unit of work. Tasks only come into
/// existence through an approved proposal, never by direct insert.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Task {
    pub task_id: String,
    pub household_id: String,
    pub title: String,
    pub description: String,
    pub status: String, // "active"
    /// Next occurrence date as YYYY-MM-DD, when scheduled
    pub next_occurrence: Option<String>,
    pub recurrence: Recurrence,
    pub created_at: String,

    /// User ids assigned to the task, filled in by the consensus block
    /// when joining with assignee rows
    #[serde(default)]
    pub assignees: Vec<String>,
}

/// The proposed body of a task, carried as the payload of a proposal.
/// `task_id` is present for edit/delete proposals and absent for creation.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TaskDraft {
    pub task_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub next_occurrence: Option<String>,
    #[serde(default)]
    pub recurrence_kind: String,
    #[serde(default)]
    pub recurrence_days: Vec<u8>,
    #[serde(default)]
    pub assignees: Vec<String>,
}
