use serde::{Deserialize, Serialize};

use crate::tasks::model::TaskDraft;

/// A requested create/edit/delete of a task, pending collective approval.
/// Proposals are append-only and terminal once approved or rejected.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Proposal {
    pub proposal_id: String,
    pub household_id: String,
    pub kind: String, // "create" | "edit" | "delete"
    pub payload: TaskDraft,
    pub created_by: String,
    pub status: String, // "pending" | "approved" | "rejected"
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProposalPayload {
    pub kind: String,
    pub payload: TaskDraft,
}

/// Validate a proposal draft the way the task form validates its steps:
/// name, a real description, a schedule and at least one responsible member.
pub fn validate_draft(kind: &str, draft: &TaskDraft) -> Result<(), String> {
    match kind {
        "delete" => {
            if draft.task_id.as_deref().unwrap_or("").is_empty() {
                return Err("A deletion proposal needs a task id".to_string());
            }
            return Ok(());
        }
        "edit" => {
            if draft.task_id.as_deref().unwrap_or("").is_empty() {
                return Err("An edit proposal needs a task id".to_string());
            }
        }
        "create" => {}
        other => return Err(format!("Unknown proposal kind: {}", other)),
    }

    if draft.title.trim().is_empty() {
        return Err("Task title is required".to_string());
    }
    if draft.description.trim().len() < 5 {
        return Err("Task description must have at least 5 characters".to_string());
    }
    if draft.recurrence_kind == "none" {
        if draft.next_occurrence.as_deref().unwrap_or("").is_empty() {
            return Err("A one-shot task needs an execution date".to_string());
        }
    } else if draft.recurrence_days.is_empty() {
        return Err("A recurring task needs at least one weekday".to_string());
    }
    if draft.assignees.is_empty() {
        return Err("Select at least one assignee".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> TaskDraft {
        TaskDraft {
            task_id: None,
            title: "Limpar cozinha".to_string(),
            description: "Balcao, pia e fogao".to_string(),
            next_occurrence: None,
            recurrence_kind: "weekly".to_string(),
            recurrence_days: vec![1, 3, 5],
            assignees: vec!["user-a".to_string()],
        }
    }

    #[test]
    fn accepts_a_complete_creation_draft() {
        assert!(validate_draft("create", &valid_draft()).is_ok());
    }

    #[test]
    fn rejects_short_descriptions() {
        let mut draft = valid_draft();
        draft.description = "ok".to_string();
        assert!(validate_draft("create", &draft).is_err());
    }

    #[test]
    fn one_shot_tasks_need_a_date() {
        let mut draft = valid_draft();
        draft.recurrence_kind = "none".to_string();
        draft.recurrence_days = vec![];
        assert!(validate_draft("create", &draft).is_err());

        draft.next_occurrence = Some("2026-09-05".to_string());
        assert!(validate_draft("create", &draft).is_ok());
    }

    #[test]
    fn recurring_tasks_need_weekdays() {
        let mut draft = valid_draft();
        draft.recurrence_days = vec![];
        assert!(validate_draft("create", &draft).is_err());
    }

    #[test]
    fn creation_never_carries_a_task_id_requirement() {
        let mut draft = valid_draft();
        draft.assignees = vec![];
        assert!(validate_draft("create", &draft).is_err());
    }

    #[test]
    fn deletion_only_needs_the_task_id() {
        let draft = TaskDraft {
            task_id: Some("t1".to_string()),
            ..TaskDraft::default()
        };
        assert!(validate_draft("delete", &draft).is_ok());
        assert!(validate_draft("delete", &TaskDraft::default()).is_err());
    }

    #[test]
    fn edits_need_a_task_id_and_a_full_body() {
        let mut draft = valid_draft();
        assert!(validate_draft("edit", &draft).is_err());
        draft.task_id = Some("t1".to_string());
        assert!(validate_draft("edit", &draft).is_ok());
    }

    #[test]
    fn unknown_kinds_are_refused() {
        assert!(validate_draft("merge", &valid_draft()).is_err());
    }
}
