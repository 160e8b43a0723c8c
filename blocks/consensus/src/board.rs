use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};
use lar_atoms::executions::model::Execution;
use lar_atoms::keys;
use lar_atoms::tasks;
use std::collections::{HashMap, HashSet};

use crate::types::{BoardTask, ExecutionWithPhotos};

/// Derive the board status shown for a task. A task stays "active"
/// until someone executes it, reads "awaiting_others" while only part
/// of the assignees have, and "completed" once every assignee has an
/// execution on record.
pub fn derive_board_status(
    stored_status: &str,
    assignees: &[String],
    completer_ids: &HashSet<String>,
) -> String {
    if stored_status != "active" {
        return stored_status.to_string();
    }
    let assignee_set: HashSet<&str> = assignees.iter().map(|s| s.as_str()).collect();
    let completed = assignee_set
        .iter()
        .filter(|id| completer_ids.contains(**id))
        .count();
    if !assignee_set.is_empty() && completed == assignee_set.len() {
        "completed".to_string()
    } else if completed > 0 {
        "awaiting_others".to_string()
    } else {
        "active".to_string()
    }
}

/// Build one board entry: a single query pulls every row scoped under
/// the task (assignees, executions, photo records) and gets partitioned
/// in memory, instead of one query per relation.
async fn load_board_task(
    client: &DynamoClient,
    table_name: &str,
    mut task: tasks::model::Task,
) -> Result<BoardTask, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk")
        .expression_attribute_values(":pk", AttributeValue::S(keys::task_scope_pk(&task.task_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut assignees = Vec::new();
    let mut executions = Vec::new();
    let mut photos_by_execution: HashMap<String, Vec<String>> = HashMap::new();

    for item in result.items() {
        let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) else {
            continue;
        };
        if let Some(user_id) = sk.strip_prefix("ASSIGNEE#") {
            assignees.push(user_id.to_string());
        } else if let Some(user_id) = sk.strip_prefix("EXECUTION#") {
            executions.push(Execution {
                execution_id: item
                    .get("execution_id")
                    .and_then(|v| v.as_s().ok())
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                task_id: task.task_id.clone(),
                user_id: user_id.to_string(),
                completed_at: item
                    .get("completed_at")
                    .and_then(|v| v.as_s().ok())
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
            });
        } else if let Some(rest) = sk.strip_prefix("PHOTO#") {
            if let Some((execution_id, _)) = rest.rsplit_once('#') {
                if let Some(path) = item.get("storage_path").and_then(|v| v.as_s().ok()) {
                    photos_by_execution
                        .entry(execution_id.to_string())
                        .or_default()
                        .push(path.to_string());
                }
            }
        }
    }

    let completer_ids: HashSet<String> =
        executions.iter().map(|e| e.user_id.clone()).collect();
    let board_status = derive_board_status(&task.status, &assignees, &completer_ids);
    task.assignees = assignees;

    let executions = executions
        .into_iter()
        .map(|execution| {
            let photos = photos_by_execution
                .remove(&execution.execution_id)
                .unwrap_or_default();
            ExecutionWithPhotos { execution, photos }
        })
        .collect();

    Ok(BoardTask {
        task,
        executions,
        board_status,
    })
}

/// The household dashboard: all tasks joined with their assignees,
/// executions and photos, with a derived completion status per task
pub async fn household_board(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
) -> Result<Response<Body>, Error> {
    let task_rows = tasks::service::load_tasks_for_household(client, table_name, household_id)
        .await
        .map_err(|e| Box::new(std::io::Error::new(std::io::ErrorKind::Other, e)) as Box<dyn std::error::Error + Send + Sync>)?;

    // Task fan-out runs concurrently; one child query per task
    let joined = futures::future::join_all(
        task_rows
            .into_iter()
            .map(|task| load_board_task(client, table_name, task)),
    )
    .await;

    let mut board = Vec::new();
    for entry in joined {
        board.push(entry.map_err(|e| {
            Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
                as Box<dyn std::error::Error + Send + Sync>
        })?);
    }

    // Newest first, matching the dashboard ordering
    board.sort_by(|a, b| b.task.created_at.cmp(&a.task.created_at));

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(&board)?.into())
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn completers(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn untouched_tasks_stay_active() {
        let status = derive_board_status("active", &ids(&["a", "b"]), &completers(&[]));
        assert_eq!(status, "active");
    }

    #[test]
    fn partial_completion_awaits_the_others() {
        let status = derive_board_status("active", &ids(&["a", "b"]), &completers(&["a"]));
        assert_eq!(status, "awaiting_others");
    }

    #[test]
    fn all_assignees_done_means_completed() {
        let status = derive_board_status("active", &ids(&["a", "b"]), &completers(&["a", "b"]));
        assert_eq!(status, "completed");
    }

    #[test]
    fn strangers_executions_do_not_complete_the_task() {
        let status = derive_board_status("active", &ids(&["a", "b"]), &completers(&["a", "z"]));
        assert_eq!(status, "awaiting_others");
    }

    #[test]
    fn stored_terminal_statuses_pass_through() {
        let status = derive_board_status("archived", &ids(&["a"]), &completers(&["a"]));
        assert_eq!(status, "archived");
    }

    #[test]
    fn a_task_with_no_assignees_never_reads_completed() {
        let status = derive_board_status("active", &ids(&[]), &completers(&["a"]));
        assert_eq!(status, "active");
    }
}
