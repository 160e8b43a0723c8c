use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::model::{Recurrence, Task, TaskDraft};
use crate::keys;

fn task_from_item(
    household_id: &str,
    task_id: &str,
    item: &HashMap<String, AttributeValue>,
) -> Task {
    Task {
        task_id: task_id.to_string(),
        household_id: household_id.to_string(),
        title: item
            .get("title")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        description: item
            .get("description")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        status: item
            .get("task_status")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| "active".to_string()),
        next_occurrence: item
            .get("next_occurrence")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string()),
        recurrence: Recurrence {
            kind: item
                .get("recurrence_kind")
                .and_then(|v| v.as_s().ok())
                .map(|s| s.to_string())
                .unwrap_or_else(|| "none".to_string()),
            weekdays: item
                .get("recurrence_days")
                .and_then(|v| v.as_ns().ok())
                .map(|ns| ns.iter().filter_map(|n| n.parse().ok()).collect())
                .unwrap_or_default(),
        },
        created_at: item
            .get("created_at")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        assignees: vec![],
    }
}

/// Load all tasks of a household (assignees empty - populated by the
/// consensus block during joins)
pub async fn load_tasks_for_household(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
) -> Result<Vec<Task>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
        .expression_attribute_values(":pk", AttributeValue::S(keys::household_scope_pk(household_id)))
        .expression_attribute_values(":sk_prefix", AttributeValue::S("TASK#".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut tasks = Vec::new();
    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            if let Some(task_id) = sk.strip_prefix("TASK#") {
                tasks.push(task_from_item(household_id, task_id, item));
            }
        }
    }

    Ok(tasks)
}

/// Get a specific task
pub async fn get_task(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    task_id: &str,
) -> Result<Task, String> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(keys::household_scope_pk(household_id)))
        .key("SK", AttributeValue::S(keys::task_sk(task_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    if let Some(item) = result.item() {
        Ok(task_from_item(household_id, task_id, item))
    } else {
        Err("Task not found".to_string())
    }
}

/// List the user ids assigned to a task
pub async fn list_assignees(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
) -> Result<Vec<String>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
        .expression_attribute_values(":pk", AttributeValue::S(keys::task_scope_pk(task_id)))
        .expression_attribute_values(":sk_prefix", AttributeValue::S("ASSIGNEE#".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut assignees = Vec::new();
    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            if let Some(user_id) = sk.strip_prefix("ASSIGNEE#") {
                assignees.push(user_id.to_string());
            }
        }
    }

    Ok(assignees)
}

/// Materialize an approved creation proposal: one task item plus one
/// assignee item per responsible member. The caller picks the task id
/// (the approved proposal's id), so a replayed apply rewrites the same
/// item instead of minting a second task.
pub async fn create_task_from_draft(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    task_id: &str,
    draft: &TaskDraft,
) -> Result<Task, String> {
    let now = chrono::Utc::now().to_rfc3339();

    let mut builder = client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S(keys::household_scope_pk(household_id)))
        .item("SK", AttributeValue::S(keys::task_sk(task_id)))
        .item("title", AttributeValue::S(draft.title.clone()))
        .item("description", AttributeValue::S(draft.description.clone()))
        .item("task_status", AttributeValue::S("active".to_string()))
        .item("recurrence_kind", AttributeValue::S(draft.recurrence_kind.clone()))
        .item("created_at", AttributeValue::S(now.clone()));

    if let Some(next) = &draft.next_occurrence {
        builder = builder.item("next_occurrence", AttributeValue::S(next.clone()));
    }
    // DynamoDB rejects empty number sets
    if !draft.recurrence_days.is_empty() {
        builder = builder.item(
            "recurrence_days",
            AttributeValue::Ns(draft.recurrence_days.iter().map(|d| d.to_string()).collect()),
        );
    }

    builder
        .send()
        .await
        .map_err(|e| format!("DynamoDB put_item error: {}", e))?;

    for user_id in &draft.assignees {
        client
            .put_item()
            .table_name(table_name)
            .item("PK", AttributeValue::S(keys::task_scope_pk(task_id)))
            .item("SK", AttributeValue::S(keys::assignee_sk(user_id)))
            .item("assigned_at", AttributeValue::S(now.clone()))
            .send()
            .await
            .map_err(|e| format!("DynamoDB put_item error: {}", e))?;
    }

    Ok(Task {
        task_id: task_id.to_string(),
        household_id: household_id.to_string(),
        title: draft.title.clone(),
        description: draft.description.clone(),
        status: "active".to_string(),
        next_occurrence: draft.next_occurrence.clone(),
        recurrence: Recurrence {
            kind: draft.recurrence_kind.clone(),
            weekdays: draft.recurrence_days.clone(),
        },
        created_at: now,
        assignees: draft.assignees.clone(),
    })
}

/// Materialize an approved edit proposal: rewrite the task body and
/// replace the assignee rows with the proposed set
pub async fn apply_edit(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    task_id: &str,
    draft: &TaskDraft,
) -> Result<Task, String> {
    // The task must still exist; an edit approved after a delete is a no-op target
    get_task(client, table_name, household_id, task_id).await?;

    let mut update_expr = vec![
        "#title = :title",
        "#description = :description",
        "recurrence_kind = :recurrence_kind",
    ];
    let mut expr_names = HashMap::new();
    expr_names.insert("#title".to_string(), "title".to_string());
    expr_names.insert("#description".to_string(), "description".to_string());

    let mut expr_values = HashMap::new();
    expr_values.insert(":title".to_string(), AttributeValue::S(draft.title.clone()));
    expr_values.insert(
        ":description".to_string(),
        AttributeValue::S(draft.description.clone()),
    );
    expr_values.insert(
        ":recurrence_kind".to_string(),
        AttributeValue::S(draft.recurrence_kind.clone()),
    );

    let mut remove_expr = vec![];
    if let Some(next) = &draft.next_occurrence {
        update_expr.push("next_occurrence = :next_occurrence");
        expr_values.insert(
            ":next_occurrence".to_string(),
            AttributeValue::S(next.clone()),
        );
    } else {
        remove_expr.push("next_occurrence");
    }
    if draft.recurrence_days.is_empty() {
        remove_expr.push("recurrence_days");
    } else {
        update_expr.push("recurrence_days = :recurrence_days");
        expr_values.insert(
            ":recurrence_days".to_string(),
            AttributeValue::Ns(draft.recurrence_days.iter().map(|d| d.to_string()).collect()),
        );
    }

    let mut update_expression = format!("SET {}", update_expr.join(", "));
    if !remove_expr.is_empty() {
        update_expression = format!("{} REMOVE {}", update_expression, remove_expr.join(", "));
    }

    let mut builder = client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(keys::household_scope_pk(household_id)))
        .key("SK", AttributeValue::S(keys::task_sk(task_id)))
        .update_expression(update_expression);

    for (k, v) in expr_names {
        builder = builder.expression_attribute_names(k, v);
    }
    for (k, v) in expr_values {
        builder = builder.expression_attribute_values(k, v);
    }

    builder
        .send()
        .await
        .map_err(|e| format!("DynamoDB update_item error: {}", e))?;

    // Replace assignee rows with the proposed set
    let now = chrono::Utc::now().to_rfc3339();
    let current = list_assignees(client, table_name, task_id).await?;
    for user_id in &current {
        if !draft.assignees.contains(user_id) {
            client
                .delete_item()
                .table_name(table_name)
                .key("PK", AttributeValue::S(keys::task_scope_pk(task_id)))
                .key("SK", AttributeValue::S(keys::assignee_sk(user_id)))
                .send()
                .await
                .map_err(|e| format!("DynamoDB delete_item error: {}", e))?;
        }
    }
    for user_id in &draft.assignees {
        if !current.contains(user_id) {
            client
                .put_item()
                .table_name(table_name)
                .item("PK", AttributeValue::S(keys::task_scope_pk(task_id)))
                .item("SK", AttributeValue::S(keys::assignee_sk(user_id)))
                .item("assigned_at", AttributeValue::S(now.clone()))
                .send()
                .await
                .map_err(|e| format!("DynamoDB put_item error: {}", e))?;
        }
    }

    get_task(client, table_name, household_id, task_id).await
}

/// Materialize an approved deletion proposal: drop the task item and every
/// row scoped under it (assignees, executions, photo records)
pub async fn delete_task(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    task_id: &str,
) -> Result<(), String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk")
        .expression_attribute_values(":pk", AttributeValue::S(keys::task_scope_pk(task_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            client
                .delete_item()
                .table_name(table_name)
                .key("PK", AttributeValue::S(keys::task_scope_pk(task_id)))
                .key("SK", AttributeValue::S(sk.to_string()))
                .send()
                .await
                .map_err(|e| format!("DynamoDB delete_item error: {}", e))?;
        }
    }

    client
        .delete_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(keys::household_scope_pk(household_id)))
        .key("SK", AttributeValue::S(keys::task_sk(task_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB delete_item error: {}", e))?;

    Ok(())
}
