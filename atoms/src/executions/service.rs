use aws_sdk_dynamodb::types::{AttributeValue, Put, TransactWriteItem};
use aws_sdk_dynamodb::Client as DynamoClient;

use super::model::{
    photo_storage_paths, validate_extensions, Execution, ExecutionPhoto, ExecutionReceipt,
};
use crate::keys;

/// Record a member's execution of a task together with its two photo
/// rows in a single transaction. Either everything lands or nothing
/// does, so a crash between writes can never leave a photo-less
/// execution behind.
pub async fn record_execution(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
    user_id: &str,
    photo_extensions: &[String],
) -> Result<ExecutionReceipt, String> {
    validate_extensions(photo_extensions)?;

    let execution_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now();
    let now_rfc3339 = now.to_rfc3339();
    let now_millis = now.timestamp_millis();

    let execution_put = Put::builder()
        .table_name(table_name)
        .item("PK", AttributeValue::S(keys::task_scope_pk(task_id)))
        .item("SK", AttributeValue::S(keys::execution_sk(user_id)))
        .item("execution_id", AttributeValue::S(execution_id.clone()))
        .item("completed_at", AttributeValue::S(now_rfc3339.clone()))
        .condition_expression("attribute_not_exists(SK)")
        .build()
        .map_err(|e| format!("DynamoDB transaction build error: {}", e))?;

    let mut transact_items = vec![TransactWriteItem::builder().put(execution_put).build()];

    let photo_paths =
        photo_storage_paths(task_id, &execution_id, user_id, now_millis, photo_extensions);
    for (index, storage_path) in photo_paths.iter().enumerate() {
        let photo_put = Put::builder()
            .table_name(table_name)
            .item("PK", AttributeValue::S(keys::task_scope_pk(task_id)))
            .item(
                "SK",
                AttributeValue::S(keys::photo_sk(&execution_id, index + 1)),
            )
            .item("storage_path", AttributeValue::S(storage_path.clone()))
            .item("uploaded_at", AttributeValue::S(now_rfc3339.clone()))
            .build()
            .map_err(|e| format!("DynamoDB transaction build error: {}", e))?;
        transact_items.push(TransactWriteItem::builder().put(photo_put).build());
    }

    let outcome = client
        .transact_write_items()
        .set_transact_items(Some(transact_items))
        .send()
        .await;

    match outcome {
        Ok(_) => Ok(ExecutionReceipt {
            execution: Execution {
                execution_id,
                task_id: task_id.to_string(),
                user_id: user_id.to_string(),
                completed_at: now_rfc3339,
            },
            photo_paths,
        }),
        Err(e) => {
            let canceled = e
                .as_service_error()
                .map(|se| se.is_transaction_canceled_exception())
                .unwrap_or(false);
            if canceled {
                Err("Execution already recorded".to_string())
            } else {
                Err(format!("DynamoDB transact_write_items error: {}", e))
            }
        }
    }
}

/// Load the executions recorded for a task
pub async fn load_executions_for_task(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
) -> Result<Vec<Execution>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
        .expression_attribute_values(":pk", AttributeValue::S(keys::task_scope_pk(task_id)))
        .expression_attribute_values(":sk_prefix", AttributeValue::S("EXECUTION#".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut executions = Vec::new();
    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            if let Some(user_id) = sk.strip_prefix("EXECUTION#") {
                executions.push(Execution {
                    execution_id: item
                        .get("execution_id")
                        .and_then(|v| v.as_s().ok())
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                    task_id: task_id.to_string(),
                    user_id: user_id.to_string(),
                    completed_at: item
                        .get("completed_at")
                        .and_then(|v| v.as_s().ok())
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                });
            }
        }
    }

    Ok(executions)
}

/// Load the photo rows recorded for a task, across all of its executions
pub async fn load_photos_for_task(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
) -> Result<Vec<ExecutionPhoto>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
        .expression_attribute_values(":pk", AttributeValue::S(keys::task_scope_pk(task_id)))
        .expression_attribute_values(":sk_prefix", AttributeValue::S("PHOTO#".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut photos = Vec::new();
    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            let execution_id = sk
                .strip_prefix("PHOTO#")
                .and_then(|rest| rest.rsplit_once('#'))
                .map(|(eid, _)| eid.to_string())
                .unwrap_or_default();
            photos.push(ExecutionPhoto {
                task_id: task_id.to_string(),
                execution_id,
                storage_path: item
                    .get("storage_path")
                    .and_then(|v| v.as_s().ok())
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                uploaded_at: item
                    .get("uploaded_at")
                    .and_then(|v| v.as_s().ok())
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
            });
        }
    }

    Ok(photos)
}
