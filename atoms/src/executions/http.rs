use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use super::model::{ExecutionPhoto, RecordExecutionPayload};
use super::service;

/// Record an execution by the authenticated member. Returns the storage
/// paths the client must upload its two photos to.
pub async fn record_execution_handler(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
    user_id: &str,
    body: &str,
) -> Result<Response<Body>, Error> {
    let payload: RecordExecutionPayload = match serde_json::from_str(body) {
        Ok(p) => p,
        Err(_) => {
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "application/json")
                .body(serde_json::json!({"error": "Invalid request body"}).to_string().into())
                .map_err(Box::new)?)
        }
    };

    match service::record_execution(client, table_name, task_id, user_id, &payload.photo_extensions)
        .await
    {
        Ok(receipt) => Ok(Response::builder()
            .status(StatusCode::CREATED)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&receipt)?.into())
            .map_err(Box::new)?),
        Err(e) if e == "Execution already recorded" => Ok(Response::builder()
            .status(StatusCode::CONFLICT)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({"error": e}).to_string().into())
            .map_err(Box::new)?),
        Err(e) if !e.starts_with("DynamoDB") => Ok(Response::builder()
            .status(StatusCode::UNPROCESSABLE_ENTITY)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({"error": e}).to_string().into())
            .map_err(Box::new)?),
        Err(e) => Err(Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
            as Box<dyn std::error::Error + Send + Sync>),
    }
}

/// List the executions recorded for a task, each with its photo rows
pub async fn list_task_executions_handler(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
) -> Result<Response<Body>, Error> {
    let executions = service::load_executions_for_task(client, table_name, task_id)
        .await
        .map_err(|e| Box::new(std::io::Error::new(std::io::ErrorKind::Other, e)) as Box<dyn std::error::Error + Send + Sync>)?;
    let photos = service::load_photos_for_task(client, table_name, task_id)
        .await
        .map_err(|e| Box::new(std::io::Error::new(std::io::ErrorKind::Other, e)) as Box<dyn std::error::Error + Send + Sync>)?;

    let listing: Vec<serde_json::Value> = executions
        .into_iter()
        .map(|execution| {
            let execution_photos: Vec<&ExecutionPhoto> = photos
                .iter()
                .filter(|p| p.execution_id == execution.execution_id)
                .collect();
            serde_json::json!({
                "execution_id": execution.execution_id,
                "task_id": execution.task_id,
                "user_id": execution.user_id,
                "completed_at": execution.completed_at,
                "photos": execution_photos,
            })
        })
        .collect();

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(&listing)?.into())
        .map_err(Box::new)?)
}
