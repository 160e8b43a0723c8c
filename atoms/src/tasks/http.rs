use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use super::service;

/// List tasks of a household (without the assignee/execution join -
/// the board endpoint in the consensus block serves the joined view)
pub async fn list_tasks_handler(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
) -> Result<Response<Body>, Error> {
    let tasks = service::load_tasks_for_household(client, table_name, household_id)
        .await
        .map_err(|e| Box::new(std::io::Error::new(std::io::ErrorKind::Other, e)) as Box<dyn std::error::Error + Send + Sync>)?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(&tasks)?.into())
        .map_err(Box::new)?)
}

/// Get a single task
pub async fn get_task_handler(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    task_id: &str,
) -> Result<Response<Body>, Error> {
    match service::get_task(client, table_name, household_id, task_id).await {
        Ok(task) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&task)?.into())
            .map_err(Box::new)?),
        Err(e) if e == "Task not found" => Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({"error": "Not found"}).to_string().into())
            .map_err(Box::new)?),
        Err(e) => Err(Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
            as Box<dyn std::error::Error + Send + Sync>),
    }
}
