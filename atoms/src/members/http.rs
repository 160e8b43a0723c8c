use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use super::service;

/// Accept an invite: the authenticated user activates their own membership
pub async fn activate_member_handler(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    user_id: &str,
) -> Result<Response<Body>, Error> {
    match service::activate_member(client, table_name, household_id, user_id).await {
        Ok(()) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({"ok": true}).to_string().into())
            .map_err(Box::new)?),
        Err(e) if e == "Membership not found" => Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({"error": "Not found"}).to_string().into())
            .map_err(Box::new)?),
        Err(e) => Err(Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
            as Box<dyn std::error::Error + Send + Sync>),
    }
}

/// Leave a household: the authenticated user deactivates their own
/// membership. The row stays, so their vote history and executions
/// remain attributable.
pub async fn deactivate_member_handler(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    user_id: &str,
) -> Result<Response<Body>, Error> {
    match service::deactivate_member(client, table_name, household_id, user_id).await {
        Ok(()) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({"ok": true}).to_string().into())
            .map_err(Box::new)?),
        Err(e) if e == "Membership not found" => Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({"error": "Not found"}).to_string().into())
            .map_err(Box::new)?),
        Err(e) => Err(Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
            as Box<dyn std::error::Error + Send + Sync>),
    }
}
