use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use super::model::CreateProposalPayload;
use super::service;

/// Create a proposal authored by the authenticated member
pub async fn create_proposal_handler(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    author_id: &str,
    body: &str,
) -> Result<Response<Body>, Error> {
    let payload: CreateProposalPayload = match serde_json::from_str(body) {
        Ok(p) => p,
        Err(_) => {
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "application/json")
                .body(serde_json::json!({"error": "Invalid request body"}).to_string().into())
                .map_err(Box::new)?)
        }
    };

    match service::create_proposal(client, table_name, household_id, author_id, payload).await {
        Ok(proposal) => Ok(Response::builder()
            .status(StatusCode::CREATED)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&proposal)?.into())
            .map_err(Box::new)?),
        // Validation failures read like form errors, not server faults
        Err(e) if !e.starts_with("DynamoDB") => Ok(Response::builder()
            .status(StatusCode::UNPROCESSABLE_ENTITY)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({"error": e}).to_string().into())
            .map_err(Box::new)?),
        Err(e) => Err(Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
            as Box<dyn std::error::Error + Send + Sync>),
    }
}
