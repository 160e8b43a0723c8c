use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use super::model::CreateHouseholdPayload;
use super::service;
use crate::members;

/// Create a household; the creator joins immediately as an active admin
pub async fn create_household_handler(
    client: &DynamoClient,
    table_name: &str,
    creator_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: CreateHouseholdPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(_) => {
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "application/json")
                .body(serde_json::json!({"error": "Invalid request body"}).to_string().into())
                .map_err(Box::new)?)
        }
    };

    let household = service::create_household(client, table_name, payload)
        .await
        .map_err(|e| Box::new(std::io::Error::new(std::io::ErrorKind::Other, e)) as Box<dyn std::error::Error + Send + Sync>)?;

    members::service::put_active_member(client, table_name, &household.household_id, creator_id, "admin")
        .await
        .map_err(|e| Box::new(std::io::Error::new(std::io::ErrorKind::Other, e)) as Box<dyn std::error::Error + Send + Sync>)?;

    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(&household)?.into())
        .map_err(Box::new)?)
}

/// List the households the authenticated user belongs to, pending
/// memberships included so an invitee can see what they were invited to
pub async fn list_households_handler(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<Response<Body>, Error> {
    let households = service::load_households(client, table_name)
        .await
        .map_err(|e| Box::new(std::io::Error::new(std::io::ErrorKind::Other, e)) as Box<dyn std::error::Error + Send + Sync>)?;

    let mut visible = Vec::new();
    for household in households {
        let membership = members::service::get_membership(
            client,
            table_name,
            &household.household_id,
            user_id,
        )
        .await
        .map_err(|e| Box::new(std::io::Error::new(std::io::ErrorKind::Other, e)) as Box<dyn std::error::Error + Send + Sync>)?;

        if let Some(membership) = membership {
            visible.push(serde_json::json!({
                "household_id": household.household_id,
                "name": household.name,
                "created_at": household.created_at,
                "active": membership.active,
                "role": membership.role,
            }));
        }
    }

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(&visible)?.into())
        .map_err(Box::new)?)
}

/// Get a single household
pub async fn get_household_handler(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
) -> Result<Response<Body>, Error> {
    match service::get_household(client, table_name, household_id).await {
        Ok(household) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&household)?.into())
            .map_err(Box::new)?),
        Err(e) if e == "Household not found" => Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({"error": "Not found"}).to_string().into())
            .map_err(Box::new)?),
        Err(e) => Err(Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
            as Box<dyn std::error::Error + Send + Sync>),
    }
}
