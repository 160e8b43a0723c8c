use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};
use lar_atoms::{members, users};
use std::collections::HashMap;

use crate::types::MemberView;

/// List the household roster joined with the user directory, so the
/// client gets names and emails alongside the membership flags
pub async fn household_roster(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
) -> Result<Response<Body>, Error> {
    let memberships = members::service::load_members(client, table_name, household_id)
        .await
        .map_err(|e| Box::new(std::io::Error::new(std::io::ErrorKind::Other, e)) as Box<dyn std::error::Error + Send + Sync>)?;

    let user_ids: Vec<String> = memberships.iter().map(|m| m.user_id.clone()).collect();
    let profiles = users::service::load_profiles(client, table_name, &user_ids)
        .await
        .map_err(|e| Box::new(std::io::Error::new(std::io::ErrorKind::Other, e)) as Box<dyn std::error::Error + Send + Sync>)?;

    let mut by_user: HashMap<String, users::model::Profile> = profiles
        .into_iter()
        .map(|p| (p.user_id.clone(), p))
        .collect();

    let roster: Vec<MemberView> = memberships
        .into_iter()
        .map(|membership| {
            let profile = by_user.remove(&membership.user_id);
            MemberView {
                membership,
                name: profile.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
                email: profile.map(|p| p.email).unwrap_or_default(),
            }
        })
        .collect();

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(&roster)?.into())
        .map_err(Box::new)?)
}
