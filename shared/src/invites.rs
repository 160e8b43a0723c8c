use aws_sdk_cognitoidentityprovider::types::{AttributeType, MessageActionType};
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_sesv2::Client as SesClient;
use lambda_http::{http::StatusCode, Body, Error, Response};
use lar_atoms::{households, members, users};
use serde::Deserialize;

use crate::auth;
use crate::email::send_invite_email;

#[derive(Deserialize)]
pub struct InviteRequest {
    pub email: String,
    pub household_id: String,
    /// Where the accept link should send the invitee; defaults to the
    /// app's own accept page
    #[serde(default)]
    pub redirect_to: Option<String>,
    /// Fallback for clients that cannot set an Authorization header
    #[serde(default)]
    pub access_token: Option<String>,
}

fn invite_error(status: StatusCode, message: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(
            serde_json::json!({"ok": false, "error": message})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

fn internal(e: String) -> Error {
    Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
        as Box<dyn std::error::Error + Send + Sync>
}

/// Find the Cognito user for an email, creating a suppressed-email
/// account when none exists yet. Returns the user's subject id.
async fn find_or_create_user(
    cognito_client: &CognitoClient,
    user_pool_id: &str,
    email: &str,
) -> Result<String, String> {
    let listing = cognito_client
        .list_users()
        .user_pool_id(user_pool_id)
        .filter(format!("email = \"{}\"", email))
        .limit(1)
        .send()
        .await
        .map_err(|e| format!("Cognito list_users error: {}", e))?;

    if let Some(user) = listing.users().first() {
        for attribute in user.attributes() {
            if attribute.name() == "sub" {
                return Ok(attribute.value().unwrap_or_default().to_string());
            }
        }
        return Err("Existing user has no subject attribute".to_string());
    }

    // The invite email below replaces Cognito's own welcome message
    let created = cognito_client
        .admin_create_user()
        .user_pool_id(user_pool_id)
        .username(email)
        .user_attributes(
            AttributeType::builder()
                .name("email")
                .value(email)
                .build()
                .map_err(|e| format!("Cognito attribute build error: {}", e))?,
        )
        .user_attributes(
            AttributeType::builder()
                .name("email_verified")
                .value("true")
                .build()
                .map_err(|e| format!("Cognito attribute build error: {}", e))?,
        )
        .message_action(MessageActionType::Suppress)
        .send()
        .await
        .map_err(|e| format!("Cognito admin_create_user error: {}", e))?;

    created
        .user()
        .map(|user| {
            user.attributes()
                .iter()
                .find(|a| a.name() == "sub")
                .and_then(|a| a.value())
                .unwrap_or_default()
                .to_string()
        })
        .filter(|sub| !sub.is_empty())
        .ok_or_else(|| "Created user has no subject attribute".to_string())
}

/// Invite someone into a household by email. Creates the account if
/// needed, registers a pending membership and sends the accept link.
/// Re-inviting the same email is harmless.
#[allow(clippy::too_many_arguments)]
pub async fn create_invite(
    cognito_client: &CognitoClient,
    dynamo_client: &DynamoClient,
    ses_client: &SesClient,
    table_name: &str,
    user_pool_id: &str,
    from_email: &str,
    app_base_url: &str,
    auth_header: Option<&str>,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let body_str = match body {
        Body::Text(text) => text.as_str(),
        Body::Binary(bytes) => std::str::from_utf8(bytes).unwrap_or(""),
        Body::Empty => "",
    };

    let request: InviteRequest = match serde_json::from_str(body_str) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!("Failed to parse invite request: {}", e);
            return invite_error(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    let token = auth::bearer_token(auth_header).or(request.access_token.clone());
    let Some(token) = token else {
        return invite_error(StatusCode::UNAUTHORIZED, "Missing access token");
    };
    let caller = match auth::resolve_user(cognito_client, &token).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::warn!("Invite token validation failed: {}", e);
            return invite_error(StatusCode::UNAUTHORIZED, "Invalid access token");
        }
    };

    if request.email.is_empty() || !request.email.contains('@') {
        return invite_error(StatusCode::BAD_REQUEST, "A valid email is required");
    }
    if request.household_id.is_empty() {
        return invite_error(StatusCode::BAD_REQUEST, "household_id is required");
    }

    let household = match households::service::get_household(
        dynamo_client,
        table_name,
        &request.household_id,
    )
    .await
    {
        Ok(h) => h,
        Err(e) if e == "Household not found" => {
            return invite_error(StatusCode::NOT_FOUND, "Household not found")
        }
        Err(e) => return Err(internal(e)),
    };

    let caller_is_member = members::service::is_active_member(
        dynamo_client,
        table_name,
        &request.household_id,
        &caller.user_id,
    )
    .await
    .map_err(internal)?;
    if !caller_is_member {
        return invite_error(StatusCode::FORBIDDEN, "Only active members can invite");
    }

    let invited_user_id = find_or_create_user(cognito_client, user_pool_id, &request.email)
        .await
        .map_err(internal)?;

    // Seed the directory entry so the roster can show the invitee
    // before they ever log in; a user who already has one keeps it
    let display_name = request
        .email
        .split('@')
        .next()
        .unwrap_or_default()
        .to_string();
    users::service::seed_profile(
        dynamo_client,
        table_name,
        &users::model::Profile {
            user_id: invited_user_id.clone(),
            name: display_name,
            email: request.email.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        },
    )
    .await
    .map_err(internal)?;

    members::service::upsert_pending_member(
        dynamo_client,
        table_name,
        &request.household_id,
        &invited_user_id,
    )
    .await
    .map_err(internal)?;

    let accept_url = match &request.redirect_to {
        Some(url) if !url.is_empty() => url.clone(),
        _ => format!(
            "{}/accept-invite?household_id={}",
            app_base_url.trim_end_matches('/'),
            request.household_id
        ),
    };
    send_invite_email(
        ses_client,
        from_email,
        &request.email,
        &household.name,
        &accept_url,
    )
    .await
    .map_err(internal)?;

    tracing::info!(
        household_id = %request.household_id,
        invited_by = %caller.user_id,
        "invite sent"
    );

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(
            serde_json::json!({"ok": true, "user_id": invited_user_id})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}
