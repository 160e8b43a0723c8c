use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use lambda_http::{http::StatusCode, Body, Response};

/// The caller's identity as resolved from the Cognito access token
pub struct AuthContext {
    pub user_id: String,
    pub email: String,
}

/// Pull the bearer token out of an Authorization header value
pub fn bearer_token(auth_header: Option<&str>) -> Option<String> {
    auth_header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Resolve an access token to the user's subject id and email
pub async fn resolve_user(
    cognito_client: &CognitoClient,
    access_token: &str,
) -> Result<AuthContext, String> {
    let user = cognito_client
        .get_user()
        .access_token(access_token)
        .send()
        .await
        .map_err(|e| format!("Cognito get_user error: {}", e))?;

    let mut user_id = String::new();
    let mut email = String::new();
    for attribute in user.user_attributes() {
        match attribute.name() {
            "sub" => user_id = attribute.value().unwrap_or_default().to_string(),
            "email" => email = attribute.value().unwrap_or_default().to_string(),
            _ => {}
        }
    }

    if user_id.is_empty() {
        return Err("Access token has no subject".to_string());
    }

    Ok(AuthContext { user_id, email })
}

/// Authenticate a request from its Authorization header. On failure the
/// caller gets a ready-made 401 to return as-is.
pub async fn authenticate_request(
    cognito_client: &CognitoClient,
    auth_header: Option<&str>,
) -> Result<AuthContext, Response<Body>> {
    let Some(token) = bearer_token(auth_header) else {
        return Err(unauthorized("Missing access token"));
    };

    match resolve_user(cognito_client, &token).await {
        Ok(ctx) => Ok(ctx),
        Err(e) => {
            tracing::warn!("Token validation failed: {}", e);
            Err(unauthorized("Invalid access token"))
        }
    }
}

fn unauthorized(message: &str) -> Response<Body> {
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header("Content-Type", "application/json")
        .body(serde_json::json!({"error": message}).to_string().into())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_strips_the_scheme() {
        assert_eq!(
            bearer_token(Some("Bearer abc.def.ghi")),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn missing_or_malformed_headers_yield_none() {
        assert_eq!(bearer_token(None), None);
        assert_eq!(bearer_token(Some("Basic dXNlcg==")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
    }
}
