use aws_sdk_dynamodb::Client as DynamoClient;
use consensus_block::{board, members as roster, proposals as proposal_views, votes};
use lambda_http::http::header::HeaderValue;
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use lar_atoms as atoms;
use lar_shared::{auth, invites, AppState};
use serde::Deserialize;
use std::env;
use std::sync::Arc;

fn with_cors_headers(mut resp: Response<Body>) -> Response<Body> {
    let headers = resp.headers_mut();
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type,Authorization"),
    );
    resp
}

fn finalize_response(resp: Result<Response<Body>, Error>) -> Result<Response<Body>, Error> {
    resp.map(with_cors_headers)
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(serde_json::json!({"error": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}

fn forbidden() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::FORBIDDEN)
        .header("Content-Type", "application/json")
        .body(
            serde_json::json!({"error": "Not a member of this household"})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

fn internal(e: String) -> Error {
    Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
        as Box<dyn std::error::Error + Send + Sync>
}

#[derive(Deserialize, Default)]
struct ActivatePayload {
    #[serde(default)]
    name: Option<String>,
}

/// Every household-scoped route requires an active membership
async fn is_active_member(
    dynamo: &DynamoClient,
    table_name: &str,
    household_id: &str,
    user_id: &str,
) -> Result<bool, Error> {
    atoms::members::service::is_active_member(dynamo, table_name, household_id, user_id)
        .await
        .map_err(internal)
}

/// Main Lambda handler - routes requests to the household endpoints
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method().clone();
    let path = event.uri().path().to_string();
    let body = event.body();
    tracing::info!("API Lambda invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == Method::OPTIONS {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return Ok(with_cors_headers(resp));
    }

    let table_name = env::var("TABLE_NAME").unwrap_or_else(|_| "lar".to_string());
    let auth_header = event
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    // Invite route resolves its own token (header or body fallback)
    if path == "/invites" && method == Method::POST {
        let user_pool_id = env::var("USER_POOL_ID").expect("USER_POOL_ID must be set");
        let from_email = env::var("INVITE_FROM_EMAIL").expect("INVITE_FROM_EMAIL must be set");
        let app_base_url = env::var("APP_BASE_URL").expect("APP_BASE_URL must be set");

        return finalize_response(
            invites::create_invite(
                &state.cognito_client,
                &state.dynamo_client,
                &state.ses_client,
                &table_name,
                &user_pool_id,
                &from_email,
                &app_base_url,
                auth_header,
                body,
            )
            .await,
        );
    }

    // Everything else requires a valid bearer token
    let caller = match auth::authenticate_request(&state.cognito_client, auth_header).await {
        Ok(ctx) => ctx,
        Err(resp) => return Ok(with_cors_headers(resp)),
    };

    let dynamo = &state.dynamo_client;
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let resp = match (&method, parts.as_slice()) {
        (&Method::GET, ["me"]) => {
            match atoms::users::service::get_profile(dynamo, &table_name, &caller.user_id).await {
                Ok(profile) => Ok(Response::builder()
                    .status(StatusCode::OK)
                    .header("Content-Type", "application/json")
                    .body(serde_json::to_string(&profile)?.into())
                    .map_err(Box::new)?),
                Err(e) if e == "Profile not found" => Ok(Response::builder()
                    .status(StatusCode::OK)
                    .header("Content-Type", "application/json")
                    .body(
                        serde_json::json!({
                            "user_id": caller.user_id,
                            "email": caller.email,
                        })
                        .to_string()
                        .into(),
                    )
                    .map_err(Box::new)?),
                Err(e) => Err(internal(e)),
            }
        }

        (&Method::POST, ["households"]) => {
            atoms::households::http::create_household_handler(
                dynamo,
                &table_name,
                &caller.user_id,
                body,
            )
            .await
        }
        (&Method::GET, ["households"]) => {
            atoms::households::http::list_households_handler(dynamo, &table_name, &caller.user_id)
                .await
        }
        (&Method::GET, ["households", household_id]) => {
            // Pending members may look at the household they were invited to
            let membership = atoms::members::service::get_membership(
                dynamo,
                &table_name,
                household_id,
                &caller.user_id,
            )
            .await
            .map_err(internal)?;
            if membership.is_none() {
                return finalize_response(forbidden());
            }
            atoms::households::http::get_household_handler(dynamo, &table_name, household_id).await
        }

        (&Method::GET, ["households", household_id, "members"]) => {
            if !is_active_member(dynamo, &table_name, household_id, &caller.user_id).await? {
                return finalize_response(forbidden());
            }
            roster::household_roster(dynamo, &table_name, household_id).await
        }
        (&Method::POST, ["households", household_id, "members", "activate"]) => {
            let activated = atoms::members::http::activate_member_handler(
                dynamo,
                &table_name,
                household_id,
                &caller.user_id,
            )
            .await?;
            // The invitee's chosen display name arrives with the acceptance
            if activated.status() == StatusCode::OK {
                let payload: ActivatePayload =
                    serde_json::from_slice(body).unwrap_or_default();
                if let Some(name) = payload.name.filter(|n| !n.trim().is_empty()) {
                    atoms::users::service::put_profile(
                        dynamo,
                        &table_name,
                        &atoms::users::model::Profile {
                            user_id: caller.user_id.clone(),
                            name,
                            email: caller.email.clone(),
                            created_at: chrono::Utc::now().to_rfc3339(),
                        },
                    )
                    .await
                    .map_err(internal)?;
                }
            }
            Ok(activated)
        }
        (&Method::POST, ["households", household_id, "members", "deactivate"]) => {
            if !is_active_member(dynamo, &table_name, household_id, &caller.user_id).await? {
                return finalize_response(forbidden());
            }
            atoms::members::http::deactivate_member_handler(
                dynamo,
                &table_name,
                household_id,
                &caller.user_id,
            )
            .await
        }

        (&Method::GET, ["households", household_id, "board"]) => {
            if !is_active_member(dynamo, &table_name, household_id, &caller.user_id).await? {
                return finalize_response(forbidden());
            }
            board::household_board(dynamo, &table_name, household_id).await
        }
        (&Method::GET, ["households", household_id, "tasks"]) => {
            if !is_active_member(dynamo, &table_name, household_id, &caller.user_id).await? {
                return finalize_response(forbidden());
            }
            atoms::tasks::http::list_tasks_handler(dynamo, &table_name, household_id).await
        }
        (&Method::GET, ["households", household_id, "tasks", task_id]) => {
            if !is_active_member(dynamo, &table_name, household_id, &caller.user_id).await? {
                return finalize_response(forbidden());
            }
            atoms::tasks::http::get_task_handler(dynamo, &table_name, household_id, task_id).await
        }
        (&Method::GET, ["households", household_id, "tasks", task_id, "executions"]) => {
            if !is_active_member(dynamo, &table_name, household_id, &caller.user_id).await? {
                return finalize_response(forbidden());
            }
            match atoms::tasks::service::get_task(dynamo, &table_name, household_id, task_id).await
            {
                Ok(_) => {
                    atoms::executions::http::list_task_executions_handler(
                        dynamo,
                        &table_name,
                        task_id,
                    )
                    .await
                }
                Err(e) if e == "Task not found" => not_found(),
                Err(e) => Err(internal(e)),
            }
        }
        (&Method::POST, ["households", household_id, "tasks", task_id, "executions"]) => {
            if !is_active_member(dynamo, &table_name, household_id, &caller.user_id).await? {
                return finalize_response(forbidden());
            }
            // The task must belong to this household before anything is written
            match atoms::tasks::service::get_task(dynamo, &table_name, household_id, task_id).await
            {
                Ok(_) => {
                    atoms::executions::http::record_execution_handler(
                        dynamo,
                        &table_name,
                        task_id,
                        &caller.user_id,
                        std::str::from_utf8(body).unwrap_or(""),
                    )
                    .await
                }
                Err(e) if e == "Task not found" => not_found(),
                Err(e) => Err(internal(e)),
            }
        }

        (&Method::POST, ["households", household_id, "proposals"]) => {
            if !is_active_member(dynamo, &table_name, household_id, &caller.user_id).await? {
                return finalize_response(forbidden());
            }
            atoms::proposals::http::create_proposal_handler(
                dynamo,
                &table_name,
                household_id,
                &caller.user_id,
                std::str::from_utf8(body).unwrap_or(""),
            )
            .await
        }
        (&Method::GET, ["households", household_id, "proposals"]) => {
            if !is_active_member(dynamo, &table_name, household_id, &caller.user_id).await? {
                return finalize_response(forbidden());
            }
            proposal_views::pending_proposals(dynamo, &table_name, household_id, &caller.user_id)
                .await
        }
        (&Method::POST, ["households", household_id, "proposals", proposal_id, "approvals"]) => {
            votes::approve_proposal(
                dynamo,
                &table_name,
                household_id,
                proposal_id,
                &caller.user_id,
            )
            .await
        }
        (&Method::POST, ["households", household_id, "proposals", proposal_id, "reject"]) => {
            votes::reject_proposal(
                dynamo,
                &table_name,
                household_id,
                proposal_id,
                &caller.user_id,
            )
            .await
        }

        _ => not_found(),
    };

    finalize_response(resp)
}
