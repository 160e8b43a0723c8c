use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};
use lar_atoms::members::model::active_member_ids;
use lar_atoms::{approvals, members, proposals, tasks};

use crate::tally::Tally;
use crate::types::VoteOutcome;

fn json_response(status: StatusCode, body: serde_json::Value) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(body.to_string().into())
        .map_err(Box::new)?)
}

fn internal(e: String) -> Error {
    Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
        as Box<dyn std::error::Error + Send + Sync>
}

/// Materialize an approved proposal against the task list
async fn apply_proposal(
    client: &DynamoClient,
    table_name: &str,
    proposal: &proposals::model::Proposal,
) -> Result<(), String> {
    let draft = &proposal.payload;
    match proposal.kind.as_str() {
        "create" => {
            // The proposal id doubles as the task id so a replayed apply
            // rewrites the same item instead of minting a second task
            tasks::service::create_task_from_draft(
                client,
                table_name,
                &proposal.household_id,
                &proposal.proposal_id,
                draft,
            )
            .await?;
        }
        "edit" => {
            let task_id = draft.task_id.as_deref().unwrap_or_default();
            tasks::service::apply_edit(client, table_name, &proposal.household_id, task_id, draft)
                .await?;
        }
        "delete" => {
            let task_id = draft.task_id.as_deref().unwrap_or_default();
            tasks::service::delete_task(client, table_name, &proposal.household_id, task_id)
                .await?;
        }
        other => return Err(format!("Unknown proposal kind: {}", other)),
    }
    Ok(())
}

/// Collapse the finalize result after the payload has been applied.
/// Losing the conditional write to a racing last vote still reads as
/// approved; only real store failures propagate.
fn finalized_status(outcome: Result<(), String>) -> Result<String, String> {
    match outcome {
        Ok(()) => Ok("approved".to_string()),
        Err(e) if e == "Proposal is not pending" => Ok("approved".to_string()),
        Err(e) => Err(e),
    }
}

/// Cast the caller's approval. When the vote completes the set of
/// active members, the payload is applied and the proposal finalized in
/// the same request. Apply runs before finalize: a failed apply leaves
/// the proposal pending, and a later approve attempt (even a duplicate
/// vote) re-evaluates unanimity and retries the apply.
pub async fn approve_proposal(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    proposal_id: &str,
    user_id: &str,
) -> Result<Response<Body>, Error> {
    let is_member = members::service::is_active_member(client, table_name, household_id, user_id)
        .await
        .map_err(internal)?;
    if !is_member {
        return json_response(
            StatusCode::FORBIDDEN,
            serde_json::json!({"error": "Only active members can vote"}),
        );
    }

    let proposal =
        match proposals::service::get_proposal(client, table_name, household_id, proposal_id).await
        {
            Ok(p) => p,
            Err(e) if e == "Proposal not found" => {
                return json_response(
                    StatusCode::NOT_FOUND,
                    serde_json::json!({"error": "Not found"}),
                )
            }
            Err(e) => return Err(internal(e)),
        };
    if proposal.status != "pending" {
        return json_response(
            StatusCode::CONFLICT,
            serde_json::json!({"error": "Proposal is not pending"}),
        );
    }

    // A duplicate vote is still refused, but only after the tally below
    // ran once more, so a unanimity whose apply failed earlier gets
    // another chance to land
    let duplicate_vote =
        match approvals::service::cast_approval(client, table_name, proposal_id, user_id).await {
            Ok(_) => false,
            Err(e) if e == "Vote already cast" => true,
            Err(e) => return Err(internal(e)),
        };

    let memberships = members::service::load_members(client, table_name, household_id)
        .await
        .map_err(internal)?;
    let active = active_member_ids(&memberships);
    let votes = approvals::service::load_approvals_for_proposal(client, table_name, proposal_id)
        .await
        .map_err(internal)?;
    let approver_ids: Vec<String> = votes.into_iter().map(|a| a.user_id).collect();
    let tally = Tally::count(&approver_ids, &active);

    let mut status = "pending".to_string();
    if tally.is_unanimous() {
        apply_proposal(client, table_name, &proposal)
            .await
            .map_err(internal)?;
        status = finalized_status(
            proposals::service::finalize_proposal(
                client,
                table_name,
                household_id,
                proposal_id,
                "approved",
            )
            .await,
        )
        .map_err(internal)?;
        tracing::info!(proposal_id, kind = %proposal.kind, "proposal approved and applied");
    }

    if duplicate_vote {
        return json_response(
            StatusCode::CONFLICT,
            serde_json::json!({"error": "Vote already cast"}),
        );
    }

    let outcome = VoteOutcome {
        proposal_id: proposal_id.to_string(),
        status,
        approvals: tally.approvals,
        required: tally.required,
    };

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(&outcome)?.into())
        .map_err(Box::new)?)
}

/// A single dissent settles the matter: any active member can reject a
/// pending proposal outright, without waiting for the others.
pub async fn reject_proposal(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    proposal_id: &str,
    user_id: &str,
) -> Result<Response<Body>, Error> {
    let is_member = members::service::is_active_member(client, table_name, household_id, user_id)
        .await
        .map_err(internal)?;
    if !is_member {
        return json_response(
            StatusCode::FORBIDDEN,
            serde_json::json!({"error": "Only active members can vote"}),
        );
    }

    if let Err(e) =
        proposals::service::get_proposal(client, table_name, household_id, proposal_id).await
    {
        if e == "Proposal not found" {
            return json_response(
                StatusCode::NOT_FOUND,
                serde_json::json!({"error": "Not found"}),
            );
        }
        return Err(internal(e));
    }

    match proposals::service::finalize_proposal(
        client,
        table_name,
        household_id,
        proposal_id,
        "rejected",
    )
    .await
    {
        Ok(()) => {
            tracing::info!(proposal_id, rejected_by = user_id, "proposal rejected");
            json_response(
                StatusCode::OK,
                serde_json::json!({"proposal_id": proposal_id, "status": "rejected"}),
            )
        }
        Err(e) if e == "Proposal is not pending" => {
            json_response(StatusCode::CONFLICT, serde_json::json!({"error": e}))
        }
        Err(e) => Err(internal(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applied_then_finalized_reads_approved() {
        assert_eq!(finalized_status(Ok(())).unwrap(), "approved");
    }

    #[test]
    fn losing_the_finalize_race_still_reads_approved() {
        let outcome = finalized_status(Err("Proposal is not pending".to_string()));
        assert_eq!(outcome.unwrap(), "approved");
    }

    #[test]
    fn store_failures_during_finalize_propagate() {
        let outcome = finalized_status(Err("DynamoDB update_item error: timeout".to_string()));
        assert!(outcome.is_err());
    }
}
