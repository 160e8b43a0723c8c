use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};
use lar_atoms::members::model::active_member_ids;
use lar_atoms::{approvals, members, proposals, users};
use serde::Serialize;

use crate::tally::Tally;

/// One pending proposal as the approvals screen shows it: the payload
/// plus the vote standing and the author's display name
#[derive(Debug, Serialize)]
pub struct PendingProposal {
    #[serde(flatten)]
    pub proposal: proposals::model::Proposal,
    pub author_name: String,
    pub approvals: usize,
    pub required: usize,
    pub user_has_voted: bool,
}

/// Pending proposals joined with their tallies. One roster read serves
/// every proposal; votes are fetched once per proposal.
pub async fn pending_proposals(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    viewer_id: &str,
) -> Result<Response<Body>, Error> {
    let internal = |e: String| {
        Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
            as Box<dyn std::error::Error + Send + Sync>
    };

    let proposal_rows =
        proposals::service::load_pending_proposals(client, table_name, household_id)
            .await
            .map_err(internal)?;
    let memberships = members::service::load_members(client, table_name, household_id)
        .await
        .map_err(internal)?;
    let active = active_member_ids(&memberships);

    let vote_sets = futures::future::join_all(proposal_rows.iter().map(|p| {
        approvals::service::load_approvals_for_proposal(client, table_name, &p.proposal_id)
    }))
    .await;

    let mut entries = Vec::new();
    for (proposal, votes) in proposal_rows.into_iter().zip(vote_sets) {
        let votes = votes.map_err(internal)?;
        let approver_ids: Vec<String> = votes.iter().map(|a| a.user_id.clone()).collect();
        let tally = Tally::count(&approver_ids, &active);
        let user_has_voted = approver_ids.iter().any(|id| id == viewer_id);

        let author_name =
            match users::service::get_profile(client, table_name, &proposal.created_by).await {
                Ok(profile) => profile.name,
                Err(e) if e == "Profile not found" => String::new(),
                Err(e) => return Err(internal(e)),
            };

        entries.push(PendingProposal {
            proposal,
            author_name,
            approvals: tally.approvals,
            required: tally.required,
            user_has_voted,
        });
    }

    // Newest first, matching the approvals screen
    entries.sort_by(|a, b| b.proposal.created_at.cmp(&a.proposal.created_at));

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(&entries)?.into())
        .map_err(Box::new)?)
}
