use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::model::{validate_draft, CreateProposalPayload, Proposal};
use crate::keys;

fn proposal_from_item(
    household_id: &str,
    proposal_id: &str,
    item: &HashMap<String, AttributeValue>,
) -> Proposal {
    Proposal {
        proposal_id: proposal_id.to_string(),
        household_id: household_id.to_string(),
        kind: item
            .get("kind")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        payload: item
            .get("payload")
            .and_then(|v| v.as_s().ok())
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default(),
        created_by: item
            .get("created_by")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        status: item
            .get("proposal_status")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        created_at: item
            .get("created_at")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
    }
}

/// Append a proposal to the household's ledger with status "pending"
pub async fn create_proposal(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    author_id: &str,
    payload: CreateProposalPayload,
) -> Result<Proposal, String> {
    validate_draft(&payload.kind, &payload.payload)?;

    let proposal_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let payload_json = serde_json::to_string(&payload.payload)
        .map_err(|e| format!("Payload serialization error: {}", e))?;

    client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S(keys::household_scope_pk(household_id)))
        .item("SK", AttributeValue::S(keys::proposal_sk(&proposal_id)))
        .item("kind", AttributeValue::S(payload.kind.clone()))
        .item("payload", AttributeValue::S(payload_json))
        .item("created_by", AttributeValue::S(author_id.to_string()))
        .item("proposal_status", AttributeValue::S("pending".to_string()))
        .item("created_at", AttributeValue::S(now.clone()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB put_item error: {}", e))?;

    Ok(Proposal {
        proposal_id,
        household_id: household_id.to_string(),
        kind: payload.kind,
        payload: payload.payload,
        created_by: author_id.to_string(),
        status: "pending".to_string(),
        created_at: now,
    })
}

/// Load the proposals of a household still awaiting consensus
pub async fn load_pending_proposals(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
) -> Result<Vec<Proposal>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
        .filter_expression("proposal_status = :pending")
        .expression_attribute_values(":pk", AttributeValue::S(keys::household_scope_pk(household_id)))
        .expression_attribute_values(":sk_prefix", AttributeValue::S("PROPOSAL#".to_string()))
        .expression_attribute_values(":pending", AttributeValue::S("pending".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut proposals = Vec::new();
    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            if let Some(proposal_id) = sk.strip_prefix("PROPOSAL#") {
                proposals.push(proposal_from_item(household_id, proposal_id, item));
            }
        }
    }

    Ok(proposals)
}

/// Get a specific proposal
pub async fn get_proposal(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    proposal_id: &str,
) -> Result<Proposal, String> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(keys::household_scope_pk(household_id)))
        .key("SK", AttributeValue::S(keys::proposal_sk(proposal_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    if let Some(item) = result.item() {
        Ok(proposal_from_item(household_id, proposal_id, item))
    } else {
        Err("Proposal not found".to_string())
    }
}

/// Move a pending proposal to its terminal status. The condition keeps
/// approved/rejected proposals terminal even under racing finalizers.
pub async fn finalize_proposal(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    proposal_id: &str,
    status: &str,
) -> Result<(), String> {
    let outcome = client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(keys::household_scope_pk(household_id)))
        .key("SK", AttributeValue::S(keys::proposal_sk(proposal_id)))
        .update_expression("SET proposal_status = :status")
        .condition_expression("proposal_status = :pending")
        .expression_attribute_values(":status", AttributeValue::S(status.to_string()))
        .expression_attribute_values(":pending", AttributeValue::S("pending".to_string()))
        .send()
        .await;

    match outcome {
        Ok(_) => Ok(()),
        Err(e) => {
            let not_pending = e
                .as_service_error()
                .map(|se| se.is_conditional_check_failed_exception())
                .unwrap_or(false);
            if not_pending {
                Err("Proposal is not pending".to_string())
            } else {
                Err(format!("DynamoDB update_item error: {}", e))
            }
        }
    }
}
