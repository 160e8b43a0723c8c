use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use super::model::Approval;
use crate::keys;

/// Record a member's approval. The conditional put makes a second vote
/// from the same member a visible error instead of a silent overwrite.
pub async fn cast_approval(
    client: &DynamoClient,
    table_name: &str,
    proposal_id: &str,
    user_id: &str,
) -> Result<Approval, String> {
    let now = chrono::Utc::now().to_rfc3339();

    let outcome = client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S(keys::proposal_scope_pk(proposal_id)))
        .item("SK", AttributeValue::S(keys::approval_sk(user_id)))
        .item("created_at", AttributeValue::S(now.clone()))
        .condition_expression("attribute_not_exists(SK)")
        .send()
        .await;

    match outcome {
        Ok(_) => Ok(Approval {
            proposal_id: proposal_id.to_string(),
            user_id: user_id.to_string(),
            created_at: now,
        }),
        Err(e) => {
            let already_voted = e
                .as_service_error()
                .map(|se| se.is_conditional_check_failed_exception())
                .unwrap_or(false);
            if already_voted {
                Err("Vote already cast".to_string())
            } else {
                Err(format!("DynamoDB put_item error: {}", e))
            }
        }
    }
}

/// Load every approval recorded for a proposal
pub async fn load_approvals_for_proposal(
    client: &DynamoClient,
    table_name: &str,
    proposal_id: &str,
) -> Result<Vec<Approval>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
        .expression_attribute_values(":pk", AttributeValue::S(keys::proposal_scope_pk(proposal_id)))
        .expression_attribute_values(":sk_prefix", AttributeValue::S("APPROVAL#".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut approvals = Vec::new();
    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            if let Some(user_id) = sk.strip_prefix("APPROVAL#") {
                approvals.push(Approval {
                    proposal_id: proposal_id.to_string(),
                    user_id: user_id.to_string(),
                    created_at: item
                        .get("created_at")
                        .and_then(|v| v.as_s().ok())
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                });
            }
        }
    }

    Ok(approvals)
}
