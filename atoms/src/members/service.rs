use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use super::model::Membership;
use crate::keys;

/// Load every membership row of a household, pending ones included
pub async fn load_members(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
) -> Result<Vec<Membership>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
        .expression_attribute_values(":pk", AttributeValue::S(keys::household_scope_pk(household_id)))
        .expression_attribute_values(":sk_prefix", AttributeValue::S("MEMBER#".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut members = Vec::new();
    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            if let Some(user_id) = sk.strip_prefix("MEMBER#") {
                members.push(Membership {
                    household_id: household_id.to_string(),
                    user_id: user_id.to_string(),
                    active: item
                        .get("active")
                        .and_then(|v| v.as_bool().ok())
                        .copied()
                        .unwrap_or(false),
                    role: item
                        .get("role")
                        .and_then(|v| v.as_s().ok())
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "member".to_string()),
                    invited_at: item
                        .get("invited_at")
                        .and_then(|v| v.as_s().ok())
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                });
            }
        }
    }

    Ok(members)
}

/// Get the membership row for a user, if one exists
pub async fn get_membership(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    user_id: &str,
) -> Result<Option<Membership>, String> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(keys::household_scope_pk(household_id)))
        .key("SK", AttributeValue::S(keys::member_sk(user_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    Ok(result.item().map(|item| Membership {
        household_id: household_id.to_string(),
        user_id: user_id.to_string(),
        active: item
            .get("active")
            .and_then(|v| v.as_bool().ok())
            .copied()
            .unwrap_or(false),
        role: item
            .get("role")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| "member".to_string()),
        invited_at: item
            .get("invited_at")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
    }))
}

/// Whether the user is an active member of the household
pub async fn is_active_member(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    user_id: &str,
) -> Result<bool, String> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(keys::household_scope_pk(household_id)))
        .key("SK", AttributeValue::S(keys::member_sk(user_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    Ok(result
        .item()
        .and_then(|item| item.get("active"))
        .and_then(|v| v.as_bool().ok())
        .copied()
        .unwrap_or(false))
}

/// A membership row that already exists is left alone; only real store
/// failures propagate. This is what keeps a re-invite from deactivating
/// an active member.
fn preserve_existing_membership(already_exists: bool, error: String) -> Result<(), String> {
    if already_exists {
        Ok(())
    } else {
        Err(error)
    }
}

/// Register an invited user as a pending (inactive) member. Re-inviting an
/// email that already has a membership row leaves the existing row untouched,
/// so an active member is never silently deactivated by a second invite.
pub async fn upsert_pending_member(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    user_id: &str,
) -> Result<(), String> {
    let now = chrono::Utc::now().to_rfc3339();

    let outcome = client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S(keys::household_scope_pk(household_id)))
        .item("SK", AttributeValue::S(keys::member_sk(user_id)))
        .item("active", AttributeValue::Bool(false))
        .item("role", AttributeValue::S("member".to_string()))
        .item("invited_at", AttributeValue::S(now))
        .condition_expression("attribute_not_exists(SK)")
        .send()
        .await;

    match outcome {
        Ok(_) => Ok(()),
        Err(e) => {
            let already_exists = e
                .as_service_error()
                .map(|se| se.is_conditional_check_failed_exception())
                .unwrap_or(false);
            preserve_existing_membership(already_exists, format!("DynamoDB put_item error: {}", e))
        }
    }
}

/// Register an already-active membership, used for the founder when a
/// household is created
pub async fn put_active_member(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    user_id: &str,
    role: &str,
) -> Result<(), String> {
    let now = chrono::Utc::now().to_rfc3339();

    client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S(keys::household_scope_pk(household_id)))
        .item("SK", AttributeValue::S(keys::member_sk(user_id)))
        .item("active", AttributeValue::Bool(true))
        .item("role", AttributeValue::S(role.to_string()))
        .item("invited_at", AttributeValue::S(now))
        .send()
        .await
        .map_err(|e| format!("DynamoDB put_item error: {}", e))?;

    Ok(())
}

/// Flip the active flag on an existing membership (invite acceptance)
pub async fn activate_member(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    user_id: &str,
) -> Result<(), String> {
    set_active_flag(client, table_name, household_id, user_id, true).await
}

/// Deactivate a membership; the row stays for history
pub async fn deactivate_member(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    user_id: &str,
) -> Result<(), String> {
    set_active_flag(client, table_name, household_id, user_id, false).await
}

async fn set_active_flag(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
    user_id: &str,
    active: bool,
) -> Result<(), String> {
    let outcome = client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(keys::household_scope_pk(household_id)))
        .key("SK", AttributeValue::S(keys::member_sk(user_id)))
        .update_expression("SET #active = :active")
        .expression_attribute_names("#active", "active")
        .expression_attribute_values(":active", AttributeValue::Bool(active))
        .condition_expression("attribute_exists(SK)")
        .send()
        .await;

    match outcome {
        Ok(_) => Ok(()),
        Err(e) => {
            let missing = e
                .as_service_error()
                .map(|se| se.is_conditional_check_failed_exception())
                .unwrap_or(false);
            if missing {
                Err("Membership not found".to_string())
            } else {
                Err(format!("DynamoDB update_item error: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_inviting_an_existing_member_leaves_the_row_untouched() {
        // The conditional put refuses the write; the upsert reports success
        // without ever touching the active flag
        assert!(preserve_existing_membership(true, "unused".to_string()).is_ok());
    }

    #[test]
    fn upsert_failures_other_than_existence_propagate() {
        let outcome = preserve_existing_membership(
            false,
            "DynamoDB put_item error: throttled".to_string(),
        );
        assert!(outcome.is_err());
    }
}
