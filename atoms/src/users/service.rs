use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use super::model::Profile;
use crate::keys;

/// Upsert the directory entry for a user
pub async fn put_profile(
    client: &DynamoClient,
    table_name: &str,
    profile: &Profile,
) -> Result<(), String> {
    client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S(keys::user_pk(&profile.user_id)))
        .item("SK", AttributeValue::S(keys::user_pk(&profile.user_id)))
        .item("full_name", AttributeValue::S(profile.name.clone()))
        .item("email", AttributeValue::S(profile.email.clone()))
        .item("created_at", AttributeValue::S(profile.created_at.clone()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB put_item error: {}", e))?;

    Ok(())
}

/// An existing directory entry is never overwritten by a seed; only a
/// real store failure propagates
fn preserve_existing_profile(already_exists: bool, error: String) -> Result<(), String> {
    if already_exists {
        Ok(())
    } else {
        Err(error)
    }
}

/// Seed a directory entry if the user has none yet. Invites call this
/// for every target, so a member invited into a second household keeps
/// the name they chose.
pub async fn seed_profile(
    client: &DynamoClient,
    table_name: &str,
    profile: &Profile,
) -> Result<(), String> {
    let outcome = client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S(keys::user_pk(&profile.user_id)))
        .item("SK", AttributeValue::S(keys::user_pk(&profile.user_id)))
        .item("full_name", AttributeValue::S(profile.name.clone()))
        .item("email", AttributeValue::S(profile.email.clone()))
        .item("created_at", AttributeValue::S(profile.created_at.clone()))
        .condition_expression("attribute_not_exists(PK)")
        .send()
        .await;

    match outcome {
        Ok(_) => Ok(()),
        Err(e) => {
            let already_exists = e
                .as_service_error()
                .map(|se| se.is_conditional_check_failed_exception())
                .unwrap_or(false);
            preserve_existing_profile(already_exists, format!("DynamoDB put_item error: {}", e))
        }
    }
}

/// Get the directory entry for a user
pub async fn get_profile(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<Profile, String> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(keys::user_pk(user_id)))
        .key("SK", AttributeValue::S(keys::user_pk(user_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    if let Some(item) = result.item() {
        Ok(Profile {
            user_id: user_id.to_string(),
            name: item
                .get("full_name")
                .and_then(|v| v.as_s().ok())
                .map(|s| s.to_string())
                .unwrap_or_default(),
            email: item
                .get("email")
                .and_then(|v| v.as_s().ok())
                .map(|s| s.to_string())
                .unwrap_or_default(),
            created_at: item
                .get("created_at")
                .and_then(|v| v.as_s().ok())
                .map(|s| s.to_string())
                .unwrap_or_default(),
        })
    } else {
        Err("Profile not found".to_string())
    }
}

/// Load directory entries for a set of users, skipping ids with no entry
pub async fn load_profiles(
    client: &DynamoClient,
    table_name: &str,
    user_ids: &[String],
) -> Result<Vec<Profile>, String> {
    let mut profiles = Vec::new();
    for user_id in user_ids {
        match get_profile(client, table_name, user_id).await {
            Ok(profile) => profiles.push(profile),
            Err(e) if e == "Profile not found" => {}
            Err(e) => return Err(e),
        }
    }
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_over_an_existing_profile_is_a_no_op() {
        assert!(preserve_existing_profile(true, "unused".to_string()).is_ok());
    }

    #[test]
    fn seed_failures_other_than_existence_propagate() {
        let outcome =
            preserve_existing_profile(false, "DynamoDB put_item error: throttled".to_string());
        assert!(outcome.is_err());
    }
}
