use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use super::model::{CreateHouseholdPayload, Household};
use crate::keys;

/// Create a new household:
/// PK = "HOUSEHOLD"
/// SK = "HOUSEHOLD#{household_id}"
pub async fn create_household(
    client: &DynamoClient,
    table_name: &str,
    payload: CreateHouseholdPayload,
) -> Result<Household, String> {
    let household_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S(keys::household_pk()))
        .item("SK", AttributeValue::S(keys::household_sk(&household_id)))
        .item("name", AttributeValue::S(payload.name.clone()))
        .item("created_at", AttributeValue::S(now.clone()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB put_item error: {}", e))?;

    Ok(Household {
        household_id,
        name: payload.name,
        created_at: now,
    })
}

/// Load every household registered in the table. The household count in
/// a deployment is small; callers filter by membership afterwards.
pub async fn load_households(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Vec<Household>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk")
        .expression_attribute_values(":pk", AttributeValue::S(keys::household_pk()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut households = Vec::new();
    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            if let Some(household_id) = sk.strip_prefix("HOUSEHOLD#") {
                households.push(Household {
                    household_id: household_id.to_string(),
                    name: item
                        .get("name")
                        .and_then(|v| v.as_s().ok())
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                    created_at: item
                        .get("created_at")
                        .and_then(|v| v.as_s().ok())
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                });
            }
        }
    }

    Ok(households)
}

/// Get a specific household
pub async fn get_household(
    client: &DynamoClient,
    table_name: &str,
    household_id: &str,
) -> Result<Household, String> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(keys::household_pk()))
        .key("SK", AttributeValue::S(keys::household_sk(household_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    if let Some(item) = result.item() {
        Ok(Household {
            household_id: household_id.to_string(),
            name: item
                .get("name")
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
        Err("Household not found".to_string())
    }
}
