use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client as S3Client;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Evidence photos only need to exist long enough for the household to
/// check a completion; after this many days both the object and its
/// ledger row are swept.
pub const RETENTION_DAYS: i64 = 5;

pub const DELETE_BATCH_SIZE: usize = 100;

#[derive(Debug, Serialize)]
pub struct CleanupReport {
    pub removed_files: usize,
    pub removed_rows: usize,
    pub cutoff: String,
}

pub fn cutoff_timestamp(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(RETENTION_DAYS)
}

/// Pick the object keys whose last-modified time falls before the
/// cutoff. Objects modified exactly at the cutoff survive.
pub fn select_expired(objects: &[(String, i64)], cutoff_secs: i64) -> Vec<String> {
    objects
        .iter()
        .filter(|(_, modified_secs)| *modified_secs < cutoff_secs)
        .map(|(key, _)| key.clone())
        .collect()
}

/// Delete expired photo objects from the bucket in batches. Orphans
/// from abandoned uploads and deleted tasks age out here too.
async fn sweep_bucket(
    s3_client: &S3Client,
    bucket_name: &str,
    cutoff: DateTime<Utc>,
) -> Result<usize, String> {
    let mut expired_keys = Vec::new();
    let mut continuation_token: Option<String> = None;

    loop {
        let mut request = s3_client.list_objects_v2().bucket(bucket_name);
        if let Some(token) = &continuation_token {
            request = request.continuation_token(token);
        }
        let page = request
            .send()
            .await
            .map_err(|e| format!("S3 list_objects_v2 error: {}", e))?;

        let listed: Vec<(String, i64)> = page
            .contents()
            .iter()
            .filter_map(|obj| {
                let key = obj.key()?.to_string();
                let modified = obj.last_modified()?.secs();
                Some((key, modified))
            })
            .collect();
        expired_keys.extend(select_expired(&listed, cutoff.timestamp()));

        continuation_token = page.next_continuation_token().map(|t| t.to_string());
        if continuation_token.is_none() {
            break;
        }
    }

    let removed = expired_keys.len();
    for chunk in expired_keys.chunks(DELETE_BATCH_SIZE) {
        let mut identifiers = Vec::new();
        for key in chunk {
            identifiers.push(
                ObjectIdentifier::builder()
                    .key(key)
                    .build()
                    .map_err(|e| format!("S3 delete build error: {}", e))?,
            );
        }
        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .build()
            .map_err(|e| format!("S3 delete build error: {}", e))?;
        s3_client
            .delete_objects()
            .bucket(bucket_name)
            .delete(delete)
            .send()
            .await
            .map_err(|e| format!("S3 delete_objects error: {}", e))?;
    }

    Ok(removed)
}

/// Delete expired photo ledger rows. Timestamps are RFC 3339 strings
/// written by this codebase, so the comparison is lexicographic.
async fn sweep_photo_rows(
    dynamo_client: &DynamoClient,
    table_name: &str,
    cutoff: DateTime<Utc>,
) -> Result<usize, String> {
    let cutoff_rfc3339 = cutoff.to_rfc3339();
    let mut expired_rows: Vec<(String, String)> = Vec::new();
    let mut exclusive_start_key = None;

    loop {
        let mut request = dynamo_client
            .scan()
            .table_name(table_name)
            .filter_expression("begins_with(SK, :photo_prefix) AND uploaded_at < :cutoff")
            .expression_attribute_values(":photo_prefix", AttributeValue::S("PHOTO#".to_string()))
            .expression_attribute_values(":cutoff", AttributeValue::S(cutoff_rfc3339.clone()));
        if let Some(start_key) = exclusive_start_key {
            request = request.set_exclusive_start_key(Some(start_key));
        }
        let page = request
            .send()
            .await
            .map_err(|e| format!("DynamoDB scan error: {}", e))?;

        for item in page.items() {
            let pk = item.get("PK").and_then(|v| v.as_s().ok());
            let sk = item.get("SK").and_then(|v| v.as_s().ok());
            if let (Some(pk), Some(sk)) = (pk, sk) {
                expired_rows.push((pk.to_string(), sk.to_string()));
            }
        }

        exclusive_start_key = page.last_evaluated_key().cloned();
        if exclusive_start_key.is_none() {
            break;
        }
    }

    let removed = expired_rows.len();
    for (pk, sk) in expired_rows {
        dynamo_client
            .delete_item()
            .table_name(table_name)
            .key("PK", AttributeValue::S(pk))
            .key("SK", AttributeValue::S(sk))
            .send()
            .await
            .map_err(|e| format!("DynamoDB delete_item error: {}", e))?;
    }

    Ok(removed)
}

/// Sweep expired evidence photos out of S3 and the ledger
pub async fn run_cleanup(
    dynamo_client: &DynamoClient,
    s3_client: &S3Client,
    table_name: &str,
    bucket_name: &str,
) -> Result<CleanupReport, String> {
    let cutoff = cutoff_timestamp(Utc::now());
    tracing::info!(cutoff = %cutoff.to_rfc3339(), "photo cleanup starting");

    let removed_files = sweep_bucket(s3_client, bucket_name, cutoff).await?;
    let removed_rows = sweep_photo_rows(dynamo_client, table_name, cutoff).await?;

    tracing::info!(removed_files, removed_rows, "photo cleanup finished");

    Ok(CleanupReport {
        removed_files,
        removed_rows,
        cutoff: cutoff.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn cutoff_is_five_days_back() {
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        let cutoff = cutoff_timestamp(now);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap());
    }

    #[test]
    fn only_objects_strictly_older_than_the_cutoff_expire() {
        let objects = vec![
            ("old.jpg".to_string(), 100),
            ("boundary.jpg".to_string(), 200),
            ("fresh.jpg".to_string(), 300),
        ];
        let expired = select_expired(&objects, 200);
        assert_eq!(expired, vec!["old.jpg".to_string()]);
    }

    #[test]
    fn rfc3339_utc_timestamps_order_lexicographically() {
        // The row sweep relies on string comparison in the filter expression
        let older = Utc.with_ymd_and_hms(2026, 8, 20, 0, 0, 0).unwrap().to_rfc3339();
        let newer = Utc.with_ymd_and_hms(2026, 8, 25, 0, 0, 0).unwrap().to_rfc3339();
        assert!(older < newer);
    }
}
