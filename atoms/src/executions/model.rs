use serde::{Deserialize, Serialize};

/// Every recorded execution carries exactly this many photos. The two
/// photo rows and the execution row are written in one transaction, so
/// an execution with fewer photos never becomes visible.
pub const REQUIRED_PHOTO_COUNT: usize = 2;

/// One member's completion of a task occurrence. At most one per member
/// per task occurrence.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Execution {
    pub execution_id: String,
    pub task_id: String,
    pub user_id: String,
    pub completed_at: String,
}

/// The ledger row for one evidence photo of an execution. The object
/// itself lives in S3 under `storage_path`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExecutionPhoto {
    pub task_id: String,
    pub execution_id: String,
    pub storage_path: String,
    pub uploaded_at: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordExecutionPayload {
    /// File extensions of the two evidence photos, e.g. ["jpg", "png"]
    pub photo_extensions: Vec<String>,
}

/// What the client gets back: the recorded execution plus the storage
/// paths it must upload the photos to.
#[derive(Debug, Serialize)]
pub struct ExecutionReceipt {
    pub execution: Execution,
    pub photo_paths: Vec<String>,
}

/// Canonical storage paths of an execution's evidence photos, numbered
/// from one. Keeping the task and execution ids in the prefix lets the
/// cleanup sweep and the deletion path find every object belonging to a
/// task.
pub fn photo_storage_paths(
    task_id: &str,
    execution_id: &str,
    user_id: &str,
    timestamp_millis: i64,
    extensions: &[String],
) -> Vec<String> {
    extensions
        .iter()
        .enumerate()
        .map(|(i, extension)| {
            format!(
                "{}/{}/{}-{}-{}.{}",
                task_id,
                execution_id,
                user_id,
                timestamp_millis,
                i + 1,
                extension
            )
        })
        .collect()
}

pub fn validate_extensions(extensions: &[String]) -> Result<(), String> {
    if extensions.len() != REQUIRED_PHOTO_COUNT {
        return Err(format!(
            "An execution needs exactly {} photos",
            REQUIRED_PHOTO_COUNT
        ));
    }
    for ext in extensions {
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!("Invalid photo extension: {}", ext));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_embed_task_execution_and_uploader_numbered_from_one() {
        let paths = photo_storage_paths(
            "t1",
            "e1",
            "u1",
            1756500000000,
            &["jpg".to_string(), "png".to_string()],
        );
        assert_eq!(
            paths,
            vec![
                "t1/e1/u1-1756500000000-1.jpg".to_string(),
                "t1/e1/u1-1756500000000-2.png".to_string(),
            ]
        );
    }

    #[test]
    fn exactly_two_extensions_are_required() {
        assert!(validate_extensions(&["jpg".to_string()]).is_err());
        assert!(validate_extensions(&[
            "jpg".to_string(),
            "png".to_string(),
            "png".to_string()
        ])
        .is_err());
        assert!(validate_extensions(&["jpg".to_string(), "png".to_string()]).is_ok());
    }

    #[test]
    fn path_traversal_in_extensions_is_refused() {
        assert!(validate_extensions(&["jpg".to_string(), "../png".to_string()]).is_err());
        assert!(validate_extensions(&["jpg".to_string(), "".to_string()]).is_err());
    }
}
