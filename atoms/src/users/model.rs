use serde::{Deserialize, Serialize};

/// Directory entry for a user, keyed by the Cognito subject id
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Profile {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
}
