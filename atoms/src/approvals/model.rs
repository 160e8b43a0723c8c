use serde::{Deserialize, Serialize};

/// One member's recorded assent to a proposal. At most one per member;
/// votes are never withdrawn.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Approval {
    pub proposal_id: String,
    pub user_id: String,
    pub created_at: String,
}
