use serde::{Deserialize, Serialize};


// ========== BOARD ==========
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExecutionWithPhotos {
    #[serde(flatten)]
    pub execution: lar_atoms::executions::model::Execution,
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BoardTask {
    #[serde(flatten)]
    pub task: lar_atoms::tasks::model::Task,
    #[serde(default)]
    pub executions: Vec<ExecutionWithPhotos>,
    /// "active" | "awaiting_others" | "completed"
    pub board_status: String,
}

// ========== VOTES ==========
#[derive(Debug, Serialize)]
pub struct VoteOutcome {
    pub proposal_id: String,
    pub status: String,
    pub approvals: usize,
    pub required: usize,
}

// ========== MEMBERS ==========
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MemberView {
    #[serde(flatten)]
    pub membership: lar_atoms::members::model::Membership,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}
