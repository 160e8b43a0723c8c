// Domain atoms: one module per item type in the table.
// Each atom keeps the split the codebase uses everywhere:
// model (serde types), service (DynamoDB access), http (response shaping).

pub mod approvals;
pub mod executions;
pub mod households;
pub mod members;
pub mod proposals;
pub mod tasks;
pub mod users;

/// Attribute key helpers shared by every atom. All entities live in one
/// table under these PK/SK item types.
pub mod keys {
    pub fn household_pk() -> String {
        "HOUSEHOLD".to_string()
    }

    pub fn household_sk(household_id: &str) -> String {
        format!("HOUSEHOLD#{}", household_id)
    }

    pub fn household_scope_pk(household_id: &str) -> String {
        format!("HOUSEHOLD#{}", household_id)
    }

    pub fn member_sk(user_id: &str) -> String {
        format!("MEMBER#{}", user_id)
    }

    pub fn task_sk(task_id: &str) -> String {
        format!("TASK#{}", task_id)
    }

    pub fn task_scope_pk(task_id: &str) -> String {
        format!("TASK#{}", task_id)
    }

    pub fn assignee_sk(user_id: &str) -> String {
        format!("ASSIGNEE#{}", user_id)
    }

    pub fn proposal_sk(proposal_id: &str) -> String {
        format!("PROPOSAL#{}", proposal_id)
    }

    pub fn proposal_scope_pk(proposal_id: &str) -> String {
        format!("PROPOSAL#{}", proposal_id)
    }

    pub fn approval_sk(user_id: &str) -> String {
        format!("APPROVAL#{}", user_id)
    }

    pub fn execution_sk(user_id: &str) -> String {
        format!("EXECUTION#{}", user_id)
    }

    pub fn photo_sk(execution_id: &str, index: usize) -> String {
        format!("PHOTO#{}#{}", execution_id, index)
    }

    pub fn user_pk(user_id: &str) -> String {
        format!("USER#{}", user_id)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn photo_sk_is_ordered_per_execution() {
            assert_eq!(photo_sk("e1", 1), "PHOTO#e1#1");
            assert_eq!(photo_sk("e1", 2), "PHOTO#e1#2");
        }
    }
}
