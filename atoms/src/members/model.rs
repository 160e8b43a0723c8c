use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Membership domain model - a user's standing in one household.
/// Memberships are deactivated, never hard-deleted; only rows with
/// `active = true` count toward approval quorums.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Membership {
    pub household_id: String,
    pub user_id: String,
    pub active: bool,
    pub role: String, // "member" | "admin"
    pub invited_at: String,
}

/// Ids of the members counted in unanimity tallies.
pub fn active_member_ids(members: &[Membership]) -> HashSet<String> {
    members
        .iter()
        .filter(|m| m.active)
        .map(|m| m.user_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(user_id: &str, active: bool) -> Membership {
        Membership {
            household_id: "h1".to_string(),
            user_id: user_id.to_string(),
            active,
            role: "member".to_string(),
            invited_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn pending_members_are_not_counted() {
        let members = vec![member("a", true), member("b", false), member("c", true)];
        let active = active_member_ids(&members);
        assert_eq!(active.len(), 2);
        assert!(active.contains("a"));
        assert!(!active.contains("b"));
    }
}
