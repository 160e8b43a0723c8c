use std::collections::HashSet;

/// Vote count for one proposal, measured against the household's
/// currently active members. A vote cast by a member who has since
/// been deactivated no longer counts toward unanimity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub approvals: usize,
    pub required: usize,
}

impl Tally {
    pub fn count(approver_ids: &[String], active_member_ids: &HashSet<String>) -> Self {
        let approvals = approver_ids
            .iter()
            .filter(|id| active_member_ids.contains(id.as_str()))
            .collect::<HashSet<_>>()
            .len();
        Tally {
            approvals,
            required: active_member_ids.len(),
        }
    }

    /// Unanimity needs every active member's vote and at least one
    /// member. An empty household never auto-approves anything.
    pub fn is_unanimous(&self) -> bool {
        self.required > 0 && self.approvals >= self.required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn votes(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn partial_approval_is_not_unanimous() {
        let tally = Tally::count(&votes(&["a", "b"]), &active(&["a", "b", "c"]));
        assert_eq!(tally.approvals, 2);
        assert_eq!(tally.required, 3);
        assert!(!tally.is_unanimous());
    }

    #[test]
    fn all_active_members_voting_is_unanimous() {
        let tally = Tally::count(&votes(&["a", "b", "c"]), &active(&["a", "b", "c"]));
        assert!(tally.is_unanimous());
    }

    #[test]
    fn pending_invitees_do_not_count_toward_the_quorum() {
        // "d" was invited but never activated, so two active votes suffice
        let tally = Tally::count(&votes(&["a", "b"]), &active(&["a", "b"]));
        assert!(tally.is_unanimous());
    }

    #[test]
    fn deactivated_voters_are_discounted() {
        let tally = Tally::count(&votes(&["a", "b", "gone"]), &active(&["a", "b", "c"]));
        assert_eq!(tally.approvals, 2);
        assert!(!tally.is_unanimous());
    }

    #[test]
    fn duplicate_votes_count_once() {
        let tally = Tally::count(&votes(&["a", "a", "b"]), &active(&["a", "b"]));
        assert_eq!(tally.approvals, 2);
    }

    #[test]
    fn empty_households_never_reach_consensus() {
        let tally = Tally::count(&votes(&[]), &active(&[]));
        assert!(!tally.is_unanimous());
    }

    #[test]
    fn a_single_member_household_approves_alone() {
        let tally = Tally::count(&votes(&["a"]), &active(&["a"]));
        assert!(tally.is_unanimous());
    }
}
