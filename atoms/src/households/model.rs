use serde::{Deserialize, Serialize};

/// Household domain model - the tenant unit every task and proposal is scoped to
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Household {
    pub household_id: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateHouseholdPayload {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_payload_requires_a_name() {
        assert!(serde_json::from_str::<CreateHouseholdPayload>("{}").is_err());
        assert!(serde_json::from_str::<CreateHouseholdPayload>("not json").is_err());

        let payload: CreateHouseholdPayload =
            serde_json::from_str(r#"{"name": "Casa"}"#).unwrap();
        assert_eq!(payload.name, "Casa");
    }
}
