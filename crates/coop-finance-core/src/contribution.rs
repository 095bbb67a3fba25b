use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Money;
use crate::{CoopError, CoopResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionStatus {
    Pending,
    Paid,
    Late,
    Penalty,
}

/// A member's monthly contribution: capital share plus the administrative
/// expense quota, with any late penalty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub id: String,
    pub member_id: String,
    /// Calendar month the contribution covers, "YYYY-MM".
    pub month: String,
    pub share_amount: Money,
    pub expense_amount: Money,
    pub penalty_amount: Money,
    pub total_amount: Money,
    pub status: ContributionStatus,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionForm {
    pub member_id: String,
    pub month: String,
    pub share_amount: Money,
    pub expense_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_amount: Option<Money>,
}

/// Contributions fall due on the 5th of their month.
pub fn due_date_for_month(month: &str) -> CoopResult<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{month}-05"), "%Y-%m-%d").map_err(|_| {
        CoopError::InvalidInput {
            field: "month".into(),
            reason: format!("'{month}' is not a YYYY-MM month"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_date_is_fifth_of_month() {
        assert_eq!(
            due_date_for_month("2024-03").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn test_malformed_month_rejected() {
        assert!(due_date_for_month("March 2024").is_err());
        assert!(due_date_for_month("2024-13").is_err());
    }
}
