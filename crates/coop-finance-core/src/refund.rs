use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// A payout returning a withdrawing member's savings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refund {
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub reason: String,
    pub amount: Money,
    pub deposit_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundForm {
    pub member_id: String,
    pub reason: String,
    pub amount: Money,
    pub deposit_date: NaiveDate,
}
