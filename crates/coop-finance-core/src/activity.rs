use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kinds of auditable events, one per user-visible operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    MemberAdd,
    MemberEdit,
    MemberDelete,
    MemberInactive,
    ContributionAdd,
    ContributionPay,
    ContributionEdit,
    ContributionDelete,
    LoanAdd,
    LoanPay,
    LoanRetentionPay,
    LoanRefinance,
    LoanCancel,
    LoanDelete,
    ExpenseAdd,
    ExpenseDelete,
    RefundAdd,
    RefundEdit,
    RefundDelete,
    ConfigUpdate,
    CashboxAdjust,
    AnnualClosing,
    DataClear,
}

/// One entry in the audit trail. Informational only; nothing in the engine
/// reads activities back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}
