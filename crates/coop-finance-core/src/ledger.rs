//! Append-only cash ledger.
//!
//! Every cash-affecting operation appends a signed transaction; corrections
//! are compensating entries, never edits. The one structural exception is
//! loan deletion, which purges entries referencing the deleted loan (see
//! `Cooperative::delete_loan`). Available cash is a pure function of the
//! transaction log plus the paid contributions and the opening balance.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contribution::{Contribution, ContributionStatus};
use crate::types::Money;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Contribution,
    LoanPayment,
    Penalty,
    Retention,
    LoanApproval,
    LoanCancel,
    Expense,
    Refund,
    ManualAdjustment,
}

/// An immutable ledger entry. Positive amounts are cash in, negative are
/// cash out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Money,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        kind: TransactionType,
        amount: Money,
        description: impl Into<String>,
        reference_id: Option<String>,
        date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            amount,
            description: description.into(),
            reference_id,
            date,
            created_at,
        }
    }
}

/// Transaction types that flow into the cash position.
///
/// `Contribution` and `Penalty` entries are informational: contribution
/// income is derived from the paid contribution records themselves, so
/// summing their ledger echoes as well would double count.
const CASH_TYPES: [TransactionType; 7] = [
    TransactionType::LoanPayment,
    TransactionType::Retention,
    TransactionType::LoanApproval,
    TransactionType::LoanCancel,
    TransactionType::Expense,
    TransactionType::Refund,
    TransactionType::ManualAdjustment,
];

/// Derive the cooperative's cash position. Pure and idempotent: the same
/// inputs always produce the same output.
pub fn available_cash(
    transactions: &[Transaction],
    contributions: &[Contribution],
    opening_balance: Money,
) -> Money {
    let contributed: Decimal = contributions
        .iter()
        .filter(|c| c.status == ContributionStatus::Paid)
        .map(|c| c.share_amount + c.expense_amount + c.penalty_amount)
        .sum();

    let transacted: Decimal = transactions
        .iter()
        .filter(|t| CASH_TYPES.contains(&t.kind))
        .map(|t| t.amount)
        .sum();

    contributed + transacted + opening_balance
}

/// Signed totals per transaction type, for reporting.
pub fn totals_by_type(transactions: &[Transaction]) -> BTreeMap<TransactionType, Money> {
    let mut totals = BTreeMap::new();
    for tx in transactions {
        *totals.entry(tx.kind).or_insert(Decimal::ZERO) += tx.amount;
    }
    totals
}

/// A member's paid contribution total (share + expense + penalty).
pub fn member_contribution_total(contributions: &[Contribution], member_id: &str) -> Money {
    contributions
        .iter()
        .filter(|c| c.member_id == member_id && c.status == ContributionStatus::Paid)
        .map(|c| c.share_amount + c.expense_amount + c.penalty_amount)
        .sum()
}
