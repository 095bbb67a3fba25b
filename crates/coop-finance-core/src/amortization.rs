//! Flat-total amortization engine.
//!
//! Despite the "French system" label on the cooperative's paper forms, the
//! pricing is not a compound-interest annuity: interest is simple interest on
//! the original principal, retention and the transfer fee are folded into a
//! flat total, and the total is split into equal installments rounded up to
//! the cent.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::money::{add_months, round_cents, round_cents_up};
use crate::types::{Money, Rate};
use crate::{CoopError, CoopResult};

/// Retention rate baked into every quote, as a fraction of principal.
///
/// Loan approval collects retention at `CoopConfig::retention_rate`, which is
/// configurable; quotes always price at this flat 1%. The two can disagree
/// when the configured rate changes. Carried as-is from the ruling pricing
/// sheet rather than unified.
pub const QUOTE_RETENTION_RATE: Rate = dec!(0.01);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    Pending,
    Paid,
    Late,
    Penalty,
    Partial,
}

/// One row of an installment schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationEntry {
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub principal: Money,
    pub interest: Money,
    pub transfer_fee: Money,
    pub payment: Money,
    /// Principal remaining after this row.
    pub balance: Money,
    pub status: InstallmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
}

/// Result of pricing a loan. Never persisted; approval freezes these values
/// onto the `Loan` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanQuote {
    pub monthly_payment: Money,
    pub total_interest: Money,
    /// The flat fee, counted once. Each schedule row repeats the fee, so the
    /// schedule's fee column does not sum to this; the quote total is the
    /// authoritative figure.
    pub total_transfer_fees: Money,
    pub total_amount: Money,
    pub schedule: Vec<AmortizationEntry>,
}

/// Price a loan and build its full installment schedule.
///
/// The fixed payment covers principal, retention, simple interest, and the
/// one flat transfer fee, split evenly over the term and rounded up to the
/// cent. Schedule rows then decompose each payment against the pure
/// principal balance; the final row absorbs accumulated rounding drift and
/// lands on a balance of exactly zero.
pub fn quote(
    amount: Money,
    monthly_rate_percent: Rate,
    term_months: u32,
    start_date: NaiveDate,
    transfer_fee: Money,
) -> CoopResult<LoanQuote> {
    if amount <= Decimal::ZERO {
        return Err(CoopError::InvalidLoanTerms {
            field: "amount".into(),
            reason: "principal must be positive".into(),
        });
    }
    if term_months == 0 {
        return Err(CoopError::InvalidLoanTerms {
            field: "term_months".into(),
            reason: "term must be at least one month".into(),
        });
    }

    let retention = amount * QUOTE_RETENTION_RATE;
    let base_with_retention = amount + retention;

    let monthly_rate = monthly_rate_percent / dec!(100);
    let total_interest = amount * monthly_rate * Decimal::from(term_months);

    // Fee is added once to the total, flat, not per installment.
    let total_amount = base_with_retention + total_interest + transfer_fee;

    // The only round-up in the system.
    let monthly_payment = round_cents_up(total_amount / Decimal::from(term_months));

    let mut schedule = Vec::with_capacity(term_months as usize);
    // The running balance tracks pure principal; retention and the fee are
    // recovered through the fixed payment only.
    let mut remaining_balance = amount;

    for installment in 1..=term_months {
        let interest = round_cents(remaining_balance * monthly_rate);
        let principal = round_cents(monthly_payment - interest);
        remaining_balance = round_cents(remaining_balance - principal);

        if installment == term_months {
            // Final row lands on zero exactly, absorbing rounding drift.
            remaining_balance = Decimal::ZERO;
        }

        schedule.push(AmortizationEntry {
            installment_number: installment,
            due_date: add_months(start_date, installment),
            principal,
            interest,
            transfer_fee,
            payment: monthly_payment,
            balance: remaining_balance.max(Decimal::ZERO),
            status: InstallmentStatus::Pending,
            paid_date: None,
        });
    }

    Ok(LoanQuote {
        monthly_payment,
        total_interest: round_cents(total_interest),
        total_transfer_fees: transfer_fee,
        total_amount: round_cents(total_amount),
        schedule,
    })
}
