use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::{AmortizationEntry, InstallmentStatus};
use crate::money::{is_approximately_zero, round_cents};
use crate::types::{Money, Rate};
use crate::{CoopError, CoopResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    PendingRetention,
    Active,
    Paid,
    Refinanced,
    Cancelled,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::PendingRetention => "pending_retention",
            LoanStatus::Active => "active",
            LoanStatus::Paid => "paid",
            LoanStatus::Refinanced => "refinanced",
            LoanStatus::Cancelled => "cancelled",
        }
    }
}

/// A disbursed loan. The quote-derived fields (payment, totals, schedule)
/// are frozen at approval; only the progress fields move afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub amount: Money,
    pub monthly_interest_rate: Rate,
    pub term_months: u32,
    pub monthly_payment: Money,
    pub transfer_fee: Money,
    pub total_interest: Money,
    pub total_amount: Money,
    pub retention_amount: Money,
    pub retention_paid: bool,
    pub paid_principal: Money,
    pub remaining_principal: Money,
    pub paid_installments: u32,
    pub total_installments: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LoanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinanced_from_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub schedule: Vec<AmortizationEntry>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanForm {
    pub member_id: String,
    pub amount: Money,
    pub monthly_interest_rate: Rate,
    pub term_months: u32,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Explicit retention override; defaults to the configured rate applied
    /// to the amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_amount: Option<Money>,
    #[serde(default)]
    pub retention_paid: bool,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    fn mark_paid_off_by_schedule(&mut self) {
        self.remaining_principal = Decimal::ZERO;
        self.paid_principal = self.total_amount;
        self.status = LoanStatus::Paid;
    }

    /// Schedule-exact settlement: pay one fixed installment.
    ///
    /// Marks the schedule row paid and recomputes the remaining principal
    /// from scratch as the sum of payments over the rows still pending. This
    /// is a different figure than the freeform path tracks; the two policies
    /// are deliberately kept separate.
    ///
    /// Returns false for an out-of-range installment number (a no-op).
    pub fn settle_schedule_exact(&mut self, installment_number: u32) -> bool {
        if installment_number < 1 || installment_number > self.total_installments {
            return false;
        }

        for entry in &mut self.schedule {
            if entry.installment_number == installment_number {
                entry.status = InstallmentStatus::Paid;
            }
        }

        let remaining: Decimal = self
            .schedule
            .iter()
            .filter(|e| e.status == InstallmentStatus::Pending)
            .map(|e| e.payment)
            .sum();

        self.paid_installments += 1;
        self.remaining_principal = remaining;
        self.paid_principal = self.total_amount - remaining;

        if is_approximately_zero(remaining) {
            self.mark_paid_off_by_schedule();
        }

        true
    }

    /// Freeform settlement: apply a prepayment directly against the
    /// remaining principal.
    ///
    /// Paid installments are estimated by dividing the applied amount by the
    /// fixed payment, a deliberately conservative approximation; the stored
    /// schedule rows are never touched on this path.
    ///
    /// Returns the amount actually applied.
    pub fn settle_freeform(&mut self, amount: Money) -> CoopResult<Money> {
        if amount < Decimal::ZERO {
            return Err(CoopError::InvalidLoanTerms {
                field: "amount".into(),
                reason: "prepayment cannot be negative".into(),
            });
        }
        if amount > self.remaining_principal && !is_approximately_zero(self.remaining_principal)
        {
            return Err(CoopError::ExcessivePayment {
                requested: amount,
                remaining: self.remaining_principal,
            });
        }

        let applied = amount.min(self.remaining_principal);
        let new_remaining = round_cents(self.remaining_principal - applied);
        let fully_paid = is_approximately_zero(new_remaining);

        self.remaining_principal = if fully_paid {
            Decimal::ZERO
        } else {
            new_remaining.max(Decimal::ZERO)
        };
        self.paid_principal = if fully_paid {
            // The freeform path tops out at the pure principal, unlike the
            // installment path which tops out at the loan's total amount.
            self.amount
        } else {
            round_cents(self.paid_principal + applied)
        };

        let estimated = (applied / self.monthly_payment)
            .floor()
            .to_u32()
            .unwrap_or(0)
            + self.paid_installments;
        self.paid_installments = if fully_paid {
            self.total_installments
        } else {
            estimated.min(self.total_installments)
        };

        if fully_paid {
            self.status = LoanStatus::Paid;
        }

        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::quote;
    use rust_decimal_macros::dec;

    fn sample_loan() -> Loan {
        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let q = quote(dec!(1000), dec!(1), 12, start, dec!(0.41)).unwrap();
        Loan {
            id: "loan-1".to_string(),
            member_id: "m1".to_string(),
            member_name: "Ana".to_string(),
            amount: dec!(1000),
            monthly_interest_rate: dec!(1),
            term_months: 12,
            monthly_payment: q.monthly_payment,
            transfer_fee: dec!(0.41),
            total_interest: q.total_interest,
            total_amount: q.total_amount,
            retention_amount: dec!(10),
            retention_paid: true,
            paid_principal: Decimal::ZERO,
            remaining_principal: q.monthly_payment * Decimal::from(12u32),
            paid_installments: 0,
            total_installments: 12,
            start_date: start,
            end_date: q.schedule.last().unwrap().due_date,
            status: LoanStatus::Active,
            refinanced_from_id: None,
            notes: None,
            schedule: q.schedule,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    #[test]
    fn test_installments_pay_down_to_exactly_zero() {
        let mut loan = sample_loan();
        let mut previous = loan.remaining_principal;

        for n in 1..=12 {
            assert!(loan.settle_schedule_exact(n));
            assert!(loan.remaining_principal <= previous);
            previous = loan.remaining_principal;
        }

        assert_eq!(loan.remaining_principal, Decimal::ZERO);
        assert_eq!(loan.paid_principal, loan.total_amount);
        assert_eq!(loan.status, LoanStatus::Paid);
        assert_eq!(loan.paid_installments, 12);
    }

    #[test]
    fn test_out_of_range_installment_is_noop() {
        let mut loan = sample_loan();
        assert!(!loan.settle_schedule_exact(0));
        assert!(!loan.settle_schedule_exact(13));
        assert_eq!(loan.paid_installments, 0);
        assert_eq!(loan.status, LoanStatus::Active);
    }

    #[test]
    fn test_freeform_applies_against_remaining_principal() {
        let mut loan = sample_loan();
        let before = loan.remaining_principal;

        let applied = loan.settle_freeform(dec!(200)).unwrap();
        assert_eq!(applied, dec!(200));
        assert_eq!(loan.remaining_principal, before - dec!(200));
        assert_eq!(loan.paid_principal, dec!(200));
        // 200 / 94.21 = 2.12..., floored.
        assert_eq!(loan.paid_installments, 2);
        assert_eq!(loan.status, LoanStatus::Active);
    }

    #[test]
    fn test_freeform_excessive_payment_rejected_and_state_unchanged() {
        let mut loan = sample_loan();
        let snapshot_remaining = loan.remaining_principal;

        let err = loan
            .settle_freeform(loan.remaining_principal + dec!(1))
            .unwrap_err();
        match err {
            CoopError::ExcessivePayment { remaining, .. } => {
                assert_eq!(remaining, snapshot_remaining)
            }
            other => panic!("Expected ExcessivePayment, got {other:?}"),
        }
        assert_eq!(loan.remaining_principal, snapshot_remaining);
        assert_eq!(loan.paid_principal, Decimal::ZERO);
        assert_eq!(loan.status, LoanStatus::Active);
    }

    #[test]
    fn test_freeform_exact_payoff() {
        let mut loan = sample_loan();
        loan.remaining_principal = dec!(50.00);
        loan.paid_installments = 10;

        let applied = loan.settle_freeform(dec!(50)).unwrap();
        assert_eq!(applied, dec!(50));
        assert_eq!(loan.remaining_principal, Decimal::ZERO);
        assert_eq!(loan.status, LoanStatus::Paid);
        assert_eq!(loan.paid_installments, loan.total_installments);
        assert_eq!(loan.paid_principal, loan.amount);
    }

    #[test]
    fn test_freeform_zero_amount_finalizes_a_residual() {
        let mut loan = sample_loan();
        loan.remaining_principal = dec!(0.01);

        let applied = loan.settle_freeform(Decimal::ZERO).unwrap();
        assert_eq!(applied, Decimal::ZERO);
        assert_eq!(loan.remaining_principal, Decimal::ZERO);
        assert_eq!(loan.status, LoanStatus::Paid);
    }

    #[test]
    fn test_freeform_negative_amount_rejected() {
        let mut loan = sample_loan();
        assert!(loan.settle_freeform(dec!(-5)).is_err());
    }
}
