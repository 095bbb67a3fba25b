use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use coop_finance_core::clock::FixedClock;
use coop_finance_core::ledger::TransactionType;
use coop_finance_core::loan::{LoanForm, LoanStatus};
use coop_finance_core::member::MemberForm;
use coop_finance_core::notify::SilentNotifier;
use coop_finance_core::{CoopError, Cooperative};

// ===========================================================================
// Helpers
// ===========================================================================

fn coop() -> Cooperative {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());
    Cooperative::with_collaborators(Box::new(clock), Box::new(SilentNotifier))
}

fn coop_with_member() -> (Cooperative, String) {
    let mut coop = coop();
    let member = coop.add_member(MemberForm {
        name: "Ana Morales".to_string(),
        phone: "555-0100".to_string(),
        join_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        notes: None,
    });
    (coop, member.id)
}

fn loan_form(member_id: &str, retention_paid: bool) -> LoanForm {
    LoanForm {
        member_id: member_id.to_string(),
        amount: dec!(1000),
        monthly_interest_rate: dec!(1),
        term_months: 12,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        notes: None,
        retention_amount: None,
        retention_paid,
    }
}

// ===========================================================================
// Approval
// ===========================================================================

#[test]
fn test_approval_freezes_quote_figures() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, true)).unwrap();

    assert_eq!(loan.monthly_payment, dec!(94.21));
    assert_eq!(loan.total_interest, dec!(120));
    assert_eq!(loan.total_amount, dec!(1130.41));
    assert_eq!(loan.retention_amount, dec!(10));
    assert_eq!(loan.schedule.len(), 12);
    assert_eq!(loan.status, LoanStatus::Active);
    // The installment path tracks outstanding cuotas: payment times term.
    assert_eq!(loan.remaining_principal, dec!(1130.52));
    assert_eq!(
        loan.end_date,
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    );
}

#[test]
fn test_approval_with_retention_prepaid_emits_both_entries() {
    let (mut coop, member_id) = coop_with_member();
    coop.approve_loan(loan_form(&member_id, true)).unwrap();

    let kinds: Vec<TransactionType> = coop.transactions().iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TransactionType::Retention, TransactionType::LoanApproval]
    );
    // Disbursement out, retention in.
    assert_eq!(coop.available_cash(), dec!(-990));
}

#[test]
fn test_approval_without_retention_is_gated() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, false)).unwrap();

    assert_eq!(loan.status, LoanStatus::PendingRetention);
    assert!(!loan.retention_paid);
    // Only the disbursement hit the ledger.
    assert_eq!(coop.transactions().len(), 1);
    assert_eq!(coop.available_cash(), dec!(-1000));
}

#[test]
fn test_approval_respects_retention_override() {
    let (mut coop, member_id) = coop_with_member();
    let mut form = loan_form(&member_id, true);
    form.retention_amount = Some(dec!(25));
    let loan = coop.approve_loan(form).unwrap();
    assert_eq!(loan.retention_amount, dec!(25));
}

#[test]
fn test_approval_unknown_member_rejected() {
    let mut coop = coop();
    let err = coop.approve_loan(loan_form("ghost", true)).unwrap_err();
    match err {
        CoopError::MemberNotFound(id) => assert_eq!(id, "ghost"),
        other => panic!("Expected MemberNotFound, got {other:?}"),
    }
    assert!(coop.loans().is_empty());
    assert!(coop.transactions().is_empty());
}

#[test]
fn test_approval_non_positive_amount_rejected() {
    let (mut coop, member_id) = coop_with_member();
    let mut form = loan_form(&member_id, true);
    form.amount = dec!(0);
    assert!(coop.approve_loan(form).is_err());
    assert!(coop.loans().is_empty());
}

// ===========================================================================
// Retention gate
// ===========================================================================

#[test]
fn test_pending_loan_accepts_no_payments() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, false)).unwrap();

    for err in [
        coop.pay_installment(&loan.id, 1).unwrap_err(),
        coop.prepay(&loan.id, dec!(100)).unwrap_err(),
        coop.refinance_loan(&loan.id, 6).unwrap_err(),
    ] {
        match err {
            CoopError::InvalidLoanState { status, .. } => {
                assert_eq!(status, "pending_retention")
            }
            other => panic!("Expected InvalidLoanState, got {other:?}"),
        }
    }
}

#[test]
fn test_pay_retention_activates_loan() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, false)).unwrap();

    let activated = coop.pay_retention(&loan.id).unwrap();
    assert_eq!(activated.status, LoanStatus::Active);
    assert!(activated.retention_paid);
    assert_eq!(coop.available_cash(), dec!(-990));

    // And the loan now accepts payments.
    assert!(coop.pay_installment(&loan.id, 1).is_ok());
}

#[test]
fn test_pay_retention_twice_rejected() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, false)).unwrap();
    coop.pay_retention(&loan.id).unwrap();
    assert!(coop.pay_retention(&loan.id).is_err());
}

// ===========================================================================
// Schedule-exact settlement
// ===========================================================================

#[test]
fn test_full_installment_payoff_is_monotonic_and_exact() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, true)).unwrap();

    let mut previous = loan.remaining_principal;
    for n in 1..=12 {
        let updated = coop.pay_installment(&loan.id, n).unwrap();
        assert!(updated.remaining_principal <= previous);
        previous = updated.remaining_principal;
    }

    let settled = coop.get_loan(&loan.id).unwrap();
    assert_eq!(settled.remaining_principal, Decimal::ZERO);
    assert_eq!(settled.status, LoanStatus::Paid);
    assert_eq!(settled.paid_installments, 12);
    assert_eq!(settled.paid_principal, settled.total_amount);

    // Each payment moved cuota plus transfer fee into cash.
    // -990 + 12 * (94.21 + 0.41)
    assert_eq!(coop.available_cash(), dec!(145.44));
}

#[test]
fn test_out_of_range_installment_is_noop() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, true)).unwrap();
    let cash_before = coop.available_cash();

    let unchanged = coop.pay_installment(&loan.id, 13).unwrap();
    assert_eq!(unchanged.paid_installments, 0);
    assert_eq!(coop.available_cash(), cash_before);
}

#[test]
fn test_paying_settled_loan_rejected() {
    let (mut coop, member_id) = coop_with_member();
    let mut form = loan_form(&member_id, true);
    form.term_months = 1;
    let loan = coop.approve_loan(form).unwrap();

    coop.pay_installment(&loan.id, 1).unwrap();
    assert_eq!(coop.get_loan(&loan.id).unwrap().status, LoanStatus::Paid);

    let err = coop.pay_installment(&loan.id, 1).unwrap_err();
    match err {
        CoopError::InvalidLoanState { status, .. } => assert_eq!(status, "paid"),
        other => panic!("Expected InvalidLoanState, got {other:?}"),
    }
}

// ===========================================================================
// Freeform settlement
// ===========================================================================

#[test]
fn test_prepay_applies_to_principal_and_charges_one_fee() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, true)).unwrap();

    let updated = coop.prepay(&loan.id, dec!(200)).unwrap();
    assert_eq!(updated.remaining_principal, dec!(930.52));
    assert_eq!(updated.paid_principal, dec!(200));
    assert_eq!(updated.paid_installments, 2);
    assert_eq!(updated.status, LoanStatus::Active);

    // -990 + (200 + 0.41)
    assert_eq!(coop.available_cash(), dec!(-789.59));
    // Schedule rows are untouched on this path.
    assert!(updated
        .schedule
        .iter()
        .all(|e| e.status == coop_finance_core::amortization::InstallmentStatus::Pending));
}

#[test]
fn test_prepay_clamp_rejects_and_leaves_state_unchanged() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, true)).unwrap();
    let cash_before = coop.available_cash();

    let err = coop
        .prepay(&loan.id, loan.remaining_principal + dec!(0.02))
        .unwrap_err();
    match err {
        CoopError::ExcessivePayment { remaining, .. } => {
            assert_eq!(remaining, loan.remaining_principal)
        }
        other => panic!("Expected ExcessivePayment, got {other:?}"),
    }

    let after = coop.get_loan(&loan.id).unwrap();
    assert_eq!(after.remaining_principal, loan.remaining_principal);
    assert_eq!(after.paid_principal, Decimal::ZERO);
    assert_eq!(coop.available_cash(), cash_before);
}

#[test]
fn test_prepay_final_balance_closes_loan() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, true)).unwrap();

    // Pay everything but 50.00, then settle the rest.
    coop.prepay(&loan.id, loan.remaining_principal - dec!(50))
        .unwrap();
    assert_eq!(
        coop.get_loan(&loan.id).unwrap().remaining_principal,
        dec!(50)
    );

    let settled = coop.prepay(&loan.id, dec!(50)).unwrap();
    assert_eq!(settled.remaining_principal, Decimal::ZERO);
    assert_eq!(settled.status, LoanStatus::Paid);
    assert_eq!(settled.paid_installments, settled.total_installments);
    assert_eq!(settled.paid_principal, settled.amount);
}

#[test]
fn test_prepay_zero_on_live_balance_changes_nothing() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, true)).unwrap();

    let untouched = coop.prepay(&loan.id, Decimal::ZERO).unwrap();
    assert_eq!(untouched.status, LoanStatus::Active);
    assert_eq!(untouched.remaining_principal, loan.remaining_principal);
}

// ===========================================================================
// Refinancing
// ===========================================================================

#[test]
fn test_refinance_reopens_outstanding_balance() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, true)).unwrap();
    coop.prepay(&loan.id, dec!(500)).unwrap();
    let remaining = coop.get_loan(&loan.id).unwrap().remaining_principal;

    let new_loan = coop.refinance_loan(&loan.id, 6).unwrap();

    assert_eq!(coop.get_loan(&loan.id).unwrap().status, LoanStatus::Refinanced);
    assert_eq!(new_loan.amount, remaining);
    assert_eq!(new_loan.term_months, 6);
    assert_eq!(new_loan.refinanced_from_id.as_deref(), Some(loan.id.as_str()));
    // Refinanced loans start with retention pending.
    assert_eq!(new_loan.status, LoanStatus::PendingRetention);
}

#[test]
fn test_refinance_leaves_source_history_untouched() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, true)).unwrap();
    coop.prepay(&loan.id, dec!(500)).unwrap();

    let entries_for_source = coop
        .transactions()
        .iter()
        .filter(|t| t.reference_id.as_deref() == Some(loan.id.as_str()))
        .count();
    coop.refinance_loan(&loan.id, 6).unwrap();
    let after = coop
        .transactions()
        .iter()
        .filter(|t| t.reference_id.as_deref() == Some(loan.id.as_str()))
        .count();
    assert_eq!(entries_for_source, after);
}

#[test]
fn test_refinanced_loan_is_terminal() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, true)).unwrap();
    coop.refinance_loan(&loan.id, 6).unwrap();

    assert!(coop.pay_installment(&loan.id, 1).is_err());
    assert!(coop.prepay(&loan.id, dec!(10)).is_err());
    assert!(coop.refinance_loan(&loan.id, 6).is_err());
}

// ===========================================================================
// Deletion
// ===========================================================================

#[test]
fn test_deleting_fresh_loan_restores_cash_exactly() {
    let (mut coop, member_id) = coop_with_member();
    let cash_before_approval = coop.available_cash();

    let loan = coop.approve_loan(loan_form(&member_id, true)).unwrap();
    assert_ne!(coop.available_cash(), cash_before_approval);

    coop.delete_loan(&loan.id).unwrap();
    assert_eq!(coop.available_cash(), cash_before_approval);
    assert!(coop.get_loan(&loan.id).is_none());
}

#[test]
fn test_deletion_keeps_collected_payments() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, true)).unwrap();
    coop.pay_installment(&loan.id, 1).unwrap();
    coop.pay_installment(&loan.id, 2).unwrap();

    coop.delete_loan(&loan.id).unwrap();

    // Approval and retention are undone; the two collected installments are
    // deliberately not reversed.
    assert_eq!(coop.available_cash(), dec!(94.62) * dec!(2));
    let payment_entries = coop
        .transactions()
        .iter()
        .filter(|t| t.kind == TransactionType::LoanPayment)
        .count();
    assert_eq!(payment_entries, 2);
}

#[test]
fn test_deletion_purges_loan_referenced_entries() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, true)).unwrap();
    coop.delete_loan(&loan.id).unwrap();

    assert!(coop
        .transactions()
        .iter()
        .all(|t| t.reference_id.as_deref() != Some(loan.id.as_str())));
}

#[test]
fn test_deleting_pending_retention_loan_undoes_disbursement_only() {
    let (mut coop, member_id) = coop_with_member();
    let loan = coop.approve_loan(loan_form(&member_id, false)).unwrap();
    assert_eq!(coop.available_cash(), dec!(-1000));

    coop.delete_loan(&loan.id).unwrap();
    assert_eq!(coop.available_cash(), dec!(0));
}

#[test]
fn test_delete_unknown_loan_rejected() {
    let mut coop = coop();
    assert!(matches!(
        coop.delete_loan("ghost"),
        Err(CoopError::LoanNotFound(_))
    ));
}
