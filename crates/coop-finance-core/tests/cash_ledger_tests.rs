use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use coop_finance_core::clock::FixedClock;
use coop_finance_core::contribution::ContributionForm;
use coop_finance_core::expense::{ExpenseCategory, ExpenseForm};
use coop_finance_core::ledger::{self, TransactionType};
use coop_finance_core::loan::LoanForm;
use coop_finance_core::member::MemberForm;
use coop_finance_core::notify::SilentNotifier;
use coop_finance_core::Cooperative;

// ===========================================================================
// Helpers
// ===========================================================================

fn coop() -> Cooperative {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
    Cooperative::with_collaborators(Box::new(clock), Box::new(SilentNotifier))
}

fn add_member(coop: &mut Cooperative, name: &str) -> String {
    coop.add_member(MemberForm {
        name: name.to_string(),
        phone: "555-0100".to_string(),
        join_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        notes: None,
    })
    .id
}

fn contribution_form(member_id: &str, month: &str) -> ContributionForm {
    ContributionForm {
        member_id: member_id.to_string(),
        month: month.to_string(),
        share_amount: dec!(25),
        expense_amount: dec!(5),
        penalty_amount: None,
    }
}

fn loan_form(member_id: &str) -> LoanForm {
    LoanForm {
        member_id: member_id.to_string(),
        amount: dec!(500),
        monthly_interest_rate: dec!(1),
        term_months: 6,
        start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        notes: None,
        retention_amount: None,
        retention_paid: true,
    }
}

// ===========================================================================
// Derived cash position
// ===========================================================================

#[test]
fn test_available_cash_accumulates_all_sources() {
    let mut coop = coop();
    let member = add_member(&mut coop, "Ana");

    coop.add_contribution(contribution_form(&member, "2024-01"))
        .unwrap();
    coop.add_contribution(contribution_form(&member, "2024-02"))
        .unwrap();
    coop.add_expense(ExpenseForm {
        description: "Ledger book".to_string(),
        amount: dec!(8),
        category: ExpenseCategory::Supplies,
        date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        notes: None,
    })
    .unwrap();
    coop.approve_loan(loan_form(&member)).unwrap();

    // 60 contributed - 8 expense - 500 disbursed + 5 retention
    assert_eq!(coop.available_cash(), dec!(-443));
}

#[test]
fn test_available_cash_is_pure_over_snapshots() {
    let mut coop = coop();
    let member = add_member(&mut coop, "Ana");
    coop.add_contribution(contribution_form(&member, "2024-01"))
        .unwrap();
    coop.approve_loan(loan_form(&member)).unwrap();

    let transactions = coop.transactions().to_vec();
    let contributions = coop.contributions().to_vec();

    let first = ledger::available_cash(&transactions, &contributions, dec!(0));
    let second = ledger::available_cash(&transactions, &contributions, dec!(0));
    assert_eq!(first, second);
    assert_eq!(first, coop.available_cash());
}

#[test]
fn test_unrelated_loans_do_not_interfere() {
    let mut coop = coop();
    let ana = add_member(&mut coop, "Ana");
    let ben = add_member(&mut coop, "Ben");

    let ana_loan = coop.approve_loan(loan_form(&ana)).unwrap();
    let totals_before = coop
        .transactions()
        .iter()
        .filter(|t| t.reference_id.as_deref() == Some(ana_loan.id.as_str()))
        .map(|t| t.amount)
        .sum::<rust_decimal::Decimal>();

    // Another member's loan leaves Ana's referenced totals untouched.
    coop.approve_loan(loan_form(&ben)).unwrap();
    let totals_after = coop
        .transactions()
        .iter()
        .filter(|t| t.reference_id.as_deref() == Some(ana_loan.id.as_str()))
        .map(|t| t.amount)
        .sum::<rust_decimal::Decimal>();

    assert_eq!(totals_before, totals_after);
}

#[test]
fn test_totals_by_type_reconcile_with_ledger() {
    let mut coop = coop();
    let member = add_member(&mut coop, "Ana");
    let loan = coop.approve_loan(loan_form(&member)).unwrap();
    coop.pay_installment(&loan.id, 1).unwrap();

    let totals = ledger::totals_by_type(coop.transactions());
    assert_eq!(totals[&TransactionType::LoanApproval], dec!(-500));
    assert_eq!(totals[&TransactionType::Retention], dec!(5));
    assert!(totals[&TransactionType::LoanPayment] > dec!(0));
}

#[test]
fn test_opening_balance_feeds_the_derivation() {
    let mut coop = coop();
    let mut config = coop.config().clone();
    config.opening_balance = dec!(250);
    coop.update_config(config);

    assert_eq!(coop.available_cash(), dec!(250));
}

#[test]
fn test_annual_closing_then_fresh_year() {
    let mut coop = coop();
    let member = add_member(&mut coop, "Ana");
    coop.add_contribution(contribution_form(&member, "2024-01"))
        .unwrap();

    let carried = coop.perform_annual_closing();
    assert_eq!(carried, dec!(30));
    assert_eq!(coop.config().opening_balance, dec!(30));
}

// ===========================================================================
// Member figures
// ===========================================================================

#[test]
fn test_member_contribution_totals_per_member() {
    let mut coop = coop();
    let ana = add_member(&mut coop, "Ana");
    let ben = add_member(&mut coop, "Ben");
    coop.add_contribution(contribution_form(&ana, "2024-01"))
        .unwrap();
    coop.add_contribution(contribution_form(&ana, "2024-02"))
        .unwrap();
    coop.add_contribution(contribution_form(&ben, "2024-01"))
        .unwrap();

    assert_eq!(
        ledger::member_contribution_total(coop.contributions(), &ana),
        dec!(60)
    );
    assert_eq!(
        ledger::member_contribution_total(coop.contributions(), &ben),
        dec!(30)
    );
}

#[test]
fn test_member_contributions_filter_by_year() {
    let mut coop = coop();
    let ana = add_member(&mut coop, "Ana");
    coop.add_contribution(contribution_form(&ana, "2023-12"))
        .unwrap();
    coop.add_contribution(contribution_form(&ana, "2024-01"))
        .unwrap();

    assert_eq!(coop.member_contributions(&ana, Some(2023)).len(), 1);
    assert_eq!(coop.member_contributions(&ana, None).len(), 1);
    assert_eq!(coop.available_years(), vec![2025, 2024, 2023]);
}

#[test]
fn test_member_loans_lists_only_their_loans() {
    let mut coop = coop();
    let ana = add_member(&mut coop, "Ana");
    let ben = add_member(&mut coop, "Ben");
    coop.approve_loan(loan_form(&ana)).unwrap();
    coop.approve_loan(loan_form(&ana)).unwrap();
    coop.approve_loan(loan_form(&ben)).unwrap();

    assert_eq!(coop.member_loans(&ana).len(), 2);
    assert_eq!(coop.member_loans(&ben).len(), 1);
}
