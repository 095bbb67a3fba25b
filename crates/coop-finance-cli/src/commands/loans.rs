use std::path::Path;

use chrono::{NaiveDate, Utc};
use clap::Args;
use rust_decimal::Decimal;

use coop_finance_core::loan::LoanForm;

use crate::{output, store};

#[derive(Args)]
pub struct ApproveLoanArgs {
    /// Borrowing member id
    #[arg(long)]
    pub member_id: String,

    /// Principal amount
    #[arg(long)]
    pub amount: Decimal,

    /// Monthly interest rate in percent (default: configured rate)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: u32,

    /// Start date (default: today)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Override the retention computed from the configured rate
    #[arg(long)]
    pub retention_amount: Option<Decimal>,

    /// Collect the retention up front, activating the loan immediately
    #[arg(long)]
    pub retention_paid: bool,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct LoanIdArgs {
    /// Loan id
    pub loan_id: String,
}

#[derive(Args)]
pub struct PayInstallmentArgs {
    /// Loan id
    pub loan_id: String,

    /// Installment number (1-based)
    #[arg(long)]
    pub number: u32,
}

#[derive(Args)]
pub struct PrepayArgs {
    /// Loan id
    pub loan_id: String,

    /// Amount to apply against principal
    #[arg(long)]
    pub amount: Decimal,
}

#[derive(Args)]
pub struct RefinanceArgs {
    /// Loan id
    pub loan_id: String,

    /// Term in months for the new loan
    #[arg(long)]
    pub term: u32,
}

#[derive(Args)]
pub struct LoansArgs {
    /// Only this member's loans
    #[arg(long)]
    pub member_id: Option<String>,
}

pub fn run_approve(args: ApproveLoanArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coop, mut store) = store::load(file)?;
    let rate = args.rate.unwrap_or(coop.config().monthly_interest_rate);
    let loan = coop.approve_loan(LoanForm {
        member_id: args.member_id,
        amount: args.amount,
        monthly_interest_rate: rate,
        term_months: args.term,
        start_date: args.start_date.unwrap_or_else(|| Utc::now().date_naive()),
        notes: args.notes,
        retention_amount: args.retention_amount,
        retention_paid: args.retention_paid,
    })?;
    store::save(&coop, &mut store)?;
    println!("{}", loan.id);
    Ok(())
}

pub fn run_pay_retention(args: LoanIdArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coop, mut store) = store::load(file)?;
    coop.pay_retention(&args.loan_id)?;
    store::save(&coop, &mut store)
}

pub fn run_pay_installment(
    args: PayInstallmentArgs,
    file: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coop, mut store) = store::load(file)?;
    coop.pay_installment(&args.loan_id, args.number)?;
    store::save(&coop, &mut store)
}

pub fn run_prepay(args: PrepayArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coop, mut store) = store::load(file)?;
    coop.prepay(&args.loan_id, args.amount)?;
    store::save(&coop, &mut store)
}

pub fn run_refinance(args: RefinanceArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coop, mut store) = store::load(file)?;
    let new_loan = coop.refinance_loan(&args.loan_id, args.term)?;
    store::save(&coop, &mut store)?;
    println!("{}", new_loan.id);
    Ok(())
}

pub fn run_remove(args: LoanIdArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coop, mut store) = store::load(file)?;
    coop.delete_loan(&args.loan_id)?;
    store::save(&coop, &mut store)
}

pub fn run_list(args: LoansArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (coop, _store) = store::load(file)?;
    let loans: Vec<_> = match &args.member_id {
        Some(member_id) => coop.member_loans(member_id),
        None => coop.loans().iter().collect(),
    };
    output::print_loans(&loans, &coop.config().currency_symbol);
    Ok(())
}

pub fn run_schedule(args: LoanIdArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (coop, _store) = store::load(file)?;
    let loan = coop
        .get_loan(&args.loan_id)
        .ok_or_else(|| format!("Loan not found: {}", args.loan_id))?;
    let symbol = &coop.config().currency_symbol;
    println!(
        "{} | {} | payment {} | remaining {}",
        loan.member_name,
        loan.status.as_str(),
        output::money(symbol, loan.monthly_payment),
        output::money(symbol, loan.remaining_principal),
    );
    output::print_schedule(&loan.schedule, symbol);
    Ok(())
}
