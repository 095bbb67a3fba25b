use std::path::Path;

use chrono::{NaiveDate, Utc};
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;

use coop_finance_core::expense::{ExpenseCategory, ExpenseForm};
use coop_finance_core::refund::RefundForm;

use crate::{output, store};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Administrative,
    Maintenance,
    Services,
    Supplies,
    Other,
}

impl From<CategoryArg> for ExpenseCategory {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Administrative => ExpenseCategory::Administrative,
            CategoryArg::Maintenance => ExpenseCategory::Maintenance,
            CategoryArg::Services => ExpenseCategory::Services,
            CategoryArg::Supplies => ExpenseCategory::Supplies,
            CategoryArg::Other => ExpenseCategory::Other,
        }
    }
}

#[derive(Args)]
pub struct AddExpenseArgs {
    /// What the money was spent on
    #[arg(long)]
    pub description: String,

    /// Amount spent
    #[arg(long)]
    pub amount: Decimal,

    #[arg(long, value_enum, default_value = "administrative")]
    pub category: CategoryArg,

    /// Expense date (default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct AddRefundArgs {
    /// Member receiving the refund
    #[arg(long)]
    pub member_id: String,

    /// Amount returned
    #[arg(long)]
    pub amount: Decimal,

    /// Reason for the withdrawal
    #[arg(long)]
    pub reason: String,

    /// Deposit date (default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

pub fn run_add(args: AddExpenseArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coop, mut store) = store::load(file)?;
    coop.add_expense(ExpenseForm {
        description: args.description,
        amount: args.amount,
        category: args.category.into(),
        date: args.date.unwrap_or_else(|| Utc::now().date_naive()),
        notes: args.notes,
    })?;
    store::save(&coop, &mut store)
}

pub fn run_list(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (coop, _store) = store::load(file)?;
    output::print_expenses(coop.expenses(), &coop.config().currency_symbol);
    Ok(())
}

pub fn run_add_refund(args: AddRefundArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coop, mut store) = store::load(file)?;
    coop.add_refund(RefundForm {
        member_id: args.member_id,
        reason: args.reason,
        amount: args.amount,
        deposit_date: args.date.unwrap_or_else(|| Utc::now().date_naive()),
    })?;
    store::save(&coop, &mut store)
}
