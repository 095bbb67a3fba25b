use std::path::Path;

use clap::Args;
use rust_decimal::Decimal;

use coop_finance_core::contribution::ContributionForm;

use crate::{output, store};

#[derive(Args)]
pub struct AddContributionArgs {
    /// Contributing member id
    #[arg(long)]
    pub member_id: String,

    /// Month covered, as YYYY-MM
    #[arg(long)]
    pub month: String,

    /// Capital share (default: configured amount)
    #[arg(long)]
    pub share: Option<Decimal>,

    /// Administrative expense quota (default: configured amount)
    #[arg(long)]
    pub expense: Option<Decimal>,

    /// Late penalty, if any
    #[arg(long)]
    pub penalty: Option<Decimal>,
}

#[derive(Args)]
pub struct ContributionsArgs {
    /// Only this member's contributions
    #[arg(long)]
    pub member_id: Option<String>,

    /// Only this year
    #[arg(long)]
    pub year: Option<i32>,
}

pub fn run_add(args: AddContributionArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coop, mut store) = store::load(file)?;
    let share = args.share.unwrap_or(coop.config().monthly_share_amount);
    let expense = args.expense.unwrap_or(coop.config().monthly_expense_amount);
    coop.add_contribution(ContributionForm {
        member_id: args.member_id,
        month: args.month,
        share_amount: share,
        expense_amount: expense,
        penalty_amount: args.penalty,
    })?;
    store::save(&coop, &mut store)
}

pub fn run_list(args: ContributionsArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (coop, _store) = store::load(file)?;
    let contributions: Vec<_> = match (&args.member_id, args.year) {
        (Some(member_id), year) => coop.member_contributions(member_id, year),
        (None, Some(year)) => {
            let prefix = format!("{year}-");
            coop.contributions()
                .iter()
                .filter(|c| c.month.starts_with(&prefix))
                .collect()
        }
        (None, None) => coop.contributions().iter().collect(),
    };
    output::print_contributions(&contributions, &coop.config().currency_symbol);
    Ok(())
}
