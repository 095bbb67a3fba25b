use std::io;
use std::path::Path;

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::json;
use tabled::{builder::Builder, Table};

use coop_finance_core::contribution::ContributionStatus;
use coop_finance_core::loan::LoanStatus;
use coop_finance_core::member::MemberStatus;
use coop_finance_core::Cooperative;

use crate::{output, store};

#[derive(Debug, Clone, ValueEnum)]
pub enum ReportFormat {
    Table,
    Csv,
    Json,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct CashboxArgs {
    /// Signed adjustment amount (positive adds cash)
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Decimal,

    #[arg(long)]
    pub description: Option<String>,
}

struct MemberRow {
    name: String,
    savings: Decimal,
    debt: Decimal,
    penalties: Decimal,
    net: Decimal,
}

fn member_rows(coop: &Cooperative) -> Vec<MemberRow> {
    let mut members: Vec<_> = coop
        .members()
        .iter()
        .filter(|m| m.status == MemberStatus::Active)
        .collect();
    members.sort_by(|a, b| a.name.cmp(&b.name));

    members
        .into_iter()
        .map(|member| {
            let paid = coop
                .contributions()
                .iter()
                .filter(|c| c.member_id == member.id && c.status == ContributionStatus::Paid);
            let (mut savings, mut penalties) = (Decimal::ZERO, Decimal::ZERO);
            for c in paid {
                savings += c.share_amount + c.expense_amount;
                penalties += c.penalty_amount;
            }
            let debt: Decimal = coop
                .loans()
                .iter()
                .filter(|l| l.member_id == member.id && l.status == LoanStatus::Active)
                .map(|l| l.remaining_principal)
                .sum();
            MemberRow {
                name: member.name.clone(),
                savings,
                debt,
                penalties,
                net: savings - debt,
            }
        })
        .collect()
}

pub fn run_report(args: ReportArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (coop, _store) = store::load(file)?;
    let rows = member_rows(&coop);
    let symbol = coop.config().currency_symbol.clone();

    let total_savings: Decimal = rows.iter().map(|r| r.savings).sum();
    let total_debt: Decimal = rows.iter().map(|r| r.debt).sum();
    let total_penalties: Decimal = rows.iter().map(|r| r.penalties).sum();
    let total_expenses: Decimal = coop.expenses().iter().map(|e| e.amount).sum();
    let cash = coop.available_cash();

    match args.format {
        ReportFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["Member", "Savings", "Debt", "Penalties", "Net"]);
            for row in &rows {
                builder.push_record([
                    row.name.clone(),
                    output::money(&symbol, row.savings),
                    output::money(&symbol, row.debt),
                    output::money(&symbol, row.penalties),
                    output::money(&symbol, row.net),
                ]);
            }
            println!("{}", Table::from(builder));
            println!(
                "Total savings: {}   Total debt: {}   Penalties: {}",
                output::money(&symbol, total_savings),
                output::money(&symbol, total_debt),
                output::money(&symbol, total_penalties),
            );
            println!(
                "Administrative expenses: {}   Available cash: {}",
                output::money(&symbol, total_expenses),
                output::money(&symbol, cash),
            );
        }
        ReportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            writer.write_record(["Member", "Savings", "Debt", "Penalties", "Net"])?;
            for row in &rows {
                writer.write_record([
                    row.name.clone(),
                    row.savings.to_string(),
                    row.debt.to_string(),
                    row.penalties.to_string(),
                    row.net.to_string(),
                ])?;
            }
            writer.write_record([
                "Total".to_string(),
                total_savings.to_string(),
                total_debt.to_string(),
                total_penalties.to_string(),
                String::new(),
            ])?;
            writer.write_record([
                "Administrative expenses".to_string(),
                total_expenses.to_string(),
                String::new(),
                String::new(),
                String::new(),
            ])?;
            writer.write_record([
                "Available cash".to_string(),
                cash.to_string(),
                String::new(),
                String::new(),
                String::new(),
            ])?;
            writer.flush()?;
        }
        ReportFormat::Json => {
            let document = json!({
                "members": rows.iter().map(|r| json!({
                    "name": r.name,
                    "savings": r.savings.to_string(),
                    "debt": r.debt.to_string(),
                    "penalties": r.penalties.to_string(),
                    "net": r.net.to_string(),
                })).collect::<Vec<_>>(),
                "totalSavings": total_savings.to_string(),
                "totalDebt": total_debt.to_string(),
                "totalPenalties": total_penalties.to_string(),
                "totalExpenses": total_expenses.to_string(),
                "availableCash": cash.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }
    Ok(())
}

pub fn run_cashbox(args: CashboxArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coop, mut store) = store::load(file)?;
    coop.adjust_cashbox(args.amount, args.description);
    store::save(&coop, &mut store)
}

pub fn run_closing(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coop, mut store) = store::load(file)?;
    let balance = coop.perform_annual_closing();
    store::save(&coop, &mut store)?;
    println!(
        "{}",
        output::money(&coop.config().currency_symbol, balance)
    );
    Ok(())
}
