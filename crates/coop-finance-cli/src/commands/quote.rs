use std::path::Path;

use chrono::{NaiveDate, Utc};
use clap::Args;
use rust_decimal::Decimal;

use coop_finance_core::amortization;

use crate::{output, store};

/// Arguments for pricing a loan
#[derive(Args)]
pub struct QuoteArgs {
    /// Principal amount
    #[arg(long)]
    pub amount: Decimal,

    /// Monthly interest rate in percent (default: configured rate)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: u32,

    /// Start date (default: today); the first installment falls one month
    /// later
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Flat transfer fee (default: configured fee)
    #[arg(long)]
    pub transfer_fee: Option<Decimal>,
}

pub fn run(args: QuoteArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (coop, _store) = store::load(file)?;
    let config = coop.config();

    let rate = args.rate.unwrap_or(config.monthly_interest_rate);
    let start_date = args.start_date.unwrap_or_else(|| Utc::now().date_naive());
    let transfer_fee = args.transfer_fee.unwrap_or(config.transfer_fee);

    let quote = amortization::quote(args.amount, rate, args.term, start_date, transfer_fee)?;

    let symbol = &config.currency_symbol;
    println!(
        "Monthly payment: {}   Total interest: {}   Total: {}",
        output::money(symbol, quote.monthly_payment),
        output::money(symbol, quote.total_interest),
        output::money(symbol, quote.total_amount),
    );
    output::print_schedule(&quote.schedule, symbol);
    Ok(())
}
