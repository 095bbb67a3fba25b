mod commands;
mod output;
mod store;
mod term;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::backup::{ExportArgs, ImportArgs};
use commands::contributions::{AddContributionArgs, ContributionsArgs};
use commands::expenses::{AddExpenseArgs, AddRefundArgs};
use commands::loans::{
    ApproveLoanArgs, LoanIdArgs, LoansArgs, PayInstallmentArgs, PrepayArgs, RefinanceArgs,
};
use commands::members::{AddMemberArgs, MemberIdArgs};
use commands::quote::QuoteArgs;
use commands::report::{CashboxArgs, ReportArgs};

/// Management CLI for a closed savings-and-credit cooperative
#[derive(Parser)]
#[command(
    name = "coop",
    version,
    about = "Manage a closed savings-and-credit cooperative",
    long_about = "Manage a closed savings-and-credit cooperative: members, monthly \
                  contributions, the full loan lifecycle (quote, approval, retention, \
                  installments, prepayment, refinancing), expenses, and the cash ledger. \
                  State lives in a single JSON file."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the cooperative state file
    #[arg(long, default_value = "coop.json", global = true)]
    file: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh state file with the default configuration
    Init,
    /// Price a loan without approving it
    Quote(QuoteArgs),
    /// Add a member
    AddMember(AddMemberArgs),
    /// List members
    Members,
    /// Mark a member inactive, keeping their history
    RetireMember(MemberIdArgs),
    /// Remove a member permanently
    RemoveMember(MemberIdArgs),
    /// Approve and disburse a loan
    ApproveLoan(ApproveLoanArgs),
    /// Collect the retention on a pending loan
    PayRetention(LoanIdArgs),
    /// Pay one fixed installment
    PayInstallment(PayInstallmentArgs),
    /// Apply a free-form prepayment to principal
    Prepay(PrepayArgs),
    /// Refinance the outstanding balance into a new loan
    Refinance(RefinanceArgs),
    /// Delete a loan, undoing its disbursement and retention
    RemoveLoan(LoanIdArgs),
    /// List loans
    Loans(LoansArgs),
    /// Show a loan's installment schedule
    Schedule(LoanIdArgs),
    /// Record a paid monthly contribution
    AddContribution(AddContributionArgs),
    /// List contributions
    Contributions(ContributionsArgs),
    /// Record an administrative expense
    AddExpense(AddExpenseArgs),
    /// List expenses
    Expenses,
    /// Record a withdrawal refund
    AddRefund(AddRefundArgs),
    /// Adjust the cashbox, mirroring the movement into the ledger
    Cashbox(CashboxArgs),
    /// Financial report with per-member balances
    Report(ReportArgs),
    /// Carry available cash into the opening balance
    Closing,
    /// Export a JSON backup
    Export(ExportArgs),
    /// Import a JSON backup, replacing all state
    Import(ImportArgs),
}

fn main() {
    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Init => commands::backup::run_init(&cli.file),
        Commands::Quote(args) => commands::quote::run(args, &cli.file),
        Commands::AddMember(args) => commands::members::run_add(args, &cli.file),
        Commands::Members => commands::members::run_list(&cli.file),
        Commands::RetireMember(args) => commands::members::run_retire(args, &cli.file),
        Commands::RemoveMember(args) => commands::members::run_remove(args, &cli.file),
        Commands::ApproveLoan(args) => commands::loans::run_approve(args, &cli.file),
        Commands::PayRetention(args) => commands::loans::run_pay_retention(args, &cli.file),
        Commands::PayInstallment(args) => commands::loans::run_pay_installment(args, &cli.file),
        Commands::Prepay(args) => commands::loans::run_prepay(args, &cli.file),
        Commands::Refinance(args) => commands::loans::run_refinance(args, &cli.file),
        Commands::RemoveLoan(args) => commands::loans::run_remove(args, &cli.file),
        Commands::Loans(args) => commands::loans::run_list(args, &cli.file),
        Commands::Schedule(args) => commands::loans::run_schedule(args, &cli.file),
        Commands::AddContribution(args) => commands::contributions::run_add(args, &cli.file),
        Commands::Contributions(args) => commands::contributions::run_list(args, &cli.file),
        Commands::AddExpense(args) => commands::expenses::run_add(args, &cli.file),
        Commands::Expenses => commands::expenses::run_list(&cli.file),
        Commands::AddRefund(args) => commands::expenses::run_add_refund(args, &cli.file),
        Commands::Cashbox(args) => commands::report::run_cashbox(args, &cli.file),
        Commands::Report(args) => commands::report::run_report(args, &cli.file),
        Commands::Closing => commands::report::run_closing(&cli.file),
        Commands::Export(args) => commands::backup::run_export(args, &cli.file),
        Commands::Import(args) => commands::backup::run_import(args, &cli.file),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(1);
    }
}
