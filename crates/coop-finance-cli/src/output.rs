use rust_decimal::Decimal;
use tabled::{builder::Builder, Table};

use coop_finance_core::amortization::AmortizationEntry;
use coop_finance_core::contribution::Contribution;
use coop_finance_core::expense::Expense;
use coop_finance_core::loan::Loan;
use coop_finance_core::member::Member;

pub fn money(symbol: &str, amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-{symbol}{}", amount.abs())
    } else {
        format!("{symbol}{amount}")
    }
}

pub fn print_schedule(schedule: &[AmortizationEntry], symbol: &str) {
    let mut builder = Builder::default();
    builder.push_record(["#", "Due date", "Payment", "Principal", "Interest", "Fee", "Balance", "Status"]);
    for entry in schedule {
        builder.push_record([
            entry.installment_number.to_string(),
            entry.due_date.to_string(),
            money(symbol, entry.payment),
            money(symbol, entry.principal),
            money(symbol, entry.interest),
            money(symbol, entry.transfer_fee),
            money(symbol, entry.balance),
            format!("{:?}", entry.status).to_lowercase(),
        ]);
    }
    println!("{}", Table::from(builder));
}

pub fn print_members(members: &[Member], symbol: &str) {
    let mut builder = Builder::default();
    builder.push_record(["Id", "Name", "Phone", "Status", "Contributions", "Joined"]);
    for member in members {
        builder.push_record([
            member.id.clone(),
            member.name.clone(),
            member.phone.clone(),
            format!("{:?}", member.status).to_lowercase(),
            money(symbol, member.total_contributions),
            member.join_date.to_string(),
        ]);
    }
    println!("{}", Table::from(builder));
}

pub fn print_loans(loans: &[&Loan], symbol: &str) {
    let mut builder = Builder::default();
    builder.push_record([
        "Id", "Member", "Amount", "Payment", "Remaining", "Paid", "Status",
    ]);
    for loan in loans {
        builder.push_record([
            loan.id.clone(),
            loan.member_name.clone(),
            money(symbol, loan.amount),
            money(symbol, loan.monthly_payment),
            money(symbol, loan.remaining_principal),
            format!("{}/{}", loan.paid_installments, loan.total_installments),
            loan.status.as_str().to_string(),
        ]);
    }
    println!("{}", Table::from(builder));
}

pub fn print_contributions(contributions: &[&Contribution], symbol: &str) {
    let mut builder = Builder::default();
    builder.push_record(["Id", "Member", "Month", "Share", "Expense", "Penalty", "Total", "Status"]);
    for c in contributions {
        builder.push_record([
            c.id.clone(),
            c.member_id.clone(),
            c.month.clone(),
            money(symbol, c.share_amount),
            money(symbol, c.expense_amount),
            money(symbol, c.penalty_amount),
            money(symbol, c.total_amount),
            format!("{:?}", c.status).to_lowercase(),
        ]);
    }
    println!("{}", Table::from(builder));
}

pub fn print_expenses(expenses: &[Expense], symbol: &str) {
    let mut builder = Builder::default();
    builder.push_record(["Id", "Date", "Category", "Description", "Amount"]);
    for expense in expenses {
        builder.push_record([
            expense.id.clone(),
            expense.date.to_string(),
            format!("{:?}", expense.category).to_lowercase(),
            expense.description.clone(),
            money(symbol, expense.amount),
        ]);
    }
    println!("{}", Table::from(builder));
}
