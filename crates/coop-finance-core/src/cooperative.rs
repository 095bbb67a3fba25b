//! Aggregate root for the cooperative's state.
//!
//! All mutation goes through `Cooperative` methods; there is no ambient or
//! static state. Every operation validates first and only then mutates, so a
//! failed call leaves the aggregate exactly as it was. Cash-affecting
//! operations append ledger entries, log an activity, and notify.

use chrono::Datelike;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::activity::{ActivityKind, ActivityLog};
use crate::amortization;
use crate::clock::{Clock, SystemClock};
use crate::config::CoopConfig;
use crate::contribution::{
    due_date_for_month, Contribution, ContributionForm, ContributionStatus,
};
use crate::expense::{Expense, ExpenseForm};
use crate::ledger::{self, Transaction, TransactionType};
use crate::loan::{Loan, LoanForm, LoanStatus};
use crate::member::{Member, MemberForm, MemberStatus};
use crate::money::round_cents;
use crate::notify::{Notifier, NotifyKind, SilentNotifier};
use crate::refund::{Refund, RefundForm};
use crate::storage::{keys, Storage};
use crate::types::Money;
use crate::{CoopError, CoopResult};

pub struct Cooperative {
    pub(crate) config: CoopConfig,
    pub(crate) members: Vec<Member>,
    pub(crate) loans: Vec<Loan>,
    pub(crate) contributions: Vec<Contribution>,
    pub(crate) expenses: Vec<Expense>,
    pub(crate) refunds: Vec<Refund>,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) activities: Vec<ActivityLog>,
    pub(crate) cashbox: Money,
    pub(crate) clock: Box<dyn Clock>,
    notifier: Box<dyn Notifier>,
}

impl Default for Cooperative {
    fn default() -> Self {
        Self::new()
    }
}

impl Cooperative {
    pub fn new() -> Self {
        Self::with_collaborators(Box::new(SystemClock), Box::new(SilentNotifier))
    }

    pub fn with_collaborators(clock: Box<dyn Clock>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            config: CoopConfig::default(),
            members: Vec::new(),
            loans: Vec::new(),
            contributions: Vec::new(),
            expenses: Vec::new(),
            refunds: Vec::new(),
            transactions: Vec::new(),
            activities: Vec::new(),
            cashbox: Decimal::ZERO,
            clock,
            notifier,
        }
    }

    /// Load every collection from storage; absent collections start empty.
    pub fn load(
        storage: &dyn Storage,
        clock: Box<dyn Clock>,
        notifier: Box<dyn Notifier>,
    ) -> CoopResult<Self> {
        Ok(Self {
            config: load_collection(storage, keys::CONFIG)?,
            members: load_collection(storage, keys::MEMBERS)?,
            loans: load_collection(storage, keys::LOANS)?,
            contributions: load_collection(storage, keys::CONTRIBUTIONS)?,
            expenses: load_collection(storage, keys::EXPENSES)?,
            refunds: load_collection(storage, keys::REFUNDS)?,
            transactions: load_collection(storage, keys::TRANSACTIONS)?,
            activities: load_collection(storage, keys::ACTIVITIES)?,
            cashbox: load_collection(storage, keys::CASHBOX)?,
            clock,
            notifier,
        })
    }

    /// Persist every collection wholesale. Best effort: the in-memory state
    /// is already mutated by the time this runs.
    pub fn persist(&self, storage: &mut dyn Storage) -> CoopResult<()> {
        store_collection(storage, keys::CONFIG, &self.config)?;
        store_collection(storage, keys::MEMBERS, &self.members)?;
        store_collection(storage, keys::LOANS, &self.loans)?;
        store_collection(storage, keys::CONTRIBUTIONS, &self.contributions)?;
        store_collection(storage, keys::EXPENSES, &self.expenses)?;
        store_collection(storage, keys::REFUNDS, &self.refunds)?;
        store_collection(storage, keys::TRANSACTIONS, &self.transactions)?;
        store_collection(storage, keys::ACTIVITIES, &self.activities)?;
        store_collection(storage, keys::CASHBOX, &self.cashbox)?;
        Ok(())
    }

    // -- Accessors ----------------------------------------------------------

    pub fn config(&self) -> &CoopConfig {
        &self.config
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn refunds(&self) -> &[Refund] {
        &self.refunds
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn activities(&self) -> &[ActivityLog] {
        &self.activities
    }

    pub fn cashbox(&self) -> Money {
        self.cashbox
    }

    pub fn get_member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn get_loan(&self, id: &str) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == id)
    }

    // -- Configuration ------------------------------------------------------

    pub fn update_config(&mut self, config: CoopConfig) {
        self.config = config;
        self.log_activity(ActivityKind::ConfigUpdate, "Configuration updated".into(), None);
        self.notifier
            .notify(NotifyKind::Success, "Configuration updated", None);
    }

    /// Reset every collection to an empty cooperative. The caller is
    /// responsible for clearing durable storage as well.
    pub fn clear_all_data(&mut self) {
        self.config = CoopConfig::default();
        self.members.clear();
        self.loans.clear();
        self.contributions.clear();
        self.expenses.clear();
        self.refunds.clear();
        self.transactions.clear();
        self.activities.clear();
        self.cashbox = Decimal::ZERO;
        self.notifier.notify(
            NotifyKind::Warning,
            "Data cleared",
            Some("All records have been permanently removed."),
        );
    }

    // -- Members ------------------------------------------------------------

    pub fn add_member(&mut self, form: MemberForm) -> Member {
        let member = Member {
            id: Uuid::new_v4().to_string(),
            name: form.name,
            phone: form.phone,
            join_date: form.join_date,
            status: MemberStatus::Active,
            total_contributions: Decimal::ZERO,
            current_balance: Decimal::ZERO,
            notes: form.notes,
            created_at: self.clock.now(),
            updated_at: self.clock.now(),
        };
        self.members.push(member.clone());
        self.log_activity(
            ActivityKind::MemberAdd,
            format!("Member added: {}", member.name),
            Some(member.id.clone()),
        );
        self.notifier.notify(
            NotifyKind::Success,
            "Member created",
            Some(&format!("{} has been added.", member.name)),
        );
        member
    }

    pub fn update_member(&mut self, id: &str, form: MemberForm) -> CoopResult<Member> {
        let now = self.clock.now();
        let idx = self.member_index(id)?;
        {
            let member = &mut self.members[idx];
            member.name = form.name;
            member.phone = form.phone;
            member.join_date = form.join_date;
            member.notes = form.notes;
            member.updated_at = now;
        }
        let member = self.members[idx].clone();
        self.log_activity(
            ActivityKind::MemberEdit,
            format!("Member updated: {}", member.name),
            Some(member.id.clone()),
        );
        self.notifier
            .notify(NotifyKind::Success, "Member updated", None);
        Ok(member)
    }

    /// Status flip, not a removal: the member and their history stay.
    pub fn retire_member(&mut self, id: &str) -> CoopResult<Member> {
        let now = self.clock.now();
        let idx = self.member_index(id)?;
        self.members[idx].status = MemberStatus::Inactive;
        self.members[idx].updated_at = now;
        let member = self.members[idx].clone();
        self.log_activity(
            ActivityKind::MemberInactive,
            format!("Member retired: {}", member.name),
            Some(member.id.clone()),
        );
        self.notifier
            .notify(NotifyKind::Success, "Member retired", None);
        Ok(member)
    }

    /// Hard removal, distinct from [`Cooperative::retire_member`].
    pub fn delete_member(&mut self, id: &str) -> CoopResult<()> {
        let idx = self.member_index(id)?;
        let member = self.members.remove(idx);
        self.log_activity(
            ActivityKind::MemberDelete,
            format!("Member deleted: {}", member.name),
            Some(member.id),
        );
        self.notifier
            .notify(NotifyKind::Success, "Member deleted", None);
        Ok(())
    }

    pub fn member_loans(&self, member_id: &str) -> Vec<&Loan> {
        self.loans
            .iter()
            .filter(|l| l.member_id == member_id)
            .collect()
    }

    /// A member's contributions for a given year (default: the current one).
    pub fn member_contributions(&self, member_id: &str, year: Option<i32>) -> Vec<&Contribution> {
        let year = year.unwrap_or_else(|| self.clock.today().year());
        let prefix = format!("{year}-");
        self.contributions
            .iter()
            .filter(|c| c.member_id == member_id && c.month.starts_with(&prefix))
            .collect()
    }

    // -- Loans ---------------------------------------------------------------

    /// Approve and disburse a loan.
    ///
    /// Retention is collected at the configured rate (or an explicit
    /// override), while the quote prices it at the engine's flat rate; see
    /// `amortization::QUOTE_RETENTION_RATE`. The loan starts `Active` only
    /// when the retention was collected up front.
    pub fn approve_loan(&mut self, form: LoanForm) -> CoopResult<Loan> {
        let member = self
            .get_member(&form.member_id)
            .ok_or_else(|| CoopError::MemberNotFound(form.member_id.clone()))?;
        let member_name = member.name.clone();

        if form.amount <= Decimal::ZERO {
            return Err(CoopError::InvalidLoanTerms {
                field: "amount".into(),
                reason: "loan amount must be positive".into(),
            });
        }

        let retention_amount = match form.retention_amount {
            Some(amount) => round_cents(amount),
            None => round_cents(form.amount * self.config.retention_rate / dec!(100)),
        };

        let quote = amortization::quote(
            form.amount,
            form.monthly_interest_rate,
            form.term_months,
            form.start_date,
            self.config.transfer_fee,
        )?;
        let end_date = quote
            .schedule
            .last()
            .map(|e| e.due_date)
            .unwrap_or(form.start_date);

        let status = if form.retention_paid {
            LoanStatus::Active
        } else {
            LoanStatus::PendingRetention
        };

        let loan = Loan {
            id: Uuid::new_v4().to_string(),
            member_id: form.member_id,
            member_name: member_name.clone(),
            amount: form.amount,
            monthly_interest_rate: form.monthly_interest_rate,
            term_months: form.term_months,
            monthly_payment: quote.monthly_payment,
            transfer_fee: self.config.transfer_fee,
            total_interest: quote.total_interest,
            total_amount: quote.total_amount,
            retention_amount,
            retention_paid: form.retention_paid,
            paid_principal: Decimal::ZERO,
            // The installment path tracks outstanding cuotas, not pure
            // principal, so the opening figure is payment times term.
            remaining_principal: quote.monthly_payment * Decimal::from(form.term_months),
            paid_installments: 0,
            total_installments: form.term_months,
            start_date: form.start_date,
            end_date,
            status,
            refinanced_from_id: None,
            notes: form.notes,
            schedule: quote.schedule,
            created_at: self.clock.now(),
        };
        self.loans.push(loan.clone());

        if loan.retention_paid {
            self.add_transaction(
                TransactionType::Retention,
                retention_amount,
                format!("Retention (supplies) - {member_name}"),
                Some(loan.id.clone()),
            );
        }
        self.add_transaction(
            TransactionType::LoanApproval,
            -loan.amount,
            format!("Loan disbursement to {member_name}"),
            Some(loan.id.clone()),
        );

        let symbol = self.config.currency_symbol.clone();
        self.log_activity(
            ActivityKind::LoanAdd,
            format!("Loan approved: {member_name} - {symbol}{}", loan.amount),
            Some(loan.id.clone()),
        );
        let detail = if loan.retention_paid {
            format!(
                "Loan of {symbol}{} disbursed. Retention collected: {symbol}{retention_amount}",
                loan.amount
            )
        } else {
            format!(
                "Loan of {symbol}{} created. Retention pending: {symbol}{retention_amount}",
                loan.amount
            )
        };
        self.notifier
            .notify(NotifyKind::Success, "Loan approved", Some(&detail));
        Ok(loan)
    }

    /// Collect the retention and activate a pending loan.
    pub fn pay_retention(&mut self, loan_id: &str) -> CoopResult<Loan> {
        let idx = self.loan_index(loan_id)?;
        if self.loans[idx].status != LoanStatus::PendingRetention {
            return Err(self.invalid_state(idx, "collect retention for"));
        }

        self.loans[idx].status = LoanStatus::Active;
        self.loans[idx].retention_paid = true;
        let loan = self.loans[idx].clone();

        self.add_transaction(
            TransactionType::Retention,
            loan.retention_amount,
            format!("Retention (supplies) - {}", loan.member_name),
            Some(loan.id.clone()),
        );
        let symbol = self.config.currency_symbol.clone();
        self.log_activity(
            ActivityKind::LoanRetentionPay,
            format!(
                "Retention collected: {} - {symbol}{}",
                loan.member_name, loan.retention_amount
            ),
            Some(loan.id.clone()),
        );
        self.notifier.notify(
            NotifyKind::Success,
            "Retention collected",
            Some(&format!(
                "Collected {symbol}{} in retention. Loan activated.",
                loan.retention_amount
            )),
        );
        Ok(loan)
    }

    /// Pay one fixed installment (schedule-exact settlement).
    ///
    /// An out-of-range installment number is a no-op: the loan is returned
    /// unchanged and nothing is appended to the ledger.
    pub fn pay_installment(&mut self, loan_id: &str, installment_number: u32) -> CoopResult<Loan> {
        let idx = self.loan_index(loan_id)?;
        if !self.loans[idx].is_active() {
            return Err(self.invalid_state(idx, "pay an installment on"));
        }

        if !self.loans[idx].settle_schedule_exact(installment_number) {
            return Ok(self.loans[idx].clone());
        }
        let loan = self.loans[idx].clone();

        // The fee charged is the current configured one, not the fee frozen
        // on the loan.
        let transfer_fee = self.config.transfer_fee;
        let total_payment = loan.monthly_payment + transfer_fee;
        let symbol = self.config.currency_symbol.clone();
        self.add_transaction(
            TransactionType::LoanPayment,
            total_payment,
            format!(
                "Installment {installment_number} - {} (payment: {symbol}{}, transfer: {symbol}{transfer_fee})",
                loan.member_name, loan.monthly_payment
            ),
            None,
        );
        self.log_activity(
            ActivityKind::LoanPay,
            format!(
                "Installment paid: {} - {installment_number}/{}",
                loan.member_name, loan.total_installments
            ),
            Some(loan.id.clone()),
        );

        if loan.status == LoanStatus::Paid {
            self.notifier.notify(
                NotifyKind::Success,
                "Loan paid off",
                Some("All installments have been settled."),
            );
        } else {
            self.notifier.notify(
                NotifyKind::Success,
                "Payment recorded",
                Some(&format!("Installment {installment_number} paid.")),
            );
        }
        Ok(loan)
    }

    /// Apply a free-form prepayment against the remaining principal
    /// (freeform settlement).
    pub fn prepay(&mut self, loan_id: &str, amount: Money) -> CoopResult<Loan> {
        let idx = self.loan_index(loan_id)?;
        if !self.loans[idx].is_active() {
            return Err(self.invalid_state(idx, "prepay"));
        }

        let applied = self.loans[idx].settle_freeform(amount)?;
        let loan = self.loans[idx].clone();

        let transfer_fee = self.config.transfer_fee;
        let symbol = self.config.currency_symbol.clone();
        self.add_transaction(
            TransactionType::LoanPayment,
            applied + transfer_fee,
            format!(
                "Loan payment - {} (principal: {symbol}{applied}, transfer: {symbol}{transfer_fee})",
                loan.member_name
            ),
            None,
        );
        self.log_activity(
            ActivityKind::LoanPay,
            format!("Prepayment: {} - {symbol}{applied}", loan.member_name),
            Some(loan.id.clone()),
        );

        if loan.status == LoanStatus::Paid {
            self.notifier.notify(
                NotifyKind::Success,
                "Loan settled",
                Some("The loan has been fully paid."),
            );
        } else {
            self.notifier.notify(
                NotifyKind::Success,
                "Payment recorded",
                Some(&format!(
                    "Applied {symbol}{applied} to principal. Remaining: {symbol}{}",
                    loan.remaining_principal
                )),
            );
        }
        Ok(loan)
    }

    /// Close an active loan and reopen its outstanding balance as a new loan
    /// at the current default rate.
    pub fn refinance_loan(&mut self, loan_id: &str, new_term_months: u32) -> CoopResult<Loan> {
        let idx = self.loan_index(loan_id)?;
        if !self.loans[idx].is_active() {
            return Err(self.invalid_state(idx, "refinance"));
        }
        // Validate everything the new approval will need before touching the
        // source loan, so a failure leaves no partial state.
        if new_term_months == 0 {
            return Err(CoopError::InvalidLoanTerms {
                field: "term_months".into(),
                reason: "term must be at least one month".into(),
            });
        }
        let remaining = self.loans[idx].remaining_principal;
        if remaining <= Decimal::ZERO {
            return Err(CoopError::InvalidLoanTerms {
                field: "amount".into(),
                reason: "nothing outstanding to refinance".into(),
            });
        }
        let member_id = self.loans[idx].member_id.clone();
        if self.get_member(&member_id).is_none() {
            return Err(CoopError::MemberNotFound(member_id));
        }

        self.loans[idx].status = LoanStatus::Refinanced;
        let old_id = self.loans[idx].id.clone();

        let new_loan = self.approve_loan(LoanForm {
            member_id,
            amount: remaining,
            monthly_interest_rate: self.config.monthly_interest_rate,
            term_months: new_term_months,
            start_date: self.clock.today(),
            notes: Some(format!("Refinancing of loan {old_id}")),
            retention_amount: None,
            retention_paid: false,
        })?;

        let new_idx = self.loan_index(&new_loan.id)?;
        self.loans[new_idx].refinanced_from_id = Some(old_id.clone());
        let new_loan = self.loans[new_idx].clone();

        self.log_activity(
            ActivityKind::LoanRefinance,
            format!(
                "Loan refinanced: {} over {new_term_months} installments",
                new_loan.member_name
            ),
            Some(old_id),
        );
        self.notifier.notify(
            NotifyKind::Success,
            "Loan refinanced",
            Some(&format!(
                "New loan created with {new_term_months} installments."
            )),
        );
        Ok(new_loan)
    }

    /// Hard-delete a loan, permitted at any status, for error correction.
    ///
    /// Compensating adjustments are appended first and the purge of entries
    /// referencing the loan then sweeps them together with the original
    /// approval and retention entries: what survives nets out to exactly
    /// undoing the disbursement and any collected retention. Installment and
    /// prepayment entries carry no reference and are deliberately left
    /// standing. The order is fixed; purging first would leave the
    /// compensators double-counting.
    pub fn delete_loan(&mut self, loan_id: &str) -> CoopResult<()> {
        let idx = self.loan_index(loan_id)?;
        let loan = self.loans[idx].clone();

        let has_disbursement = self.transactions.iter().any(|t| {
            t.kind == TransactionType::LoanApproval && t.reference_id.as_deref() == Some(loan_id)
        });
        if has_disbursement {
            self.add_transaction(
                TransactionType::ManualAdjustment,
                loan.amount,
                format!("Loan annulment - {}", loan.member_name),
                Some(loan.id.clone()),
            );
        }
        if loan.retention_paid {
            self.add_transaction(
                TransactionType::ManualAdjustment,
                -loan.retention_amount,
                format!("Retention reversal on annulment - {}", loan.member_name),
                Some(loan.id.clone()),
            );
        }

        self.transactions
            .retain(|t| t.reference_id.as_deref() != Some(loan_id));
        self.loans.remove(idx);

        let symbol = self.config.currency_symbol.clone();
        self.log_activity(
            ActivityKind::LoanDelete,
            format!("Loan deleted: {} - {symbol}{}", loan.member_name, loan.amount),
            Some(loan.id.clone()),
        );
        self.notifier.notify(
            NotifyKind::Success,
            "Loan deleted",
            Some(&format!("{symbol}{} restored to cash.", loan.amount)),
        );
        Ok(())
    }

    // -- Contributions -------------------------------------------------------

    pub fn add_contribution(&mut self, form: ContributionForm) -> CoopResult<Contribution> {
        let member_idx = self
            .members
            .iter()
            .position(|m| m.id == form.member_id)
            .ok_or_else(|| CoopError::MemberNotFound(form.member_id.clone()))?;
        let due_date = due_date_for_month(&form.month)?;
        let penalty = form.penalty_amount.unwrap_or(Decimal::ZERO);
        if form.share_amount < Decimal::ZERO
            || form.expense_amount < Decimal::ZERO
            || penalty < Decimal::ZERO
        {
            return Err(CoopError::InvalidInput {
                field: "amount".into(),
                reason: "contribution amounts cannot be negative".into(),
            });
        }

        let total = form.share_amount + form.expense_amount + penalty;
        let contribution = Contribution {
            id: Uuid::new_v4().to_string(),
            member_id: form.member_id,
            month: form.month.clone(),
            share_amount: form.share_amount,
            expense_amount: form.expense_amount,
            penalty_amount: penalty,
            total_amount: total,
            status: ContributionStatus::Paid,
            due_date,
            paid_date: Some(self.clock.today()),
            created_at: self.clock.now(),
        };
        self.contributions.push(contribution.clone());

        self.add_transaction(
            TransactionType::Contribution,
            total,
            format!("Contribution - {}", form.month),
            None,
        );

        {
            let now = self.clock.now();
            let member = &mut self.members[member_idx];
            member.total_contributions += total;
            member.current_balance += total;
            member.updated_at = now;
        }

        let symbol = self.config.currency_symbol.clone();
        self.log_activity(
            ActivityKind::ContributionAdd,
            format!("Contribution paid: {} - {symbol}{total}", form.month),
            Some(contribution.id.clone()),
        );
        self.notifier.notify(
            NotifyKind::Success,
            "Contribution paid",
            Some(&format!("Contribution of {symbol}{total} recorded.")),
        );
        Ok(contribution)
    }

    pub fn mark_contribution_paid(&mut self, id: &str) -> CoopResult<Contribution> {
        let today = self.clock.today();
        let idx = self.contribution_index(id)?;
        self.contributions[idx].status = ContributionStatus::Paid;
        self.contributions[idx].paid_date = Some(today);
        let contribution = self.contributions[idx].clone();

        self.add_transaction(
            TransactionType::Contribution,
            contribution.total_amount,
            format!("Contribution - {}", contribution.month),
            None,
        );
        let symbol = self.config.currency_symbol.clone();
        self.log_activity(
            ActivityKind::ContributionPay,
            format!(
                "Contribution paid: {} - {symbol}{}",
                contribution.month, contribution.total_amount
            ),
            Some(contribution.id.clone()),
        );
        self.notifier
            .notify(NotifyKind::Success, "Payment recorded", None);
        Ok(contribution)
    }

    pub fn update_contribution(
        &mut self,
        id: &str,
        share_amount: Money,
        expense_amount: Money,
        penalty_amount: Money,
    ) -> CoopResult<Contribution> {
        let idx = self.contribution_index(id)?;
        {
            let contribution = &mut self.contributions[idx];
            contribution.share_amount = share_amount;
            contribution.expense_amount = expense_amount;
            contribution.penalty_amount = penalty_amount;
            contribution.total_amount = share_amount + expense_amount + penalty_amount;
        }
        let contribution = self.contributions[idx].clone();

        if contribution.status == ContributionStatus::Paid {
            self.recompute_member_contributions(&contribution.member_id);
        }
        self.log_activity(
            ActivityKind::ContributionEdit,
            format!("Contribution edited: {}", contribution.month),
            Some(contribution.id.clone()),
        );
        self.notifier
            .notify(NotifyKind::Success, "Contribution updated", None);
        Ok(contribution)
    }

    pub fn delete_contribution(&mut self, id: &str) -> CoopResult<()> {
        let idx = self.contribution_index(id)?;
        let contribution = self.contributions.remove(idx);

        if contribution.status == ContributionStatus::Paid {
            self.add_transaction(
                TransactionType::ManualAdjustment,
                -contribution.total_amount,
                format!("Reversal of deleted contribution - {}", contribution.month),
                None,
            );
        }
        self.recompute_member_contributions(&contribution.member_id);
        self.log_activity(
            ActivityKind::ContributionDelete,
            format!("Contribution deleted: {}", contribution.month),
            Some(contribution.id),
        );
        self.notifier
            .notify(NotifyKind::Success, "Contribution deleted", None);
        Ok(())
    }

    // -- Expenses ------------------------------------------------------------

    pub fn add_expense(&mut self, form: ExpenseForm) -> CoopResult<Expense> {
        if form.amount <= Decimal::ZERO {
            return Err(CoopError::InvalidInput {
                field: "amount".into(),
                reason: "expense amount must be positive".into(),
            });
        }
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            description: form.description,
            amount: form.amount,
            category: form.category,
            date: form.date,
            notes: form.notes,
            created_at: self.clock.now(),
        };
        self.expenses.push(expense.clone());

        self.add_transaction(
            TransactionType::Expense,
            -expense.amount,
            expense.description.clone(),
            None,
        );
        let symbol = self.config.currency_symbol.clone();
        self.log_activity(
            ActivityKind::ExpenseAdd,
            format!(
                "Expense recorded: {} - {symbol}{}",
                expense.description, expense.amount
            ),
            Some(expense.id.clone()),
        );
        self.notifier.notify(
            NotifyKind::Success,
            "Expense recorded",
            Some(&format!("{symbol}{} recorded as expense.", expense.amount)),
        );
        Ok(expense)
    }

    /// Removes the record only; the expense transaction stays in the ledger.
    pub fn delete_expense(&mut self, id: &str) -> CoopResult<()> {
        let idx = self
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CoopError::NotFound {
                entity: "expense",
                id: id.to_string(),
            })?;
        let expense = self.expenses.remove(idx);
        self.log_activity(
            ActivityKind::ExpenseDelete,
            format!("Expense deleted: {}", expense.description),
            Some(expense.id),
        );
        self.notifier
            .notify(NotifyKind::Success, "Expense deleted", None);
        Ok(())
    }

    // -- Refunds -------------------------------------------------------------

    pub fn add_refund(&mut self, form: RefundForm) -> CoopResult<Refund> {
        let member = self
            .get_member(&form.member_id)
            .ok_or_else(|| CoopError::MemberNotFound(form.member_id.clone()))?;
        let member_name = member.name.clone();
        if form.amount <= Decimal::ZERO {
            return Err(CoopError::InvalidInput {
                field: "amount".into(),
                reason: "refund amount must be positive".into(),
            });
        }

        let refund = Refund {
            id: Uuid::new_v4().to_string(),
            member_id: form.member_id,
            member_name: member_name.clone(),
            reason: form.reason,
            amount: form.amount,
            deposit_date: form.deposit_date,
            created_at: self.clock.now(),
            updated_at: self.clock.now(),
        };
        self.refunds.push(refund.clone());

        self.add_transaction(
            TransactionType::Refund,
            -refund.amount,
            format!("Withdrawal refund - {member_name}: {}", refund.reason),
            None,
        );
        let symbol = self.config.currency_symbol.clone();
        self.log_activity(
            ActivityKind::RefundAdd,
            format!("Refund recorded: {member_name} - {symbol}{}", refund.amount),
            Some(refund.id.clone()),
        );
        self.notifier.notify(
            NotifyKind::Success,
            "Refund recorded",
            Some(&format!("{symbol}{} returned to {member_name}.", refund.amount)),
        );
        Ok(refund)
    }

    pub fn update_refund(&mut self, id: &str, form: RefundForm) -> CoopResult<Refund> {
        let now = self.clock.now();
        let idx = self.refund_index(id)?;
        {
            let refund = &mut self.refunds[idx];
            refund.reason = form.reason;
            refund.amount = form.amount;
            refund.deposit_date = form.deposit_date;
            refund.updated_at = now;
        }
        let refund = self.refunds[idx].clone();
        self.log_activity(
            ActivityKind::RefundEdit,
            format!("Refund updated: {}", refund.member_name),
            Some(refund.id.clone()),
        );
        self.notifier
            .notify(NotifyKind::Success, "Refund updated", None);
        Ok(refund)
    }

    pub fn delete_refund(&mut self, id: &str) -> CoopResult<()> {
        let idx = self.refund_index(id)?;
        let refund = self.refunds.remove(idx);
        self.log_activity(
            ActivityKind::RefundDelete,
            format!("Refund deleted: {}", refund.member_name),
            Some(refund.id),
        );
        self.notifier
            .notify(NotifyKind::Success, "Refund deleted", None);
        Ok(())
    }

    // -- Cashbox and ledger ---------------------------------------------------

    /// Pure append; business validation is the caller's responsibility.
    pub fn add_transaction(
        &mut self,
        kind: TransactionType,
        amount: Money,
        description: impl Into<String>,
        reference_id: Option<String>,
    ) -> Transaction {
        let tx = Transaction::new(
            kind,
            amount,
            description,
            reference_id,
            self.clock.today(),
            self.clock.now(),
        );
        self.transactions.push(tx.clone());
        tx
    }

    pub fn set_cashbox(&mut self, value: Money) {
        self.cashbox = value;
        self.notifier
            .notify(NotifyKind::Success, "Cashbox updated", None);
    }

    /// Adjust the informational cashbox scalar and mirror the movement into
    /// the ledger. A zero adjustment is a no-op.
    pub fn adjust_cashbox(&mut self, amount: Money, description: Option<String>) {
        if amount.is_zero() {
            return;
        }
        self.cashbox += amount;
        let description = description.unwrap_or_else(|| {
            if amount >= Decimal::ZERO {
                "Positive cash adjustment".to_string()
            } else {
                "Negative cash adjustment".to_string()
            }
        });
        self.add_transaction(TransactionType::ManualAdjustment, amount, description, None);
        let symbol = self.config.currency_symbol.clone();
        self.log_activity(
            ActivityKind::CashboxAdjust,
            format!("Cash adjustment: {symbol}{amount}"),
            None,
        );
        self.notifier.notify(
            NotifyKind::Success,
            "Cash adjusted",
            Some(&format!("{symbol}{} applied to the cashbox.", amount.abs())),
        );
    }

    // -- Derived figures ------------------------------------------------------

    pub fn available_cash(&self) -> Money {
        ledger::available_cash(
            &self.transactions,
            &self.contributions,
            self.config.opening_balance,
        )
    }

    /// Carry the current cash position forward as the next year's opening
    /// balance.
    pub fn perform_annual_closing(&mut self) -> Money {
        let balance = self.available_cash();
        self.config.opening_balance = balance;
        self.log_activity(
            ActivityKind::AnnualClosing,
            "Annual accounting closing completed".into(),
            None,
        );
        self.notifier.notify(
            NotifyKind::Success,
            "Closing complete",
            Some("Download a backup now to secure the new opening balance."),
        );
        balance
    }

    /// Years with recorded movements, most recent first, always including
    /// the current and next year.
    pub fn available_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .contributions
            .iter()
            .filter_map(|c| c.month.split('-').next()?.parse().ok())
            .chain(self.transactions.iter().map(|t| t.date.year()))
            .collect();
        let current = self.clock.today().year();
        years.push(current);
        years.push(current + 1);
        years.sort_unstable();
        years.dedup();
        years.reverse();
        years
    }

    // -- Internal helpers -----------------------------------------------------

    fn member_index(&self, id: &str) -> CoopResult<usize> {
        self.members
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| CoopError::MemberNotFound(id.to_string()))
    }

    fn loan_index(&self, id: &str) -> CoopResult<usize> {
        self.loans
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| CoopError::LoanNotFound(id.to_string()))
    }

    fn contribution_index(&self, id: &str) -> CoopResult<usize> {
        self.contributions
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CoopError::NotFound {
                entity: "contribution",
                id: id.to_string(),
            })
    }

    fn refund_index(&self, id: &str) -> CoopResult<usize> {
        self.refunds
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| CoopError::NotFound {
                entity: "refund",
                id: id.to_string(),
            })
    }

    fn invalid_state(&self, idx: usize, operation: &'static str) -> CoopError {
        CoopError::InvalidLoanState {
            loan_id: self.loans[idx].id.clone(),
            status: self.loans[idx].status.as_str().to_string(),
            operation,
        }
    }

    fn recompute_member_contributions(&mut self, member_id: &str) {
        let total = ledger::member_contribution_total(&self.contributions, member_id);
        let now = self.clock.now();
        if let Some(member) = self.members.iter_mut().find(|m| m.id == member_id) {
            member.total_contributions = total;
            member.updated_at = now;
        }
    }

    fn log_activity(
        &mut self,
        kind: ActivityKind,
        description: String,
        reference_id: Option<String>,
    ) {
        self.activities.push(ActivityLog {
            id: Uuid::new_v4().to_string(),
            kind,
            description,
            details: None,
            reference_id,
            timestamp: self.clock.now(),
        });
    }
}

fn load_collection<T: DeserializeOwned + Default>(
    storage: &dyn Storage,
    key: &str,
) -> CoopResult<T> {
    match storage.get(key)? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(T::default()),
    }
}

fn store_collection<T: Serialize>(
    storage: &mut dyn Storage,
    key: &str,
    value: &T,
) -> CoopResult<()> {
    storage.set(key, serde_json::to_value(value)?)
}
