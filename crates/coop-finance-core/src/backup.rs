//! JSON backup export and import.
//!
//! The backup is one document carrying every collection. Import is
//! all-or-nothing: the structure is validated before any state is replaced.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::activity::ActivityLog;
use crate::config::CoopConfig;
use crate::contribution::Contribution;
use crate::cooperative::Cooperative;
use crate::expense::Expense;
use crate::ledger::Transaction;
use crate::loan::Loan;
use crate::member::Member;
use crate::refund::Refund;
use crate::types::Money;
use crate::{CoopError, CoopResult};

pub const BACKUP_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub config: CoopConfig,
    pub members: Vec<Member>,
    pub loans: Vec<Loan>,
    pub contributions: Vec<Contribution>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub refunds: Vec<Refund>,
    #[serde(default)]
    pub activities: Vec<ActivityLog>,
    #[serde(default)]
    pub cashbox: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<NaiveDate>,
    #[serde(default)]
    pub version: String,
}

/// Structural check: `config` plus the three core arrays must be present.
/// Everything else defaults.
fn validate_structure(raw: &Value) -> CoopResult<()> {
    let object = raw
        .as_object()
        .ok_or_else(|| CoopError::InvalidBackupFormat("document is not a JSON object".into()))?;

    if !object.get("config").is_some_and(Value::is_object) {
        return Err(CoopError::InvalidBackupFormat(
            "missing 'config' object".into(),
        ));
    }
    for field in ["members", "loans", "contributions"] {
        if !object.get(field).is_some_and(Value::is_array) {
            return Err(CoopError::InvalidBackupFormat(format!(
                "missing '{field}' array"
            )));
        }
    }
    Ok(())
}

impl Cooperative {
    pub fn export_backup(&self) -> BackupDocument {
        BackupDocument {
            config: self.config.clone(),
            members: self.members.clone(),
            loans: self.loans.clone(),
            contributions: self.contributions.clone(),
            expenses: self.expenses.clone(),
            transactions: self.transactions.clone(),
            refunds: self.refunds.clone(),
            activities: self.activities.clone(),
            cashbox: self.cashbox,
            export_date: Some(self.clock.today()),
            version: BACKUP_VERSION.to_string(),
        }
    }

    /// Replace the whole aggregate with the backup's contents. The current
    /// state is untouched when the document fails validation.
    pub fn import_backup(&mut self, json: &str) -> CoopResult<()> {
        let raw: Value = serde_json::from_str(json)
            .map_err(|e| CoopError::InvalidBackupFormat(e.to_string()))?;
        validate_structure(&raw)?;
        let document: BackupDocument = serde_json::from_value(raw)
            .map_err(|e| CoopError::InvalidBackupFormat(e.to_string()))?;

        self.config = document.config;
        self.members = document.members;
        self.loans = document.loans;
        self.contributions = document.contributions;
        self.expenses = document.expenses;
        self.transactions = document.transactions;
        self.refunds = document.refunds;
        self.activities = document.activities;
        self.cashbox = document.cashbox;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::member::MemberForm;

    fn member_form() -> MemberForm {
        MemberForm {
            name: "Ana".to_string(),
            phone: "555-0100".to_string(),
            join_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut coop = Cooperative::new();
        coop.add_member(member_form());
        coop.adjust_cashbox(dec!(40), None);

        let json = serde_json::to_string(&coop.export_backup()).unwrap();

        let mut restored = Cooperative::new();
        restored.import_backup(&json).unwrap();
        assert_eq!(restored.members().len(), 1);
        assert_eq!(restored.cashbox(), dec!(40));
        assert_eq!(restored.available_cash(), coop.available_cash());
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        let mut coop = Cooperative::new();
        coop.add_member(member_form());

        let err = coop.import_backup(r#"{"config": {}, "members": []}"#).unwrap_err();
        match err {
            CoopError::InvalidBackupFormat(reason) => assert!(reason.contains("loans")),
            other => panic!("Expected InvalidBackupFormat, got {other:?}"),
        }
        // Prior state survives a failed import.
        assert_eq!(coop.members().len(), 1);
    }

    #[test]
    fn test_non_object_document_rejected() {
        let mut coop = Cooperative::new();
        assert!(coop.import_backup("[1,2,3]").is_err());
        assert!(coop.import_backup("not json").is_err());
    }

    #[test]
    fn test_optional_collections_default_empty() {
        let mut coop = Cooperative::new();
        coop.import_backup(
            r#"{"config": {}, "members": [], "loans": [], "contributions": []}"#,
        )
        .unwrap();
        assert!(coop.transactions().is_empty());
        assert_eq!(coop.cashbox(), dec!(0));
    }
}
