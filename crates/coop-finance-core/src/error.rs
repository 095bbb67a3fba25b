use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoopError {
    #[error("Invalid loan terms: {field}: {reason}")]
    InvalidLoanTerms { field: String, reason: String },

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("Loan not found: {0}")]
    LoanNotFound(String),

    #[error("No {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Cannot {operation} loan {loan_id} while it is {status}")]
    InvalidLoanState {
        loan_id: String,
        status: String,
        operation: &'static str,
    },

    #[error("Payment of {requested} exceeds remaining principal of {remaining}")]
    ExcessivePayment {
        requested: Decimal,
        remaining: Decimal,
    },

    #[error("Invalid backup format: {0}")]
    InvalidBackupFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CoopError {
    fn from(e: serde_json::Error) -> Self {
        CoopError::Serialization(e.to_string())
    }
}
