pub mod activity;
pub mod amortization;
pub mod backup;
pub mod clock;
pub mod config;
pub mod contribution;
pub mod cooperative;
pub mod error;
pub mod expense;
pub mod ledger;
pub mod loan;
pub mod member;
pub mod money;
pub mod notify;
pub mod refund;
pub mod storage;
pub mod types;

pub use cooperative::Cooperative;
pub use error::CoopError;
pub use types::*;

/// Standard result type for all cooperative operations
pub type CoopResult<T> = Result<T, CoopError>;
