pub mod backup;
pub mod contributions;
pub mod expenses;
pub mod loans;
pub mod members;
pub mod quote;
pub mod report;
