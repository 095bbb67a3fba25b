use std::collections::HashMap;

use serde_json::Value;

use crate::CoopResult;

/// Collection keys the core persists under.
pub mod keys {
    pub const CONFIG: &str = "config";
    pub const MEMBERS: &str = "members";
    pub const LOANS: &str = "loans";
    pub const CONTRIBUTIONS: &str = "contributions";
    pub const EXPENSES: &str = "expenses";
    pub const TRANSACTIONS: &str = "transactions";
    pub const REFUNDS: &str = "refunds";
    pub const ACTIVITIES: &str = "activities";
    pub const CASHBOX: &str = "cashbox";
}

/// Whole-collection persistence. The core never writes incrementally: on any
/// mutation the caller persists entire collections, and an in-memory change
/// may precede its durable flush.
pub trait Storage {
    fn get(&self, key: &str) -> CoopResult<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> CoopResult<()>;
    fn clear(&mut self) -> CoopResult<()>;
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, Value>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> CoopResult<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> CoopResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn clear(&mut self) -> CoopResult<()> {
        self.entries.clear();
        Ok(())
    }
}
