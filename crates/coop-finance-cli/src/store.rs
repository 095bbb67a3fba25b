use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use coop_finance_core::clock::SystemClock;
use coop_finance_core::storage::Storage;
use coop_finance_core::{CoopResult, Cooperative};

use crate::term::TermNotifier;

/// Collections persisted as one JSON object in a single state file. Sets are
/// in-memory; [`FileStore::save`] flushes the whole document, matching the
/// core's whole-collection persistence contract.
pub struct FileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl FileStore {
    pub fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let entries = if path.exists() {
            let contents = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read '{}': {e}", path.display()))?;
            match serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse '{}': {e}", path.display()))?
            {
                Value::Object(map) => map,
                _ => return Err(format!("'{}' is not a JSON object", path.display()).into()),
            }
        } else {
            Map::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let contents = serde_json::to_string_pretty(&Value::Object(self.entries.clone()))?;
        fs::write(&self.path, contents)
            .map_err(|e| format!("Failed to write '{}': {e}", self.path.display()))?;
        Ok(())
    }
}

impl Storage for FileStore {
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

/// Open the state file and hydrate the aggregate with terminal collaborators.
pub fn load(path: &Path) -> Result<(Cooperative, FileStore), Box<dyn std::error::Error>> {
    let store = FileStore::open(path)?;
    let coop = Cooperative::load(&store, Box::new(SystemClock), Box::new(TermNotifier))?;
    Ok((coop, store))
}

/// Persist the aggregate and flush the state file.
pub fn save(coop: &Cooperative, store: &mut FileStore) -> Result<(), Box<dyn std::error::Error>> {
    coop.persist(store)?;
    store.save()
}
