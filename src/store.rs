//! Repository interfaces the core reads and writes through, plus in-memory
//! implementations used by tests and the CLI.
//!
//! Lifecycle mutations are read-modify-write sequences: callers must
//! serialize them per record (the in-memory stores only guarantee that
//! individual reads and writes are atomic). A real repository should use the
//! record's `version` counter for an optimistic check on write, or wrap the
//! read-validate-write sequence in a transaction with at least snapshot
//! isolation.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::model::{Flag, LifecycleRecord};

/// Read/write access to flag snapshots, with rules and experiment groups
/// populated inline.
pub trait FlagStore: Send + Sync {
    fn find_by_key(&self, key: &str) -> Option<Flag>;
    fn find_by_id(&self, id: &str) -> Option<Flag>;
    fn save(&self, flag: Flag) -> Flag;
    fn delete(&self, id: &str) -> Option<Flag>;
    fn all(&self) -> Vec<Flag>;
}

/// Read/write access to lifecycle records. `save` bumps the record's
/// `version` counter.
pub trait LifecycleStore: Send + Sync {
    fn find_by_id(&self, id: &str) -> Option<LifecycleRecord>;
    fn find_by_flag_id(&self, flag_id: &str) -> Option<LifecycleRecord>;
    fn save(&self, record: LifecycleRecord) -> LifecycleRecord;
    fn delete_by_flag_id(&self, flag_id: &str) -> Option<LifecycleRecord>;
    fn all(&self) -> Vec<LifecycleRecord>;
}

/// In-memory flag storage backed by a `RwLock<HashMap>`, keyed by flag id.
#[derive(Default)]
pub struct InMemoryFlagStore {
    flags: RwLock<HashMap<String, Flag>>,
}

impl InMemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for InMemoryFlagStore {
    fn find_by_key(&self, key: &str) -> Option<Flag> {
        let flags = self.flags.read().unwrap();
        flags.values().find(|f| f.key == key).cloned()
    }

    fn find_by_id(&self, id: &str) -> Option<Flag> {
        let flags = self.flags.read().unwrap();
        flags.get(id).cloned()
    }

    fn save(&self, flag: Flag) -> Flag {
        let mut flags = self.flags.write().unwrap();
        flags.insert(flag.id.clone(), flag.clone());
        flag
    }

    fn delete(&self, id: &str) -> Option<Flag> {
        let mut flags = self.flags.write().unwrap();
        flags.remove(id)
    }

    fn all(&self) -> Vec<Flag> {
        let flags = self.flags.read().unwrap();
        let mut out: Vec<Flag> = flags.values().cloned().collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }
}

/// In-memory lifecycle storage backed by a `RwLock<HashMap>`, keyed by
/// record id.
#[derive(Default)]
pub struct InMemoryLifecycleStore {
    records: RwLock<HashMap<String, LifecycleRecord>>,
}

impl InMemoryLifecycleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LifecycleStore for InMemoryLifecycleStore {
    fn find_by_id(&self, id: &str) -> Option<LifecycleRecord> {
        let records = self.records.read().unwrap();
        records.get(id).cloned()
    }

    fn find_by_flag_id(&self, flag_id: &str) -> Option<LifecycleRecord> {
        let records = self.records.read().unwrap();
        records.values().find(|r| r.flag_id == flag_id).cloned()
    }

    fn save(&self, mut record: LifecycleRecord) -> LifecycleRecord {
        let mut records = self.records.write().unwrap();
        record.version += 1;
        records.insert(record.id.clone(), record.clone());
        record
    }

    fn delete_by_flag_id(&self, flag_id: &str) -> Option<LifecycleRecord> {
        let mut records = self.records.write().unwrap();
        let id = records
            .values()
            .find(|r| r.flag_id == flag_id)
            .map(|r| r.id.clone())?;
        records.remove(&id)
    }

    fn all(&self) -> Vec<LifecycleRecord> {
        let records = self.records.read().unwrap();
        let mut out: Vec<LifecycleRecord> = records.values().cloned().collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_flag_store_roundtrip() {
        let store = InMemoryFlagStore::new();
        store.save(Flag::new("f1", "checkout", "New checkout"));
        assert!(store.find_by_key("checkout").is_some());
        assert!(store.find_by_id("f1").is_some());
        assert!(store.find_by_key("missing").is_none());
        assert_eq!(store.all().len(), 1);

        store.delete("f1");
        assert!(store.find_by_key("checkout").is_none());
    }

    #[test]
    fn test_lifecycle_store_save_bumps_version() {
        let store = InMemoryLifecycleStore::new();
        let record = LifecycleRecord::new("lc-1", "f1", Utc::now());
        assert_eq!(record.version, 0);

        let saved = store.save(record);
        assert_eq!(saved.version, 1);

        let saved = store.save(saved);
        assert_eq!(saved.version, 2);
        assert_eq!(store.find_by_id("lc-1").unwrap().version, 2);
    }

    #[test]
    fn test_lifecycle_store_find_by_flag_id() {
        let store = InMemoryLifecycleStore::new();
        store.save(LifecycleRecord::new("lc-1", "f1", Utc::now()));
        store.save(LifecycleRecord::new("lc-2", "f2", Utc::now()));

        assert_eq!(store.find_by_flag_id("f2").unwrap().id, "lc-2");
        assert!(store.find_by_flag_id("f3").is_none());

        store.delete_by_flag_id("f1");
        assert!(store.find_by_id("lc-1").is_none());
    }
}
