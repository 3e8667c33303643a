use super::lock_table::LockTable;
use crate::file::block::BlockId;
use anyhow::Result;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum LockType {
    Shared,
    Exclusive,
}

/// ConcurrencyManager is one transaction's view of the shared lock table.
/// It remembers which locks the transaction already holds so they are not
/// re-acquired, and releases all of them at commit or rollback.
#[derive(Clone)]
pub struct ConcurrencyManager {
    lock_table: Arc<Mutex<LockTable>>,
    locks: HashMap<BlockId, LockType>,
}

impl ConcurrencyManager {
    pub fn new(lock_table: Arc<Mutex<LockTable>>) -> Self {
        Self {
            lock_table,
            locks: HashMap::new(),
        }
    }

    pub fn s_lock(&mut self, block: &BlockId) -> Result<()> {
        if !self.locks.contains_key(block) {
            self.lock_table.lock().unwrap().s_lock(block)?;
            self.locks.insert(block.clone(), LockType::Shared);
        }
        Ok(())
    }

    /// Takes the shared lock first; holding it guarantees no other
    /// transaction sneaks in between the check and the upgrade.
    pub fn x_lock(&mut self, block: &BlockId) -> Result<()> {
        if !self.has_x_lock(block) {
            self.s_lock(block)?;
            self.lock_table.lock().unwrap().x_lock(block)?;
            self.locks.insert(block.clone(), LockType::Exclusive);
        }
        Ok(())
    }

    pub fn release(&mut self) {
        let mut lock_table = self.lock_table.lock().unwrap();
        for block in self.locks.keys() {
            lock_table.unlock(block);
        }
        self.locks.clear();
    }

    fn has_x_lock(&self, block: &BlockId) -> bool {
        self.locks.get(block) == Some(&LockType::Exclusive)
    }
}
