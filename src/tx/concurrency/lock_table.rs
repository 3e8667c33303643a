use crate::file::block::BlockId;
use anyhow::{bail, Result};
use std::{
    collections::HashMap,
    time::{Duration, SystemTime},
};

const MAX_WAIT: Duration = Duration::from_secs(10);
const RETRY_INTERVAL: Duration = Duration::from_millis(20);

/// LockTable tracks block-level locks across all transactions.
/// A positive entry counts shared locks; -1 marks an exclusive lock.
/// A request that cannot be granted within the timeout is treated as a
/// deadlock.
#[derive(Default)]
pub struct LockTable {
    locks: HashMap<BlockId, i32>,
}

impl LockTable {
    pub fn s_lock(&mut self, block: &BlockId) -> Result<()> {
        let start = SystemTime::now();
        while self.has_x_lock(block) && !Self::waiting_too_long(start) {
            std::thread::sleep(RETRY_INTERVAL);
        }
        if self.has_x_lock(block) {
            bail!("deadlock while waiting for slock on {}", block);
        }
        let value = self.lock_value(block);
        self.locks.insert(block.clone(), value + 1);
        Ok(())
    }

    /// The caller is expected to already hold a shared lock on the block,
    /// so "one shared lock" means nobody else is reading it.
    pub fn x_lock(&mut self, block: &BlockId) -> Result<()> {
        let start = SystemTime::now();
        while self.has_other_s_lock(block) && !Self::waiting_too_long(start) {
            std::thread::sleep(RETRY_INTERVAL);
        }
        if self.has_other_s_lock(block) {
            bail!("deadlock while waiting for xlock on {}", block);
        }
        self.locks.insert(block.clone(), -1);
        Ok(())
    }

    pub fn unlock(&mut self, block: &BlockId) {
        let value = self.lock_value(block);
        if value > 1 {
            self.locks.insert(block.clone(), value - 1);
        } else {
            self.locks.remove(block);
        }
    }

    fn has_x_lock(&self, block: &BlockId) -> bool {
        self.lock_value(block) < 0
    }

    fn has_other_s_lock(&self, block: &BlockId) -> bool {
        self.lock_value(block) > 1
    }

    fn waiting_too_long(start: SystemTime) -> bool {
        SystemTime::now()
            .duration_since(start)
            .map(|elapsed| elapsed > MAX_WAIT)
            .unwrap_or(true)
    }

    fn lock_value(&self, block: &BlockId) -> i32 {
        self.locks.get(block).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_can_share_s_locks() {
        let mut table = LockTable::default();
        let block = BlockId::new("test", 0);
        table.s_lock(&block).unwrap();
        table.s_lock(&block).unwrap();
        assert_eq!(table.lock_value(&block), 2);
    }

    #[test]
    fn should_can_unlock() {
        let mut table = LockTable::default();
        let block = BlockId::new("test", 0);
        table.s_lock(&block).unwrap();
        table.s_lock(&block).unwrap();
        table.unlock(&block);
        assert_eq!(table.lock_value(&block), 1);
        table.unlock(&block);
        assert_eq!(table.lock_value(&block), 0);
    }

    #[test]
    fn should_can_upgrade_own_s_lock() {
        let mut table = LockTable::default();
        let block = BlockId::new("test", 0);
        table.s_lock(&block).unwrap();
        // only our own shared lock is held, so the upgrade succeeds
        table.x_lock(&block).unwrap();
        assert_eq!(table.lock_value(&block), -1);
    }
}
