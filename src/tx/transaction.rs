use super::{
    buffer_list::BufferList,
    concurrency::{concurrency_manager::ConcurrencyManager, lock_table::LockTable},
    recovery::recovery_manager::RecoveryManager,
};
use crate::{
    buffer::buffer_manager::BufferManager,
    file::{block::BlockId, file_manager::FileManager},
    log::log_manager::LogManager,
};
use anyhow::{bail, Result};
use std::sync::{
    atomic::{AtomicI32, Ordering},
    Arc, Mutex,
};
use tracing::debug;

static NEXT_TX_NUM: AtomicI32 = AtomicI32::new(0);

/// Transaction gives typed, logged, lock-protected access to blocks.
/// Reads take a shared lock on the block, writes an exclusive lock; all
/// locks are held until commit or rollback.
#[derive(Clone)]
pub struct Transaction {
    recovery_manager: Arc<Mutex<RecoveryManager>>,
    concurrency_manager: ConcurrencyManager,
    buffer_manager: Arc<Mutex<BufferManager>>,
    file_manager: Arc<Mutex<FileManager>>,
    buffer_list: Arc<Mutex<BufferList>>,
    tx_num: i32,
}

impl Transaction {
    pub fn new(
        file_manager: Arc<Mutex<FileManager>>,
        log_manager: Arc<Mutex<LogManager>>,
        buffer_manager: Arc<Mutex<BufferManager>>,
        lock_table: Arc<Mutex<LockTable>>,
    ) -> Result<Self> {
        let tx_num = NEXT_TX_NUM.fetch_add(1, Ordering::SeqCst);
        let recovery_manager = Arc::new(Mutex::new(RecoveryManager::new(
            tx_num,
            log_manager,
            buffer_manager.clone(),
        )?));
        let buffer_list = Arc::new(Mutex::new(BufferList::new(buffer_manager.clone())));
        Ok(Self {
            recovery_manager,
            concurrency_manager: ConcurrencyManager::new(lock_table),
            buffer_manager,
            file_manager,
            buffer_list,
            tx_num,
        })
    }

    pub fn commit(&mut self) -> Result<()> {
        self.recovery_manager.lock().unwrap().commit()?;
        debug!(tx_num = self.tx_num, "transaction committed");
        self.concurrency_manager.release();
        self.buffer_list.lock().unwrap().unpin_all();
        Ok(())
    }

    pub fn rollback(&mut self) -> Result<()> {
        let recovery_manager = self.recovery_manager.clone();
        recovery_manager.lock().unwrap().rollback(self)?;
        debug!(tx_num = self.tx_num, "transaction rolled back");
        self.concurrency_manager.release();
        self.buffer_list.lock().unwrap().unpin_all();
        Ok(())
    }

    /// Rolls back every transaction that was in flight when the database
    /// last stopped. Run once at startup, before any other transaction.
    pub fn recover(&mut self) -> Result<()> {
        self.buffer_manager.lock().unwrap().flush_all(self.tx_num)?;
        let recovery_manager = self.recovery_manager.clone();
        recovery_manager.lock().unwrap().recover(self)?;
        // undo took exclusive locks on the restored blocks
        self.concurrency_manager.release();
        self.buffer_list.lock().unwrap().unpin_all();
        Ok(())
    }

    pub fn pin(&mut self, block: &BlockId) -> Result<()> {
        self.buffer_list.lock().unwrap().pin(block)
    }

    pub fn unpin(&mut self, block: &BlockId) {
        self.buffer_list.lock().unwrap().unpin(block);
    }

    pub fn get_int(&mut self, block: &BlockId, offset: i32) -> Result<i32> {
        self.concurrency_manager.s_lock(block)?;
        let buffer_list = self.buffer_list.lock().unwrap();
        let Some(buffer) = buffer_list.get_buffer(block) else {
            bail!("block {} is not pinned", block);
        };
        let buffer = buffer.lock().unwrap();
        Ok(buffer.contents().get_int(offset))
    }

    pub fn get_string(&mut self, block: &BlockId, offset: i32) -> Result<String> {
        self.concurrency_manager.s_lock(block)?;
        let buffer_list = self.buffer_list.lock().unwrap();
        let Some(buffer) = buffer_list.get_buffer(block) else {
            bail!("block {} is not pinned", block);
        };
        let buffer = buffer.lock().unwrap();
        buffer.contents().get_string(offset)
    }

    pub fn set_int(
        &mut self,
        block: &BlockId,
        offset: i32,
        value: i32,
        ok_to_log: bool,
    ) -> Result<()> {
        self.concurrency_manager.x_lock(block)?;
        let buffer_list = self.buffer_list.lock().unwrap();
        let Some(buffer) = buffer_list.get_buffer(block) else {
            bail!("block {} is not pinned", block);
        };
        let mut buffer = buffer.lock().unwrap();
        let mut lsn = -1;
        if ok_to_log {
            lsn = self
                .recovery_manager
                .lock()
                .unwrap()
                .set_int(&mut buffer, offset)?;
        }
        buffer.contents_mut().set_int(offset, value);
        buffer.set_modified(self.tx_num, lsn);
        Ok(())
    }

    pub fn set_string(
        &mut self,
        block: &BlockId,
        offset: i32,
        value: &str,
        ok_to_log: bool,
    ) -> Result<()> {
        self.concurrency_manager.x_lock(block)?;
        let buffer_list = self.buffer_list.lock().unwrap();
        let Some(buffer) = buffer_list.get_buffer(block) else {
            bail!("block {} is not pinned", block);
        };
        let mut buffer = buffer.lock().unwrap();
        let mut lsn = -1;
        if ok_to_log {
            lsn = self
                .recovery_manager
                .lock()
                .unwrap()
                .set_string(&mut buffer, offset)?;
        }
        buffer.contents_mut().set_string(offset, value);
        buffer.set_modified(self.tx_num, lsn);
        Ok(())
    }

    /// Number of blocks in the file. Takes a shared lock on a dummy
    /// end-of-file block so the count cannot change underneath us.
    pub fn size(&mut self, filename: &str) -> Result<i32> {
        let dummy_block = BlockId::new(filename, -1);
        self.concurrency_manager.s_lock(&dummy_block)?;
        self.file_manager.lock().unwrap().block_count(filename)
    }

    /// Extends the file by one block. Exclusive lock on the dummy block
    /// keeps two transactions from appending at the same position.
    pub fn append(&mut self, filename: &str) -> Result<BlockId> {
        let dummy_block = BlockId::new(filename, -1);
        self.concurrency_manager.x_lock(&dummy_block)?;
        self.file_manager.lock().unwrap().append_block(filename)
    }

    pub fn block_size(&self) -> i32 {
        self.file_manager.lock().unwrap().block_size
    }

    pub fn available_buffers(&self) -> usize {
        self.buffer_manager.lock().unwrap().num_available
    }
}
