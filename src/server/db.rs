use crate::{
    buffer::buffer_manager::BufferManager,
    file::file_manager::FileManager,
    log::log_manager::LogManager,
    metadata::metadata_manager::MetadataManager,
    tx::{concurrency::lock_table::LockTable, transaction::Transaction},
    LOG_FILE,
};
use anyhow::Result;
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing::debug;

/// TinyRel wires the storage layers together. One instance per database
/// directory; transactions created from it share the file, log and buffer
/// managers and a single lock table.
pub struct TinyRel {
    pub file_manager: Arc<Mutex<FileManager>>,
    pub log_manager: Arc<Mutex<LogManager>>,
    pub buffer_manager: Arc<Mutex<BufferManager>>,
    pub lock_table: Arc<Mutex<LockTable>>,
}

impl TinyRel {
    pub fn new(dir: impl Into<PathBuf>, block_size: i32, pool_size: usize) -> Result<Self> {
        let file_manager = Arc::new(Mutex::new(FileManager::new(dir, block_size)?));
        let log_manager = Arc::new(Mutex::new(LogManager::new(
            file_manager.clone(),
            LOG_FILE.to_string(),
        )?));
        let buffer_manager = Arc::new(Mutex::new(BufferManager::new(
            file_manager.clone(),
            log_manager.clone(),
            pool_size,
        )));
        debug!(block_size, pool_size, "database started");
        Ok(Self {
            file_manager,
            log_manager,
            buffer_manager,
            lock_table: Arc::new(Mutex::new(LockTable::default())),
        })
    }

    pub fn is_new(&self) -> bool {
        self.file_manager.lock().unwrap().is_new
    }

    pub fn transaction(&self) -> Result<Arc<Mutex<Transaction>>> {
        let tx = Transaction::new(
            self.file_manager.clone(),
            self.log_manager.clone(),
            self.buffer_manager.clone(),
            self.lock_table.clone(),
        )?;
        Ok(Arc::new(Mutex::new(tx)))
    }

    /// Opens the catalog, creating it first if the database is new.
    /// Existing databases are recovered before the catalog is read.
    pub fn metadata_manager(&self, tx: Arc<Mutex<Transaction>>) -> Result<MetadataManager> {
        let is_new = self.is_new();
        if !is_new {
            tx.lock().unwrap().recover()?;
        }
        MetadataManager::new(is_new, tx)
    }
}
