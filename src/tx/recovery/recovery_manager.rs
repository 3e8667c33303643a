use super::log_record::LogRecord;
use crate::{
    buffer::{buffer::Buffer, buffer_manager::BufferManager},
    log::log_manager::LogManager,
    tx::transaction::Transaction,
};
use anyhow::{anyhow, Result};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

/// RecoveryManager implements undo-only recovery for one transaction.
/// Every update logs its old value before the page is changed; rollback and
/// recovery replay the log newest first and put the old values back.
pub struct RecoveryManager {
    log_manager: Arc<Mutex<LogManager>>,
    buffer_manager: Arc<Mutex<BufferManager>>,
    tx_num: i32,
}

impl RecoveryManager {
    pub fn new(
        tx_num: i32,
        log_manager: Arc<Mutex<LogManager>>,
        buffer_manager: Arc<Mutex<BufferManager>>,
    ) -> Result<Self> {
        LogRecord::Start(tx_num).write_to_log(&mut log_manager.lock().unwrap())?;
        Ok(Self {
            log_manager,
            buffer_manager,
            tx_num,
        })
    }

    /// Logs the value about to be overwritten; returns the record's lsn.
    pub fn set_int(&self, buffer: &mut Buffer, offset: i32) -> Result<i32> {
        let old_value = buffer.contents().get_int(offset);
        let block = buffer
            .block()
            .ok_or_else(|| anyhow!("buffer is not assigned to a block"))?
            .clone();
        let record = LogRecord::SetInt {
            tx_num: self.tx_num,
            block,
            offset,
            old_value,
        };
        record.write_to_log(&mut self.log_manager.lock().unwrap())
    }

    pub fn set_string(&self, buffer: &mut Buffer, offset: i32) -> Result<i32> {
        let old_value = buffer.contents().get_string(offset)?;
        let block = buffer
            .block()
            .ok_or_else(|| anyhow!("buffer is not assigned to a block"))?
            .clone();
        let record = LogRecord::SetString {
            tx_num: self.tx_num,
            block,
            offset,
            old_value,
        };
        record.write_to_log(&mut self.log_manager.lock().unwrap())
    }

    pub fn commit(&mut self) -> Result<()> {
        self.buffer_manager.lock().unwrap().flush_all(self.tx_num)?;
        let mut log_manager = self.log_manager.lock().unwrap();
        let lsn = LogRecord::Commit(self.tx_num).write_to_log(&mut log_manager)?;
        log_manager.flush(lsn)
    }

    pub fn rollback(&mut self, tx: &mut Transaction) -> Result<()> {
        self.do_rollback(tx)?;
        self.buffer_manager.lock().unwrap().flush_all(self.tx_num)?;
        let mut log_manager = self.log_manager.lock().unwrap();
        let lsn = LogRecord::Rollback(self.tx_num).write_to_log(&mut log_manager)?;
        log_manager.flush(lsn)
    }

    pub fn recover(&mut self, tx: &mut Transaction) -> Result<()> {
        self.do_recover(tx)?;
        self.buffer_manager.lock().unwrap().flush_all(self.tx_num)?;
        let mut log_manager = self.log_manager.lock().unwrap();
        let lsn = LogRecord::Checkpoint.write_to_log(&mut log_manager)?;
        log_manager.flush(lsn)
    }

    /// Undoes this transaction's updates, newest first, stopping at its
    /// start record.
    fn do_rollback(&mut self, tx: &mut Transaction) -> Result<()> {
        let iter = self.log_manager.lock().unwrap().iter()?;
        for bytes in iter {
            let record = LogRecord::from_bytes(&bytes)?;
            if record.tx_number() == self.tx_num {
                if let LogRecord::Start(_) = record {
                    break;
                }
                record.undo(tx)?;
            }
        }
        Ok(())
    }

    /// Undoes every update belonging to a transaction that never committed
    /// or rolled back, stopping at the last checkpoint.
    fn do_recover(&mut self, tx: &mut Transaction) -> Result<()> {
        let mut finished = HashSet::new();
        let iter = self.log_manager.lock().unwrap().iter()?;
        for bytes in iter {
            let record = LogRecord::from_bytes(&bytes)?;
            match record {
                LogRecord::Checkpoint => break,
                LogRecord::Commit(tx_num) | LogRecord::Rollback(tx_num) => {
                    finished.insert(tx_num);
                }
                _ => {
                    if !finished.contains(&record.tx_number()) {
                        record.undo(tx)?;
                    }
                }
            }
        }
        Ok(())
    }
}
