use crate::{
    file::{block::BlockId, page::Page},
    log::log_manager::LogManager,
    tx::transaction::Transaction,
    I32_SIZE,
};
use anyhow::{bail, Result};

const CHECKPOINT: i32 = 0;
const START: i32 = 1;
const COMMIT: i32 = 2;
const ROLLBACK: i32 = 3;
const SET_INT: i32 = 4;
const SET_STRING: i32 = 5;

/// LogRecord is one entry in the write-ahead log. Update records carry the
/// old value so they can be undone.
///
/// On disk each record starts with a 4-byte operation code; update records
/// follow with transaction number, file name, block number, offset and the
/// old value.
#[derive(Debug, PartialEq, Eq)]
pub enum LogRecord {
    Checkpoint,
    Start(i32),
    Commit(i32),
    Rollback(i32),
    SetInt {
        tx_num: i32,
        block: BlockId,
        offset: i32,
        old_value: i32,
    },
    SetString {
        tx_num: i32,
        block: BlockId,
        offset: i32,
        old_value: String,
    },
}

impl LogRecord {
    pub fn from_bytes(bytes: &[u8]) -> Result<LogRecord> {
        let page = Page::from(bytes.to_vec());
        let int = I32_SIZE as i32;
        let op = page.get_int(0);
        match op {
            CHECKPOINT => Ok(Self::Checkpoint),
            START => Ok(Self::Start(page.get_int(int))),
            COMMIT => Ok(Self::Commit(page.get_int(int))),
            ROLLBACK => Ok(Self::Rollback(page.get_int(int))),
            SET_INT | SET_STRING => {
                let tx_num = page.get_int(int);
                let filename = page.get_string(2 * int)?;
                let block_pos = 2 * int + Page::max_length(filename.len() as i32);
                let block = BlockId::new(filename, page.get_int(block_pos));
                let offset = page.get_int(block_pos + int);
                let value_pos = block_pos + 2 * int;
                if op == SET_INT {
                    Ok(Self::SetInt {
                        tx_num,
                        block,
                        offset,
                        old_value: page.get_int(value_pos),
                    })
                } else {
                    Ok(Self::SetString {
                        tx_num,
                        block,
                        offset,
                        old_value: page.get_string(value_pos)?,
                    })
                }
            }
            _ => bail!("unknown log record op {}", op),
        }
    }

    /// Serializes the record, appends it to the log and returns its lsn.
    pub fn write_to_log(&self, log_manager: &mut LogManager) -> Result<i32> {
        let int = I32_SIZE as i32;
        let page = match self {
            Self::Checkpoint => {
                let mut page = Page::new(int);
                page.set_int(0, CHECKPOINT);
                page
            }
            Self::Start(tx_num) | Self::Commit(tx_num) | Self::Rollback(tx_num) => {
                let mut page = Page::new(2 * int);
                page.set_int(0, self.op());
                page.set_int(int, *tx_num);
                page
            }
            Self::SetInt {
                tx_num,
                block,
                offset,
                old_value,
            } => {
                let block_pos = 2 * int + Page::max_length(block.filename.len() as i32);
                let mut page = Page::new(block_pos + 3 * int);
                page.set_int(0, SET_INT);
                page.set_int(int, *tx_num);
                page.set_string(2 * int, &block.filename);
                page.set_int(block_pos, block.num);
                page.set_int(block_pos + int, *offset);
                page.set_int(block_pos + 2 * int, *old_value);
                page
            }
            Self::SetString {
                tx_num,
                block,
                offset,
                old_value,
            } => {
                let block_pos = 2 * int + Page::max_length(block.filename.len() as i32);
                let value_pos = block_pos + 2 * int;
                let mut page = Page::new(value_pos + Page::max_length(old_value.len() as i32));
                page.set_int(0, SET_STRING);
                page.set_int(int, *tx_num);
                page.set_string(2 * int, &block.filename);
                page.set_int(block_pos, block.num);
                page.set_int(block_pos + int, *offset);
                page.set_string(value_pos, old_value);
                page
            }
        };
        log_manager.append(page.contents())
    }

    pub fn tx_number(&self) -> i32 {
        match self {
            Self::Checkpoint => -1,
            Self::Start(tx_num) | Self::Commit(tx_num) | Self::Rollback(tx_num) => *tx_num,
            Self::SetInt { tx_num, .. } | Self::SetString { tx_num, .. } => *tx_num,
        }
    }

    /// Restores the old value of an update record. Restores are not logged.
    pub fn undo(&self, tx: &mut Transaction) -> Result<()> {
        match self {
            Self::SetInt {
                block,
                offset,
                old_value,
                ..
            } => {
                tx.pin(block)?;
                tx.set_int(block, *offset, *old_value, false)?;
                tx.unpin(block);
            }
            Self::SetString {
                block,
                offset,
                old_value,
                ..
            } => {
                tx.pin(block)?;
                tx.set_string(block, *offset, old_value, false)?;
                tx.unpin(block);
            }
            _ => {}
        }
        Ok(())
    }

    fn op(&self) -> i32 {
        match self {
            Self::Checkpoint => CHECKPOINT,
            Self::Start(_) => START,
            Self::Commit(_) => COMMIT,
            Self::Rollback(_) => ROLLBACK,
            Self::SetInt { .. } => SET_INT,
            Self::SetString { .. } => SET_STRING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::file_manager::FileManager;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    fn roundtrip(record: LogRecord) {
        let tempdir = tempdir().unwrap();
        let file_manager = Arc::new(Mutex::new(FileManager::new(tempdir.path(), 400).unwrap()));
        let mut log_manager = LogManager::new(file_manager, "log".to_string()).unwrap();

        record.write_to_log(&mut log_manager).unwrap();
        let bytes = log_manager.iter().unwrap().next().unwrap();
        assert_eq!(LogRecord::from_bytes(&bytes).unwrap(), record);
    }

    #[test]
    fn should_can_roundtrip_checkpoint() {
        roundtrip(LogRecord::Checkpoint);
    }

    #[test]
    fn should_can_roundtrip_start() {
        roundtrip(LogRecord::Start(7));
    }

    #[test]
    fn should_can_roundtrip_set_int() {
        roundtrip(LogRecord::SetInt {
            tx_num: 3,
            block: BlockId::new("student.tbl", 2),
            offset: 16,
            old_value: 1990,
        });
    }

    #[test]
    fn should_can_roundtrip_set_string() {
        roundtrip(LogRecord::SetString {
            tx_num: 3,
            block: BlockId::new("student.tbl", 2),
            offset: 16,
            old_value: "sname_10".to_string(),
        });
    }
}
