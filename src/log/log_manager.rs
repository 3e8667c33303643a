use super::log_iter::LogIterator;
use crate::file::{block::BlockId, file_manager::FileManager, page::Page};
use anyhow::Result;
use std::sync::{Arc, Mutex};

/// LogManager appends records to the log file.
///
/// Records are placed right to left within a block; the first 4 bytes of the
/// block hold the boundary, the offset of the most recently written record:
///
/// ```text
///                              block
/// ┌──────────┬───┬───────────────────┬────────────┬────────────┐
/// │ boundary │...│    free space     │  record 2  │  record 1  │
/// └──────────┴───┴───────────────────┴────────────┴────────────┘
///      ┃                             ▲
///      ┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛
/// ```
///
/// Writing backwards lets [`LogIterator`] return records newest first, which
/// is the order recovery wants them in.
pub struct LogManager {
    file_manager: Arc<Mutex<FileManager>>,
    log_file: String,
    log_page: Page,
    current_block: BlockId,
    // lsn is the log sequence number, a unique identifier for each record
    latest_lsn: i32,
    last_saved_lsn: i32,
}

impl LogManager {
    pub fn new(file_manager: Arc<Mutex<FileManager>>, log_file: String) -> Result<Self> {
        let mut fm = file_manager.lock().unwrap();
        let mut log_page = Page::new(fm.block_size);
        let block_count = fm.block_count(&log_file)?;
        let current_block = if block_count == 0 {
            Self::append_new_block(&mut fm, &mut log_page, &log_file)?
        } else {
            // pick up where the previous run left off
            let block = BlockId::new(log_file.clone(), block_count - 1);
            fm.read(&block, &mut log_page)?;
            block
        };
        drop(fm);

        Ok(Self {
            file_manager,
            log_file,
            log_page,
            current_block,
            latest_lsn: 0,
            last_saved_lsn: 0,
        })
    }

    /// Appends a record and returns its lsn. The record is only guaranteed to
    /// be on disk after a call to [`LogManager::flush`] with that lsn.
    pub fn append(&mut self, record: &[u8]) -> Result<i32> {
        let mut boundary = self.log_page.get_int(0);
        let bytes_needed = record.len() as i32 + crate::I32_SIZE as i32;
        if boundary - bytes_needed < crate::I32_SIZE as i32 {
            // no room left, move to a fresh block
            self.inner_flush()?;
            self.current_block = Self::append_new_block(
                &mut self.file_manager.lock().unwrap(),
                &mut self.log_page,
                &self.log_file,
            )?;
            boundary = self.log_page.get_int(0);
        }
        let record_pos = boundary - bytes_needed;
        self.log_page.set_bytes(record_pos, record);
        self.log_page.set_int(0, record_pos);
        self.latest_lsn += 1;
        Ok(self.latest_lsn)
    }

    /// Forces the log to disk if the given lsn has not been saved yet.
    pub fn flush(&mut self, lsn: i32) -> Result<()> {
        if lsn >= self.last_saved_lsn {
            self.inner_flush()?;
        }
        Ok(())
    }

    /// Iterates the log newest record first.
    pub fn iter(&mut self) -> Result<LogIterator> {
        self.inner_flush()?;
        LogIterator::new(self.file_manager.clone(), self.current_block.clone())
    }

    fn inner_flush(&mut self) -> Result<()> {
        self.file_manager
            .lock()
            .unwrap()
            .write(&self.current_block, &self.log_page)?;
        self.last_saved_lsn = self.latest_lsn;
        Ok(())
    }

    fn append_new_block(
        file_manager: &mut FileManager,
        log_page: &mut Page,
        log_file: &str,
    ) -> Result<BlockId> {
        let block = file_manager.append_block(log_file)?;
        *log_page = Page::new(file_manager.block_size);
        // an empty block's boundary sits at the end of the block
        log_page.set_int(0, file_manager.block_size);
        file_manager.write(&block, log_page)?;
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn new_log_manager(dir: &std::path::Path, block_size: i32) -> LogManager {
        let file_manager = Arc::new(Mutex::new(FileManager::new(dir, block_size).unwrap()));
        LogManager::new(file_manager, "log".to_string()).unwrap()
    }

    #[test]
    fn should_can_new_log_manager() {
        let tempdir = tempdir().unwrap();
        let log_manager = new_log_manager(tempdir.path(), 32);
        assert_eq!(log_manager.current_block, BlockId::new("log", 0));
        assert_eq!(log_manager.log_page.get_int(0), 32);
    }

    #[test]
    fn should_can_append_record() {
        let tempdir = tempdir().unwrap();
        let mut log_manager = new_log_manager(tempdir.path(), 32);
        let lsn = log_manager.append(b"hello").unwrap();
        assert_eq!(lsn, 1);
        // 32 - (5 + 4) = 23
        assert_eq!(log_manager.log_page.get_int(0), 23);
    }

    #[test]
    fn should_can_iterate_newest_first() {
        let tempdir = tempdir().unwrap();
        let mut log_manager = new_log_manager(tempdir.path(), 32);
        log_manager.append(b"first").unwrap();
        log_manager.append(b"second").unwrap();
        let mut iter = log_manager.iter().unwrap();
        assert_eq!(iter.next().unwrap(), b"second");
        assert_eq!(iter.next().unwrap(), b"first");
        assert!(iter.next().is_none());
    }

    #[test]
    fn should_can_spill_to_new_block() {
        let tempdir = tempdir().unwrap();
        let mut log_manager = new_log_manager(tempdir.path(), 32);
        for i in 0..10 {
            log_manager.append(format!("record-{}", i).as_bytes()).unwrap();
        }
        assert!(log_manager.current_block.num > 0);
        let records: Vec<Vec<u8>> = log_manager.iter().unwrap().collect();
        assert_eq!(records.len(), 10);
        assert_eq!(records[0], b"record-9");
        assert_eq!(records[9], b"record-0");
    }
}
