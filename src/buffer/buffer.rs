use crate::{
    file::{block::BlockId, file_manager::FileManager, page::Page},
    log::log_manager::LogManager,
};
use anyhow::Result;
use std::sync::{Arc, Mutex};

/// Buffer holds one page of a block in memory together with its pin count
/// and, when dirty, the transaction that modified it.
pub struct Buffer {
    file_manager: Arc<Mutex<FileManager>>,
    log_manager: Arc<Mutex<LogManager>>,
    contents: Page,
    block: Option<BlockId>,
    pins: i32,
    // -1 while the page is clean
    tx_num: i32,
    lsn: i32,
}

impl Buffer {
    pub fn new(file_manager: Arc<Mutex<FileManager>>, log_manager: Arc<Mutex<LogManager>>) -> Self {
        let block_size = file_manager.lock().unwrap().block_size;
        Self {
            file_manager,
            log_manager,
            contents: Page::new(block_size),
            block: None,
            pins: 0,
            tx_num: -1,
            lsn: -1,
        }
    }

    pub fn contents(&self) -> &Page {
        &self.contents
    }

    pub fn contents_mut(&mut self) -> &mut Page {
        &mut self.contents
    }

    pub fn block(&self) -> Option<&BlockId> {
        self.block.as_ref()
    }

    pub fn set_modified(&mut self, tx_num: i32, lsn: i32) {
        self.tx_num = tx_num;
        if lsn >= 0 {
            self.lsn = lsn;
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.pins > 0
    }

    pub fn modifying_tx(&self) -> i32 {
        self.tx_num
    }

    /// Reassigns this buffer to a block, flushing any dirty contents first.
    pub fn assign_to_block(&mut self, block: &BlockId) -> Result<()> {
        self.flush()?;
        self.file_manager
            .lock()
            .unwrap()
            .read(block, &mut self.contents)?;
        self.block = Some(block.clone());
        self.pins = 0;
        Ok(())
    }

    /// Writes the page back if dirty. The matching log record goes out first
    /// (write-ahead rule).
    pub fn flush(&mut self) -> Result<()> {
        if self.tx_num >= 0 {
            self.log_manager.lock().unwrap().flush(self.lsn)?;
            if let Some(block) = &self.block {
                self.file_manager.lock().unwrap().write(block, &self.contents)?;
            }
            self.tx_num = -1;
        }
        Ok(())
    }

    pub fn pin(&mut self) {
        self.pins += 1;
    }

    pub fn unpin(&mut self) {
        self.pins -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn new_managers(
        dir: &std::path::Path,
    ) -> (Arc<Mutex<FileManager>>, Arc<Mutex<LogManager>>) {
        let file_manager = Arc::new(Mutex::new(FileManager::new(dir, 32).unwrap()));
        let log_manager = Arc::new(Mutex::new(
            LogManager::new(file_manager.clone(), "log".to_string()).unwrap(),
        ));
        (file_manager, log_manager)
    }

    #[test]
    fn should_can_new_buffer() {
        let tempdir = tempdir().unwrap();
        let (file_manager, log_manager) = new_managers(tempdir.path());
        let buffer = Buffer::new(file_manager, log_manager);
        assert_eq!(buffer.contents().contents().len(), 32);
        assert_eq!(buffer.block(), None);
        assert!(!buffer.is_pinned());
    }

    #[test]
    fn should_flush_survives_reassignment() {
        let tempdir = tempdir().unwrap();
        let (file_manager, log_manager) = new_managers(tempdir.path());
        let block = BlockId::new("test", 0);

        let mut buffer = Buffer::new(file_manager.clone(), log_manager.clone());
        buffer.assign_to_block(&block).unwrap();
        buffer.contents_mut().set_string(0, "hello");
        buffer.set_modified(0, -1);
        buffer.flush().unwrap();

        let mut other = Buffer::new(file_manager, log_manager);
        other.assign_to_block(&block).unwrap();
        assert_eq!(other.contents().get_string(0).unwrap(), "hello");
    }
}
