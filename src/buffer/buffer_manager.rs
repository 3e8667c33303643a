use super::buffer::Buffer;
use crate::{
    file::{block::BlockId, file_manager::FileManager},
    log::log_manager::LogManager,
};
use anyhow::{bail, Result};
use std::{
    sync::{Arc, Mutex},
    time::{Duration, SystemTime},
};

const MAX_WAIT: Duration = Duration::from_secs(10);
const RETRY_INTERVAL: Duration = Duration::from_millis(20);

/// BufferManager owns the buffer pool. Pinning waits for an unpinned buffer
/// up to a timeout; replacement picks the first unpinned buffer.
pub struct BufferManager {
    buffer_pool: Vec<Arc<Mutex<Buffer>>>,
    pub num_available: usize,
}

impl BufferManager {
    pub fn new(
        file_manager: Arc<Mutex<FileManager>>,
        log_manager: Arc<Mutex<LogManager>>,
        num_buffers: usize,
    ) -> Self {
        let buffer_pool = (0..num_buffers)
            .map(|_| {
                Arc::new(Mutex::new(Buffer::new(
                    file_manager.clone(),
                    log_manager.clone(),
                )))
            })
            .collect();
        Self {
            buffer_pool,
            num_available: num_buffers,
        }
    }

    /// Flushes every buffer dirtied by the given transaction.
    pub fn flush_all(&mut self, tx_num: i32) -> Result<()> {
        for buffer in &self.buffer_pool {
            let mut buffer = buffer.lock().unwrap();
            if buffer.modifying_tx() == tx_num {
                buffer.flush()?;
            }
        }
        Ok(())
    }

    pub fn unpin(&mut self, buffer: Arc<Mutex<Buffer>>) {
        let mut buffer = buffer.lock().unwrap();
        buffer.unpin();
        if !buffer.is_pinned() {
            self.num_available += 1;
        }
    }

    pub fn pin(&mut self, block: &BlockId) -> Result<Arc<Mutex<Buffer>>> {
        let start = SystemTime::now();
        loop {
            if let Some(buffer) = self.try_pin(block)? {
                return Ok(buffer);
            }
            if Self::waiting_too_long(start) {
                bail!("no buffer available for {}", block);
            }
            std::thread::sleep(RETRY_INTERVAL);
        }
    }

    fn try_pin(&mut self, block: &BlockId) -> Result<Option<Arc<Mutex<Buffer>>>> {
        let buffer = match self.find_existing_buffer(block) {
            Some(buffer) => buffer,
            None => {
                let Some(buffer) = self.choose_unpinned_buffer() else {
                    return Ok(None);
                };
                buffer.lock().unwrap().assign_to_block(block)?;
                buffer
            }
        };

        let mut locked = buffer.lock().unwrap();
        if !locked.is_pinned() {
            self.num_available -= 1;
        }
        locked.pin();
        drop(locked);

        Ok(Some(buffer))
    }

    fn waiting_too_long(start: SystemTime) -> bool {
        SystemTime::now()
            .duration_since(start)
            .map(|elapsed| elapsed > MAX_WAIT)
            .unwrap_or(true)
    }

    fn find_existing_buffer(&self, block: &BlockId) -> Option<Arc<Mutex<Buffer>>> {
        self.buffer_pool
            .iter()
            .find(|buffer| buffer.lock().unwrap().block() == Some(block))
            .cloned()
    }

    fn choose_unpinned_buffer(&self) -> Option<Arc<Mutex<Buffer>>> {
        self.buffer_pool
            .iter()
            .find(|buffer| !buffer.lock().unwrap().is_pinned())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn new_buffer_manager(dir: &std::path::Path, num_buffers: usize) -> BufferManager {
        let file_manager = Arc::new(Mutex::new(FileManager::new(dir, 32).unwrap()));
        let log_manager = Arc::new(Mutex::new(
            LogManager::new(file_manager.clone(), "log".to_string()).unwrap(),
        ));
        BufferManager::new(file_manager, log_manager, num_buffers)
    }

    #[test]
    fn should_can_pin_and_unpin() {
        let tempdir = tempdir().unwrap();
        let mut bm = new_buffer_manager(tempdir.path(), 3);

        let block = BlockId::new("test", 0);
        let buffer = bm.pin(&block).unwrap();
        assert_eq!(bm.num_available, 2);

        bm.unpin(buffer);
        assert_eq!(bm.num_available, 3);
    }

    #[test]
    fn should_reuse_buffer_for_same_block() {
        let tempdir = tempdir().unwrap();
        let mut bm = new_buffer_manager(tempdir.path(), 3);

        let block = BlockId::new("test", 0);
        let b1 = bm.pin(&block).unwrap();
        let b2 = bm.pin(&block).unwrap();
        assert!(Arc::ptr_eq(&b1, &b2));
        assert_eq!(bm.num_available, 2);
    }
}
