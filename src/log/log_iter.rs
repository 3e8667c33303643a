use crate::file::{block::BlockId, file_manager::FileManager, page::Page};
use crate::I32_SIZE;
use anyhow::Result;
use std::sync::{Arc, Mutex};

/// LogIterator walks log records from the newest block back to block 0.
/// Within a block it reads forward from the boundary, which yields records
/// newest first because the log manager writes them right to left.
pub struct LogIterator {
    file_manager: Arc<Mutex<FileManager>>,
    block: BlockId,
    page: Page,
    current_pos: i32,
    block_size: i32,
}

impl LogIterator {
    pub fn new(file_manager: Arc<Mutex<FileManager>>, block: BlockId) -> Result<Self> {
        let block_size = file_manager.lock().unwrap().block_size;
        let mut iter = Self {
            file_manager,
            block: block.clone(),
            page: Page::new(block_size),
            current_pos: 0,
            block_size,
        };
        iter.move_to_block(block)?;
        Ok(iter)
    }

    fn move_to_block(&mut self, block: BlockId) -> Result<()> {
        self.file_manager
            .lock()
            .unwrap()
            .read(&block, &mut self.page)?;
        self.current_pos = self.page.get_int(0);
        self.block = block;
        Ok(())
    }
}

impl Iterator for LogIterator {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_pos >= self.block_size {
            if self.block.num == 0 {
                return None;
            }
            let previous = BlockId::new(self.block.filename.clone(), self.block.num - 1);
            self.move_to_block(previous).ok()?;
            if self.current_pos >= self.block_size {
                return None;
            }
        }
        let record = self.page.get_bytes(self.current_pos).to_vec();
        self.current_pos += I32_SIZE as i32 + record.len() as i32;
        Some(record)
    }
}
