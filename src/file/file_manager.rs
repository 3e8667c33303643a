use super::{block::BlockId, page::Page};
use anyhow::Result;
use std::{
    collections::HashMap,
    fs::{create_dir_all, read_dir, File, OpenOptions},
    io::{Read as _, Seek as _, Write as _},
    path::PathBuf,
};

/// FileManager reads and writes pages at block granularity.
/// Files live in a single database directory; leftover temp files from an
/// earlier run are removed on startup.
pub struct FileManager {
    pub db_dir: PathBuf,
    pub block_size: i32,
    pub is_new: bool,
    open_files: HashMap<String, File>,
}

impl FileManager {
    pub fn new(db_dir: impl Into<PathBuf>, block_size: i32) -> Result<Self> {
        let db_dir = db_dir.into();
        let is_new = !db_dir.exists();
        if is_new {
            create_dir_all(&db_dir)?;
        } else {
            for entry in read_dir(&db_dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.is_file() && entry.file_name().to_string_lossy().starts_with("temp") {
                    std::fs::remove_file(&path)?;
                }
            }
        }

        Ok(FileManager {
            db_dir,
            block_size,
            is_new,
            open_files: HashMap::new(),
        })
    }

    pub fn read(&mut self, block: &BlockId, page: &mut Page) -> Result<()> {
        let offset = block.num * self.block_size;
        let mut file = self.get_file(&block.filename)?;
        file.seek(std::io::SeekFrom::Start(offset as u64))?;
        // a short read leaves the rest of the page zeroed
        let _ = file.read(page.contents_mut())?;
        Ok(())
    }

    pub fn write(&mut self, block: &BlockId, page: &Page) -> Result<()> {
        let offset = block.num * self.block_size;
        let mut file = self.get_file(&block.filename)?;
        file.seek(std::io::SeekFrom::Start(offset as u64))?;
        file.write_all(page.contents())?;
        Ok(())
    }

    /// Extends the file with one zeroed block and returns its id.
    pub fn append_block(&mut self, filename: &str) -> Result<BlockId> {
        let block = BlockId::new(filename, self.block_count(filename)?);
        let offset = block.num * self.block_size;
        let bytes = vec![0; self.block_size as usize];
        let mut file = self.get_file(filename)?;
        file.seek(std::io::SeekFrom::Start(offset as u64))?;
        file.write_all(&bytes)?;
        Ok(block)
    }

    pub fn block_count(&mut self, filename: &str) -> Result<i32> {
        let file = self.get_file(filename)?;
        Ok((file.metadata()?.len() / self.block_size as u64) as i32)
    }

    fn get_file(&mut self, filename: &str) -> Result<&File> {
        if !self.open_files.contains_key(filename) {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(self.db_dir.join(filename))?;
            self.open_files.insert(filename.to_string(), file);
        }
        self.open_files
            .get(filename)
            .ok_or_else(|| anyhow::anyhow!("cannot open file {}", filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn should_can_new_file_manager() {
        let tempdir = tempdir().unwrap();
        let dir = tempdir.path().join("db");
        let file_manager = FileManager::new(&dir, 32).unwrap();
        assert_eq!(file_manager.db_dir, dir);
        assert_eq!(file_manager.block_size, 32);
        assert!(file_manager.is_new);
    }

    #[test]
    fn should_remove_temp_file() {
        let tempdir = tempdir().unwrap();
        let tmpfile = tempdir.path().join("temp_stuff");
        File::create(&tmpfile).unwrap();
        FileManager::new(tempdir.path(), 32).unwrap();
        assert!(!tmpfile.exists());
    }

    #[test]
    fn should_can_append_block() {
        let tempdir = tempdir().unwrap();
        let mut file_manager = FileManager::new(tempdir.path(), 32).unwrap();
        let block = file_manager.append_block("test").unwrap();
        assert_eq!(block.num, 0);
        let block = file_manager.append_block("test").unwrap();
        assert_eq!(block.num, 1);
        assert_eq!(file_manager.block_count("test").unwrap(), 2);
    }

    #[test]
    fn should_can_write_and_read_back() {
        let tempdir = tempdir().unwrap();
        let mut file_manager = FileManager::new(tempdir.path(), 32).unwrap();
        let block = file_manager.append_block("test").unwrap();

        let mut page = Page::new(32);
        page.set_string(4, "hello");
        file_manager.write(&block, &page).unwrap();

        let mut read_back = Page::new(32);
        file_manager.read(&block, &mut read_back).unwrap();
        assert_eq!(read_back.get_string(4).unwrap(), "hello");
    }
}
