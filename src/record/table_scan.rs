use super::{layout::Layout, record_page::RecordPage, rid::Rid, schema::FieldType};
use crate::{
    error::DbError,
    query::{
        constant::Constant,
        scan::{Scan, UpdateScan},
    },
    tx::transaction::Transaction,
    unlock,
};
use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};

/// TableScan is the cursor over a table's physical records. It walks the
/// table file block by block, skipping empty slots; `insert` claims the next
/// free slot, appending a block when the file is full.
pub struct TableScan {
    tx: Arc<Mutex<Transaction>>,
    layout: Arc<Layout>,
    record_page: Option<RecordPage>,
    file_name: String,
    current_slot: i32,
}

impl TableScan {
    pub fn new(
        tx: Arc<Mutex<Transaction>>,
        table_name: impl Into<String>,
        layout: Arc<Layout>,
    ) -> Result<Self> {
        let file_name = table_name.into() + ".tbl";
        let mut scan = Self {
            tx: tx.clone(),
            layout,
            record_page: None,
            file_name: file_name.clone(),
            current_slot: -1,
        };

        if unlock!(tx).size(&file_name)? == 0 {
            scan.move_to_new_block()?;
        } else {
            scan.move_to_block(0)?;
        }
        Ok(scan)
    }

    fn move_to_block(&mut self, block_num: i32) -> Result<()> {
        self.release_page();
        let block = crate::file::block::BlockId::new(self.file_name.clone(), block_num);
        self.record_page = Some(RecordPage::new(self.tx.clone(), block, self.layout.clone())?);
        self.current_slot = -1;
        Ok(())
    }

    fn move_to_new_block(&mut self) -> Result<()> {
        self.release_page();
        let block = unlock!(self.tx).append(&self.file_name)?;
        let mut record_page = RecordPage::new(self.tx.clone(), block, self.layout.clone())?;
        record_page.format()?;
        self.record_page = Some(record_page);
        self.current_slot = -1;
        Ok(())
    }

    fn release_page(&mut self) {
        if let Some(record_page) = self.record_page.take() {
            unlock!(self.tx).unpin(record_page.block());
        }
    }

    fn at_last_block(&mut self) -> Result<bool> {
        let last = unlock!(self.tx).size(&self.file_name)? - 1;
        Ok(self.page()?.block().num == last)
    }

    fn page(&self) -> Result<&RecordPage> {
        self.record_page
            .as_ref()
            .ok_or_else(|| anyhow!("table scan is closed"))
    }

    fn page_mut(&mut self) -> Result<&mut RecordPage> {
        self.record_page
            .as_mut()
            .ok_or_else(|| anyhow!("table scan is closed"))
    }

    fn check_field(&self, field_name: &str, field_type: FieldType) -> Result<()> {
        match self.layout.schema.field_type(field_name) {
            Some(actual) if actual == field_type => Ok(()),
            Some(actual) => Err(DbError::TypeMismatch(
                format!("{:?}", field_type),
                format!("{:?}", actual),
            )
            .into()),
            None => Err(DbError::FieldAccess(field_name.to_string()).into()),
        }
    }
}

impl Scan for TableScan {
    fn before_first(&mut self) -> Result<()> {
        self.move_to_block(0)
    }

    fn next(&mut self) -> Result<bool> {
        loop {
            self.current_slot = self.page()?.next_after(self.current_slot)?;
            if self.current_slot >= 0 {
                return Ok(true);
            }
            if self.at_last_block()? {
                // park past the last slot so exhaustion is sticky
                self.current_slot = self.page()?.slot_count();
                return Ok(false);
            }
            let next_block = self.page()?.block().num + 1;
            self.move_to_block(next_block)?;
        }
    }

    fn get_int(&mut self, field_name: &str) -> Result<i32> {
        self.check_field(field_name, FieldType::Integer)?;
        let slot = self.current_slot;
        self.page()?.get_int(slot, field_name)
    }

    fn get_string(&mut self, field_name: &str) -> Result<String> {
        self.check_field(field_name, FieldType::Varchar)?;
        let slot = self.current_slot;
        self.page()?.get_string(slot, field_name)
    }

    fn get_value(&mut self, field_name: &str) -> Result<Constant> {
        match self.layout.schema.field_type(field_name) {
            Some(FieldType::Integer) => Ok(Constant::Int(self.get_int(field_name)?)),
            Some(FieldType::Varchar) => Ok(Constant::String(self.get_string(field_name)?)),
            None => Err(DbError::FieldAccess(field_name.to_string()).into()),
        }
    }

    fn has_field(&self, field_name: &str) -> bool {
        self.layout.schema.has_field(field_name)
    }

    fn close(&mut self) {
        self.release_page();
    }

    fn as_update_scan(&mut self) -> Option<&mut dyn UpdateScan> {
        Some(self)
    }
}

impl UpdateScan for TableScan {
    fn set_int(&mut self, field_name: &str, value: i32) -> Result<()> {
        self.check_field(field_name, FieldType::Integer)?;
        let slot = self.current_slot;
        self.page_mut()?.set_int(slot, field_name, value)
    }

    fn set_string(&mut self, field_name: &str, value: &str) -> Result<()> {
        self.check_field(field_name, FieldType::Varchar)?;
        let slot = self.current_slot;
        self.page_mut()?.set_string(slot, field_name, value)
    }

    fn set_value(&mut self, field_name: &str, value: Constant) -> Result<()> {
        match value {
            Constant::Int(value) => self.set_int(field_name, value),
            Constant::String(value) => self.set_string(field_name, &value),
        }
    }

    /// Positions the scan at the next free slot, extending the file when
    /// every block is full.
    fn insert(&mut self) -> Result<()> {
        loop {
            let slot = self.current_slot;
            self.current_slot = self.page_mut()?.insert_after(slot)?;
            if self.current_slot >= 0 {
                return Ok(());
            }
            if self.at_last_block()? {
                self.move_to_new_block()?;
            } else {
                let next_block = self.page()?.block().num + 1;
                self.move_to_block(next_block)?;
            }
        }
    }

    fn delete(&mut self) -> Result<()> {
        let slot = self.current_slot;
        self.page_mut()?.delete(slot)
    }

    fn get_rid(&mut self) -> Result<Rid> {
        Ok(Rid::new(self.page()?.block().num, self.current_slot))
    }

    fn move_to_rid(&mut self, rid: Rid) -> Result<()> {
        self.move_to_block(rid.block_num)?;
        self.current_slot = rid.slot;
        Ok(())
    }
}

impl Drop for TableScan {
    fn drop(&mut self) {
        self.release_page();
    }
}
