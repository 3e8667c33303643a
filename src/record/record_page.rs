use super::{layout::Layout, schema::FieldType};
use crate::{error::DbError, file::block::BlockId, tx::transaction::Transaction, unlock};
use anyhow::Result;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotFlag {
    Empty,
    Used,
}

impl From<SlotFlag> for i32 {
    fn from(flag: SlotFlag) -> i32 {
        match flag {
            SlotFlag::Empty => 0,
            SlotFlag::Used => 1,
        }
    }
}

/// RecordPage arranges one block as a sequence of fixed-size slots,
/// one record per slot:
///
/// ```text
///                       slot 0                          slot 1 ...
/// ┏━━━━━━━━━━━━━━━━━━━━━━━┻━━━━━━━━━━━━━━━━━━━━━━┳━━━━━━━┻━━━━━━━┓
/// ┌───────────┬─────────────┬────────────────────┬───────────────┐
/// │ 0 0 0 1   │  0 0 0 6    │ 0 0 0 5 h e l l o  │      ...      │
/// └───────────┴─────────────┴────────────────────┴───────────────┘
/// ┗━━━━━┳━━━━━┻━━━━━━┳━━━━━━┻━━━━━━━━━┳━━━━━━━━━━┛
///     flag        integer         varchar(5)
/// (0: empty, 1: used)
/// ```
pub struct RecordPage {
    tx: Arc<Mutex<Transaction>>,
    block: BlockId,
    layout: Arc<Layout>,
}

impl RecordPage {
    /// Pins the block for the lifetime of the page. The caller unpins it.
    pub fn new(tx: Arc<Mutex<Transaction>>, block: BlockId, layout: Arc<Layout>) -> Result<Self> {
        unlock!(tx).pin(&block)?;
        Ok(Self { tx, block, layout })
    }

    pub fn block(&self) -> &BlockId {
        &self.block
    }

    pub fn get_int(&self, slot: i32, field_name: &str) -> Result<i32> {
        let field_pos = self.field_pos(slot, field_name)?;
        unlock!(self.tx).get_int(&self.block, field_pos)
    }

    pub fn get_string(&self, slot: i32, field_name: &str) -> Result<String> {
        let field_pos = self.field_pos(slot, field_name)?;
        unlock!(self.tx).get_string(&self.block, field_pos)
    }

    pub fn set_int(&mut self, slot: i32, field_name: &str, value: i32) -> Result<()> {
        let field_pos = self.field_pos(slot, field_name)?;
        unlock!(self.tx).set_int(&self.block, field_pos, value, true)
    }

    pub fn set_string(&mut self, slot: i32, field_name: &str, value: &str) -> Result<()> {
        let field_pos = self.field_pos(slot, field_name)?;
        unlock!(self.tx).set_string(&self.block, field_pos, value, true)
    }

    pub fn delete(&mut self, slot: i32) -> Result<()> {
        self.set_flag(slot, SlotFlag::Empty)
    }

    /// Marks every slot empty and zeroes the fields. Not logged; used only
    /// on freshly appended blocks.
    pub fn format(&mut self) -> Result<()> {
        let mut slot = 0;
        while self.is_valid_slot(slot) {
            let mut tx = unlock!(self.tx);
            tx.set_int(&self.block, self.offset(slot), SlotFlag::Empty.into(), false)?;
            for field_name in &self.layout.schema.fields {
                let field_pos = self.offset(slot)
                    + self
                        .layout
                        .offset(field_name)
                        .ok_or_else(|| DbError::CatalogLookup(field_name.clone()))?;
                match self.layout.schema.field_type(field_name) {
                    Some(FieldType::Integer) => tx.set_int(&self.block, field_pos, 0, false)?,
                    Some(FieldType::Varchar) => tx.set_string(&self.block, field_pos, "", false)?,
                    None => return Err(DbError::CatalogLookup(field_name.clone()).into()),
                }
            }
            slot += 1;
        }
        Ok(())
    }

    /// Next used slot after the given one, or -1.
    pub fn next_after(&self, slot: i32) -> Result<i32> {
        self.search_after(slot, SlotFlag::Used)
    }

    /// Claims the next empty slot after the given one, or returns -1 when
    /// the block is full.
    pub fn insert_after(&mut self, slot: i32) -> Result<i32> {
        let new_slot = self.search_after(slot, SlotFlag::Empty)?;
        if new_slot >= 0 {
            self.set_flag(new_slot, SlotFlag::Used)?;
        }
        Ok(new_slot)
    }

    pub fn is_valid_slot(&self, slot: i32) -> bool {
        self.offset(slot + 1) <= unlock!(self.tx).block_size()
    }

    /// First slot index past the end of the block.
    pub fn slot_count(&self) -> i32 {
        unlock!(self.tx).block_size() / self.layout.slot_size
    }

    fn set_flag(&mut self, slot: i32, flag: SlotFlag) -> Result<()> {
        unlock!(self.tx).set_int(&self.block, self.offset(slot), flag.into(), true)
    }

    fn search_after(&self, slot: i32, flag: SlotFlag) -> Result<i32> {
        let mut slot = slot + 1;
        while self.is_valid_slot(slot) {
            if self.get_flag(slot)? == i32::from(flag) {
                return Ok(slot);
            }
            slot += 1;
        }
        Ok(-1)
    }

    fn get_flag(&self, slot: i32) -> Result<i32> {
        unlock!(self.tx).get_int(&self.block, self.offset(slot))
    }

    fn field_pos(&self, slot: i32, field_name: &str) -> Result<i32> {
        let field_offset = self
            .layout
            .offset(field_name)
            .ok_or_else(|| DbError::FieldAccess(field_name.to_string()))?;
        Ok(self.offset(slot) + field_offset)
    }

    fn offset(&self, slot: i32) -> i32 {
        self.layout.slot_size * slot
    }
}
