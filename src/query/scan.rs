use super::constant::Constant;
use crate::record::rid::Rid;
use anyhow::Result;

/// Scan is a forward-only cursor over the records produced by a plan.
///
/// A fresh scan is positioned before its first record; `next` advances and
/// reports whether a record is current. Once `next` returns false it keeps
/// returning false until `before_first` rewinds the scan. `close` releases
/// the underlying transactional resources and is safe to call more than
/// once.
pub trait Scan {
    fn before_first(&mut self) -> Result<()>;
    fn next(&mut self) -> Result<bool>;
    fn get_int(&mut self, field_name: &str) -> Result<i32>;
    fn get_string(&mut self, field_name: &str) -> Result<String>;
    fn get_value(&mut self, field_name: &str) -> Result<Constant>;
    fn has_field(&self, field_name: &str) -> bool;
    fn close(&mut self);

    /// Scans backed by stored records can also be written through.
    fn as_update_scan(&mut self) -> Option<&mut dyn UpdateScan> {
        None
    }
}

pub trait UpdateScan: Scan {
    fn set_int(&mut self, field_name: &str, value: i32) -> Result<()>;
    fn set_string(&mut self, field_name: &str, value: &str) -> Result<()>;
    fn set_value(&mut self, field_name: &str, value: Constant) -> Result<()>;
    /// Positions the scan at a free slot for a new record.
    fn insert(&mut self) -> Result<()>;
    fn delete(&mut self) -> Result<()>;
    fn get_rid(&mut self) -> Result<Rid>;
    fn move_to_rid(&mut self, rid: Rid) -> Result<()>;
}
