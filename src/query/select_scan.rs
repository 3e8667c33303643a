use super::{
    constant::Constant,
    predicate::Predicate,
    scan::{Scan, UpdateScan},
};
use crate::record::rid::Rid;
use anyhow::{anyhow, Result};

/// SelectScan filters an underlying scan, advancing it until the predicate
/// matches. Updates pass through when the underlying scan is updatable.
pub struct SelectScan {
    scan: Box<dyn Scan>,
    pred: Predicate,
}

impl SelectScan {
    pub fn new(scan: Box<dyn Scan>, pred: Predicate) -> SelectScan {
        SelectScan { scan, pred }
    }

    fn update_scan(&mut self) -> Result<&mut dyn UpdateScan> {
        self.scan
            .as_update_scan()
            .ok_or_else(|| anyhow!("underlying scan is not updatable"))
    }
}

impl Scan for SelectScan {
    fn before_first(&mut self) -> Result<()> {
        self.scan.before_first()
    }

    fn next(&mut self) -> Result<bool> {
        while self.scan.next()? {
            if self.pred.is_satisfied(self.scan.as_mut())? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn get_int(&mut self, field_name: &str) -> Result<i32> {
        self.scan.get_int(field_name)
    }

    fn get_string(&mut self, field_name: &str) -> Result<String> {
        self.scan.get_string(field_name)
    }

    fn get_value(&mut self, field_name: &str) -> Result<Constant> {
        self.scan.get_value(field_name)
    }

    fn has_field(&self, field_name: &str) -> bool {
        self.scan.has_field(field_name)
    }

    fn close(&mut self) {
        self.scan.close();
    }

    fn as_update_scan(&mut self) -> Option<&mut dyn UpdateScan> {
        if self.scan.as_update_scan().is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl UpdateScan for SelectScan {
    fn set_int(&mut self, field_name: &str, value: i32) -> Result<()> {
        self.update_scan()?.set_int(field_name, value)
    }

    fn set_string(&mut self, field_name: &str, value: &str) -> Result<()> {
        self.update_scan()?.set_string(field_name, value)
    }

    fn set_value(&mut self, field_name: &str, value: Constant) -> Result<()> {
        self.update_scan()?.set_value(field_name, value)
    }

    fn insert(&mut self) -> Result<()> {
        self.update_scan()?.insert()
    }

    fn delete(&mut self) -> Result<()> {
        self.update_scan()?.delete()
    }

    fn get_rid(&mut self) -> Result<Rid> {
        self.update_scan()?.get_rid()
    }

    fn move_to_rid(&mut self, rid: Rid) -> Result<()> {
        self.update_scan()?.move_to_rid(rid)
    }
}
