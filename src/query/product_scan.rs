use super::{constant::Constant, scan::Scan};
use crate::error::DbError;
use anyhow::Result;

/// ProductScan iterates the cross product of two scans: for every record of
/// the outer scan it walks the inner scan once from the start.
pub struct ProductScan {
    scan1: Box<dyn Scan>,
    scan2: Box<dyn Scan>,
    // false once the outer scan is exhausted (or was empty to begin with)
    outer_valid: bool,
}

impl ProductScan {
    pub fn new(scan1: Box<dyn Scan>, scan2: Box<dyn Scan>) -> Result<ProductScan> {
        let mut scan = ProductScan {
            scan1,
            scan2,
            outer_valid: false,
        };
        scan.before_first()?;
        Ok(scan)
    }
}

impl Scan for ProductScan {
    /// Rewinds both sides and positions the outer scan on its first record,
    /// so that `next` only has to advance the inner scan.
    fn before_first(&mut self) -> Result<()> {
        self.scan1.before_first()?;
        self.outer_valid = self.scan1.next()?;
        self.scan2.before_first()
    }

    fn next(&mut self) -> Result<bool> {
        if !self.outer_valid {
            return Ok(false);
        }
        if self.scan2.next()? {
            return Ok(true);
        }
        // inner exhausted: restart it and move the outer scan forward
        self.scan2.before_first()?;
        if !self.scan2.next()? {
            // inner side is empty, the product is too
            self.outer_valid = false;
            return Ok(false);
        }
        self.outer_valid = self.scan1.next()?;
        Ok(self.outer_valid)
    }

    fn get_int(&mut self, field_name: &str) -> Result<i32> {
        if self.scan1.has_field(field_name) {
            self.scan1.get_int(field_name)
        } else if self.scan2.has_field(field_name) {
            self.scan2.get_int(field_name)
        } else {
            Err(DbError::FieldAccess(field_name.to_string()).into())
        }
    }

    fn get_string(&mut self, field_name: &str) -> Result<String> {
        if self.scan1.has_field(field_name) {
            self.scan1.get_string(field_name)
        } else if self.scan2.has_field(field_name) {
            self.scan2.get_string(field_name)
        } else {
            Err(DbError::FieldAccess(field_name.to_string()).into())
        }
    }

    fn get_value(&mut self, field_name: &str) -> Result<Constant> {
        if self.scan1.has_field(field_name) {
            self.scan1.get_value(field_name)
        } else if self.scan2.has_field(field_name) {
            self.scan2.get_value(field_name)
        } else {
            Err(DbError::FieldAccess(field_name.to_string()).into())
        }
    }

    fn has_field(&self, field_name: &str) -> bool {
        self.scan1.has_field(field_name) || self.scan2.has_field(field_name)
    }

    fn close(&mut self) {
        self.scan1.close();
        self.scan2.close();
    }
}
