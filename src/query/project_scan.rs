use super::{constant::Constant, scan::Scan};
use crate::error::DbError;
use anyhow::Result;

/// ProjectScan restricts the fields visible through an underlying scan.
/// Reading a field outside the projection fails; iteration is unchanged.
pub struct ProjectScan {
    scan: Box<dyn Scan>,
    fields: Vec<String>,
}

impl ProjectScan {
    pub fn new(scan: Box<dyn Scan>, fields: Vec<String>) -> ProjectScan {
        ProjectScan { scan, fields }
    }

    fn check_field(&self, field_name: &str) -> Result<()> {
        if self.has_field(field_name) {
            Ok(())
        } else {
            Err(DbError::FieldAccess(field_name.to_string()).into())
        }
    }
}

impl Scan for ProjectScan {
    fn before_first(&mut self) -> Result<()> {
        self.scan.before_first()
    }

    fn next(&mut self) -> Result<bool> {
        self.scan.next()
    }

    fn get_int(&mut self, field_name: &str) -> Result<i32> {
        self.check_field(field_name)?;
        self.scan.get_int(field_name)
    }

    fn get_string(&mut self, field_name: &str) -> Result<String> {
        self.check_field(field_name)?;
        self.scan.get_string(field_name)
    }

    fn get_value(&mut self, field_name: &str) -> Result<Constant> {
        self.check_field(field_name)?;
        self.scan.get_value(field_name)
    }

    fn has_field(&self, field_name: &str) -> bool {
        self.fields.iter().any(|field| field == field_name)
    }

    fn close(&mut self) {
        self.scan.close();
    }
}
