use crate::error::DbError;
use anyhow::{bail, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Varchar,
}

/// Numeric type codes as stored in the field catalog.
impl From<FieldType> for i32 {
    fn from(value: FieldType) -> i32 {
        match value {
            FieldType::Integer => 4,
            FieldType::Varchar => 12,
        }
    }
}

impl TryFrom<i32> for FieldType {
    type Error = anyhow::Error;

    fn try_from(value: i32) -> Result<FieldType> {
        match value {
            4 => Ok(FieldType::Integer),
            12 => Ok(FieldType::Varchar),
            _ => bail!("unknown field type code {}", value),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FieldInfo {
    field_type: FieldType,
    length: i32,
}

/// Schema is the record layout of a table: field names in declaration order
/// with their type and length. Immutable once published behind an Arc.
#[derive(Default, Debug, Clone)]
pub struct Schema {
    pub fields: Vec<String>,
    info: HashMap<String, FieldInfo>,
}

impl Schema {
    pub fn add_field(&mut self, field_name: impl Into<String>, field_type: FieldType, length: i32) {
        let field_name = field_name.into();
        self.fields.push(field_name.clone());
        self.info.insert(field_name, FieldInfo { field_type, length });
    }

    pub fn add_int_field(&mut self, field_name: impl Into<String>) {
        self.add_field(field_name, FieldType::Integer, 0);
    }

    pub fn add_string_field(&mut self, field_name: impl Into<String>, length: i32) {
        self.add_field(field_name, FieldType::Varchar, length);
    }

    /// Copies one field descriptor from another schema. Fails if the field is
    /// missing there, or if this schema already has a field of that name.
    pub fn add(&mut self, field_name: impl Into<String>, source: &Schema) -> Result<()> {
        let field_name = field_name.into();
        if self.has_field(&field_name) {
            return Err(DbError::SchemaMismatch(format!("duplicate field {}", field_name)).into());
        }
        let Some(info) = source.info.get(&field_name) else {
            return Err(DbError::SchemaMismatch(format!("no field {}", field_name)).into());
        };
        self.add_field(field_name, info.field_type, info.length);
        Ok(())
    }

    pub fn add_all(&mut self, source: &Schema) -> Result<()> {
        for field_name in &source.fields {
            self.add(field_name.clone(), source)?;
        }
        Ok(())
    }

    pub fn has_field(&self, field_name: &str) -> bool {
        self.info.contains_key(field_name)
    }

    pub fn field_type(&self, field_name: &str) -> Option<FieldType> {
        self.info.get(field_name).map(|info| info.field_type)
    }

    pub fn length(&self, field_name: &str) -> Option<i32> {
        self.info.get(field_name).map(|info| info.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_can_add_fields() {
        let mut schema = Schema::default();
        schema.add_int_field("id");
        schema.add_string_field("name", 8);
        assert_eq!(schema.fields, vec!["id", "name"]);
        assert_eq!(schema.field_type("id"), Some(FieldType::Integer));
        assert_eq!(schema.field_type("name"), Some(FieldType::Varchar));
        assert_eq!(schema.length("name"), Some(8));
        assert!(!schema.has_field("missing"));
    }

    #[test]
    fn should_fail_add_of_unknown_field() {
        let source = Schema::default();
        let mut schema = Schema::default();
        let err = schema.add("id", &source).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn should_fail_add_all_on_colliding_field() {
        let mut left = Schema::default();
        left.add_int_field("id");
        let mut union = Schema::default();
        union.add_all(&left).unwrap();
        let err = union.add_all(&left).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::SchemaMismatch(_))
        ));
    }
}
