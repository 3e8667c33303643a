use super::schema::{FieldType, Schema};
use crate::{error::DbError, file::page::Page, I32_SIZE};
use anyhow::Result;
use std::{collections::HashMap, sync::Arc};

/// Layout maps a schema onto fixed-size record slots: a byte offset per
/// field and the total slot size. The first 4 bytes of every slot hold the
/// empty/used flag. Computed once, never mutated.
#[derive(Debug)]
pub struct Layout {
    pub schema: Arc<Schema>,
    offsets: HashMap<String, i32>,
    pub slot_size: i32,
}

impl Layout {
    pub fn try_from_schema(schema: Arc<Schema>) -> Result<Self> {
        let mut pos = I32_SIZE as i32;
        let mut offsets = HashMap::new();
        for field_name in &schema.fields {
            offsets.insert(field_name.clone(), pos);
            pos += Self::length_in_bytes(&schema, field_name)?;
        }
        Ok(Self {
            schema,
            offsets,
            slot_size: pos,
        })
    }

    /// Rebuilds a layout from offsets read back out of the field catalog.
    pub fn from_metadata(schema: Arc<Schema>, offsets: HashMap<String, i32>, slot_size: i32) -> Self {
        Self {
            schema,
            offsets,
            slot_size,
        }
    }

    pub fn offset(&self, field_name: &str) -> Option<i32> {
        self.offsets.get(field_name).copied()
    }

    fn length_in_bytes(schema: &Schema, field_name: &str) -> Result<i32> {
        let field_type = schema
            .field_type(field_name)
            .ok_or_else(|| DbError::CatalogLookup(field_name.to_string()))?;
        match field_type {
            FieldType::Integer => Ok(I32_SIZE as i32),
            FieldType::Varchar => {
                let length = schema
                    .length(field_name)
                    .ok_or_else(|| DbError::CatalogLookup(field_name.to_string()))?;
                Ok(Page::max_length(length))
            }
        }
    }
}
