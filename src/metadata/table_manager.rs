use crate::{
    error::DbError,
    query::scan::{Scan as _, UpdateScan as _},
    record::{layout::Layout, schema::Schema, table_scan::TableScan},
    tx::transaction::Transaction,
};
use anyhow::Result;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

pub const MAX_NAME: i32 = 16;

/// TableManager persists schemas and layouts in two catalog tables, which
/// are ordinary tables themselves:
///   - `tblcat` holds one row per table: name and slot size
///   - `fldcat` holds one row per field: table, name, type code, length
///     and offset within the slot
pub struct TableManager {
    table_catalog_layout: Arc<Layout>,
    field_catalog_layout: Arc<Layout>,
}

impl TableManager {
    pub fn new(is_new: bool, tx: Arc<Mutex<Transaction>>) -> Result<Self> {
        let mut table_catalog_schema = Schema::default();
        table_catalog_schema.add_string_field("tblname", MAX_NAME);
        table_catalog_schema.add_int_field("slotsize");
        let table_catalog_layout =
            Arc::new(Layout::try_from_schema(Arc::new(table_catalog_schema))?);

        let mut field_catalog_schema = Schema::default();
        field_catalog_schema.add_string_field("tblname", MAX_NAME);
        field_catalog_schema.add_string_field("fldname", MAX_NAME);
        field_catalog_schema.add_int_field("type");
        field_catalog_schema.add_int_field("length");
        field_catalog_schema.add_int_field("offset");
        let field_catalog_layout =
            Arc::new(Layout::try_from_schema(Arc::new(field_catalog_schema))?);

        let tm = Self {
            table_catalog_layout,
            field_catalog_layout,
        };

        if is_new {
            // the catalog describes itself
            tm.create_table("tblcat", tm.table_catalog_layout.schema.clone(), tx.clone())?;
            tm.create_table("fldcat", tm.field_catalog_layout.schema.clone(), tx)?;
        }

        Ok(tm)
    }

    pub fn create_table(
        &self,
        table_name: &str,
        schema: Arc<Schema>,
        tx: Arc<Mutex<Transaction>>,
    ) -> Result<()> {
        let layout = Layout::try_from_schema(schema)?;

        let mut tcat = TableScan::new(tx.clone(), "tblcat", self.table_catalog_layout.clone())?;
        tcat.insert()?;
        tcat.set_string("tblname", table_name)?;
        tcat.set_int("slotsize", layout.slot_size)?;
        tcat.close();

        let mut fcat = TableScan::new(tx, "fldcat", self.field_catalog_layout.clone())?;
        for field_name in &layout.schema.fields {
            let field_type = layout
                .schema
                .field_type(field_name)
                .ok_or_else(|| DbError::CatalogLookup(field_name.clone()))?;
            let length = layout
                .schema
                .length(field_name)
                .ok_or_else(|| DbError::CatalogLookup(field_name.clone()))?;
            let offset = layout
                .offset(field_name)
                .ok_or_else(|| DbError::CatalogLookup(field_name.clone()))?;

            fcat.insert()?;
            fcat.set_string("tblname", table_name)?;
            fcat.set_string("fldname", field_name)?;
            fcat.set_int("type", field_type.into())?;
            fcat.set_int("length", length)?;
            fcat.set_int("offset", offset)?;
        }
        fcat.close();

        Ok(())
    }

    pub fn get_layout(&self, table_name: &str, tx: Arc<Mutex<Transaction>>) -> Result<Layout> {
        let mut slot_size = -1;

        let mut tcat = TableScan::new(tx.clone(), "tblcat", self.table_catalog_layout.clone())?;
        while tcat.next()? {
            if tcat.get_string("tblname")? == table_name {
                slot_size = tcat.get_int("slotsize")?;
                break;
            }
        }
        tcat.close();

        if slot_size < 0 {
            return Err(DbError::CatalogLookup(table_name.to_string()).into());
        }

        let mut schema = Schema::default();
        let mut offsets = HashMap::new();

        let mut fcat = TableScan::new(tx, "fldcat", self.field_catalog_layout.clone())?;
        while fcat.next()? {
            if fcat.get_string("tblname")? == table_name {
                let field_name = fcat.get_string("fldname")?;
                let field_type = fcat.get_int("type")?.try_into()?;
                let length = fcat.get_int("length")?;
                let offset = fcat.get_int("offset")?;
                schema.add_field(field_name.clone(), field_type, length);
                offsets.insert(field_name, offset);
            }
        }
        fcat.close();

        Ok(Layout::from_metadata(Arc::new(schema), offsets, slot_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record::schema::FieldType, server::db::TinyRel};
    use tempfile::tempdir;

    #[test]
    fn should_can_roundtrip_layout() -> Result<()> {
        let tempdir = tempdir()?;
        let db = TinyRel::new(tempdir.path(), 400, 8)?;
        let tx = db.transaction()?;
        let table_manager = TableManager::new(true, tx.clone())?;

        let mut schema = Schema::default();
        schema.add_int_field("A");
        schema.add_string_field("B", 9);
        table_manager.create_table("T", Arc::new(schema), tx.clone())?;

        let layout = table_manager.get_layout("T", tx.clone())?;
        assert_eq!(layout.schema.fields, vec!["A", "B"]);
        assert_eq!(layout.schema.field_type("A"), Some(FieldType::Integer));
        assert_eq!(layout.schema.field_type("B"), Some(FieldType::Varchar));
        assert_eq!(layout.schema.length("B"), Some(9));
        assert_eq!(layout.offset("A"), Some(4));
        assert_eq!(layout.offset("B"), Some(8));
        // 4 flag + 4 int + (4 + 9) varchar
        assert_eq!(layout.slot_size, 21);
        Ok(())
    }

    #[test]
    fn should_fail_get_layout_of_unknown_table() -> Result<()> {
        let tempdir = tempdir()?;
        let db = TinyRel::new(tempdir.path(), 400, 8)?;
        let tx = db.transaction()?;
        let table_manager = TableManager::new(true, tx.clone())?;

        let err = table_manager.get_layout("missing", tx).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::CatalogLookup(_))
        ));
        Ok(())
    }
}
