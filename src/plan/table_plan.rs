use super::Plan;
use crate::{
    error::DbError,
    metadata::{metadata_manager::MetadataManager, stat_info::StatInfo},
    query::scan::Scan,
    record::{layout::Layout, table_scan::TableScan},
    tx::transaction::Transaction,
};
use anyhow::Result;
use std::sync::{Arc, Mutex};

/// Leaf of a plan tree: a full scan of one stored table. The layout and
/// statistics are looked up once, at construction, and held for the life of
/// the plan.
pub struct TablePlan {
    tx: Arc<Mutex<Transaction>>,
    table_name: String,
    layout: Arc<Layout>,
    stat_info: StatInfo,
}

impl TablePlan {
    pub fn new(
        tx: Arc<Mutex<Transaction>>,
        table_name: impl Into<String>,
        metadata_manager: &MetadataManager,
    ) -> Result<Self> {
        let table_name = table_name.into();
        let layout = Arc::new(metadata_manager.get_layout(&table_name, tx.clone())?);
        let stat_info = metadata_manager.get_stat_info(&table_name, layout.clone(), tx.clone())?;
        Ok(Self {
            tx,
            table_name,
            layout,
            stat_info,
        })
    }
}

impl Plan for TablePlan {
    fn open(&self) -> Result<Box<dyn Scan>> {
        let scan = TableScan::new(self.tx.clone(), &self.table_name, self.layout.clone())?;
        Ok(Box::new(scan))
    }

    fn blocks_accessed(&self) -> i32 {
        self.stat_info.num_blocks
    }

    fn records_output(&self) -> i32 {
        self.stat_info.num_records
    }

    fn distinct_values(&self, field_name: &str) -> Result<i32> {
        if !self.layout.schema.has_field(field_name) {
            return Err(DbError::CatalogLookup(field_name.to_string()).into());
        }
        Ok(self.stat_info.distinct_values(field_name))
    }

    fn schema(&self) -> Arc<crate::record::schema::Schema> {
        self.layout.schema.clone()
    }
}
