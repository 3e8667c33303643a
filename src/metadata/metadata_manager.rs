use super::{stat_info::StatInfo, stat_manager::StatManager, table_manager::TableManager};
use crate::{
    record::{layout::Layout, schema::Schema},
    tx::transaction::Transaction,
    unlock,
};
use anyhow::Result;
use std::sync::{Arc, Mutex};

/// MetadataManager is the catalog facade the planner talks to: schemas and
/// layouts on one side, table statistics on the other.
pub struct MetadataManager {
    table_manager: Arc<Mutex<TableManager>>,
    stat_manager: Arc<Mutex<StatManager>>,
}

impl MetadataManager {
    pub fn new(is_new: bool, tx: Arc<Mutex<Transaction>>) -> Result<Self> {
        let table_manager = Arc::new(Mutex::new(TableManager::new(is_new, tx.clone())?));
        let stat_manager = Arc::new(Mutex::new(StatManager::new(table_manager.clone(), tx)?));
        Ok(Self {
            table_manager,
            stat_manager,
        })
    }

    pub fn create_table(
        &self,
        table_name: &str,
        schema: Arc<Schema>,
        tx: Arc<Mutex<Transaction>>,
    ) -> Result<()> {
        unlock!(self.table_manager).create_table(table_name, schema, tx)
    }

    pub fn get_layout(&self, table_name: &str, tx: Arc<Mutex<Transaction>>) -> Result<Layout> {
        unlock!(self.table_manager).get_layout(table_name, tx)
    }

    pub fn get_stat_info(
        &self,
        table_name: &str,
        layout: Arc<Layout>,
        tx: Arc<Mutex<Transaction>>,
    ) -> Result<StatInfo> {
        unlock!(self.stat_manager).get_stat_info(table_name, layout, tx)
    }
}
