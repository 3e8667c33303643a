use super::{stat_info::StatInfo, table_manager::TableManager};
use crate::{
    query::scan::{Scan as _, UpdateScan as _},
    record::{layout::Layout, table_scan::TableScan},
    tx::transaction::Transaction,
};
use anyhow::Result;
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};
use tracing::debug;

const REFRESH_THRESHOLD: i32 = 100;

/// StatManager computes table statistics by scanning the table and caches
/// them. The whole cache is recomputed every hundred requests, so estimates
/// drift from reality but only for a bounded time.
pub struct StatManager {
    table_manager: Arc<Mutex<TableManager>>,
    table_stats: HashMap<String, StatInfo>,
    num_calls: i32,
}

impl StatManager {
    pub fn new(table_manager: Arc<Mutex<TableManager>>, tx: Arc<Mutex<Transaction>>) -> Result<Self> {
        let mut stat_manager = Self {
            table_manager,
            table_stats: HashMap::new(),
            num_calls: 0,
        };
        stat_manager.refresh_statistics(tx)?;
        Ok(stat_manager)
    }

    pub fn get_stat_info(
        &mut self,
        table_name: &str,
        layout: Arc<Layout>,
        tx: Arc<Mutex<Transaction>>,
    ) -> Result<StatInfo> {
        self.num_calls += 1;
        if self.num_calls > REFRESH_THRESHOLD {
            self.refresh_statistics(tx.clone())?;
        }
        if let Some(stat_info) = self.table_stats.get(table_name) {
            return Ok(stat_info.clone());
        }
        let stat_info = Self::calc_table_stats(table_name, layout, tx)?;
        self.table_stats
            .insert(table_name.to_string(), stat_info.clone());
        Ok(stat_info)
    }

    fn refresh_statistics(&mut self, tx: Arc<Mutex<Transaction>>) -> Result<()> {
        debug!("refreshing table statistics");
        self.table_stats = HashMap::new();
        self.num_calls = 0;

        let table_manager = self.table_manager.lock().unwrap();
        let table_catalog_layout = Arc::new(table_manager.get_layout("tblcat", tx.clone())?);
        let mut tcat = TableScan::new(tx.clone(), "tblcat", table_catalog_layout)?;
        while tcat.next()? {
            let table_name = tcat.get_string("tblname")?;
            let layout = Arc::new(table_manager.get_layout(&table_name, tx.clone())?);
            let stat_info = Self::calc_table_stats(&table_name, layout, tx.clone())?;
            self.table_stats.insert(table_name, stat_info);
        }
        tcat.close();

        Ok(())
    }

    /// One pass over the table counts records and blocks and collects the
    /// distinct values of every field.
    fn calc_table_stats(
        table_name: &str,
        layout: Arc<Layout>,
        tx: Arc<Mutex<Transaction>>,
    ) -> Result<StatInfo> {
        let mut num_records = 0;
        let mut num_blocks = 0;
        let mut values: HashMap<&String, HashSet<_>> = layout
            .schema
            .fields
            .iter()
            .map(|field_name| (field_name, HashSet::new()))
            .collect();

        let mut ts = TableScan::new(tx, table_name, layout.clone())?;
        while ts.next()? {
            num_records += 1;
            num_blocks = ts.get_rid()?.block_num + 1;
            for field_name in &layout.schema.fields {
                let value = ts.get_value(field_name)?;
                if let Some(seen) = values.get_mut(field_name) {
                    seen.insert(value);
                }
            }
        }
        ts.close();

        let distinct = values
            .into_iter()
            .map(|(field_name, seen)| (field_name.clone(), seen.len() as i32))
            .collect();
        Ok(StatInfo::new(num_blocks, num_records, distinct))
    }
}
