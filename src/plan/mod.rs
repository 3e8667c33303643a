pub mod product_plan;
pub mod project_plan;
pub mod select_plan;
pub mod table_plan;

use crate::{query::scan::Scan, record::schema::Schema};
use anyhow::Result;
use std::sync::Arc;

/// Plan describes how to produce a scan, and what producing it would cost.
///
/// A plan tree is built bottom-up from [`table_plan::TablePlan`] leaves and
/// owns its children outright; the cost methods recurse over the tree
/// without touching the disk, and `open` turns the tree into a ready
/// iterator pipeline. Opening the same plan twice yields two scans with
/// independent cursors.
pub trait Plan {
    fn open(&self) -> Result<Box<dyn Scan>>;
    /// Estimated number of block reads to scan the output once.
    fn blocks_accessed(&self) -> i32;
    /// Estimated number of records in the output.
    fn records_output(&self) -> i32;
    /// Estimated number of distinct values of a field of the output.
    fn distinct_values(&self, field_name: &str) -> Result<i32>;
    fn schema(&self) -> Arc<Schema>;
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use crate::error::DbError;
    use anyhow::bail;
    use std::collections::HashMap;

    /// A leaf plan with canned statistics, for testing cost arithmetic
    /// without a database underneath.
    pub struct StubPlan {
        pub schema: Arc<Schema>,
        pub blocks: i32,
        pub records: i32,
        pub distinct: HashMap<String, i32>,
    }

    impl Plan for StubPlan {
        fn open(&self) -> Result<Box<dyn Scan>> {
            bail!("stub plan cannot be opened")
        }

        fn blocks_accessed(&self) -> i32 {
            self.blocks
        }

        fn records_output(&self) -> i32 {
            self.records
        }

        fn distinct_values(&self, field_name: &str) -> Result<i32> {
            self.distinct
                .get(field_name)
                .copied()
                .ok_or_else(|| DbError::CatalogLookup(field_name.to_string()).into())
        }

        fn schema(&self) -> Arc<Schema> {
            self.schema.clone()
        }
    }
}
