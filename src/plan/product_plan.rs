use super::Plan;
use crate::{
    error::DbError,
    query::{product_scan::ProductScan, scan::Scan},
    record::schema::Schema,
};
use anyhow::Result;
use std::sync::Arc;

/// Cross product of two child plans via a nested loop: the right side is
/// rescanned once per left record, which is exactly what the block estimate
/// B1 + R1 * B2 says. The child schemas must be disjoint; a shared field
/// name fails at construction.
pub struct ProductPlan {
    plan1: Box<dyn Plan>,
    plan2: Box<dyn Plan>,
    schema: Arc<Schema>,
}

impl std::fmt::Debug for ProductPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductPlan")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl ProductPlan {
    pub fn new(plan1: Box<dyn Plan>, plan2: Box<dyn Plan>) -> Result<Self> {
        let mut schema = Schema::default();
        schema.add_all(&plan1.schema())?;
        schema.add_all(&plan2.schema())?;
        Ok(Self {
            plan1,
            plan2,
            schema: Arc::new(schema),
        })
    }
}

impl Plan for ProductPlan {
    fn open(&self) -> Result<Box<dyn Scan>> {
        let scan1 = self.plan1.open()?;
        let scan2 = self.plan2.open()?;
        Ok(Box::new(ProductScan::new(scan1, scan2)?))
    }

    fn blocks_accessed(&self) -> i32 {
        self.plan1.blocks_accessed().saturating_add(
            self.plan1
                .records_output()
                .saturating_mul(self.plan2.blocks_accessed()),
        )
    }

    fn records_output(&self) -> i32 {
        self.plan1
            .records_output()
            .saturating_mul(self.plan2.records_output())
    }

    fn distinct_values(&self, field_name: &str) -> Result<i32> {
        if self.plan1.schema().has_field(field_name) {
            self.plan1.distinct_values(field_name)
        } else if self.plan2.schema().has_field(field_name) {
            self.plan2.distinct_values(field_name)
        } else {
            Err(DbError::CatalogLookup(field_name.to_string()).into())
        }
    }

    fn schema(&self) -> Arc<Schema> {
        self.schema.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::stub::StubPlan;
    use std::collections::HashMap;

    fn stub(field_name: &str, blocks: i32, records: i32, dv: i32) -> StubPlan {
        let mut schema = Schema::default();
        schema.add_int_field(field_name);
        let mut distinct = HashMap::new();
        distinct.insert(field_name.to_string(), dv);
        StubPlan {
            schema: Arc::new(schema),
            blocks,
            records,
            distinct,
        }
    }

    #[test]
    fn should_can_estimate_nested_loop_costs() -> Result<()> {
        let plan = ProductPlan::new(
            Box::new(stub("a", 5, 50, 50)),
            Box::new(stub("b", 3, 30, 10)),
        )?;
        assert_eq!(plan.blocks_accessed(), 5 + 50 * 3);
        assert_eq!(plan.records_output(), 50 * 30);
        assert_eq!(plan.distinct_values("a")?, 50);
        assert_eq!(plan.distinct_values("b")?, 10);
        assert_eq!(plan.schema().fields, vec!["a", "b"]);
        Ok(())
    }

    #[test]
    fn should_saturate_huge_estimates() -> Result<()> {
        let plan = ProductPlan::new(
            Box::new(stub("a", i32::MAX, i32::MAX, 5)),
            Box::new(stub("b", i32::MAX, i32::MAX, 5)),
        )?;
        assert_eq!(plan.blocks_accessed(), i32::MAX);
        assert_eq!(plan.records_output(), i32::MAX);
        Ok(())
    }

    #[test]
    fn should_fail_construction_on_shared_field_name() {
        let err = ProductPlan::new(
            Box::new(stub("a", 5, 50, 50)),
            Box::new(stub("a", 3, 30, 10)),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn should_fail_distinct_values_of_unknown_field() -> Result<()> {
        let plan = ProductPlan::new(
            Box::new(stub("a", 5, 50, 50)),
            Box::new(stub("b", 3, 30, 10)),
        )?;
        let err = plan.distinct_values("missing").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::CatalogLookup(_))
        ));
        Ok(())
    }
}
