use super::Plan;
use crate::{
    query::{project_scan::ProjectScan, scan::Scan},
    record::schema::Schema,
};
use anyhow::Result;
use std::sync::Arc;

/// Restricts the child plan to a list of fields. Projection drops columns,
/// not rows, so both cost estimates pass through unchanged. Naming a field
/// the child does not have fails at construction.
pub struct ProjectPlan {
    plan: Box<dyn Plan>,
    schema: Arc<Schema>,
}

impl std::fmt::Debug for ProjectPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectPlan")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl ProjectPlan {
    pub fn new(plan: Box<dyn Plan>, field_names: Vec<String>) -> Result<Self> {
        let mut schema = Schema::default();
        let child_schema = plan.schema();
        for field_name in &field_names {
            schema.add(field_name.clone(), &child_schema)?;
        }
        Ok(Self {
            plan,
            schema: Arc::new(schema),
        })
    }
}

impl Plan for ProjectPlan {
    fn open(&self) -> Result<Box<dyn Scan>> {
        let scan = self.plan.open()?;
        Ok(Box::new(ProjectScan::new(scan, self.schema.fields.clone())))
    }

    fn blocks_accessed(&self) -> i32 {
        self.plan.blocks_accessed()
    }

    fn records_output(&self) -> i32 {
        self.plan.records_output()
    }

    fn distinct_values(&self, field_name: &str) -> Result<i32> {
        self.plan.distinct_values(field_name)
    }

    fn schema(&self) -> Arc<Schema> {
        self.schema.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::DbError, plan::stub::StubPlan};
    use std::collections::HashMap;

    fn stub() -> StubPlan {
        let mut schema = Schema::default();
        schema.add_string_field("sname", 16);
        schema.add_int_field("majorId");
        let mut distinct = HashMap::new();
        distinct.insert("sname".to_string(), 45);
        distinct.insert("majorId".to_string(), 50);
        StubPlan {
            schema: Arc::new(schema),
            blocks: 5,
            records: 50,
            distinct,
        }
    }

    #[test]
    fn should_can_pass_costs_through() -> Result<()> {
        let plan = ProjectPlan::new(Box::new(stub()), vec!["sname".to_string()])?;
        assert_eq!(plan.blocks_accessed(), 5);
        assert_eq!(plan.records_output(), 50);
        assert_eq!(plan.distinct_values("sname")?, 45);
        assert_eq!(plan.schema().fields, vec!["sname"]);
        Ok(())
    }

    #[test]
    fn should_fail_construction_on_unknown_field() {
        let err =
            ProjectPlan::new(Box::new(stub()), vec!["missing".to_string()]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::SchemaMismatch(_))
        ));
    }
}
