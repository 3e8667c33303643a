use super::Plan;
use crate::{
    error::DbError,
    query::{predicate::Predicate, scan::Scan, select_scan::SelectScan},
    record::schema::Schema,
};
use anyhow::Result;
use std::{cmp, sync::Arc};

/// Filters the child plan by a predicate. Selection never reads extra
/// blocks, so the block cost passes through; the record estimate shrinks by
/// the predicate's reduction factor, never below one.
pub struct SelectPlan {
    plan: Box<dyn Plan>,
    pred: Predicate,
}

impl SelectPlan {
    pub fn new(plan: Box<dyn Plan>, pred: Predicate) -> Self {
        Self { plan, pred }
    }
}

impl Plan for SelectPlan {
    fn open(&self) -> Result<Box<dyn Scan>> {
        let scan = self.plan.open()?;
        Ok(Box::new(SelectScan::new(scan, self.pred.clone())))
    }

    fn blocks_accessed(&self) -> i32 {
        self.plan.blocks_accessed()
    }

    fn records_output(&self) -> i32 {
        let reduction = cmp::max(1, self.pred.reduction_factor(self.plan.as_ref()));
        cmp::max(1, self.plan.records_output() / reduction)
    }

    fn distinct_values(&self, field_name: &str) -> Result<i32> {
        if !self.plan.schema().has_field(field_name) {
            return Err(DbError::CatalogLookup(field_name.to_string()).into());
        }
        if self.pred.equates_with_constant(field_name).is_some() {
            // the predicate pins the field to a single value
            return Ok(1);
        }
        let distinct_values = self.plan.distinct_values(field_name)?;
        Ok(cmp::min(distinct_values, self.records_output()))
    }

    fn schema(&self) -> Arc<Schema> {
        self.plan.schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::DbError,
        plan::stub::StubPlan,
        query::{constant::Constant, expression::Expression, term::Term},
    };
    use std::collections::HashMap;

    fn student_stub() -> StubPlan {
        let mut schema = Schema::default();
        schema.add_string_field("sname", 16);
        schema.add_int_field("majorId");
        schema.add_int_field("gradyear");
        let mut distinct = HashMap::new();
        distinct.insert("sname".to_string(), 50);
        distinct.insert("majorId".to_string(), 50);
        distinct.insert("gradyear".to_string(), 50);
        StubPlan {
            schema: Arc::new(schema),
            blocks: 5,
            records: 50,
            distinct,
        }
    }

    #[test]
    fn should_can_estimate_equality_with_constant() {
        let pred = Predicate::new(Term::new(
            Expression::from("majorId"),
            Constant::from(10).into(),
        ));
        let plan = SelectPlan::new(Box::new(student_stub()), pred);
        assert_eq!(plan.blocks_accessed(), 5);
        assert_eq!(plan.records_output(), 1);
        assert_eq!(plan.distinct_values("majorId").unwrap(), 1);
        // other fields are clamped by the output size
        assert_eq!(plan.distinct_values("gradyear").unwrap(), 1);
    }

    #[test]
    fn should_can_estimate_equality_between_fields() {
        let pred = Predicate::new(Term::new(
            Expression::from("majorId"),
            Expression::from("gradyear"),
        ));
        let plan = SelectPlan::new(Box::new(student_stub()), pred);
        // reduction is the larger of the two distinct counts
        assert_eq!(plan.records_output(), 1);
    }

    #[test]
    fn should_never_estimate_below_one_record() {
        let pred = Predicate::new(Term::new(
            Expression::from("majorId"),
            Constant::from(10).into(),
        ));
        let mut stub = student_stub();
        stub.records = 0;
        let plan = SelectPlan::new(Box::new(stub), pred);
        assert_eq!(plan.records_output(), 1);
    }

    #[test]
    fn should_fail_distinct_values_of_unknown_field() {
        let plan = SelectPlan::new(Box::new(student_stub()), Predicate::default());
        let err = plan.distinct_values("missing").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::CatalogLookup(_))
        ));
    }

    #[test]
    fn should_fail_distinct_values_of_unknown_field_fixed_by_predicate() {
        // a predicate naming a field does not make it part of the schema
        let pred = Predicate::new(Term::new(
            Expression::from("ghost"),
            Constant::from(5).into(),
        ));
        let plan = SelectPlan::new(Box::new(student_stub()), pred);
        let err = plan.distinct_values("ghost").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::CatalogLookup(_))
        ));
    }
}
