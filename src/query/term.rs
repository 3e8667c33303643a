use super::{constant::Constant, expression::Expression, scan::Scan};
use crate::{plan::Plan, record::schema::Schema};
use anyhow::Result;
use std::cmp::{self, Ordering};

/// Term is an equality comparison between two expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    lhs: Expression,
    rhs: Expression,
}

impl Term {
    pub fn new(lhs: Expression, rhs: Expression) -> Self {
        Self { lhs, rhs }
    }

    pub fn is_satisfied(&self, scan: &mut dyn Scan) -> Result<bool> {
        let lhs_value = self.lhs.evaluate(scan)?;
        let rhs_value = self.rhs.evaluate(scan)?;
        Ok(lhs_value.compare_to(&rhs_value)? == Ordering::Equal)
    }

    /// How many input records one output record stands for, estimated from
    /// the plan's distinct-value counts.
    ///
    /// The field-to-field case uses `max(V(f1), V(f2))`. Shapes the model
    /// does not recognize, including fields the plan cannot resolve,
    /// contribute a factor of 1.
    pub fn reduction_factor(&self, plan: &dyn Plan) -> i32 {
        match (&self.lhs, &self.rhs) {
            (Expression::FieldName(lhs_name), Expression::FieldName(rhs_name)) => {
                match (plan.distinct_values(lhs_name), plan.distinct_values(rhs_name)) {
                    (Ok(lhs_values), Ok(rhs_values)) => cmp::max(lhs_values, rhs_values),
                    _ => 1,
                }
            }
            (Expression::FieldName(field_name), Expression::Value(_))
            | (Expression::Value(_), Expression::FieldName(field_name)) => {
                plan.distinct_values(field_name).unwrap_or(1)
            }
            _ => 1,
        }
    }

    /// The constant this term fixes `field_name` to, if any.
    pub fn equates_with_constant(&self, field_name: &str) -> Option<&Constant> {
        match (&self.lhs, &self.rhs) {
            (Expression::FieldName(name), Expression::Value(value))
            | (Expression::Value(value), Expression::FieldName(name))
                if name == field_name =>
            {
                Some(value)
            }
            _ => None,
        }
    }

    /// The field this term equates `field_name` with, if any.
    pub fn equates_with_field(&self, field_name: &str) -> Option<&str> {
        match (&self.lhs, &self.rhs) {
            (Expression::FieldName(lhs_name), Expression::FieldName(rhs_name)) => {
                if lhs_name == field_name {
                    Some(rhs_name)
                } else if rhs_name == field_name {
                    Some(lhs_name)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn applies_to(&self, schema: &Schema) -> bool {
        self.lhs.applies_to(schema) && self.rhs.applies_to(schema)
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}
