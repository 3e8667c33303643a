use crate::error::DbError;
use anyhow::Result;
use std::cmp::Ordering;

/// Constant is a typed literal value. Comparison is only defined between
/// constants of the same type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    Int(i32),
    String(String),
}

impl Constant {
    pub fn compare_to(&self, other: &Constant) -> Result<Ordering> {
        match (self, other) {
            (Constant::Int(left), Constant::Int(right)) => Ok(left.cmp(right)),
            (Constant::String(left), Constant::String(right)) => Ok(left.cmp(right)),
            _ => Err(DbError::TypeMismatch(self.type_name().into(), other.type_name().into()).into()),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Constant::Int(_) => "int",
            Constant::String(_) => "string",
        }
    }
}

impl From<i32> for Constant {
    fn from(value: i32) -> Self {
        Constant::Int(value)
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Constant::String(value.to_string())
    }
}

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Constant::Int(value) => write!(f, "{}", value),
            Constant::String(value) => write!(f, "'{}'", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_can_compare_same_type() {
        assert_eq!(
            Constant::from(1).compare_to(&Constant::from(2)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Constant::from("b").compare_to(&Constant::from("a")).unwrap(),
            Ordering::Greater
        );
    }

    #[test]
    fn should_fail_cross_type_comparison() {
        let err = Constant::from(1)
            .compare_to(&Constant::from("one"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::TypeMismatch(_, _))
        ));
    }
}
