use super::{constant::Constant, scan::Scan, term::Term};
use crate::plan::Plan;

use anyhow::Result;

/// Predicate is a conjunction of terms. An empty predicate is always
/// satisfied.
#[derive(Default, Debug, Clone)]
pub struct Predicate {
    terms: Vec<Term>,
}

impl Predicate {
    pub fn new(term: Term) -> Self {
        Self { terms: vec![term] }
    }

    pub fn con_join_with(&mut self, pred: &Predicate) {
        self.terms.extend(pred.terms.iter().cloned());
    }

    pub fn is_satisfied(&self, scan: &mut dyn Scan) -> Result<bool> {
        for term in &self.terms {
            if !term.is_satisfied(scan)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Product of the term reduction factors.
    pub fn reduction_factor(&self, plan: &dyn Plan) -> i32 {
        self.terms
            .iter()
            .map(|term| term.reduction_factor(plan))
            .fold(1, i32::saturating_mul)
    }

    pub fn equates_with_constant(&self, field_name: &str) -> Option<&Constant> {
        self.terms
            .iter()
            .find_map(|term| term.equates_with_constant(field_name))
    }

    pub fn equates_with_field(&self, field_name: &str) -> Option<&str> {
        self.terms
            .iter()
            .find_map(|term| term.equates_with_field(field_name))
    }
}

impl From<Term> for Predicate {
    fn from(term: Term) -> Self {
        Predicate::new(term)
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut terms = self.terms.iter();
        if let Some(term) = terms.next() {
            write!(f, "{}", term)?;
            for term in terms {
                write!(f, " AND {}", term)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::expression::Expression;

    #[test]
    fn should_can_display_conjunction() {
        let mut pred = Predicate::new(Term::new(
            Expression::from("majorId"),
            Constant::from(10).into(),
        ));
        pred.con_join_with(&Predicate::new(Term::new(
            Expression::from("gradyear"),
            Constant::from(2000).into(),
        )));
        assert_eq!(pred.to_string(), "majorId = 10 AND gradyear = 2000");
    }

    #[test]
    fn should_can_find_constant_across_terms() {
        let mut pred = Predicate::new(Term::new(
            Expression::from("majorId"),
            Constant::from(10).into(),
        ));
        pred.con_join_with(&Predicate::new(Term::new(
            Expression::from("sname"),
            Expression::from("altname"),
        )));
        assert_eq!(
            pred.equates_with_constant("majorId"),
            Some(&Constant::Int(10))
        );
        assert_eq!(pred.equates_with_constant("sname"), None);
        assert_eq!(pred.equates_with_field("sname"), Some("altname"));
    }
}
