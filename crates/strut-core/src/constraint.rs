//! Linear constraints.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::BitOr;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use crate::expression::Expression;
use crate::strength::Strength;

/// Tolerance below which a residual counts as zero. The solver prunes
/// tableau cells with the same bound.
pub const EPSILON: f64 = 1e-8;

static NEXT_CONSTRAINT_ID: AtomicU64 = AtomicU64::new(1);

/// The relation of a constraint (equality or inequality).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelationalOperator {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

impl fmt::Display for RelationalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationalOperator::LessOrEqual => write!(f, "<="),
            RelationalOperator::Equal => write!(f, "=="),
            RelationalOperator::GreaterOrEqual => write!(f, ">="),
        }
    }
}

#[derive(Debug)]
struct ConstraintData {
    id: u64,
    expression: Expression,
    op: RelationalOperator,
    strength: Strength,
}

/// A constraint of the form `expression OP 0` at some strength.
///
/// Constraints compare by identity: two constraints built independently
/// from the same expression are distinct, while clones are the same
/// constraint.
#[derive(Clone)]
pub struct Constraint(Arc<ConstraintData>);

impl Constraint {
    /// Create a constraint from an expression, reducing it to canonical form.
    pub fn new(expression: Expression, op: RelationalOperator, strength: Strength) -> Self {
        Self(Arc::new(ConstraintData {
            id: NEXT_CONSTRAINT_ID.fetch_add(1, AtomicOrdering::Relaxed),
            expression: expression.reduce(),
            op,
            strength: strength.clip(),
        }))
    }

    pub fn expression(&self) -> &Expression {
        &self.0.expression
    }

    pub fn op(&self) -> RelationalOperator {
        self.0.op
    }

    pub fn strength(&self) -> Strength {
        self.0.strength
    }

    /// A new constraint with the same relation at a different strength.
    pub fn with_strength(&self, strength: Strength) -> Constraint {
        Constraint::new(self.0.expression.clone(), self.0.op, strength)
    }

    /// Check the relation against the current variable values.
    pub fn violated(&self) -> bool {
        let value = self.0.expression.value();
        match self.0.op {
            RelationalOperator::Equal => value.abs() >= EPSILON,
            RelationalOperator::LessOrEqual => value > 0.0,
            RelationalOperator::GreaterOrEqual => value < 0.0,
        }
    }
}

impl BitOr<Strength> for Constraint {
    type Output = Constraint;

    fn bitor(self, strength: Strength) -> Constraint {
        self.with_strength(strength)
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl PartialOrd for Constraint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Constraint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("expression", &self.0.expression)
            .field("op", &self.0.op)
            .field("strength", &self.0.strength)
            .finish()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} 0 | {}", self.0.expression, self.0.op, self.0.strength)
    }
}

/// Relational builders producing required constraints of `lhs - rhs OP 0`.
pub trait Relate: Clone + Into<Expression> {
    fn is_le(&self, rhs: impl Into<Expression>) -> Constraint {
        relate(self.clone().into(), RelationalOperator::LessOrEqual, rhs.into())
    }

    fn is_eq(&self, rhs: impl Into<Expression>) -> Constraint {
        relate(self.clone().into(), RelationalOperator::Equal, rhs.into())
    }

    fn is_ge(&self, rhs: impl Into<Expression>) -> Constraint {
        relate(self.clone().into(), RelationalOperator::GreaterOrEqual, rhs.into())
    }
}

impl<T: Clone + Into<Expression>> Relate for T {}

fn relate(mut lhs: Expression, op: RelationalOperator, rhs: Expression) -> Constraint {
    lhs.extend_scaled(rhs, -1.0);
    Constraint::new(lhs, op, Strength::REQUIRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Term;
    use crate::variable::Variable;

    #[test]
    fn test_constraint_creation() {
        let v = Variable::new("foo");
        let c = Constraint::new(
            Expression::new([Term::new(v.clone(), 1.0)], 1.0),
            RelationalOperator::Equal,
            Strength::REQUIRED,
        );
        assert_eq!(c.strength(), Strength::REQUIRED);
        assert_eq!(c.op(), RelationalOperator::Equal);
        assert_eq!(c.expression().constant(), 1.0);
        assert_eq!(c.expression().terms().len(), 1);
        assert_eq!(c.expression().terms()[0].variable, v);
        assert_eq!(c.expression().terms()[0].coefficient, 1.0);
    }

    #[test]
    fn test_strength_is_clipped() {
        let v = Variable::new("foo");
        let c = Constraint::new(Expression::from(&v), RelationalOperator::LessOrEqual, 5e9.into());
        assert_eq!(c.strength(), Strength::REQUIRED);
    }

    #[test]
    fn test_or_strength_makes_new_constraint() {
        let v = Variable::new("foo");
        let c = v.is_eq(1.0);
        for strength in [Strength::WEAK, Strength::MEDIUM, Strength::STRONG, Strength::new(1.0, 1.0, 0.0)] {
            let weaker = c.clone() | strength;
            assert_eq!(weaker.strength(), strength);
            assert_eq!(weaker.op(), c.op());
            assert_ne!(weaker, c);
        }
    }

    #[test]
    fn test_identity_equality() {
        let v = Variable::new("foo");
        let a = v.is_ge(0.0);
        let b = v.is_ge(0.0);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_relate_reduces_lhs_minus_rhs() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        // 10x + 5 <= y - 10
        let lhs = Expression::new([Term::new(x.clone(), 10.0)], 5.0);
        let rhs = Expression::new([Term::new(y.clone(), 1.0)], -10.0);
        let c = lhs.is_le(rhs);

        assert_eq!(c.op(), RelationalOperator::LessOrEqual);
        assert_eq!(c.strength(), Strength::REQUIRED);
        assert_eq!(c.expression().constant(), 15.0);
        assert_eq!(c.expression().terms().len(), 2);
        assert_eq!(c.expression().terms()[0].variable, x);
        assert_eq!(c.expression().terms()[1].coefficient, -1.0);
    }

    #[test]
    fn test_violated() {
        let v = Variable::new("v");
        let ge = v.is_ge(10.0);
        let le = v.is_le(-5.0);
        let eq = v.is_eq(3.0);

        v.set_value(10.0);
        assert!(!ge.violated());
        assert!(le.violated());
        assert!(eq.violated());

        v.set_value(3.0);
        assert!(ge.violated());
        assert!(!eq.violated());
    }
}
