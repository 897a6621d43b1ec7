//! Arithmetic operators for building expressions.
//!
//! Scaling a variable or term yields a [`Term`]; any addition or
//! subtraction yields an [`Expression`] whose terms keep operand order.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::expression::{Expression, Term};
use crate::variable::Variable;

// Scaling.

impl Mul<f64> for Term {
    type Output = Term;

    fn mul(mut self, rhs: f64) -> Term {
        self.coefficient *= rhs;
        self
    }
}

impl Div<f64> for Term {
    type Output = Term;

    fn div(self, rhs: f64) -> Term {
        self * (1.0 / rhs)
    }
}

impl Neg for Term {
    type Output = Term;

    fn neg(self) -> Term {
        self * -1.0
    }
}

impl Mul<f64> for Expression {
    type Output = Expression;

    fn mul(mut self, rhs: f64) -> Expression {
        self.scale(rhs);
        self
    }
}

impl Div<f64> for Expression {
    type Output = Expression;

    fn div(self, rhs: f64) -> Expression {
        self * (1.0 / rhs)
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        self * -1.0
    }
}

macro_rules! variable_scaling {
    ($($ty:ty),*) => {$(
        impl Mul<f64> for $ty {
            type Output = Term;

            fn mul(self, rhs: f64) -> Term {
                Term::from(self) * rhs
            }
        }

        impl Div<f64> for $ty {
            type Output = Term;

            fn div(self, rhs: f64) -> Term {
                Term::from(self) / rhs
            }
        }

        impl Neg for $ty {
            type Output = Term;

            fn neg(self) -> Term {
                -Term::from(self)
            }
        }
    )*};
}

variable_scaling!(Variable, &Variable);

macro_rules! scalar_lhs {
    ($($ty:ty => $out:ty),*) => {$(
        impl Mul<$ty> for f64 {
            type Output = $out;

            fn mul(self, rhs: $ty) -> $out {
                rhs * self
            }
        }

        impl Add<$ty> for f64 {
            type Output = Expression;

            fn add(self, rhs: $ty) -> Expression {
                Expression::from_constant(self) + rhs
            }
        }

        impl Sub<$ty> for f64 {
            type Output = Expression;

            fn sub(self, rhs: $ty) -> Expression {
                Expression::from_constant(self) - rhs
            }
        }
    )*};
}

scalar_lhs!(
    Variable => Term,
    &Variable => Term,
    Term => Term,
    Expression => Expression
);

// Sums.

macro_rules! linear_sum {
    ($($ty:ty),*) => {$(
        impl<R: Into<Expression>> Add<R> for $ty {
            type Output = Expression;

            fn add(self, rhs: R) -> Expression {
                let mut expression = Expression::from(self);
                expression.extend_scaled(rhs.into(), 1.0);
                expression
            }
        }

        impl<R: Into<Expression>> Sub<R> for $ty {
            type Output = Expression;

            fn sub(self, rhs: R) -> Expression {
                let mut expression = Expression::from(self);
                expression.extend_scaled(rhs.into(), -1.0);
                expression
            }
        }
    )*};
}

linear_sum!(Variable, &Variable, Term, Expression);
