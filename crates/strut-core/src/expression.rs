//! Linear expressions over solver variables.

use std::collections::BTreeMap;
use std::fmt;

use smallvec::SmallVec;

use crate::variable::Variable;

/// A variable scaled by a coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub variable: Variable,
    pub coefficient: f64,
}

impl Term {
    pub fn new(variable: Variable, coefficient: f64) -> Self {
        Self {
            variable,
            coefficient,
        }
    }

    /// Evaluate the term with the variable's current value.
    pub fn value(&self) -> f64 {
        self.coefficient * self.variable.value()
    }
}

impl From<Variable> for Term {
    fn from(variable: Variable) -> Self {
        Term::new(variable, 1.0)
    }
}

impl From<&Variable> for Term {
    fn from(variable: &Variable) -> Self {
        Term::new(variable.clone(), 1.0)
    }
}

/// A linear expression in the form: constant + Σ(coefficient * variable)
///
/// Building an expression with the arithmetic operators keeps the terms in
/// operand order, possibly mentioning a variable more than once. Call
/// [`Expression::reduce`] for the canonical form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    terms: SmallVec<[Term; 4]>,
    constant: f64,
}

impl Expression {
    pub fn new(terms: impl IntoIterator<Item = Term>, constant: f64) -> Self {
        Self {
            terms: terms.into_iter().collect(),
            constant,
        }
    }

    /// Create a constant expression.
    pub fn from_constant(constant: f64) -> Self {
        Self {
            terms: SmallVec::new(),
            constant,
        }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluate the expression with the current variable values.
    pub fn value(&self) -> f64 {
        self.terms.iter().map(Term::value).sum::<f64>() + self.constant
    }

    /// Merge the terms of each variable into one, ordered by variable identity.
    pub fn reduce(&self) -> Expression {
        let mut merged: BTreeMap<Variable, f64> = BTreeMap::new();
        for term in &self.terms {
            *merged.entry(term.variable.clone()).or_insert(0.0) += term.coefficient;
        }
        Expression {
            terms: merged
                .into_iter()
                .map(|(variable, coefficient)| Term::new(variable, coefficient))
                .collect(),
            constant: self.constant,
        }
    }

    /// Append a term.
    pub fn push_term(&mut self, term: Term) {
        self.terms.push(term);
    }

    pub(crate) fn scale(&mut self, factor: f64) {
        self.constant *= factor;
        for term in &mut self.terms {
            term.coefficient *= factor;
        }
    }

    pub(crate) fn extend_scaled(&mut self, other: Expression, factor: f64) {
        self.constant += other.constant * factor;
        self.terms.extend(other.terms.into_iter().map(|mut term| {
            term.coefficient *= factor;
            term
        }));
    }
}

impl From<f64> for Expression {
    fn from(constant: f64) -> Self {
        Expression::from_constant(constant)
    }
}

impl From<Term> for Expression {
    fn from(term: Term) -> Self {
        Expression::new([term], 0.0)
    }
}

impl From<Variable> for Expression {
    fn from(variable: Variable) -> Self {
        Expression::from(Term::from(variable))
    }
}

impl From<&Variable> for Expression {
    fn from(variable: &Variable) -> Self {
        Expression::from(Term::from(variable))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{} * {}", term.coefficient, term.variable)?;
        }
        if self.terms.is_empty() {
            write!(f, "{}", self.constant)
        } else {
            write!(f, " + {}", self.constant)
        }
    }
}
