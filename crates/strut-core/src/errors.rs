//! Error types for the strut solver.

use thiserror::Error;

use crate::constraint::Constraint;
use crate::variable::Variable;

/// Errors raised by solver operations.
#[derive(Debug, Clone, Error)]
pub enum SolverError {
    #[error("The constraint has already been added to the solver: {0}")]
    DuplicateConstraint(Constraint),

    #[error("The constraint has not been added to the solver: {0}")]
    UnknownConstraint(Constraint),

    #[error("The constraint cannot be satisfied: {0}")]
    UnsatisfiableConstraint(Constraint),

    #[error("The edit variable has already been added to the solver: {0}")]
    DuplicateEditVariable(Variable),

    #[error("The edit variable has not been added to the solver: {0}")]
    UnknownEditVariable(Variable),

    #[error("A required strength cannot be used for edit variable {0}")]
    BadRequiredStrength(Variable),

    #[error("The objective function is unbounded")]
    UnboundedObjective,

    #[error("Internal solver error: {0}")]
    InternalSolverError(&'static str),
}

impl SolverError {
    /// The constraint that caused the error, if any.
    pub fn constraint(&self) -> Option<&Constraint> {
        match self {
            SolverError::DuplicateConstraint(c)
            | SolverError::UnknownConstraint(c)
            | SolverError::UnsatisfiableConstraint(c) => Some(c),
            _ => None,
        }
    }

    /// The variable that caused the error, if any.
    pub fn variable(&self) -> Option<&Variable> {
        match self {
            SolverError::DuplicateEditVariable(v)
            | SolverError::UnknownEditVariable(v)
            | SolverError::BadRequiredStrength(v) => Some(v),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;
