//! Core types for the strut constraint solver.
//!
//! This crate provides the values a caller builds constraints from:
//! - Strengths (constraint priorities)
//! - Variables, terms and linear expressions
//! - Constraints and the relational builders that produce them
//! - Error types
//!
//! # Example
//!
//! ```
//! use strut_core::{Relate, Strength, Variable};
//!
//! let left = Variable::new("left");
//! let width = Variable::new("width");
//! let right = Variable::new("right");
//!
//! let fixed = (&left + &width).is_eq(&right);
//! let preferred = width.is_ge(100.0) | Strength::WEAK;
//! assert_eq!(preferred.strength(), Strength::WEAK);
//! assert_eq!(fixed.expression().terms().len(), 3);
//! ```

pub mod constraint;
pub mod errors;
pub mod expression;
mod ops;
pub mod strength;
pub mod variable;

pub use constraint::{Constraint, Relate, RelationalOperator, EPSILON};
pub use errors::{Result, SolverError};
pub use expression::{Expression, Term};
pub use strength::Strength;
pub use variable::{Context, Variable};
