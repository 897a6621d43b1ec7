//! Incremental Cassowary constraint solver.
//!
//! This crate implements:
//! - The simplex tableau with primal and dual optimization
//! - Weighted soft constraints via error symbols
//! - Edit variables with cheap value suggestions
//!
//! # Example
//!
//! ```
//! use strut_solver::{Relate, Solver, Strength, Variable};
//!
//! let left = Variable::new("left");
//! let width = Variable::new("width");
//! let right = Variable::new("right");
//!
//! let mut solver = Solver::new();
//! solver.add_constraint(&(&left + &width).is_eq(&right)).unwrap();
//! solver.add_constraint(&left.is_eq(10.0)).unwrap();
//! solver.add_constraint(&(width.is_eq(100.0) | Strength::WEAK)).unwrap();
//!
//! solver.add_edit_variable(&right, Strength::STRONG).unwrap();
//! solver.suggest_value(&right, 300.0).unwrap();
//! solver.solve().unwrap();
//!
//! assert!((width.value() - 290.0).abs() < 1e-8);
//! ```

mod row;
mod solver;
mod symbol;
mod tableau;

pub use solver::Solver;
pub use strut_core::{
    Constraint, Context, Expression, Relate, RelationalOperator, Result, SolverError, Strength,
    Term, Variable,
};
