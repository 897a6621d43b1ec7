//! High-level solver interface.
//!
//! [`Solver`] owns a tableau and exposes the incremental operations a
//! layout engine drives: register constraints, mark variables as editable,
//! suggest values and read back the solution.

use strut_core::{Constraint, Result, Strength, Variable};

use crate::tableau::Tableau;

/// An incremental constraint solver.
///
/// Variable values are only written by [`Solver::solve`]; after any other
/// mutating call they are stale until the next solve.
#[derive(Debug, Default)]
pub struct Solver {
    tableau: Tableau,
}

impl Solver {
    /// Create an empty solver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint.
    ///
    /// Fails with `DuplicateConstraint` if it is already present and with
    /// `UnsatisfiableConstraint` if it is required and conflicts with the
    /// required constraints already added. In both cases the solver is left
    /// as it was.
    pub fn add_constraint(&mut self, constraint: &Constraint) -> Result<()> {
        self.tableau.add_constraint(constraint)
    }

    /// Add constraints in order, stopping at the first error.
    pub fn add_constraints<'a, I>(&mut self, constraints: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Constraint>,
    {
        for constraint in constraints {
            self.add_constraint(constraint)?;
        }
        Ok(())
    }

    /// Remove a previously added constraint.
    pub fn remove_constraint(&mut self, constraint: &Constraint) -> Result<()> {
        self.tableau.remove_constraint(constraint)
    }

    pub fn has_constraint(&self, constraint: &Constraint) -> bool {
        self.tableau.has_constraint(constraint)
    }

    /// Register a variable whose value will be driven by [`Solver::suggest_value`].
    ///
    /// The strength must be below [`Strength::REQUIRED`].
    pub fn add_edit_variable(&mut self, variable: &Variable, strength: Strength) -> Result<()> {
        self.tableau.add_edit_variable(variable, strength)
    }

    pub fn remove_edit_variable(&mut self, variable: &Variable) -> Result<()> {
        self.tableau.remove_edit_variable(variable)
    }

    pub fn has_edit_variable(&self, variable: &Variable) -> bool {
        self.tableau.has_edit_variable(variable)
    }

    /// Suggest a target value for an edit variable.
    pub fn suggest_value(&mut self, variable: &Variable, value: f64) -> Result<()> {
        self.tableau.suggest_value(variable, value)
    }

    /// Bring the tableau to an optimal feasible solution and write it into
    /// every variable the solver knows about.
    pub fn solve(&mut self) -> Result<()> {
        self.tableau.solve()
    }

    /// Same as [`Solver::solve`].
    pub fn update_variables(&mut self) -> Result<()> {
        self.solve()
    }

    /// Drop every constraint and edit variable.
    pub fn reset(&mut self) {
        self.tableau.reset();
    }
}
