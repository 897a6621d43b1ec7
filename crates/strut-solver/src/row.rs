//! Sparse tableau rows.

use std::collections::BTreeMap;

use strut_core::EPSILON;

use crate::symbol::Symbol;

/// Near-zero check for floating point values.
pub(crate) fn near_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// A row in the simplex tableau: constant + Σ(coefficient * symbol)
///
/// When a row is stored in the tableau under a basic symbol, that symbol is
/// the implicit subject with coefficient -1.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Row {
    cells: BTreeMap<Symbol, f64>,
    constant: f64,
}

impl Row {
    pub(crate) fn new(constant: f64) -> Self {
        Self {
            cells: BTreeMap::new(),
            constant,
        }
    }

    pub(crate) fn cells(&self) -> &BTreeMap<Symbol, f64> {
        &self.cells
    }

    pub(crate) fn constant(&self) -> f64 {
        self.constant
    }

    /// Add a value to the constant, returning the new constant.
    pub(crate) fn add(&mut self, value: f64) -> f64 {
        self.constant += value;
        self.constant
    }

    /// Accumulate a coefficient for a symbol, dropping the cell if it cancels.
    pub(crate) fn insert_symbol(&mut self, symbol: Symbol, coefficient: f64) {
        let entry = self.cells.entry(symbol).or_insert(0.0);
        *entry += coefficient;
        if near_zero(*entry) {
            self.cells.remove(&symbol);
        }
    }

    /// Merge another row scaled by `coefficient`.
    pub(crate) fn insert_row(&mut self, other: &Row, coefficient: f64) {
        self.constant += other.constant * coefficient;
        for (&symbol, &c) in &other.cells {
            self.insert_symbol(symbol, c * coefficient);
        }
    }

    pub(crate) fn remove(&mut self, symbol: Symbol) {
        self.cells.remove(&symbol);
    }

    /// True if the row only mentions dummy symbols.
    pub(crate) fn all_dummies(&self) -> bool {
        self.cells.keys().all(Symbol::is_dummy)
    }

    /// The first slack or error symbol in the row.
    pub(crate) fn any_pivotable_symbol(&self) -> Option<Symbol> {
        self.cells.keys().copied().find(Symbol::is_pivotable)
    }

    pub(crate) fn reverse_sign(&mut self) {
        self.constant = -self.constant;
        for coeff in self.cells.values_mut() {
            *coeff = -*coeff;
        }
    }

    /// Solve the row for `symbol`, which must have a cell.
    ///
    /// Afterwards the row holds the expression `symbol` equals, and `symbol`
    /// itself is dropped.
    pub(crate) fn solve_for(&mut self, symbol: Symbol) {
        debug_assert!(
            self.cells.contains_key(&symbol),
            "solving a row for a symbol it does not contain"
        );
        let coeff = self.cells.remove(&symbol).unwrap_or(1.0);
        let multiplier = -1.0 / coeff;
        self.constant *= multiplier;
        for c in self.cells.values_mut() {
            *c *= multiplier;
        }
    }

    /// Solve the row basic in `lhs` for `rhs` instead.
    ///
    /// `rhs` must have a cell in this row.
    pub(crate) fn solve_for_pair(&mut self, lhs: Symbol, rhs: Symbol) {
        self.insert_symbol(lhs, -1.0);
        self.solve_for(rhs);
    }

    pub(crate) fn coefficient_for(&self, symbol: Symbol) -> f64 {
        self.cells.get(&symbol).copied().unwrap_or(0.0)
    }

    /// Replace `symbol` by the expression in `row`.
    pub(crate) fn substitute(&mut self, symbol: Symbol, row: &Row) {
        if let Some(coeff) = self.cells.remove(&symbol) {
            self.insert_row(row, coeff);
        }
    }
}
