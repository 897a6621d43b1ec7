//! The incremental simplex tableau.
//!
//! This is the Cassowary algorithm as described in "The Cassowary Linear
//! Arithmetic Constraint Solving Algorithm" by Greg J. Badros and Alan
//! Borning: every constraint becomes a row over slack, error and dummy
//! symbols, soft constraints feed their error symbols into a weighted
//! objective, and the tableau is kept primal feasible between calls so
//! each edit only needs a few pivots.
//!
//! All maps are ordered by key. Entering and leaving choices take the first
//! qualifying symbol in ascending id order, which makes pivot sequences
//! reproducible.

use std::collections::BTreeMap;

use strut_core::{Constraint, Expression, RelationalOperator, Result, SolverError, Strength, Variable};
use tracing::{debug, trace};

use crate::row::{near_zero, Row};
use crate::symbol::{Symbol, SymbolKind};

/// The symbols recording where a constraint lives in the tableau.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Tag {
    pub(crate) marker: Symbol,
    pub(crate) other: Symbol,
}

/// Rows and objective saved before an add that may be rejected.
#[derive(Debug, Clone)]
struct Snapshot {
    rows: BTreeMap<Symbol, Row>,
    objective: Row,
}

#[derive(Debug, Clone)]
struct EditInfo {
    tag: Tag,
    constraint: Constraint,
    constant: f64,
}

/// Complete solver state.
#[derive(Debug)]
pub(crate) struct Tableau {
    /// Constraints and their marker symbols
    cns: BTreeMap<Constraint, Tag>,
    /// Rows keyed by their basic symbol
    rows: BTreeMap<Symbol, Row>,
    /// External symbol of every variable seen so far
    vars: BTreeMap<Variable, Symbol>,
    edits: BTreeMap<Variable, EditInfo>,
    /// Basic symbols whose row constant may have gone negative
    infeasible_rows: Vec<Symbol>,
    objective: Row,
    /// Temporary objective while a row is added through an artificial slack
    artificial: Option<Row>,
    /// Next symbol id
    id_tick: u64,
    /// Set when the objective may no longer be optimal
    dirty: bool,
}

impl Default for Tableau {
    fn default() -> Self {
        Self::new()
    }
}

impl Tableau {
    pub(crate) fn new() -> Self {
        Self {
            cns: BTreeMap::new(),
            rows: BTreeMap::new(),
            vars: BTreeMap::new(),
            edits: BTreeMap::new(),
            infeasible_rows: Vec::new(),
            objective: Row::default(),
            artificial: None,
            id_tick: 1,
            dirty: false,
        }
    }

    pub(crate) fn add_constraint(&mut self, constraint: &Constraint) -> Result<()> {
        self.insert_constraint(constraint).map(|_| ())
    }

    fn insert_constraint(&mut self, constraint: &Constraint) -> Result<Tag> {
        if self.cns.contains_key(constraint) {
            return Err(SolverError::DuplicateConstraint(constraint.clone()));
        }

        // Row creation substitutes basic rows, which must be feasible.
        self.ensure_dual_optimized()?;

        let (mut row, tag) = self.create_row(constraint);
        let mut subject = Self::choose_subject(&row);

        // A row of dummies only is a redundant required equality if its
        // constant is zero, and a contradiction otherwise.
        if subject.is_none() && row.all_dummies() {
            if !near_zero(row.constant()) {
                return Err(SolverError::UnsatisfiableConstraint(constraint.clone()));
            }
            // A basic dummy must sit at exactly zero.
            row.add(-row.constant());
            subject = Some(tag.marker);
        }

        // A subject owned by an older constraint may appear in other
        // restricted rows, and substituting it can drive them negative.
        let guarded = subject.map_or(true, |s| {
            s.is_pivotable() && s != tag.marker && s != tag.other
        });
        let snapshot = guarded.then(|| self.snapshot());

        let strength = constraint.strength().value();
        self.register_errors(&tag, strength);

        let outcome = match (subject, snapshot.as_ref()) {
            (Some(subject), None) => {
                self.commit_row(subject, row);
                Ok(true)
            }
            (Some(subject), Some(snapshot)) => {
                let fallback = row.clone();
                self.commit_row(subject, row);
                if self.dual_optimize().is_ok() {
                    Ok(true)
                } else {
                    // The dual pass only repairs rows it has a pivot for.
                    // Phase one decides feasibility exactly.
                    self.restore(snapshot.clone());
                    self.register_errors(&tag, strength);
                    self.add_with_artificial_variable(fallback)
                }
            }
            (None, _) => self.add_with_artificial_variable(row),
        };

        let accepted = match outcome {
            Ok(accepted) => accepted,
            Err(err) => {
                self.rollback(snapshot);
                return Err(err);
            }
        };
        if !accepted {
            self.rollback(snapshot);
            debug!(
                component = "tableau",
                operation = "add_constraint",
                status = "unsatisfiable",
                op = %constraint.op(),
                "Rejected constraint"
            );
            return Err(SolverError::UnsatisfiableConstraint(constraint.clone()));
        }

        self.cns.insert(constraint.clone(), tag);
        self.dirty = true;

        debug!(
            component = "tableau",
            operation = "add_constraint",
            status = "success",
            op = %constraint.op(),
            strength,
            subject = subject.map_or(0, |s| s.id()),
            rows = self.rows.len(),
            "Added constraint"
        );

        Ok(tag)
    }

    fn register_errors(&mut self, tag: &Tag, strength: f64) {
        for symbol in [tag.marker, tag.other] {
            if symbol.is_error() {
                self.objective.insert_symbol(symbol, strength);
            }
        }
    }

    /// Solve `row` for `subject` and make it basic.
    fn commit_row(&mut self, subject: Symbol, mut row: Row) {
        row.solve_for(subject);
        self.substitute(subject, &row);
        self.rows.insert(subject, row);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.rows.clone(),
            objective: self.objective.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.rows = snapshot.rows;
        self.objective = snapshot.objective;
        self.artificial = None;
        self.infeasible_rows.clear();
    }

    /// Undo a rejected add. Adds that never took a snapshot cannot fail.
    fn rollback(&mut self, snapshot: Option<Snapshot>) {
        if let Some(snapshot) = snapshot {
            self.restore(snapshot);
        }
        self.artificial = None;
        self.infeasible_rows.clear();
    }

    /// Add a row that has no valid subject through an artificial slack.
    ///
    /// Returns whether the artificial objective reached zero, i.e. whether
    /// the row is satisfiable alongside the rest of the tableau.
    fn add_with_artificial_variable(&mut self, row: Row) -> Result<bool> {
        let art = self.new_symbol(SymbolKind::Slack);
        self.rows.insert(art, row.clone());
        self.artificial = Some(row);

        let optimized = self.optimize();
        let success = self
            .artificial
            .take()
            .map_or(false, |objective| near_zero(objective.constant()));
        optimized?;

        if let Some(mut basic) = self.rows.remove(&art) {
            // Dummies are zero, so the artificial row is settled.
            if basic.all_dummies() {
                return Ok(success);
            }
            let entering = match basic.any_pivotable_symbol() {
                Some(symbol) => symbol,
                None => return Ok(false),
            };
            basic.solve_for_pair(art, entering);
            self.substitute(entering, &basic);
            self.rows.insert(entering, basic);
        }

        for row in self.rows.values_mut() {
            row.remove(art);
        }
        self.objective.remove(art);

        Ok(success)
    }

    pub(crate) fn remove_constraint(&mut self, constraint: &Constraint) -> Result<()> {
        let tag = *self
            .cns
            .get(constraint)
            .ok_or_else(|| SolverError::UnknownConstraint(constraint.clone()))?;

        self.ensure_dual_optimized()?;

        self.cns.remove(constraint);
        self.dirty = true;

        // Strip the error symbols from the objective *before* pivoting, or
        // the substitutions below would feed them back in.
        self.remove_constraint_effects(&tag, constraint.strength());

        if self.rows.remove(&tag.marker).is_none() {
            let leaving = self
                .marker_leaving_row(tag.marker)
                .ok_or(SolverError::InternalSolverError("failed to find leaving row"))?;
            let mut row = self
                .rows
                .remove(&leaving)
                .ok_or(SolverError::InternalSolverError("leaving row is not basic"))?;
            row.solve_for_pair(leaving, tag.marker);
            self.substitute(tag.marker, &row);
        }

        debug!(
            component = "tableau",
            operation = "remove_constraint",
            status = "success",
            marker = tag.marker.id(),
            rows = self.rows.len(),
            "Removed constraint"
        );

        Ok(())
    }

    pub(crate) fn has_constraint(&self, constraint: &Constraint) -> bool {
        self.cns.contains_key(constraint)
    }

    pub(crate) fn add_edit_variable(&mut self, variable: &Variable, strength: Strength) -> Result<()> {
        if self.edits.contains_key(variable) {
            return Err(SolverError::DuplicateEditVariable(variable.clone()));
        }
        let strength = strength.clip();
        if strength.is_required() {
            return Err(SolverError::BadRequiredStrength(variable.clone()));
        }

        let constraint = Constraint::new(Expression::from(variable), RelationalOperator::Equal, strength);
        let tag = self.insert_constraint(&constraint)?;
        self.edits.insert(
            variable.clone(),
            EditInfo {
                tag,
                constraint,
                constant: 0.0,
            },
        );

        debug!(
            component = "tableau",
            operation = "add_edit_variable",
            status = "success",
            variable = %variable,
            strength = strength.value(),
            "Registered edit variable"
        );

        Ok(())
    }

    pub(crate) fn remove_edit_variable(&mut self, variable: &Variable) -> Result<()> {
        let constraint = self
            .edits
            .get(variable)
            .map(|info| info.constraint.clone())
            .ok_or_else(|| SolverError::UnknownEditVariable(variable.clone()))?;
        self.remove_constraint(&constraint)?;
        self.edits.remove(variable);
        Ok(())
    }

    pub(crate) fn has_edit_variable(&self, variable: &Variable) -> bool {
        self.edits.contains_key(variable)
    }

    pub(crate) fn suggest_value(&mut self, variable: &Variable, value: f64) -> Result<()> {
        if !self.edits.contains_key(variable) {
            return Err(SolverError::UnknownEditVariable(variable.clone()));
        }

        // The dual phase needs an optimal objective to start from.
        self.ensure_optimized()?;

        let (tag, delta) = match self.edits.get_mut(variable) {
            Some(info) => {
                let delta = value - info.constant;
                info.constant = value;
                (info.tag, delta)
            }
            None => return Err(SolverError::UnknownEditVariable(variable.clone())),
        };

        trace!(
            component = "tableau",
            operation = "suggest_value",
            variable = %variable,
            value,
            delta,
            "Suggested value"
        );

        // Check first if the positive error symbol is basic.
        if let Some(row) = self.rows.get_mut(&tag.marker) {
            if row.add(-delta) < 0.0 {
                self.infeasible_rows.push(tag.marker);
            }
            return Ok(());
        }

        // Then the negative error symbol.
        if let Some(row) = self.rows.get_mut(&tag.other) {
            if row.add(delta) < 0.0 {
                self.infeasible_rows.push(tag.other);
            }
            return Ok(());
        }

        // Otherwise update every row the error symbols appear in.
        for (&symbol, row) in self.rows.iter_mut() {
            let coeff = row.coefficient_for(tag.marker);
            if coeff != 0.0 && row.add(delta * coeff) < 0.0 && symbol.is_pivotable() {
                self.infeasible_rows.push(symbol);
            }
        }

        Ok(())
    }

    /// Re-optimize and write the solution into every known variable.
    pub(crate) fn solve(&mut self) -> Result<()> {
        self.ensure_optimized()?;
        self.ensure_dual_optimized()?;
        self.update_external_vars();

        debug!(
            component = "tableau",
            operation = "solve",
            status = "success",
            rows = self.rows.len(),
            variables = self.vars.len(),
            objective = self.objective.constant(),
            "Solved tableau"
        );

        Ok(())
    }

    pub(crate) fn reset(&mut self) {
        self.rows.clear();
        self.cns.clear();
        self.vars.clear();
        self.edits.clear();
        self.infeasible_rows.clear();
        self.objective = Row::default();
        self.artificial = None;
        self.id_tick = 1;
        self.dirty = false;

        debug!(component = "tableau", operation = "reset", status = "success", "Reset tableau");
    }

    fn new_symbol(&mut self, kind: SymbolKind) -> Symbol {
        let symbol = Symbol::new(kind, self.id_tick);
        self.id_tick += 1;
        symbol
    }

    /// Get the symbol for a variable, creating it on first use.
    fn var_symbol(&mut self, variable: &Variable) -> Symbol {
        if let Some(&symbol) = self.vars.get(variable) {
            return symbol;
        }
        let symbol = self.new_symbol(SymbolKind::External);
        self.vars.insert(variable.clone(), symbol);
        symbol
    }

    /// Create a row for a constraint.
    ///
    /// Basic variables are replaced by their rows, so the result only
    /// mentions parametric symbols. The row constant is made non-negative.
    fn create_row(&mut self, constraint: &Constraint) -> (Row, Tag) {
        let expr = constraint.expression();
        let mut row = Row::new(expr.constant());

        for term in expr.terms() {
            if near_zero(term.coefficient) {
                continue;
            }
            let symbol = self.var_symbol(&term.variable);
            match self.rows.get(&symbol) {
                Some(basic) => row.insert_row(basic, term.coefficient),
                None => row.insert_symbol(symbol, term.coefficient),
            }
        }

        let mut tag = Tag::default();
        let required = constraint.strength().is_required();

        match constraint.op() {
            RelationalOperator::LessOrEqual | RelationalOperator::GreaterOrEqual => {
                let coeff = if constraint.op() == RelationalOperator::LessOrEqual {
                    1.0
                } else {
                    -1.0
                };
                let slack = self.new_symbol(SymbolKind::Slack);
                tag.marker = slack;
                row.insert_symbol(slack, coeff);
                if !required {
                    let error = self.new_symbol(SymbolKind::Error);
                    tag.other = error;
                    row.insert_symbol(error, -coeff);
                }
            }
            RelationalOperator::Equal => {
                if required {
                    let dummy = self.new_symbol(SymbolKind::Dummy);
                    tag.marker = dummy;
                    row.insert_symbol(dummy, 1.0);
                } else {
                    // v = eplus - eminus
                    let errplus = self.new_symbol(SymbolKind::Error);
                    let errminus = self.new_symbol(SymbolKind::Error);
                    tag.marker = errplus;
                    tag.other = errminus;
                    row.insert_symbol(errplus, -1.0);
                    row.insert_symbol(errminus, 1.0);
                }
            }
        }

        if row.constant() < 0.0 {
            row.reverse_sign();
        }

        (row, tag)
    }

    /// Choose the symbol to solve a new row for.
    ///
    /// 1) The first external symbol.
    /// 2) Otherwise the last slack or error symbol with a negative
    ///    coefficient. Ids grow monotonically, so that is the newest one and
    ///    the cheapest to substitute.
    ///
    /// With basic symbols already substituted, no candidate means the row is
    /// a required constraint that cannot be satisfied.
    fn choose_subject(row: &Row) -> Option<Symbol> {
        let mut result = None;
        for (&symbol, &coeff) in row.cells() {
            match symbol.kind() {
                SymbolKind::External => return Some(symbol),
                SymbolKind::Slack | SymbolKind::Error if coeff < 0.0 => result = Some(symbol),
                _ => {}
            }
        }
        result
    }

    /// Substitute a parametric symbol with a row throughout the tableau.
    fn substitute(&mut self, symbol: Symbol, row: &Row) {
        for (&basic, r) in self.rows.iter_mut() {
            r.substitute(symbol, row);
            // Dummy rows stay at zero and external rows are unrestricted.
            if basic.is_pivotable() && r.constant() < 0.0 {
                self.infeasible_rows.push(basic);
            }
        }
        self.objective.substitute(symbol, row);
        if let Some(artificial) = self.artificial.as_mut() {
            artificial.substitute(symbol, row);
        }
    }

    /// Pivot `entering` into the basis in place of `leaving`.
    fn pivot(&mut self, leaving: Symbol, entering: Symbol) -> Result<()> {
        let mut row = self
            .rows
            .remove(&leaving)
            .ok_or(SolverError::InternalSolverError("leaving symbol is not basic"))?;
        row.solve_for_pair(leaving, entering);
        self.substitute(entering, &row);
        self.rows.insert(entering, row);

        trace!(
            component = "tableau",
            operation = "pivot",
            leaving = leaving.id(),
            entering = entering.id(),
            "Pivoted"
        );

        Ok(())
    }

    /// Phase 2 of the primal simplex: pivot until the objective is minimal.
    ///
    /// Minimizes the artificial objective instead while one is present.
    fn optimize(&mut self) -> Result<()> {
        loop {
            let objective = self.artificial.as_ref().unwrap_or(&self.objective);
            let entering = match Self::entering_symbol(objective) {
                Some(symbol) => symbol,
                None => return Ok(()),
            };
            let leaving = self
                .leaving_row(entering)
                .ok_or(SolverError::UnboundedObjective)?;
            self.pivot(leaving, entering)?;
        }
    }

    /// Dual simplex: pivot infeasible rows back to feasibility while keeping
    /// the objective optimal.
    fn dual_optimize(&mut self) -> Result<()> {
        while let Some(leaving) = self.infeasible_rows.pop() {
            let entering = match self.rows.get(&leaving) {
                Some(row) if row.constant() < 0.0 => self
                    .dual_entering_symbol(row)
                    .ok_or(SolverError::InternalSolverError("dual optimize failed"))?,
                _ => continue,
            };
            self.pivot(leaving, entering)?;
        }
        Ok(())
    }

    fn ensure_optimized(&mut self) -> Result<()> {
        if self.dirty {
            self.optimize()?;
            self.dirty = false;
        }
        Ok(())
    }

    fn ensure_dual_optimized(&mut self) -> Result<()> {
        if !self.infeasible_rows.is_empty() {
            self.dual_optimize()?;
        }
        Ok(())
    }

    /// The first non-dummy objective symbol with a negative coefficient.
    fn entering_symbol(objective: &Row) -> Option<Symbol> {
        objective
            .cells()
            .iter()
            .find(|(symbol, &coeff)| !symbol.is_dummy() && coeff < 0.0)
            .map(|(&symbol, _)| symbol)
    }

    /// The positive, non-dummy cell of an infeasible row with the smallest
    /// objective ratio.
    fn dual_entering_symbol(&self, row: &Row) -> Option<Symbol> {
        let mut entering = None;
        let mut ratio = f64::MAX;
        for (&symbol, &coeff) in row.cells() {
            if coeff > 0.0 && !symbol.is_dummy() {
                let r = self.objective.coefficient_for(symbol) / coeff;
                if r < ratio {
                    ratio = r;
                    entering = Some(symbol);
                }
            }
        }
        entering
    }

    /// Minimum ratio test over the restricted rows. `None` means the
    /// objective is unbounded in the direction of `entering`.
    fn leaving_row(&self, entering: Symbol) -> Option<Symbol> {
        let mut ratio = f64::MAX;
        let mut found = None;
        for (&symbol, row) in &self.rows {
            if symbol.is_external() {
                continue;
            }
            let coeff = row.coefficient_for(entering);
            if coeff < 0.0 {
                let r = -row.constant() / coeff;
                if r < ratio {
                    ratio = r;
                    found = Some(symbol);
                }
            }
        }
        found
    }

    /// Pick the row to pivot a non-basic marker out through.
    ///
    /// 0) A basic dummy row containing the marker. It is an equivalent
    ///    required equality, and pivoting through it keeps every dummy at
    ///    zero.
    /// 1) A restricted row with a negative marker coefficient and the
    ///    smallest `-constant / coefficient`.
    /// 2) A restricted row with the smallest `constant / coefficient`.
    /// 3) The first unrestricted row containing the marker.
    fn marker_leaving_row(&self, marker: Symbol) -> Option<Symbol> {
        let mut dummy = None;
        let mut first = None;
        let mut second = None;
        let mut third = None;
        let mut r1 = f64::MAX;
        let mut r2 = f64::MAX;

        for (&symbol, row) in &self.rows {
            let c = row.coefficient_for(marker);
            if c == 0.0 {
                continue;
            }
            if symbol.is_dummy() {
                if dummy.is_none() {
                    dummy = Some(symbol);
                }
            } else if symbol.is_external() {
                if third.is_none() {
                    third = Some(symbol);
                }
            } else if c < 0.0 {
                let r = -row.constant() / c;
                if r < r1 {
                    r1 = r;
                    first = Some(symbol);
                }
            } else {
                let r = row.constant() / c;
                if r < r2 {
                    r2 = r;
                    second = Some(symbol);
                }
            }
        }

        dummy.or(first).or(second).or(third)
    }

    fn remove_constraint_effects(&mut self, tag: &Tag, strength: Strength) {
        for marker in [tag.marker, tag.other] {
            if marker.is_error() {
                self.remove_marker_effects(marker, strength.value());
            }
        }
    }

    /// Cancel an error symbol's weight in the objective, whether the symbol
    /// is parametric or has already been substituted away as a basic row.
    fn remove_marker_effects(&mut self, marker: Symbol, strength: f64) {
        match self.rows.get(&marker) {
            Some(row) => self.objective.insert_row(row, -strength),
            None => self.objective.insert_symbol(marker, -strength),
        }
    }

    fn update_external_vars(&self) {
        for (variable, symbol) in &self.vars {
            let value = self.rows.get(symbol).map_or(0.0, Row::constant);
            variable.set_value(value);
        }
    }
}
