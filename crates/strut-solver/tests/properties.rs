//! Property-based tests for solver invariants.

use proptest::prelude::*;
use strut_solver::{
    Constraint, Expression, Relate, RelationalOperator, Solver, SolverError, Strength, Variable,
};

const TOLERANCE: f64 = 1e-7;

/// Coefficients for `a*x + b*y + c*z + k >= 0`.
type Inequality = (i32, i32, i32, i32);

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Remove(usize),
}

fn inequality() -> impl Strategy<Value = Inequality> {
    (-5i32..=5, -5i32..=5, -5i32..=5, -40i32..=40)
}

fn op(len: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..len).prop_map(Op::Add),
        1 => (0..len).prop_map(Op::Remove),
    ]
}

/// One step of an edit session over a pool of satisfiable constraints.
#[derive(Debug, Clone)]
enum Step {
    Add(usize),
    Remove(usize),
    Suggest(usize, i32),
}

fn step(len: usize) -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (0..len).prop_map(Step::Add),
        1 => (0..len).prop_map(Step::Remove),
        2 => (0..2usize, -150i32..150).prop_map(|(v, t)| Step::Suggest(v, t)),
    ]
}

fn coefficients() -> impl Strategy<Value = (i32, i32, i32)> {
    (-5i32..=5, -5i32..=5, -5i32..=5).prop_filter("no variables", |&(a, b, c)| {
        a != 0 || b != 0 || c != 0
    })
}

/// `a*x + b*y + c*z - (a*px + b*py + c*pz)`, which is zero at `point`.
fn centered(vars: &[Variable; 3], (a, b, c): (i32, i32, i32), point: [f64; 3]) -> Expression {
    let offset = f64::from(a) * point[0] + f64::from(b) * point[1] + f64::from(c) * point[2];
    f64::from(a) * &vars[0] + f64::from(b) * &vars[1] + f64::from(c) * &vars[2] - offset
}

fn vars() -> [Variable; 3] {
    [Variable::new("x"), Variable::new("y"), Variable::new("z")]
}

fn build(vars: &[Variable; 3], (a, b, c, k): Inequality) -> Constraint {
    let expr = f64::from(a) * &vars[0] + f64::from(b) * &vars[1] + f64::from(c) * &vars[2]
        + f64::from(k);
    expr.is_ge(0.0)
}

/// Flip an inequality so it holds at `point`.
fn oriented(vars: &[Variable; 3], ineq: Inequality, point: [f64; 3]) -> Constraint {
    let constraint = build(vars, ineq);
    let at_point: f64 = constraint
        .expression()
        .terms()
        .iter()
        .map(|term| {
            let idx = vars.iter().position(|v| *v == term.variable).unwrap_or(0);
            term.coefficient * point[idx]
        })
        .sum::<f64>()
        + constraint.expression().constant();
    if at_point >= 0.0 {
        constraint
    } else {
        Constraint::new(
            constraint.expression().clone(),
            RelationalOperator::LessOrEqual,
            Strength::REQUIRED,
        )
    }
}

fn bounding_box(vars: &[Variable; 3]) -> Vec<Constraint> {
    vars.iter()
        .flat_map(|v| [v.is_ge(-100.0), v.is_le(100.0)])
        .collect()
}

fn holds(constraint: &Constraint) -> bool {
    let value = constraint.expression().value();
    match constraint.op() {
        RelationalOperator::LessOrEqual => value <= TOLERANCE,
        RelationalOperator::Equal => value.abs() <= TOLERANCE,
        RelationalOperator::GreaterOrEqual => value >= -TOLERANCE,
    }
}

proptest! {
    #[test]
    fn required_constraints_hold_after_add_remove(
        ineqs in prop::collection::vec(inequality(), 1..8),
        ops in prop::collection::vec(op(8), 1..24),
        targets in prop::array::uniform3(-150i32..150),
    ) {
        let vars = vars();
        let mut solver = Solver::new();
        for constraint in bounding_box(&vars) {
            solver.add_constraint(&constraint).unwrap();
        }
        for (v, t) in vars.iter().zip(targets) {
            let preference = v.is_eq(f64::from(t)) | Strength::WEAK;
            solver.add_constraint(&preference).unwrap();
        }

        let pool: Vec<Constraint> = ineqs.iter().map(|&ineq| build(&vars, ineq)).collect();
        let mut active: Vec<Constraint> = Vec::new();

        for op in ops {
            match op {
                Op::Add(i) => {
                    let constraint = &pool[i % pool.len()];
                    match solver.add_constraint(constraint) {
                        Ok(()) => active.push(constraint.clone()),
                        Err(SolverError::DuplicateConstraint(_))
                        | Err(SolverError::UnsatisfiableConstraint(_)) => {}
                        Err(err) => return Err(TestCaseError::fail(err.to_string())),
                    }
                }
                Op::Remove(i) => {
                    if !active.is_empty() {
                        let constraint = active.remove(i % active.len());
                        prop_assert!(solver.remove_constraint(&constraint).is_ok());
                    }
                }
            }

            solver.solve().unwrap();
            for constraint in &active {
                prop_assert!(holds(constraint), "violated: {}", constraint);
            }
            for v in &vars {
                prop_assert!(v.value() >= -100.0 - TOLERANCE && v.value() <= 100.0 + TOLERANCE);
            }
        }
    }

    #[test]
    fn removal_matches_never_added(
        base in prop::collection::vec(inequality(), 0..6),
        extra in inequality(),
        point in prop::array::uniform3(-20i32..20),
    ) {
        let vars = vars();
        let point = point.map(f64::from);

        let constraints: Vec<Constraint> = base
            .iter()
            .map(|&ineq| oriented(&vars, ineq, point))
            .collect();
        let build_solver = |constraints: &[Constraint]| {
            let mut solver = Solver::new();
            for constraint in bounding_box(&vars).iter().chain(constraints) {
                solver.add_constraint(constraint).unwrap();
            }
            for (v, p) in vars.iter().zip(point) {
                solver
                    .add_constraint(&(v.is_eq(p) | Strength::MEDIUM))
                    .unwrap();
            }
            solver
        };

        let mut fresh = build_solver(&constraints);
        fresh.solve().unwrap();
        let expected: Vec<f64> = vars.iter().map(Variable::value).collect();

        let mut edited = build_solver(&constraints);
        let extra = build(&vars, extra);
        if edited.add_constraint(&extra).is_ok() {
            edited.solve().unwrap();
            edited.remove_constraint(&extra).unwrap();
        }
        edited.solve().unwrap();

        for (v, e) in vars.iter().zip(&expected) {
            prop_assert!((v.value() - e).abs() < 1e-6, "{} = {} != {}", v, v.value(), e);
        }
    }
}

proptest! {
    #[test]
    fn feasible_edit_sessions_accept_every_constraint(
        point in prop::array::uniform3(-20i32..20),
        equalities in prop::collection::vec(coefficients(), 0..3),
        inequalities in prop::collection::vec((coefficients(), 0i32..=40, any::<bool>()), 0..5),
        steps in prop::collection::vec(step(10), 1..32),
    ) {
        let vars = vars();
        let point = point.map(f64::from);
        let mut solver = Solver::new();
        for constraint in bounding_box(&vars) {
            solver.add_constraint(&constraint).unwrap();
        }
        solver.add_edit_variable(&vars[0], Strength::STRONG).unwrap();
        solver.add_edit_variable(&vars[1], Strength::WEAK).unwrap();

        // Every equality comes with a scaled copy so some adds are redundant.
        let mut pool: Vec<Constraint> = Vec::new();
        for &coeffs in &equalities {
            let expr = centered(&vars, coeffs, point);
            pool.push((expr.clone() * 2.0).is_eq(0.0));
            pool.push(expr.is_eq(0.0));
        }
        for &(coeffs, slack, upper) in &inequalities {
            let expr = centered(&vars, coeffs, point);
            let slack = f64::from(slack);
            pool.push(if upper {
                (expr - slack).is_le(0.0)
            } else {
                (expr + slack).is_ge(0.0)
            });
        }
        prop_assume!(!pool.is_empty());

        let mut active: Vec<Constraint> = Vec::new();
        for step in steps {
            match step {
                Step::Add(i) => {
                    let constraint = &pool[i % pool.len()];
                    if !active.contains(constraint) {
                        let added = solver.add_constraint(constraint);
                        prop_assert!(added.is_ok(), "rejected {}: {:?}", constraint, added);
                        active.push(constraint.clone());
                    }
                }
                Step::Remove(i) => {
                    if !active.is_empty() {
                        let constraint = active.remove(i % active.len());
                        let removed = solver.remove_constraint(&constraint);
                        prop_assert!(removed.is_ok(), "remove {}: {:?}", constraint, removed);
                    }
                }
                Step::Suggest(v, target) => {
                    let suggested = solver.suggest_value(&vars[v], f64::from(target));
                    prop_assert!(suggested.is_ok(), "suggest: {:?}", suggested);
                }
            }

            let solved = solver.solve();
            prop_assert!(solved.is_ok(), "solve: {:?}", solved);
            for constraint in &active {
                prop_assert!(holds(constraint), "violated: {} = {}", constraint, constraint.expression().value());
            }
            for v in &vars {
                prop_assert!(v.value() >= -100.0 - TOLERANCE && v.value() <= 100.0 + TOLERANCE);
            }
        }
    }
}

#[test]
fn expression_value_tracks_solution() {
    let vars = vars();
    let mut solver = Solver::new();
    solver.add_constraint(&vars[0].is_eq(2.0)).unwrap();
    solver.add_constraint(&vars[1].is_eq(&vars[0] * 3.0)).unwrap();
    solver.add_constraint(&vars[2].is_eq(Expression::from_constant(-1.0))).unwrap();
    solver.solve().unwrap();

    let sum = &vars[0] + &vars[1] + &vars[2];
    assert!((sum.value() - 7.0).abs() < TOLERANCE);
}
