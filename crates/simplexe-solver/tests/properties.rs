//! Property-based tests for the simplex engine
//!
//! Random small programs with many zero right-hand sides, so degenerate
//! pivots and ties in the ratio test are common:
//! - basis shape after every pivot, in both phases
//! - optimality of terminal tableaus
//! - feasibility and duality of optimal points
//! - termination of the anti-cycling rules

use proptest::prelude::*;
use simplexe_solver::{LpProblem, Solver, SolutionStatus, Tableau, TieBreak, pivot};

const TOL: f64 = 1e-9;
const CHECK: f64 = 1e-6;

/// Strategy for small integer coefficients
fn coefficient() -> impl Strategy<Value = f64> {
    (-3i32..=3).prop_map(f64::from)
}

/// Strategy for right-hand sides, biased towards zero
fn rhs_value(allow_negative: bool) -> impl Strategy<Value = f64> {
    let values: Vec<f64> = if allow_negative {
        vec![0.0, 0.0, 1.0, 2.0, -1.0]
    } else {
        vec![0.0, 0.0, 1.0, 2.0]
    };
    prop::sample::select(values)
}

fn problem(max_rows: usize, max_cols: usize, allow_negative: bool) -> impl Strategy<Value = LpProblem> {
    (1..=max_rows, 1..=max_cols).prop_flat_map(move |(m, n)| {
        (
            prop::collection::vec(prop::collection::vec(coefficient(), n), m),
            prop::collection::vec(rhs_value(allow_negative), m),
            prop::collection::vec(coefficient(), n),
        )
            .prop_map(|(a, b, c)| LpProblem::new(a, b, c))
    })
}

fn dual_objective(problem: &LpProblem, shadow_prices: &[f64]) -> f64 {
    problem.rhs.iter().zip(shadow_prices).map(|(b, y)| b * y).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Every pivot keeps exactly m basic variables whose columns form a
    /// permuted identity, with the entering column the unit vector of its row.
    #[test]
    fn pivots_preserve_basis(problem in problem(6, 6, false)) {
        let mut tableau = Tableau::new(&problem).unwrap();
        let m = problem.num_constraints();

        for _ in 0..200 {
            let Some(column) = pivot::entering_column(&tableau, TOL) else { break };
            let Some(row) = pivot::leaving_row(&tableau, column, TieBreak::Lexicographic, TOL) else { break };
            tableau.pivot(row, column, TOL).unwrap();

            prop_assert_eq!(tableau.basis().len(), m);
            prop_assert_eq!(tableau.unit_row(column, CHECK), Some(row));
            prop_assert!(tableau.has_identity_basis(CHECK));
            prop_assert!(tableau.is_feasible(CHECK));
        }
    }

    /// The artificial basis of the auxiliary tableau survives pivoting, and
    /// the auxiliary objective climbs monotonically towards zero.
    #[test]
    fn phase_one_pivots_preserve_basis(problem in problem(6, 6, true)) {
        let mut tableau = Tableau::auxiliary(&problem).unwrap();
        let m = problem.num_constraints();
        prop_assert!(tableau.has_identity_basis(CHECK));
        prop_assert!(tableau.is_feasible(CHECK));

        for _ in 0..200 {
            let Some(column) = pivot::entering_column(&tableau, TOL) else { break };
            let row = pivot::leaving_row(&tableau, column, TieBreak::Lexicographic, TOL);
            prop_assert!(row.is_some(), "auxiliary objective is bounded");
            let Some(row) = row else { break };
            let before = tableau.objective_value();
            tableau.pivot(row, column, TOL).unwrap();

            prop_assert_eq!(tableau.basis().len(), m);
            prop_assert_eq!(tableau.unit_row(column, CHECK), Some(row));
            prop_assert!(tableau.has_identity_basis(CHECK));
            prop_assert!(tableau.is_feasible(CHECK));
            prop_assert!(tableau.objective_value() >= before - CHECK);
            prop_assert!(tableau.objective_value() <= CHECK);
        }
    }

    /// A phase that stops for lack of an entering column has no negative
    /// objective row entry.
    #[test]
    fn termination_implies_optimality(problem in problem(6, 6, false)) {
        let mut tableau = Tableau::new(&problem).unwrap();

        for _ in 0..200 {
            let Some(column) = pivot::entering_column(&tableau, TOL) else {
                prop_assert!(tableau.is_optimal(TOL));
                break;
            };
            let Some(row) = pivot::leaving_row(&tableau, column, TieBreak::Lexicographic, TOL) else { break };
            tableau.pivot(row, column, TOL).unwrap();
        }
    }

    /// Optimal points are feasible and match the dual objective.
    #[test]
    fn optimal_points_are_feasible(problem in problem(8, 6, true)) {
        let solution = Solver::new()
            .with_tie_break(TieBreak::Lexicographic)
            .solve(&problem)
            .unwrap();

        if solution.status == SolutionStatus::Optimal {
            prop_assert_eq!(solution.values.len(), problem.num_variables());
            prop_assert!(problem.max_violation(&solution.values) <= CHECK);
            prop_assert!((problem.evaluate(&solution.values) - solution.objective_value).abs() <= CHECK);

            let shadow_prices = &solution.analysis.shadow_prices;
            prop_assert!(shadow_prices.iter().all(|&y| y >= -CHECK));
            prop_assert!((dual_objective(&problem, shadow_prices) - solution.objective_value).abs() <= CHECK);
        }
    }

    /// Anti-cycling rules finish well inside a fixed bound on up to twenty
    /// constraints, and agree with each other.
    #[test]
    fn anti_cycling_rules_terminate(problem in problem(20, 8, true)) {
        let lexicographic = Solver::new()
            .with_tie_break(TieBreak::Lexicographic)
            .with_max_iterations(2_000)
            .solve(&problem)
            .unwrap();
        let perturbation = Solver::new()
            .with_tie_break(TieBreak::Perturbation)
            .with_max_iterations(2_000)
            .solve(&problem)
            .unwrap();

        prop_assert_ne!(lexicographic.status, SolutionStatus::IterationLimitExceeded);
        prop_assert_eq!(lexicographic.status, perturbation.status);
        if lexicographic.status == SolutionStatus::Optimal {
            prop_assert!((lexicographic.objective_value - perturbation.objective_value).abs() <= CHECK);
        }
    }

    /// The default rule with stall recovery reaches the same outcome.
    #[test]
    fn stall_recovery_matches_lexicographic(problem in problem(8, 6, true)) {
        let recovered = Solver::new()
            .with_stall_limit(Some(25))
            .solve(&problem)
            .unwrap();
        let lexicographic = Solver::new()
            .with_tie_break(TieBreak::Lexicographic)
            .solve(&problem)
            .unwrap();

        prop_assert_eq!(recovered.status, lexicographic.status);
        if recovered.status == SolutionStatus::Optimal {
            prop_assert!((recovered.objective_value - lexicographic.objective_value).abs() <= CHECK);
        }
    }
}

#[test]
fn textbook_scenarios() {
    let solver = Solver::new();

    let optimal = LpProblem::new(
        vec![vec![1.0, 1.0], vec![2.0, 1.0]],
        vec![4.0, 6.0],
        vec![3.0, 2.0],
    );
    let solution = solver.solve(&optimal).unwrap();
    assert_eq!(solution.status, SolutionStatus::Optimal);
    assert!((solution.values[0] - 2.0).abs() < CHECK);
    assert!((solution.values[1] - 2.0).abs() < CHECK);
    assert!((solution.objective_value - 10.0).abs() < CHECK);

    let unbounded = LpProblem::new(vec![vec![1.0, -1.0]], vec![1.0], vec![1.0, 1.0]);
    assert_eq!(solver.solve(&unbounded).unwrap().status, SolutionStatus::Unbounded);

    let infeasible = LpProblem::new(
        vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        vec![-1.0, -1.0],
        vec![1.0, 1.0],
    );
    assert_eq!(solver.solve(&infeasible).unwrap().status, SolutionStatus::Infeasible);
}
