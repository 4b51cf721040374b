use crate::problem::LpProblem;
use crate::tableau::{Tableau, VariableKind};

/// The result of solving an LP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Optimal values for each structural variable
    pub values: Vec<f64>,
    /// Optimal objective value
    pub objective_value: f64,
    /// Iteration counters
    pub stats: SolveStats,
    /// Dual information at the optimum
    pub analysis: Analysis,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The objective grows without bound over the feasible region
    Unbounded,
    /// No nonnegative point satisfies the constraints
    Infeasible,
    /// A phase hit the configured iteration cap
    IterationLimitExceeded,
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "OPTIMAL"),
            SolutionStatus::Unbounded => write!(f, "UNBOUNDED"),
            SolutionStatus::Infeasible => write!(f, "INFEASIBLE"),
            SolutionStatus::IterationLimitExceeded => write!(f, "ITERATION LIMIT EXCEEDED"),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveStats {
    /// Pivots performed on the auxiliary problem
    pub phase_one_iterations: usize,
    /// Pivots performed on the true objective
    pub phase_two_iterations: usize,
    /// Optimal sum of artificial variables, when phase one ran
    pub auxiliary_value: Option<f64>,
    /// Pivots with a zero step length
    pub degenerate_pivots: usize,
    /// Whether a degenerate stall forced a switch to the lexicographic rule
    pub stall_recovered: bool,
}

impl SolveStats {
    pub fn total_iterations(&self) -> usize {
        self.phase_one_iterations + self.phase_two_iterations
    }
}

/// Dual information read from the optimal tableau
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    /// Shadow price (dual value) of each constraint.
    /// How much the objective improves per unit of extra right-hand side.
    pub shadow_prices: Vec<f64>,

    /// Reduced cost of each structural variable
    pub reduced_costs: Vec<ReducedCost>,

    /// Indices of constraints that hold with equality at the optimum
    pub binding_constraints: Vec<usize>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedCost {
    /// Variable name
    pub variable: String,
    /// Current value in solution
    pub value: f64,
    /// How much the objective coefficient must grow before the variable enters
    pub reduced_cost: f64,
    /// Is this variable in the basis?
    pub is_basic: bool,
}

impl Solution {
    pub fn unbounded(stats: SolveStats) -> Self {
        Self::terminal(SolutionStatus::Unbounded, f64::INFINITY, stats)
    }

    pub fn infeasible(stats: SolveStats) -> Self {
        Self::terminal(SolutionStatus::Infeasible, f64::NEG_INFINITY, stats)
    }

    pub fn iteration_limit(stats: SolveStats) -> Self {
        Self::terminal(SolutionStatus::IterationLimitExceeded, f64::NAN, stats)
    }

    fn terminal(status: SolutionStatus, objective_value: f64, stats: SolveStats) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective_value,
            stats,
            analysis: Analysis::default(),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Read the optimal point, objective value, and duals out of a terminal
    /// phase two tableau.
    pub fn extract(tableau: &Tableau, problem: &LpProblem, tolerance: f64, stats: SolveStats) -> Self {
        let n = problem.num_variables();
        let m = problem.num_constraints();
        let snap = |v: f64| if v.abs() < tolerance { 0.0 } else { v };

        let mut values = vec![0.0; n];
        let mut slacks = vec![0.0; m];
        for (row, &column) in tableau.basis().iter().enumerate() {
            match tableau.variable_kind(column) {
                VariableKind::Structural(j) => values[j] = snap(tableau.rhs(row)),
                VariableKind::Slack(i) => slacks[i] = snap(tableau.rhs(row)),
                VariableKind::Artificial(_) => {}
            }
        }

        let shadow_prices = (0..m).map(|i| snap(tableau.objective_entry(n + i))).collect();
        let binding_constraints = (0..m).filter(|&i| slacks[i] <= tolerance).collect();
        let reduced_costs = (0..n)
            .map(|j| {
                let is_basic = tableau.is_basic(j);
                ReducedCost {
                    variable: problem.variables[j].clone(),
                    value: values[j],
                    reduced_cost: if is_basic { 0.0 } else { snap(tableau.objective_entry(j)) },
                    is_basic,
                }
            })
            .collect();

        Self {
            status: SolutionStatus::Optimal,
            values,
            objective_value: snap(tableau.objective_value()),
            stats,
            analysis: Analysis {
                shadow_prices,
                reduced_costs,
                binding_constraints,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_extract_after_pivots() {
        let problem = LpProblem::new(
            vec![vec![1.0, 1.0], vec![2.0, 1.0]],
            vec![4.0, 6.0],
            vec![3.0, 2.0],
        );
        let mut tableau = Tableau::new(&problem).unwrap();
        tableau.pivot(1, 0, TOL).unwrap();
        tableau.pivot(0, 1, TOL).unwrap();

        let solution = Solution::extract(&tableau, &problem, TOL, SolveStats::default());
        assert!(solution.is_optimal());
        assert!((solution.values[0] - 2.0).abs() < 1e-9);
        assert!((solution.values[1] - 2.0).abs() < 1e-9);
        assert!((solution.objective_value - 10.0).abs() < 1e-9);
        assert!((solution.analysis.shadow_prices[0] - 1.0).abs() < 1e-9);
        assert!((solution.analysis.shadow_prices[1] - 1.0).abs() < 1e-9);
        assert_eq!(solution.analysis.binding_constraints, vec![0, 1]);
        assert!(solution.analysis.reduced_costs.iter().all(|rc| rc.is_basic));
    }

    #[test]
    fn test_terminal_constructors() {
        let unbounded = Solution::unbounded(SolveStats::default());
        assert_eq!(unbounded.status, SolutionStatus::Unbounded);
        assert!(unbounded.values.is_empty());
        assert_eq!(unbounded.objective_value, f64::INFINITY);

        let infeasible = Solution::infeasible(SolveStats::default());
        assert_eq!(infeasible.status, SolutionStatus::Infeasible);
        assert!(!infeasible.is_optimal());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SolutionStatus::Optimal.to_string(), "OPTIMAL");
        assert_eq!(
            SolutionStatus::IterationLimitExceeded.to_string(),
            "ITERATION LIMIT EXCEEDED"
        );
    }
}
