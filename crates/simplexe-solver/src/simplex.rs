use tracing::{debug, trace, warn};

use crate::config::{SolverConfig, TieBreak};
use crate::error::SolveError;
use crate::pivot;
use crate::problem::LpProblem;
use crate::solution::{Solution, SolveStats};
use crate::tableau::{Tableau, VariableKind};

/// Scale of the right-hand side perturbation used by `TieBreak::Perturbation`.
const PERTURBATION: f64 = 1e-7;

/// Two-phase simplex solver for `maximize c·x s.t. Ax <= b, x >= 0`
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

/// Outcome of phase one on the auxiliary problem
#[derive(Debug, Clone)]
pub enum PhaseOneOutcome {
    /// Artificials driven to zero; `tableau` carries a feasible basis and the
    /// true objective, ready for phase two.
    Feasible {
        tableau: Tableau,
        auxiliary_value: f64,
        iterations: usize,
    },
    /// The minimal sum of artificials is positive
    Infeasible {
        auxiliary_value: f64,
        iterations: usize,
    },
    IterationLimitExceeded { iterations: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    One,
    Two,
}

enum PhaseEnd {
    Optimal,
    Unbounded { column: usize },
    IterationLimit,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.config.tolerance = tol;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.config.tie_break = tie_break;
        self
    }

    pub fn with_stall_limit(mut self, limit: Option<usize>) -> Self {
        self.config.stall_limit = limit;
        self
    }

    /// Solve the LP problem using the two-phase simplex method
    pub fn solve(&self, problem: &LpProblem) -> Result<Solution, SolveError> {
        self.config.validate()?;
        problem.validate()?;

        let mut stats = SolveStats::default();

        // The slack basis is feasible when no right-hand side is negative.
        let mut tableau = if problem.rhs.iter().all(|&b| b >= 0.0) {
            debug!("slack basis is feasible, skipping phase one");
            Tableau::new(problem)?
        } else {
            match self.run_phase_one(problem, &mut stats)? {
                PhaseOneOutcome::Feasible { tableau, .. } => tableau,
                PhaseOneOutcome::Infeasible { .. } => return Ok(Solution::infeasible(stats)),
                PhaseOneOutcome::IterationLimitExceeded { .. } => {
                    return Ok(Solution::iteration_limit(stats));
                }
            }
        };

        match self.iterate(&mut tableau, Phase::Two, &mut stats)? {
            PhaseEnd::Optimal => {}
            PhaseEnd::Unbounded { column } => {
                debug!(variable = %tableau.variable_name(column), "program is unbounded");
                return Ok(Solution::unbounded(stats));
            }
            PhaseEnd::IterationLimit => return Ok(Solution::iteration_limit(stats)),
        }

        let solution = Solution::extract(&tableau, problem, self.config.tolerance, stats);
        debug!(
            objective = solution.objective_value,
            iterations = solution.stats.total_iterations(),
            "optimal solution found"
        );
        Ok(solution)
    }

    /// Run phase one on its own, regardless of the signs of `b`.
    pub fn phase_one(&self, problem: &LpProblem) -> Result<PhaseOneOutcome, SolveError> {
        self.config.validate()?;
        problem.validate()?;
        self.run_phase_one(problem, &mut SolveStats::default())
    }

    fn run_phase_one(&self, problem: &LpProblem, stats: &mut SolveStats) -> Result<PhaseOneOutcome, SolveError> {
        let tol = self.config.tolerance;
        let mut tableau = Tableau::auxiliary(problem)?;
        debug!(
            artificials = tableau.num_artificial(),
            "phase one: minimizing the sum of artificial variables"
        );

        match self.iterate(&mut tableau, Phase::One, stats)? {
            PhaseEnd::Optimal => {}
            // The auxiliary objective is bounded by zero.
            PhaseEnd::Unbounded { column } => return Err(SolveError::AuxiliaryUnbounded { column }),
            PhaseEnd::IterationLimit => {
                return Ok(PhaseOneOutcome::IterationLimitExceeded {
                    iterations: stats.phase_one_iterations,
                });
            }
        }

        let iterations = stats.phase_one_iterations;
        let sum = -tableau.objective_value();
        let auxiliary_value = if sum.abs() <= tol { 0.0 } else { sum };
        stats.auxiliary_value = Some(auxiliary_value);

        if auxiliary_value > tol {
            debug!(auxiliary_value, "phase one: program is infeasible");
            return Ok(PhaseOneOutcome::Infeasible {
                auxiliary_value,
                iterations,
            });
        }

        self.drive_out_artificials(&mut tableau, stats)?;
        tableau.drop_artificial_columns();
        tableau.set_objective(&problem.objective);
        debug!(iterations, "phase one: feasible basis found");

        Ok(PhaseOneOutcome::Feasible {
            tableau,
            auxiliary_value,
            iterations,
        })
    }

    /// Replace every artificial still basic at value zero by the
    /// non-artificial column with the largest entry in its row.
    fn drive_out_artificials(&self, tableau: &mut Tableau, stats: &mut SolveStats) -> Result<(), SolveError> {
        let tol = self.config.tolerance;
        let art_start = tableau.num_columns() - tableau.num_artificial();

        for row in 0..tableau.num_constraints() {
            let basic = tableau.basis()[row];
            if !matches!(tableau.variable_kind(basic), VariableKind::Artificial(_)) {
                continue;
            }

            let column = (0..art_start)
                .filter(|&j| tableau.entry(row, j).abs() > tol)
                .max_by(|&a, &b| tableau.entry(row, a).abs().total_cmp(&tableau.entry(row, b).abs()))
                .ok_or(SolveError::ArtificialStuck { row })?;

            debug!(
                leaving = %tableau.variable_name(basic),
                entering = %tableau.variable_name(column),
                "phase one: degenerate pivot on artificial"
            );
            tableau.pivot(row, column, tol)?;
            stats.degenerate_pivots += 1;
        }

        Ok(())
    }

    /// Pivot until optimal, unbounded, or out of iterations.
    fn iterate(&self, tableau: &mut Tableau, phase: Phase, stats: &mut SolveStats) -> Result<PhaseEnd, SolveError> {
        let tol = self.config.tolerance;
        let mut rule = self.config.tie_break;
        let mut iterations = 0;
        let mut stalled = 0;

        tableau.reset_reference();
        if rule == TieBreak::Perturbation {
            tableau.perturb(PERTURBATION);
        }

        let end = loop {
            let Some(column) = pivot::entering_column(tableau, tol) else {
                break PhaseEnd::Optimal;
            };
            if iterations >= self.config.max_iterations {
                warn!(?phase, iterations, "iteration limit reached");
                break PhaseEnd::IterationLimit;
            }
            let Some(row) = pivot::leaving_row(tableau, column, rule, tol) else {
                break PhaseEnd::Unbounded { column };
            };

            let step = pivot::step_length(tableau, row, column);
            if pivot::is_degenerate(step, tol) {
                stalled += 1;
                stats.degenerate_pivots += 1;
            } else {
                stalled = 0;
            }

            trace!(
                ?phase,
                iteration = iterations,
                entering = %tableau.variable_name(column),
                leaving = %tableau.variable_name(tableau.basis()[row]),
                step,
                "pivot"
            );
            tableau.pivot(row, column, tol)?;
            trace!("dictionary after pivot:\n{}", tableau.dictionary());
            iterations += 1;

            if rule == TieBreak::LowestIndex
                && self.config.stall_limit.is_some_and(|limit| stalled >= limit)
            {
                warn!(
                    ?phase,
                    stalled, "degenerate stall, switching to the lexicographic rule"
                );
                rule = TieBreak::Lexicographic;
                tableau.reset_reference();
                stats.stall_recovered = true;
            }
        };

        tableau.clear_perturbation();
        match phase {
            Phase::One => stats.phase_one_iterations += iterations,
            Phase::Two => stats.phase_two_iterations += iterations,
        }
        Ok(end)
    }
}
