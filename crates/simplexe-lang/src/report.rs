use simplexe_solver::{Solution, SolutionStatus, SolveStats};

use crate::compiler::CompiledProgram;

/// A solution restated in the terms of the source program: its own
/// objective sense, constraint names and relation directions.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub status: SolutionStatus,
    pub objective_value: f64,
    /// Empty unless the status is optimal
    pub variables: Vec<VariableReport>,
    /// Empty unless the status is optimal
    pub constraints: Vec<ConstraintReport>,
    pub stats: SolveStats,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableReport {
    pub name: String,
    pub value: f64,
    pub reduced_cost: f64,
    pub is_basic: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintReport {
    pub name: String,
    pub shadow_price: f64,
    pub binding: bool,
}

impl CompiledProgram {
    pub fn report(&self, solution: &Solution) -> Report {
        let variables = self
            .reduced_costs(solution)
            .into_iter()
            .map(|rc| VariableReport {
                name: rc.variable,
                value: rc.value,
                reduced_cost: rc.reduced_cost,
                is_basic: rc.is_basic,
            })
            .collect();

        let constraints = self
            .constraint_names
            .iter()
            .zip(self.shadow_prices(solution))
            .enumerate()
            .map(|(i, (name, shadow_price))| ConstraintReport {
                name: name.clone(),
                shadow_price,
                binding: solution.analysis.binding_constraints.contains(&i),
            })
            .collect();

        Report {
            status: solution.status,
            objective_value: self.objective_value(solution),
            variables,
            constraints,
            stats: solution.stats.clone(),
        }
    }
}
