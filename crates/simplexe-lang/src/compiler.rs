use std::collections::{HashMap, HashSet};

use simplexe_solver::{LpProblem, ReducedCost, Solution};
use thiserror::Error;

use crate::ast::*;
use crate::parser::{ParseError, Parser};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Duplicate constraint name: {0}")]
    DuplicateConstraint(String),
    #[error("Objective has no terms")]
    EmptyObjective,
    #[error("Coefficient of {variable} is not finite")]
    NonFiniteCoefficient { variable: String },
    #[error("Right-hand side of constraint {0} is not finite")]
    NonFiniteRhs(String),
}

/// A program lowered to `maximize cᵗx s.t. Ax <= b, x >= 0`
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledProgram {
    pub sense: Sense,
    pub problem: LpProblem,
    /// One name per row of `problem`, `c<k>` for unnamed constraints where
    /// `k` is the position in the source
    pub constraint_names: Vec<String>,
    /// `1.0` for rows written with `<=`, `-1.0` for rows negated from `>=`
    pub row_signs: Vec<f64>,
    /// Sign constraints `x >= 0` dropped as implied by the standard form
    pub dropped_bounds: usize,
}

impl CompiledProgram {
    /// The objective value in the program's own sense
    pub fn objective_value(&self, solution: &Solution) -> f64 {
        self.orient(solution.objective_value)
    }

    /// Shadow prices of the source constraints, in the program's own sense
    /// and relation direction.
    pub fn shadow_prices(&self, solution: &Solution) -> Vec<f64> {
        solution
            .analysis
            .shadow_prices
            .iter()
            .zip(&self.row_signs)
            .map(|(y, sign)| self.orient(y * sign) + 0.0)
            .collect()
    }

    /// Reduced costs `c_j - yᵀA_j` in the program's own sense: the change in
    /// the objective per unit of a nonbasic variable forced into the solution.
    /// Basic variables report zero.
    pub fn reduced_costs(&self, solution: &Solution) -> Vec<ReducedCost> {
        solution
            .analysis
            .reduced_costs
            .iter()
            .map(|rc| ReducedCost {
                reduced_cost: self.orient(-rc.reduced_cost) + 0.0,
                ..rc.clone()
            })
            .collect()
    }

    fn orient(&self, value: f64) -> f64 {
        match self.sense {
            Sense::Maximize => value,
            Sense::Minimize => -value,
        }
    }
}

/// Parse and compile program text in one step
pub fn compile_source(source: &str) -> Result<CompiledProgram, CompileError> {
    let program = Parser::parse(source)?;
    compile(&program)
}

pub fn compile(program: &Program) -> Result<CompiledProgram, CompileError> {
    if program.objective.expr.is_empty() {
        return Err(CompileError::EmptyObjective);
    }

    let variables = program.variables();
    let index: HashMap<&str, usize> = variables
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let dense = |expr: &LinearExpr| -> Result<Vec<f64>, CompileError> {
        let mut row = vec![0.0; variables.len()];
        for term in &expr.terms {
            if !term.coefficient.is_finite() {
                return Err(CompileError::NonFiniteCoefficient {
                    variable: term.variable.clone(),
                });
            }
            // every name was collected by Program::variables
            if let Some(&j) = index.get(term.variable.as_str()) {
                row[j] += term.coefficient;
            }
        }
        Ok(row)
    };

    let mut objective = dense(&program.objective.expr)?;
    if program.objective.sense == Sense::Minimize {
        objective.iter_mut().for_each(|c| *c = -*c);
    }

    let mut seen = HashSet::new();
    let mut constraints: Vec<Vec<f64>> = Vec::new();
    let mut rhs = Vec::new();
    let mut constraint_names = Vec::new();
    let mut row_signs = Vec::new();
    let mut dropped_bounds = 0;

    for (i, constraint) in program.constraints.iter().enumerate() {
        let name = constraint.name.clone().unwrap_or_else(|| format!("c{}", i + 1));
        if constraint.name.is_some() && !seen.insert(name.clone()) {
            return Err(CompileError::DuplicateConstraint(name));
        }
        if !constraint.rhs.is_finite() {
            return Err(CompileError::NonFiniteRhs(name));
        }
        if constraint.is_sign_constraint() {
            dropped_bounds += 1;
            continue;
        }

        let sign = match constraint.relation {
            Relation::Le => 1.0,
            Relation::Ge => -1.0,
        };
        let row = dense(&constraint.lhs)?;
        constraints.push(row.into_iter().map(|a| sign * a + 0.0).collect());
        rhs.push(sign * constraint.rhs + 0.0);
        constraint_names.push(name);
        row_signs.push(sign);
    }

    Ok(CompiledProgram {
        sense: program.objective.sense,
        problem: LpProblem::new(constraints, rhs, objective).with_variables(variables),
        constraint_names,
        row_signs,
        dropped_bounds,
    })
}
