use crate::error::SolveError;

/// A linear program in standard form:
/// maximize `objective · x` subject to `constraints · x <= rhs`, `x >= 0`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Variable names (used for rendering only)
    pub variables: Vec<String>,
    /// Constraint matrix A, one row per constraint
    pub constraints: Vec<Vec<f64>>,
    /// Right-hand side b
    pub rhs: Vec<f64>,
    /// Objective coefficients c
    pub objective: Vec<f64>,
}

impl LpProblem {
    pub fn new(constraints: Vec<Vec<f64>>, rhs: Vec<f64>, objective: Vec<f64>) -> Self {
        let variables = (1..=objective.len()).map(|j| format!("x{}", j)).collect();
        Self {
            variables,
            constraints,
            rhs,
            objective,
        }
    }

    pub fn with_variables(mut self, variables: Vec<String>) -> Self {
        self.variables = variables;
        self
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Reject inputs that cannot describe a program before any tableau is built.
    pub fn validate(&self) -> Result<(), SolveError> {
        let n = self.num_variables();
        let m = self.num_constraints();

        if self.rhs.len() != m {
            return Err(SolveError::DimensionMismatch {
                what: "right-hand side",
                expected: m,
                found: self.rhs.len(),
            });
        }
        if self.variables.len() != n {
            return Err(SolveError::DimensionMismatch {
                what: "variable names",
                expected: n,
                found: self.variables.len(),
            });
        }

        for (i, row) in self.constraints.iter().enumerate() {
            if row.len() != n {
                return Err(SolveError::RaggedRow {
                    row: i,
                    expected: n,
                    found: row.len(),
                });
            }
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(SolveError::NonFinite {
                    what: "constraint matrix",
                    index: i * n + j,
                });
            }
        }
        if let Some(i) = self.rhs.iter().position(|v| !v.is_finite()) {
            return Err(SolveError::NonFinite {
                what: "right-hand side",
                index: i,
            });
        }
        if let Some(j) = self.objective.iter().position(|v| !v.is_finite()) {
            return Err(SolveError::NonFinite {
                what: "objective",
                index: j,
            });
        }

        Ok(())
    }

    /// Objective value `c · x`.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.objective.iter().zip(values).map(|(c, x)| c * x).sum()
    }

    /// Largest amount by which `values` violates `Ax <= b` or `x >= 0`.
    /// Zero for a feasible point.
    pub fn max_violation(&self, values: &[f64]) -> f64 {
        let rows = self.constraints.iter().zip(&self.rhs).map(|(row, b)| {
            let lhs: f64 = row.iter().zip(values).map(|(a, x)| a * x).sum();
            lhs - b
        });
        let signs = values.iter().map(|x| -x);
        rows.chain(signs).fold(0.0, f64::max)
    }
}
