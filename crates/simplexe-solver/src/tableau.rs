use crate::error::SolveError;
use crate::problem::LpProblem;

/// Role of a tableau column.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// Original decision variable `x_j`
    Structural(usize),
    /// Slack of constraint `i`
    Slack(usize),
    /// Phase one artificial of constraint `i`
    Artificial(usize),
}

/// Dense simplex tableau.
///
/// Columns are laid out as `[structural | slack | artificial | rhs]`; the
/// artificial block is only present during phase one. Rows `0..m` hold the
/// constraint equations, row `m` holds the negated reduced costs, so the
/// bottom-right cell accumulates the current objective value.
#[derive(Debug, Clone)]
pub struct Tableau {
    data: Vec<Vec<f64>>,
    basis: Vec<usize>,
    n_structural: usize,
    n_slack: usize,
    n_artificial: usize,
    names: Vec<String>,
    /// Basis the current phase started from; its columns seed the
    /// lexicographic ordering.
    reference: Vec<usize>,
    /// Right-hand side perturbation, carried through every pivot.
    perturbation: Option<Vec<f64>>,
}

impl Tableau {
    /// Tableau with the all-slack basis and the objective row set to `-c`.
    ///
    /// Legal for any `b`; with a negative entry the basis is infeasible and
    /// [`Tableau::is_feasible`] reports it. Malformed problems are rejected
    /// before anything is built.
    pub fn new(problem: &LpProblem) -> Result<Self, SolveError> {
        problem.validate()?;
        let n = problem.num_variables();
        let m = problem.num_constraints();
        let mut tableau = Self::empty(problem, 0);
        let rhs_col = n + m;

        for (i, (row, &b)) in problem.constraints.iter().zip(&problem.rhs).enumerate() {
            tableau.data[i][..n].copy_from_slice(row);
            tableau.data[i][n + i] = 1.0;
            tableau.data[i][rhs_col] = b;
            tableau.basis.push(n + i);
        }
        for (j, &c) in problem.objective.iter().enumerate() {
            tableau.data[m][j] = -c;
        }

        tableau.reference = tableau.basis.clone();
        Ok(tableau)
    }

    /// Phase one tableau: rows with a negative right-hand side are negated,
    /// one artificial per constraint forms the starting basis, and the
    /// objective maximizes the negated sum of artificials.
    pub fn auxiliary(problem: &LpProblem) -> Result<Self, SolveError> {
        problem.validate()?;
        let n = problem.num_variables();
        let m = problem.num_constraints();
        let mut tableau = Self::empty(problem, m);
        let art_start = n + m;
        let rhs_col = n + 2 * m;

        for (i, (row, &b)) in problem.constraints.iter().zip(&problem.rhs).enumerate() {
            let sign = if b < 0.0 { -1.0 } else { 1.0 };
            for (cell, &a) in tableau.data[i][..n].iter_mut().zip(row) {
                *cell = sign * a;
            }
            tableau.data[i][n + i] = sign;
            tableau.data[i][art_start + i] = 1.0;
            tableau.data[i][rhs_col] = sign * b;
            tableau.basis.push(art_start + i);
        }

        // Objective row is +1 on every artificial; subtracting each
        // constraint row prices the artificial basis out.
        for j in (0..=rhs_col).filter(|j| !(art_start..rhs_col).contains(j)) {
            let sum: f64 = (0..m).map(|i| tableau.data[i][j]).sum();
            tableau.data[m][j] = -sum;
        }

        tableau.reference = tableau.basis.clone();
        Ok(tableau)
    }

    fn empty(problem: &LpProblem, n_artificial: usize) -> Self {
        let n = problem.num_variables();
        let m = problem.num_constraints();
        Self {
            data: vec![vec![0.0; n + m + n_artificial + 1]; m + 1],
            basis: Vec::with_capacity(m),
            n_structural: n,
            n_slack: m,
            n_artificial,
            names: problem.variables.clone(),
            reference: Vec::new(),
            perturbation: None,
        }
    }

    pub fn num_constraints(&self) -> usize {
        self.basis.len()
    }

    pub fn num_structural(&self) -> usize {
        self.n_structural
    }

    pub fn num_artificial(&self) -> usize {
        self.n_artificial
    }

    /// Number of variable columns, excluding the right-hand side.
    pub fn num_columns(&self) -> usize {
        self.n_structural + self.n_slack + self.n_artificial
    }

    pub fn entry(&self, row: usize, column: usize) -> f64 {
        self.data[row][column]
    }

    pub fn rhs(&self, row: usize) -> f64 {
        self.data[row][self.num_columns()]
    }

    /// Right-hand side including the perturbation, when one is installed.
    pub fn perturbed_rhs(&self, row: usize) -> f64 {
        match &self.perturbation {
            Some(delta) => self.rhs(row) + delta[row],
            None => self.rhs(row),
        }
    }

    pub fn is_perturbed(&self) -> bool {
        self.perturbation.is_some()
    }

    /// Objective row entry (negated reduced cost) of a column.
    pub fn objective_entry(&self, column: usize) -> f64 {
        self.data[self.num_constraints()][column]
    }

    /// Current objective value of the phase.
    pub fn objective_value(&self) -> f64 {
        self.data[self.num_constraints()][self.num_columns()]
    }

    /// Basic column of each constraint row.
    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    pub fn reference_basis(&self) -> &[usize] {
        &self.reference
    }

    pub fn is_basic(&self, column: usize) -> bool {
        self.basis.contains(&column)
    }

    pub fn nonbasic(&self) -> Vec<usize> {
        (0..self.num_columns()).filter(|&j| !self.is_basic(j)).collect()
    }

    pub fn variable_kind(&self, column: usize) -> VariableKind {
        let slack_start = self.n_structural;
        let art_start = slack_start + self.n_slack;
        if column < slack_start {
            VariableKind::Structural(column)
        } else if column < art_start {
            VariableKind::Slack(column - slack_start)
        } else {
            VariableKind::Artificial(column - art_start)
        }
    }

    pub fn variable_name(&self, column: usize) -> String {
        match self.variable_kind(column) {
            VariableKind::Structural(j) => self.names[j].clone(),
            VariableKind::Slack(i) => format!("s{}", i + 1),
            VariableKind::Artificial(i) => format!("a{}", i + 1),
        }
    }

    /// Gauss-Jordan pivot: `column` enters the basis in place of the
    /// variable basic in `row`.
    pub fn pivot(&mut self, row: usize, column: usize, tolerance: f64) -> Result<(), SolveError> {
        let pivot = self.data[row][column];
        if pivot.abs() <= tolerance {
            return Err(SolveError::SingularPivot { row, column });
        }

        for value in self.data[row].iter_mut() {
            *value /= pivot;
        }
        let pivot_row = self.data[row].clone();
        let factors: Vec<f64> = self.data.iter().map(|r| r[column]).collect();

        for (i, current) in self.data.iter_mut().enumerate() {
            let factor = factors[i];
            if i == row || factor == 0.0 {
                continue;
            }
            for (value, &p) in current.iter_mut().zip(&pivot_row) {
                *value -= factor * p;
            }
            current[column] = 0.0;
        }
        self.data[row][column] = 1.0;

        if let Some(delta) = self.perturbation.as_mut() {
            delta[row] /= pivot;
            let scaled = delta[row];
            for (i, d) in delta.iter_mut().enumerate() {
                if i != row {
                    *d -= factors[i] * scaled;
                }
            }
        }

        self.basis[row] = column;
        Ok(())
    }

    /// No objective row entry is negative.
    pub fn is_optimal(&self, tolerance: f64) -> bool {
        (0..self.num_columns()).all(|j| self.objective_entry(j) >= -tolerance)
    }

    /// Every basic variable is nonnegative.
    pub fn is_feasible(&self, tolerance: f64) -> bool {
        (0..self.num_constraints()).all(|i| self.rhs(i) >= -tolerance)
    }

    /// Row in which `column` is the unit vector, if it is one.
    pub fn unit_row(&self, column: usize, tolerance: f64) -> Option<usize> {
        let m = self.num_constraints();
        let mut found = None;
        for i in 0..=m {
            let value = self.data[i][column];
            if (value - 1.0).abs() <= tolerance && i < m && found.is_none() {
                found = Some(i);
            } else if value.abs() > tolerance {
                return None;
            }
        }
        found
    }

    /// Basic columns form a permuted identity and match their rows.
    pub fn has_identity_basis(&self, tolerance: f64) -> bool {
        self.basis
            .iter()
            .enumerate()
            .all(|(i, &column)| self.unit_row(column, tolerance) == Some(i))
    }

    /// Record the current basis as the start of a phase.
    pub fn reset_reference(&mut self) {
        self.reference = self.basis.clone();
    }

    /// Install a perturbation `delta_i = epsilon * 2^-i` on the right-hand side.
    pub fn perturb(&mut self, epsilon: f64) {
        let delta = (0..self.num_constraints())
            .map(|i| epsilon * 0.5f64.powi(i as i32))
            .collect();
        self.perturbation = Some(delta);
    }

    pub fn clear_perturbation(&mut self) {
        self.perturbation = None;
    }

    /// Remove the artificial block once phase one has pivoted every
    /// artificial out of the basis.
    pub fn drop_artificial_columns(&mut self) {
        let start = self.n_structural + self.n_slack;
        let end = start + self.n_artificial;
        for row in self.data.iter_mut() {
            row.drain(start..end);
        }
        self.n_artificial = 0;
        self.reference.retain(|&column| column < start);
        self.perturbation = None;
    }

    /// Replace the objective row with `-c` expressed over the current basis.
    pub fn set_objective(&mut self, objective: &[f64]) {
        let m = self.num_constraints();
        let width = self.num_columns() + 1;
        let mut row = vec![0.0; width];
        for (cell, &c) in row.iter_mut().zip(objective) {
            *cell = -c;
        }

        for (i, &column) in self.basis.iter().enumerate() {
            let factor = row[column];
            if factor == 0.0 {
                continue;
            }
            for (value, &a) in row.iter_mut().zip(&self.data[i]) {
                *value -= factor * a;
            }
            row[column] = 0.0;
        }

        self.data[m] = row;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn sample() -> LpProblem {
        LpProblem::new(
            vec![vec![1.0, 1.0], vec![2.0, 1.0]],
            vec![4.0, 6.0],
            vec![3.0, 2.0],
        )
    }

    #[test]
    fn test_initial_layout() {
        let tableau = Tableau::new(&sample()).unwrap();
        assert_eq!(tableau.num_constraints(), 2);
        assert_eq!(tableau.num_columns(), 4);
        assert_eq!(tableau.basis(), &[2, 3]);
        assert_eq!(tableau.nonbasic(), vec![0, 1]);
        assert_eq!(tableau.objective_entry(0), -3.0);
        assert_eq!(tableau.objective_entry(1), -2.0);
        assert_eq!(tableau.rhs(1), 6.0);
        assert_eq!(tableau.objective_value(), 0.0);
        assert!(tableau.has_identity_basis(TOL));
        assert!(tableau.is_feasible(TOL));
        assert!(!tableau.is_optimal(TOL));
    }

    #[test]
    fn test_negative_rhs_is_infeasible_basis() {
        let problem = LpProblem::new(vec![vec![1.0, -1.0]], vec![-1.0], vec![1.0, 0.0]);
        let tableau = Tableau::new(&problem).unwrap();
        assert!(!tableau.is_feasible(TOL));
    }

    #[test]
    fn test_short_rhs_rejected() {
        let problem = LpProblem::new(vec![vec![1.0, 1.0], vec![2.0, 1.0]], vec![4.0], vec![3.0, 2.0]);
        let expected = SolveError::DimensionMismatch {
            what: "right-hand side",
            expected: 2,
            found: 1,
        };
        assert_eq!(Tableau::new(&problem).unwrap_err(), expected);
        assert_eq!(Tableau::auxiliary(&problem).unwrap_err(), expected);
    }

    #[test]
    fn test_ragged_row_rejected() {
        let problem = LpProblem::new(vec![vec![1.0]], vec![1.0], vec![1.0, 1.0]);
        let expected = SolveError::RaggedRow {
            row: 0,
            expected: 2,
            found: 1,
        };
        assert_eq!(Tableau::new(&problem).unwrap_err(), expected);
        assert_eq!(Tableau::auxiliary(&problem).unwrap_err(), expected);
    }

    #[test]
    fn test_pivot_produces_unit_column() {
        let mut tableau = Tableau::new(&sample()).unwrap();
        tableau.pivot(1, 0, TOL).unwrap();

        assert_eq!(tableau.basis(), &[2, 0]);
        assert_eq!(tableau.unit_row(0, TOL), Some(1));
        assert!(tableau.has_identity_basis(TOL));
        assert!((tableau.rhs(0) - 1.0).abs() < TOL);
        assert!((tableau.rhs(1) - 3.0).abs() < TOL);
        assert!((tableau.objective_value() - 9.0).abs() < TOL);
        assert!((tableau.objective_entry(1) + 0.5).abs() < TOL);
    }

    #[test]
    fn test_singular_pivot_rejected() {
        let problem = LpProblem::new(vec![vec![0.0, 1.0]], vec![1.0], vec![1.0, 1.0]);
        let mut tableau = Tableau::new(&problem).unwrap();
        assert_eq!(
            tableau.pivot(0, 0, TOL),
            Err(SolveError::SingularPivot { row: 0, column: 0 })
        );
    }

    #[test]
    fn test_auxiliary_construction() {
        let problem = LpProblem::new(
            vec![vec![1.0, -1.0], vec![1.0, 1.0]],
            vec![-1.0, 5.0],
            vec![1.0, 0.0],
        );
        let tableau = Tableau::auxiliary(&problem).unwrap();

        assert_eq!(tableau.num_artificial(), 2);
        assert_eq!(tableau.basis(), &[4, 5]);
        assert_eq!(tableau.variable_kind(4), VariableKind::Artificial(0));
        // Row 0 negated: -x1 + x2 - s1 + a1 = 1
        assert_eq!(tableau.entry(0, 0), -1.0);
        assert_eq!(tableau.entry(0, 2), -1.0);
        assert_eq!(tableau.rhs(0), 1.0);
        assert!(tableau.is_feasible(TOL));
        assert!(tableau.has_identity_basis(TOL));
        // w = -(a1 + a2) = -6 at the start
        assert_eq!(tableau.objective_value(), -6.0);
        assert_eq!(tableau.objective_entry(4), 0.0);
        assert_eq!(tableau.objective_entry(0), 0.0);
        assert_eq!(tableau.objective_entry(1), -2.0);
        assert_eq!(tableau.objective_entry(2), 1.0);
    }

    #[test]
    fn test_drop_artificials_and_restore_objective() {
        let problem = LpProblem::new(vec![vec![1.0, -1.0]], vec![-1.0], vec![1.0, 0.0]);
        let mut tableau = Tableau::auxiliary(&problem).unwrap();
        // x2 enters, a1 leaves
        tableau.pivot(0, 1, TOL).unwrap();
        assert!(tableau.objective_value().abs() < TOL);

        tableau.drop_artificial_columns();
        tableau.set_objective(&problem.objective);

        assert_eq!(tableau.num_columns(), 3);
        assert_eq!(tableau.basis(), &[1]);
        assert!(tableau.has_identity_basis(TOL));
        assert_eq!(tableau.objective_entry(0), -1.0);
        assert_eq!(tableau.objective_entry(1), 0.0);
        assert_eq!(tableau.rhs(0), 1.0);
    }

    #[test]
    fn test_set_objective_prices_out_basis() {
        let mut tableau = Tableau::new(&sample()).unwrap();
        tableau.pivot(1, 0, TOL).unwrap();
        tableau.set_objective(&[3.0, 2.0]);
        assert_eq!(tableau.objective_entry(0), 0.0);
        assert!((tableau.objective_value() - 9.0).abs() < TOL);
    }

    #[test]
    fn test_perturbation_follows_pivots() {
        let mut tableau = Tableau::new(&sample()).unwrap();
        tableau.perturb(1e-3);
        assert!((tableau.perturbed_rhs(0) - 4.001).abs() < 1e-12);
        assert!((tableau.perturbed_rhs(1) - 6.0005).abs() < 1e-12);

        tableau.pivot(1, 0, TOL).unwrap();
        // row 1 scaled by 1/2, row 0 loses half of it
        assert!((tableau.perturbed_rhs(1) - 3.00025).abs() < 1e-12);
        assert!((tableau.perturbed_rhs(0) - 1.00075).abs() < 1e-12);
        assert!((tableau.rhs(0) - 1.0).abs() < 1e-12);

        tableau.clear_perturbation();
        assert!(!tableau.is_perturbed());
    }

    #[test]
    fn test_variable_names() {
        let tableau = Tableau::auxiliary(&sample()).unwrap();
        let names: Vec<_> = (0..tableau.num_columns())
            .map(|j| tableau.variable_name(j))
            .collect();
        assert_eq!(names, vec!["x1", "x2", "s1", "s2", "a1", "a2"]);
    }
}
