use thiserror::Error;

/// Errors raised before or during a solve that are not LP outcomes.
///
/// Unbounded and infeasible programs are reported through
/// [`SolutionStatus`](crate::SolutionStatus); these variants cover malformed
/// input, invalid configuration, and internal consistency failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Dimension mismatch in {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Constraint row {row} has {found} coefficients, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Non-finite value in {what} at index {index}")]
    NonFinite { what: &'static str, index: usize },
    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),
    #[error("Pivot element at row {row}, column {column} is zero")]
    SingularPivot { row: usize, column: usize },
    #[error("Auxiliary problem reported unbounded on column {column}")]
    AuxiliaryUnbounded { column: usize },
    #[error("Artificial variable in row {row} cannot be pivoted out of the basis")]
    ArtificialStuck { row: usize },
}
