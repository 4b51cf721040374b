mod config;
mod display;
mod error;
pub mod pivot;
mod problem;
mod simplex;
mod solution;
mod tableau;

pub use config::{SolverConfig, TieBreak};
pub use display::Dictionary;
pub use error::SolveError;
pub use problem::LpProblem;
pub use simplex::{PhaseOneOutcome, Solver};
pub use solution::{Analysis, ReducedCost, Solution, SolutionStatus, SolveStats};
pub use tableau::{Tableau, VariableKind};
