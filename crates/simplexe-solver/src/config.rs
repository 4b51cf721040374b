use crate::error::SolveError;

/// How the ratio test breaks ties between rows with the same minimum ratio.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Pick the lowest row index. Can cycle on degenerate tableaus.
    #[default]
    LowestIndex,
    /// Pick the lexicographically smallest scaled row. Always terminates.
    Lexicographic,
    /// Break ties through a small decreasing perturbation of the right-hand side.
    Perturbation,
}

impl TieBreak {
    /// Whether the rule guarantees termination on its own.
    pub fn terminates(self) -> bool {
        !matches!(self, TieBreak::LowestIndex)
    }
}

impl std::fmt::Display for TieBreak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TieBreak::LowestIndex => write!(f, "lowest-index"),
            TieBreak::Lexicographic => write!(f, "lexicographic"),
            TieBreak::Perturbation => write!(f, "perturbation"),
        }
    }
}

/// Knobs threaded through both phases of a solve.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Leaving-row tie-break rule
    pub tie_break: TieBreak,
    /// Maximum pivots per phase
    pub max_iterations: usize,
    /// Tolerance for every comparison against zero or one
    pub tolerance: f64,
    /// Consecutive degenerate pivots tolerated under `LowestIndex` before
    /// the phase switches to the lexicographic rule. `None` never switches.
    pub stall_limit: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::LowestIndex,
            max_iterations: 10_000,
            tolerance: 1e-9,
            stall_limit: None,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), SolveError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(SolveError::InvalidConfig(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(SolveError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.stall_limit == Some(0) {
            return Err(SolveError::InvalidConfig(
                "stall_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
