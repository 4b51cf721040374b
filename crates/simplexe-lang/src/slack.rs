use std::fmt;

use crate::ast::{LinearExpr, Program, Relation};

/// A constraint rewritten as an equality by adding (`<=`) or subtracting
/// (`>=`) a nonnegative slack variable.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Equality {
    pub name: Option<String>,
    pub lhs: LinearExpr,
    pub slack: String,
    /// `1.0` for a `<=` row, `-1.0` for a `>=` row
    pub slack_sign: f64,
    pub rhs: f64,
}

/// One equality per constraint, with slacks named `s1, s2, ...` in
/// constraint order. Sign constraints `x >= 0` are implied by the standard
/// form and get no slack, so the names match the solver's tableau columns.
pub fn introduce_slack(program: &Program) -> Vec<Equality> {
    program
        .constraints
        .iter()
        .filter(|constraint| !constraint.is_sign_constraint())
        .enumerate()
        .map(|(i, constraint)| Equality {
            name: constraint.name.clone(),
            lhs: constraint.lhs.clone(),
            slack: format!("s{}", i + 1),
            slack_sign: match constraint.relation {
                Relation::Le => 1.0,
                Relation::Ge => -1.0,
            },
            rhs: constraint.rhs,
        })
        .collect()
}

impl fmt::Display for Equality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{}: ", name)?;
        }
        let sign = if self.slack_sign < 0.0 { '-' } else { '+' };
        write!(f, "{} {} {} = {}", self.lhs, sign, self.slack, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;

    #[test]
    fn test_introduce_slack() {
        let program = Parser::parse(
            "maximize 3 x1 + 2 x2\nsubject to\n  x1 + x2 <= 4\n  cover: 2 x1 - x2 >= -1",
        )
        .unwrap();
        let rows: Vec<String> = introduce_slack(&program).iter().map(|e| e.to_string()).collect();
        assert_eq!(rows, vec!["x1 + x2 + s1 = 4", "cover: 2 x1 - x2 - s2 = -1"]);
    }

    #[test]
    fn test_sign_constraints_get_no_slack() {
        let program = Parser::parse("max x + y\nst\n  x >= 0\n  x + y <= 4\n  y >= 0\n  y <= 3").unwrap();
        let slacks: Vec<String> = introduce_slack(&program).into_iter().map(|e| e.slack).collect();
        assert_eq!(slacks, vec!["s1", "s2"]);

        let compiled = crate::compile(&program).unwrap();
        assert_eq!(compiled.problem.num_constraints(), slacks.len());
        let tableau = simplexe_solver::Tableau::new(&compiled.problem).unwrap();
        assert_eq!(tableau.variable_name(2), "s1");
        assert_eq!(tableau.variable_name(3), "s2");
    }

    #[test]
    fn test_no_constraints() {
        let program = Parser::parse("max x").unwrap();
        assert!(introduce_slack(&program).is_empty());
    }
}
