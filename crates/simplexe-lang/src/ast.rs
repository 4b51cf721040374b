use std::fmt;

use crate::lexer::Span;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub objective: ObjectiveDecl,
    pub constraints: Vec<ConstraintDecl>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveDecl {
    pub span: Span,
    pub sense: Sense,
    pub expr: LinearExpr,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDecl {
    pub span: Span,
    pub name: Option<String>,
    pub lhs: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `<=`
    Le,
    /// `>=`
    Ge,
}

/// A sum of `coefficient * variable` terms, in source order
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearExpr {
    pub terms: Vec<Term>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub span: Span,
    pub coefficient: f64,
    pub variable: String,
}

impl LinearExpr {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Variable names in order of first appearance
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.variable.as_str())
    }
}

impl ConstraintDecl {
    /// `x >= 0` for a single variable with a positive coefficient, which
    /// restates the implicit nonnegativity bound.
    pub fn is_sign_constraint(&self) -> bool {
        self.relation == Relation::Ge
            && self.rhs == 0.0
            && self.lhs.terms.len() == 1
            && self.lhs.terms[0].coefficient > 0.0
    }
}

impl Program {
    /// Variable names across the objective and all constraints, in order of
    /// first appearance.
    pub fn variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let exprs = std::iter::once(&self.objective.expr).chain(self.constraints.iter().map(|c| &c.lhs));
        for expr in exprs {
            for name in expr.variables() {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Maximize => write!(f, "maximize"),
            Sense::Minimize => write!(f, "minimize"),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Le => write!(f, "<="),
            Relation::Ge => write!(f, ">="),
        }
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, term) in self.terms.iter().enumerate() {
            let magnitude = term.coefficient.abs();
            let negative = term.coefficient.is_sign_negative();
            match (i, negative) {
                (0, true) => write!(f, "-")?,
                (0, false) => {}
                (_, true) => write!(f, " - ")?,
                (_, false) => write!(f, " + ")?,
            }
            if magnitude != 1.0 {
                write!(f, "{} ", magnitude)?;
            }
            write!(f, "{}", term.variable)?;
        }
        Ok(())
    }
}

impl fmt::Display for ConstraintDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{}: ", name)?;
        }
        write!(f, "{} {} {}", self.lhs, self.relation, self.rhs)
    }
}

/// Canonical source form; parsing it again yields the same program.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.objective.sense, self.objective.expr)?;
        if !self.constraints.is_empty() {
            writeln!(f, "subject to")?;
            for constraint in &self.constraints {
                writeln!(f, "  {}", constraint)?;
            }
        }
        Ok(())
    }
}
