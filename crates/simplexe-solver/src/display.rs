use std::fmt;

use crate::tableau::Tableau;

/// Dictionary view of a tableau: every basic variable and the objective
/// written in terms of the nonbasic variables.
///
/// ```text
/// s1 = 4 - x1 - x2
/// s2 = 6 - 2 x1 - x2
/// z = 0 + 3 x1 + 2 x2
/// ```
pub struct Dictionary<'a> {
    tableau: &'a Tableau,
}

impl Tableau {
    pub fn dictionary(&self) -> Dictionary<'_> {
        Dictionary { tableau: self }
    }
}

impl fmt::Display for Dictionary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tableau = self.tableau;
        let nonbasic = tableau.nonbasic();

        for (row, &basic) in tableau.basis().iter().enumerate() {
            write!(f, "{} = {}", tableau.variable_name(basic), number(tableau.rhs(row)))?;
            for &j in &nonbasic {
                write_term(f, -tableau.entry(row, j), &tableau.variable_name(j))?;
            }
            writeln!(f)?;
        }

        let objective = if tableau.num_artificial() > 0 { "w" } else { "z" };
        write!(f, "{} = {}", objective, number(tableau.objective_value()))?;
        for &j in &nonbasic {
            write_term(f, -tableau.objective_entry(j), &tableau.variable_name(j))?;
        }
        writeln!(f)
    }
}

fn write_term(f: &mut fmt::Formatter<'_>, coefficient: f64, name: &str) -> fmt::Result {
    if coefficient.abs() < 1e-12 {
        return Ok(());
    }
    let sign = if coefficient < 0.0 { '-' } else { '+' };
    let magnitude = coefficient.abs();
    if (magnitude - 1.0).abs() < 1e-12 {
        write!(f, " {} {}", sign, name)
    } else {
        write!(f, " {} {} {}", sign, number(magnitude), name)
    }
}

/// Integers without a fraction, everything else to four decimals with
/// trailing zeros trimmed.
pub(crate) fn number(value: f64) -> String {
    let value = value + 0.0;
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() + 0.0)
    } else {
        let text = format!("{:.4}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
