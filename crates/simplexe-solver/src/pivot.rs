use std::cmp::Ordering;

use crate::config::TieBreak;
use crate::tableau::Tableau;

/// Entering column by Dantzig's rule: the most negative objective row
/// entry, lowest column on ties. `None` when the tableau is optimal.
pub fn entering_column(tableau: &Tableau, tolerance: f64) -> Option<usize> {
    let mut best = -tolerance;
    let mut column = None;

    for j in 0..tableau.num_columns() {
        let value = tableau.objective_entry(j);
        if value < best {
            best = value;
            column = Some(j);
        }
    }

    column
}

/// Leaving row by the minimum-ratio test over rows with a positive entry in
/// `column`. `None` means the program is unbounded along `column`.
///
/// Rows whose ratio lies within `tolerance` of the minimum are tied and
/// resolved by `rule`. `TieBreak::LowestIndex` can cycle.
pub fn leaving_row(tableau: &Tableau, column: usize, rule: TieBreak, tolerance: f64) -> Option<usize> {
    let candidates: Vec<(usize, f64)> = (0..tableau.num_constraints())
        .filter_map(|i| {
            let entry = tableau.entry(i, column);
            (entry > tolerance).then(|| (i, tableau.rhs(i) / entry))
        })
        .collect();

    let min_ratio = candidates
        .iter()
        .map(|&(_, ratio)| ratio)
        .fold(f64::INFINITY, f64::min);

    let mut tied = candidates
        .into_iter()
        .filter(|&(_, ratio)| ratio <= min_ratio + tolerance)
        .map(|(i, _)| i);

    match rule {
        TieBreak::LowestIndex => tied.next(),
        TieBreak::Lexicographic => tied.min_by(|&a, &b| {
            lexicographic_cmp(tableau, a, b, column, tolerance).then(a.cmp(&b))
        }),
        TieBreak::Perturbation if tableau.is_perturbed() => tied.min_by(|&a, &b| {
            let ra = tableau.perturbed_rhs(a) / tableau.entry(a, column);
            let rb = tableau.perturbed_rhs(b) / tableau.entry(b, column);
            ra.total_cmp(&rb).then(a.cmp(&b))
        }),
        TieBreak::Perturbation => tied.next(),
    }
}

/// Compare rows `a` and `b` scaled by their entries in `column`, right-hand
/// side first, then the columns of the phase's reference basis.
fn lexicographic_cmp(tableau: &Tableau, a: usize, b: usize, column: usize, tolerance: f64) -> Ordering {
    let pa = tableau.entry(a, column);
    let pb = tableau.entry(b, column);

    let rhs = (tableau.rhs(a) / pa, tableau.rhs(b) / pb);
    let block = tableau
        .reference_basis()
        .iter()
        .map(|&j| (tableau.entry(a, j) / pa, tableau.entry(b, j) / pb));

    std::iter::once(rhs)
        .chain(block)
        .find(|(x, y)| (x - y).abs() > tolerance)
        .map(|(x, y)| x.total_cmp(&y))
        .unwrap_or(Ordering::Equal)
}

/// Ratio of the pivot row, i.e. the step length of the pivot.
pub fn step_length(tableau: &Tableau, row: usize, column: usize) -> f64 {
    tableau.rhs(row) / tableau.entry(row, column)
}

/// A pivot that leaves the objective unchanged.
pub fn is_degenerate(step: f64, tolerance: f64) -> bool {
    step.abs() <= tolerance
}
