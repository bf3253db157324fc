use crate::basis::Basis;
use crate::simplex::SolveError;
use crate::tableau::Tableau;

/// Position of a pivot, 0-based into the constraint rows and variable columns
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pivot {
    pub row: usize,
    pub column: usize,
}

/// Rule for choosing the entering column and breaking ratio-test ties
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotRule {
    /// Most negative objective coefficient, lowest row on ratio ties
    #[default]
    Dantzig,
    /// Lowest-index negative objective coefficient, lowest basic variable
    /// on ratio ties. Cannot cycle.
    Bland,
}

/// One candidate row of the ratio test
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RatioEntry {
    pub row: usize,
    pub rhs: f64,
    pub coefficient: f64,
    pub ratio: f64,
}

/// Ratio test for an entering column over the rows with a positive coefficient
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RatioTest {
    pub column: usize,
    pub entries: Vec<RatioEntry>,
}

impl RatioTest {
    pub fn new(tableau: &Tableau, column: usize, tolerance: f64) -> Self {
        let entries = tableau
            .constraint_rows()
            .iter()
            .enumerate()
            .filter(|(_, r)| r[column] > tolerance)
            .map(|(row, r)| {
                let rhs = r[tableau.rhs_column()];
                RatioEntry {
                    row,
                    rhs,
                    coefficient: r[column],
                    ratio: rhs / r[column],
                }
            })
            .collect();

        Self { column, entries }
    }

    /// Row with the minimum strictly positive ratio, first row on ties.
    /// Falls back to the first zero ratio when no ratio is positive.
    pub fn leaving_row(&self, tolerance: f64) -> Option<usize> {
        self.leaving_row_by(tolerance, |entry| entry.row)
    }

    fn leaving_row_by(&self, tolerance: f64, rank: impl Fn(&RatioEntry) -> usize) -> Option<usize> {
        let mut best: Option<&RatioEntry> = None;
        for entry in self.entries.iter().filter(|e| e.ratio > 0.0) {
            best = match best {
                Some(b) if ratios_tie(entry.ratio, b.ratio, tolerance) => {
                    if rank(entry) < rank(b) {
                        Some(entry)
                    } else {
                        Some(b)
                    }
                }
                Some(b) if entry.ratio < b.ratio => Some(entry),
                Some(b) => Some(b),
                None => Some(entry),
            };
        }

        // Non-positive ratios only come from a zero (or rounded-negative) RHS
        best.or_else(|| {
            self.entries
                .iter()
                .filter(|e| e.ratio <= 0.0)
                .min_by_key(|&e| rank(e))
        })
        .map(|e| e.row)
    }
}

/// Ratios equal up to `tolerance` relative to their magnitude
fn ratios_tie(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * a.abs().max(b.abs())
}

/// Chooses entering and leaving variables without touching the tableau
#[derive(Debug, Clone, Copy)]
pub struct PivotSelector {
    pub rule: PivotRule,
    pub tolerance: f64,
}

impl PivotSelector {
    pub fn new(rule: PivotRule, tolerance: f64) -> Self {
        Self { rule, tolerance }
    }

    /// Entering column, or `None` when no objective coefficient is negative
    pub fn entering_column(&self, tableau: &Tableau) -> Option<usize> {
        let p = tableau.p();
        match self.rule {
            PivotRule::Dantzig => {
                let mut min_val = -self.tolerance;
                let mut min_col = None;
                for (j, &value) in p.iter().enumerate() {
                    if value < min_val {
                        min_val = value;
                        min_col = Some(j);
                    }
                }
                min_col
            }
            PivotRule::Bland => p.iter().position(|&value| value < -self.tolerance),
        }
    }

    /// Run the ratio test on `column` and pick the leaving row
    pub fn leaving_row(&self, tableau: &Tableau, column: usize) -> Result<(Pivot, RatioTest), SolveError> {
        let test = RatioTest::new(tableau, column, self.tolerance);
        let row = match self.rule {
            PivotRule::Dantzig => test.leaving_row(self.tolerance),
            PivotRule::Bland => {
                let basis = Basis::find(tableau, self.tolerance);
                test.leaving_row_by(self.tolerance, |entry| {
                    basis
                        .entry_for_row(entry.row)
                        .map_or(usize::MAX, |e| e.column)
                })
            }
        };

        match row {
            Some(row) => Ok((Pivot { row, column }, test)),
            None => Err(SolveError::Unbounded {
                column,
                name: tableau.variable_name(column),
            }),
        }
    }

    /// Next pivot, or `None` when the tableau is optimal
    pub fn select(&self, tableau: &Tableau) -> Result<Option<(Pivot, RatioTest)>, SolveError> {
        match self.entering_column(tableau) {
            Some(column) => self.leaving_row(tableau, column).map(Some),
            None => Ok(None),
        }
    }
}

/// Gauss-Jordan elimination around `pivot`, in place.
///
/// The pivot row is divided by the pivot value, then subtracted from every
/// other row, the objective row included, so that the pivot column becomes a
/// unit column with its 1 in the pivot row. The pivot must lie on a
/// constraint row and a variable column.
pub fn apply_pivot(tableau: &mut Tableau, pivot: Pivot) -> Result<(), SolveError> {
    let Pivot { row, column } = pivot;
    if row >= tableau.num_constraints() || column >= tableau.rhs_column() {
        return Err(SolveError::PivotOutOfRange { row, column });
    }
    let pivot_val = tableau.coefficient(row, column);
    if pivot_val == 0.0 || !pivot_val.is_finite() {
        return Err(SolveError::Division { row, column });
    }

    let data = tableau.matrix_mut();

    for value in data[row].iter_mut() {
        *value /= pivot_val;
    }
    let pivot_row = data[row].clone();

    for (i, other) in data.iter_mut().enumerate() {
        if i == row {
            continue;
        }
        let factor = other[column];
        if factor == 0.0 {
            continue;
        }
        for (value, &p) in other.iter_mut().zip(&pivot_row) {
            *value -= factor * p;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn example() -> Tableau {
        Tableau::new(vec![
            vec![2.0, 1.0, 1.0, 0.0, 0.0, 100.0],
            vec![1.0, 1.0, 0.0, 1.0, 0.0, 80.0],
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 40.0],
            vec![-3.0, -2.0, 0.0, 0.0, 0.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_first_pivot_of_example() {
        let tableau = example();
        let selector = PivotSelector::new(PivotRule::Dantzig, TOL);

        let (pivot, test) = selector.select(&tableau).unwrap().unwrap();
        assert_eq!(pivot, Pivot { row: 2, column: 0 });

        let ratios: Vec<f64> = test.entries.iter().map(|e| e.ratio).collect();
        assert_eq!(ratios, vec![50.0, 80.0, 40.0]);
    }

    #[test]
    fn test_selection_does_not_mutate() {
        let tableau = example();
        let before = tableau.clone();
        let selector = PivotSelector::new(PivotRule::Dantzig, TOL);
        selector.select(&tableau).unwrap();
        assert_eq!(tableau, before);
    }

    #[test]
    fn test_entering_tie_picks_lowest_column() {
        let tableau = Tableau::new(vec![
            vec![1.0, 1.0, 1.0, 0.0, 4.0],
            vec![1.0, 3.0, 0.0, 1.0, 6.0],
            vec![-2.0, -2.0, 0.0, 0.0, 0.0],
        ])
        .unwrap();
        let selector = PivotSelector::new(PivotRule::Dantzig, TOL);

        for _ in 0..10 {
            assert_eq!(selector.entering_column(&tableau), Some(0));
        }
    }

    #[test]
    fn test_ratio_tie_picks_first_row() {
        let tableau = Tableau::new(vec![
            vec![1.0, 0.0, 1.0, 0.0, 0.0, 40.0],
            vec![2.0, 1.0, 0.0, 1.0, 0.0, 80.0],
            vec![1.0, 1.0, 0.0, 0.0, 1.0, 90.0],
            vec![-1.0, -3.0, 0.0, 0.0, 0.0, 0.0],
        ])
        .unwrap();
        let selector = PivotSelector::new(PivotRule::Dantzig, TOL);

        let (pivot, _) = selector.leaving_row(&tableau, 0).unwrap();
        assert_eq!(pivot.row, 0);
    }

    #[test]
    fn test_zero_ratio_fallback() {
        let tableau = Tableau::new(vec![
            vec![1.0, 1.0, 1.0, 0.0, 0.0],
            vec![1.0, -1.0, 0.0, 1.0, 5.0],
            vec![-1.0, 0.0, 0.0, 0.0, 0.0],
        ])
        .unwrap();
        let selector = PivotSelector::new(PivotRule::Dantzig, TOL);

        // Only row 1 has a positive ratio
        let (pivot, _) = selector.leaving_row(&tableau, 0).unwrap();
        assert_eq!(pivot.row, 1);

        // Row 0 is the only candidate and its ratio is zero
        let (pivot, test) = selector.leaving_row(&tableau, 1).unwrap();
        assert_eq!(pivot.row, 0);
        assert_eq!(test.entries.len(), 1);
    }

    #[test]
    fn test_unbounded_column() {
        let tableau = Tableau::new(vec![
            vec![1.0, -1.0, 1.0, 0.0, 4.0],
            vec![0.0, -2.0, 0.0, 1.0, 6.0],
            vec![0.0, -1.0, 0.0, 0.0, 0.0],
        ])
        .unwrap();
        let selector = PivotSelector::new(PivotRule::Dantzig, TOL);

        match selector.select(&tableau) {
            Err(SolveError::Unbounded { column, name }) => {
                assert_eq!(column, 1);
                assert_eq!(name, "X2");
            }
            other => panic!("expected unbounded, got {:?}", other),
        }
    }

    #[test]
    fn test_optimal_has_no_entering_column() {
        let tableau = Tableau::new(vec![
            vec![1.0, 1.0, 1.0, 0.0, 4.0],
            vec![0.0, 1.0, 0.0, 1.0, 6.0],
            vec![0.0, 2.0, 1.0, 0.0, 4.0],
        ])
        .unwrap();
        let selector = PivotSelector::new(PivotRule::Dantzig, TOL);
        assert_eq!(selector.select(&tableau).unwrap(), None);
    }

    #[test]
    fn test_bland_picks_first_negative() {
        let tableau = Tableau::new(vec![
            vec![1.0, 1.0, 1.0, 0.0, 4.0],
            vec![1.0, 3.0, 0.0, 1.0, 6.0],
            vec![-1.0, -5.0, 0.0, 0.0, 0.0],
        ])
        .unwrap();

        let dantzig = PivotSelector::new(PivotRule::Dantzig, TOL);
        let bland = PivotSelector::new(PivotRule::Bland, TOL);
        assert_eq!(dantzig.entering_column(&tableau), Some(1));
        assert_eq!(bland.entering_column(&tableau), Some(0));
    }

    #[test]
    fn test_bland_ratio_tie_picks_lowest_basic_variable() {
        // Row 0 is owned by S2 (column 3), row 1 by X2 (column 1)
        let tableau = Tableau::new(vec![
            vec![1.0, 0.0, 0.0, 1.0, 2.0],
            vec![2.0, 1.0, 0.0, 0.0, 4.0],
            vec![-1.0, 0.0, 0.0, 0.0, 0.0],
        ])
        .unwrap();

        let dantzig = PivotSelector::new(PivotRule::Dantzig, TOL);
        let bland = PivotSelector::new(PivotRule::Bland, TOL);
        assert_eq!(dantzig.leaving_row(&tableau, 0).unwrap().0.row, 0);
        assert_eq!(bland.leaving_row(&tableau, 0).unwrap().0.row, 1);
    }

    #[test]
    fn test_pivot_makes_unit_column() {
        let mut tableau = example();
        let pivot = Pivot { row: 2, column: 0 };
        apply_pivot(&mut tableau, pivot).unwrap();

        for (i, value) in tableau.column(0).iter().enumerate() {
            let expected = if i == 2 { 1.0 } else { 0.0 };
            assert!((value - expected).abs() < TOL, "row {} = {}", i, value);
        }
        assert!(tableau.p()[0].abs() < TOL);
        assert!((tableau.objective_value() - 120.0).abs() < TOL);
    }

    #[test]
    fn test_elimination_identity() {
        let original = Tableau::new(vec![
            vec![2.0, 3.0, 1.0, 0.0, 0.0, 12.0],
            vec![4.0, 1.0, 0.0, 1.0, 0.0, 10.0],
            vec![1.5, 2.5, 0.0, 0.0, 1.0, 7.0],
            vec![-1.0, -4.0, 0.0, 0.0, 0.0, 0.0],
        ])
        .unwrap();
        let pivot = Pivot { row: 1, column: 1 };
        let mut tableau = original.clone();
        apply_pivot(&mut tableau, pivot).unwrap();

        let old = original.matrix();
        let new = tableau.matrix();
        let (i, j) = (pivot.row, pivot.column);
        for k in 0..old.len() {
            if k == i {
                continue;
            }
            for c in 0..old[k].len() {
                let expected = old[k][c] - old[k][j] * (old[i][c] / old[i][j]);
                assert!(
                    (new[k][c] - expected).abs() < TOL,
                    "[{}, {}] = {} (expected {})",
                    k,
                    c,
                    new[k][c],
                    expected
                );
            }
        }
    }

    #[test]
    fn test_zero_pivot_is_division_error() {
        let mut tableau = example();
        let before = tableau.clone();
        let result = apply_pivot(&mut tableau, Pivot { row: 2, column: 1 });
        assert_eq!(result, Err(SolveError::Division { row: 2, column: 1 }));
        assert_eq!(tableau, before);
    }

    #[test]
    fn test_tiny_positive_ratio_leaves() {
        // max x1 with x1 <= 1e-10 and x1 <= 5
        let tableau = Tableau::new(vec![
            vec![1.0, 1.0, 0.0, 1e-10],
            vec![1.0, 0.0, 1.0, 5.0],
            vec![-1.0, 0.0, 0.0, 0.0],
        ])
        .unwrap();
        let selector = PivotSelector::new(PivotRule::Dantzig, TOL);

        let (pivot, _) = selector.select(&tableau).unwrap().unwrap();
        assert_eq!(pivot, Pivot { row: 0, column: 0 });
    }

    #[test]
    fn test_ratio_ties_are_relative() {
        let test = RatioTest {
            column: 0,
            entries: vec![
                RatioEntry { row: 0, rhs: 2e-10, coefficient: 1.0, ratio: 2e-10 },
                RatioEntry { row: 1, rhs: 1e-10, coefficient: 1.0, ratio: 1e-10 },
                RatioEntry { row: 2, rhs: 1e-10, coefficient: 1.0, ratio: 1e-10 * (1.0 + 1e-12) },
            ],
        };
        assert_eq!(test.leaving_row(TOL), Some(1));
    }

    #[test]
    fn test_out_of_range_pivot() {
        let mut tableau = example();
        let before = tableau.clone();

        // Row 3 is the objective row, column 5 is RHS
        assert_eq!(
            apply_pivot(&mut tableau, Pivot { row: 3, column: 0 }),
            Err(SolveError::PivotOutOfRange { row: 3, column: 0 })
        );
        assert_eq!(
            apply_pivot(&mut tableau, Pivot { row: 0, column: 5 }),
            Err(SolveError::PivotOutOfRange { row: 0, column: 5 })
        );
        assert_eq!(
            apply_pivot(&mut tableau, Pivot { row: 9, column: 9 }),
            Err(SolveError::PivotOutOfRange { row: 9, column: 9 })
        );
        assert_eq!(tableau, before);
    }
}
