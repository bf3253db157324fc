use crate::tableau::Tableau;

/// A basic variable and the constraint row holding its unit entry
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BasisEntry {
    pub row: usize,
    pub column: usize,
    pub name: String,
}

/// Basis recovered from the unit columns of a tableau.
///
/// Derived on demand from the current values; the solver never stores it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Basis {
    pub entries: Vec<BasisEntry>,
}

impl Basis {
    /// Scan the constraint sub-matrix row by row for entries equal to one
    /// whose column is otherwise zero. Each constraint row keeps the first
    /// such column found in scan order.
    pub fn find(tableau: &Tableau, tolerance: f64) -> Self {
        let m = tableau.num_constraints();
        let mut entries: Vec<BasisEntry> = Vec::with_capacity(m);

        for (i, row) in tableau.constraint_rows().iter().enumerate() {
            for (j, &value) in row[..tableau.rhs_column()].iter().enumerate() {
                if (value - 1.0).abs() > tolerance || !is_unit_column(tableau, i, j, tolerance) {
                    continue;
                }
                entries.push(BasisEntry {
                    row: i,
                    column: j,
                    name: tableau.variable_name(j),
                });
                break;
            }
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Row in which `column` is basic, if it is
    pub fn row_of(&self, column: usize) -> Option<usize> {
        self.entries.iter().find(|e| e.column == column).map(|e| e.row)
    }

    /// Basic variable owning `row`, if any
    pub fn entry_for_row(&self, row: usize) -> Option<&BasisEntry> {
        self.entries.iter().find(|e| e.row == row)
    }

    pub fn is_basic(&self, column: usize) -> bool {
        self.row_of(column).is_some()
    }
}

fn is_unit_column(tableau: &Tableau, row: usize, column: usize, tolerance: f64) -> bool {
    tableau
        .constraint_rows()
        .iter()
        .enumerate()
        .all(|(k, r)| k == row || r[column].abs() <= tolerance)
}
