use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("Tableau is empty")]
    Empty,
    #[error("Tableau needs at least one constraint row above the objective row")]
    NoConstraints,
    #[error("Row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{columns} columns cannot hold {slack} slack and {artificial} artificial variables plus RHS and at least one decision variable")]
    ColumnCount {
        columns: usize,
        slack: usize,
        artificial: usize,
    },
    #[error("Non-finite value at row {row}, column {column}")]
    NonFinite { row: usize, column: usize },
    #[error("Constraint row {row} has a negative right-hand side")]
    NegativeRhs { row: usize },
    #[error("Constraint {constraint} has {found} coefficients, expected {expected}")]
    CoefficientCount {
        constraint: String,
        expected: usize,
        found: usize,
    },
}

/// Category of a tableau column
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// Original decision variable (`X`)
    Decision,
    /// Slack variable of a `<=` constraint (`S`)
    Slack,
    /// Artificial variable (`R`)
    Artificial,
}

impl VariableKind {
    pub fn prefix(self) -> char {
        match self {
            VariableKind::Decision => 'X',
            VariableKind::Slack => 'S',
            VariableKind::Artificial => 'R',
        }
    }
}

/// Simplex tableau in canonical maximization form.
///
/// ```text
///          +-------------------+-----+
///   matrix | X1... S1... R1... | RHS |
/// +--------+-------------------+-----+
/// |  Base  |         A         |  b  |
/// +--------+-------------------+-----+
/// |    P   |        c*X        | obj |
/// +--------+-------------------+-----+
/// ```
///
/// The last row is the objective row `P`, whose trailing entry carries the
/// current objective value. Rows and columns are fixed at construction; only
/// values change as pivots are applied.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    data: Vec<Vec<f64>>,
    n_decision: usize,
    n_slack: usize,
    n_artificial: usize,
}

impl Tableau {
    /// Build a tableau with one slack variable per constraint and no artificials
    pub fn new(matrix: Vec<Vec<f64>>) -> Result<Self, ShapeError> {
        let constraints = matrix.len().saturating_sub(1);
        Self::with_variables(matrix, constraints, 0)
    }

    /// Build a tableau with explicit slack and artificial variable counts.
    ///
    /// Besides the shape checks, every constraint row must have a
    /// non-negative RHS; the first offending row is reported as
    /// [`ShapeError::NegativeRhs`]. The objective row's trailing value is not
    /// checked.
    pub fn with_variables(
        matrix: Vec<Vec<f64>>,
        n_slack: usize,
        n_artificial: usize,
    ) -> Result<Self, ShapeError> {
        let Some(first) = matrix.first() else {
            return Err(ShapeError::Empty);
        };
        if matrix.len() < 2 {
            return Err(ShapeError::NoConstraints);
        }

        let columns = first.len();
        for (row, values) in matrix.iter().enumerate() {
            if values.len() != columns {
                return Err(ShapeError::Ragged {
                    row,
                    expected: columns,
                    found: values.len(),
                });
            }
            if let Some(column) = values.iter().position(|v| !v.is_finite()) {
                return Err(ShapeError::NonFinite { row, column });
            }
        }

        // At least one decision column besides slack, artificial and RHS
        if columns < n_slack + n_artificial + 2 {
            return Err(ShapeError::ColumnCount {
                columns,
                slack: n_slack,
                artificial: n_artificial,
            });
        }

        let rhs_col = columns - 1;
        let constraints = matrix.len() - 1;
        if let Some(row) = (0..constraints).find(|&i| matrix[i][rhs_col] < 0.0) {
            return Err(ShapeError::NegativeRhs { row });
        }

        Ok(Self {
            n_decision: columns - 1 - n_slack - n_artificial,
            data: matrix,
            n_slack,
            n_artificial,
        })
    }

    /// Number of constraint rows (`m`)
    pub fn num_constraints(&self) -> usize {
        self.data.len() - 1
    }

    /// Number of variable columns, excluding RHS
    pub fn num_variables(&self) -> usize {
        self.n_decision + self.n_slack + self.n_artificial
    }

    pub fn num_decision(&self) -> usize {
        self.n_decision
    }

    pub fn num_slack(&self) -> usize {
        self.n_slack
    }

    pub fn num_artificial(&self) -> usize {
        self.n_artificial
    }

    /// Index of the RHS column
    pub fn rhs_column(&self) -> usize {
        self.num_variables()
    }

    /// Constraint coefficient `A[row][column]`
    pub fn coefficient(&self, row: usize, column: usize) -> f64 {
        self.data[row][column]
    }

    /// Constraint row `row` of `A`, without its RHS entry
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row][..self.rhs_column()]
    }

    /// Constraint rows of `[A | b]`
    pub fn constraint_rows(&self) -> &[Vec<f64>] {
        &self.data[..self.num_constraints()]
    }

    /// Constraint column `column` of `A`
    pub fn column(&self, column: usize) -> Vec<f64> {
        self.constraint_rows().iter().map(|r| r[column]).collect()
    }

    /// Constraint sub-matrix `A`
    pub fn a(&self) -> Vec<Vec<f64>> {
        self.constraint_rows()
            .iter()
            .map(|r| r[..self.rhs_column()].to_vec())
            .collect()
    }

    pub fn rhs(&self, row: usize) -> f64 {
        self.data[row][self.rhs_column()]
    }

    /// Right-hand side vector `b`
    pub fn b(&self) -> Vec<f64> {
        (0..self.num_constraints()).map(|i| self.rhs(i)).collect()
    }

    /// Objective row `P` including the trailing objective value
    pub fn objective_row(&self) -> &[f64] {
        &self.data[self.num_constraints()]
    }

    /// Objective coefficients `P`, excluding the running objective value
    pub fn p(&self) -> &[f64] {
        &self.objective_row()[..self.rhs_column()]
    }

    pub fn objective_value(&self) -> f64 {
        self.objective_row()[self.rhs_column()]
    }

    /// Full matrix, constraint rows followed by the objective row
    pub fn matrix(&self) -> &[Vec<f64>] {
        &self.data
    }

    pub(crate) fn matrix_mut(&mut self) -> &mut [Vec<f64>] {
        &mut self.data
    }

    pub fn variable_kind(&self, column: usize) -> VariableKind {
        if column < self.n_decision {
            VariableKind::Decision
        } else if column < self.n_decision + self.n_slack {
            VariableKind::Slack
        } else {
            VariableKind::Artificial
        }
    }

    /// Display name of a variable column: `X{k}`, `S{k}` or `R{k}`, 1-indexed
    /// within each category
    pub fn variable_name(&self, column: usize) -> String {
        let kind = self.variable_kind(column);
        let offset = match kind {
            VariableKind::Decision => 0,
            VariableKind::Slack => self.n_decision,
            VariableKind::Artificial => self.n_decision + self.n_slack,
        };
        format!("{}{}", kind.prefix(), column - offset + 1)
    }

    /// Names of every column, ending with `RHS`
    pub fn column_names(&self) -> Vec<String> {
        (0..self.num_variables())
            .map(|j| self.variable_name(j))
            .chain(std::iter::once("RHS".to_string()))
            .collect()
    }

    /// Column index of a variable name produced by [`Tableau::variable_name`]
    pub fn column_of(&self, name: &str) -> Option<usize> {
        (0..self.num_variables()).find(|&j| self.variable_name(j) == name)
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m, n, s, r: {}, {}, {}, {}",
            self.num_constraints(),
            self.n_decision,
            self.n_slack,
            self.n_artificial
        )
    }
}
