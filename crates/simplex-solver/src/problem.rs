use crate::tableau::{ShapeError, Tableau};

/// Linear program in canonical form: maximize `c·x` subject to `A·x <= b`, `x >= 0`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function coefficients, to be maximized
    pub objective: Vec<f64>,
    /// Constraints
    pub constraints: Vec<Constraint>,
}

/// A single `<=` constraint
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Right-hand side value
    pub rhs: f64,
}

impl LpProblem {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: vec![0.0; n],
            constraints: Vec::new(),
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>) {
        self.objective = coefficients;
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraint_names(&self) -> Vec<String> {
        self.constraints.iter().map(|c| c.name.clone()).collect()
    }

    /// Build the initial tableau: one slack column per constraint, the
    /// negated objective in the last row and a zero objective value
    pub fn to_tableau(&self) -> Result<Tableau, ShapeError> {
        let n_vars = self.num_variables();
        let n_constraints = self.num_constraints();

        if self.objective.len() != n_vars {
            return Err(ShapeError::CoefficientCount {
                constraint: "objective".to_string(),
                expected: n_vars,
                found: self.objective.len(),
            });
        }

        let total_cols = n_vars + n_constraints + 1;
        let mut data = vec![vec![0.0; total_cols]; n_constraints + 1];

        for (i, c) in self.constraints.iter().enumerate() {
            if c.coefficients.len() != n_vars {
                return Err(ShapeError::CoefficientCount {
                    constraint: c.name.clone(),
                    expected: n_vars,
                    found: c.coefficients.len(),
                });
            }
            data[i][..n_vars].copy_from_slice(&c.coefficients);
            data[i][n_vars + i] = 1.0;
            data[i][total_cols - 1] = c.rhs;
        }

        for (j, &coef) in self.objective.iter().enumerate() {
            data[n_constraints][j] = -coef;
        }

        Tableau::new(data)
    }
}
