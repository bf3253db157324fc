use crate::basis::{Basis, BasisEntry};
use crate::tableau::Tableau;

/// Final result of an optimal solve
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Solution {
    /// Value of each decision variable, in column order
    pub variables: Vec<VariableValue>,
    /// Value of each slack variable, in column order
    pub slacks: Vec<VariableValue>,
    /// Optimal objective value
    pub objective_value: f64,
    /// Number of pivots performed
    pub iterations: usize,
    /// Basis of the final tableau
    pub basis: Vec<BasisEntry>,
    /// Detailed analysis
    pub analysis: Analysis,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableValue {
    pub name: String,
    pub value: f64,
}

/// Detailed analysis of the optimal tableau
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Shadow prices (dual values) for each constraint with a slack column
    /// Indicates how much the objective would rise per unit of extra RHS
    pub shadow_prices: Vec<ShadowPrice>,

    /// Reduced costs for each decision variable
    /// For non-basic variables, indicates how much the objective coefficient
    /// must rise before the variable enters the solution
    pub reduced_costs: Vec<ReducedCost>,

    /// Which constraints are binding (tight) at optimum
    pub binding_constraints: Vec<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct ShadowPrice {
    /// Constraint name
    pub constraint: String,
    /// Shadow price value
    pub value: f64,
    /// Interpretation
    pub interpretation: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct ReducedCost {
    /// Variable name
    pub variable: String,
    /// Current value in solution
    pub value: f64,
    /// Reduced cost
    pub reduced_cost: f64,
    /// Is this variable in the basis?
    pub is_basic: bool,
}

impl Solution {
    /// Read the basic feasible solution off an optimal tableau.
    ///
    /// Basic variables take the RHS of the row holding their unit entry;
    /// every non-basic variable is zero.
    pub fn from_tableau(tableau: &Tableau, iterations: usize, tolerance: f64) -> Self {
        let basis = Basis::find(tableau, tolerance);
        let value_of = |column: usize| basis.row_of(column).map_or(0.0, |row| tableau.rhs(row));

        let variables: Vec<VariableValue> = (0..tableau.num_decision())
            .map(|j| VariableValue {
                name: tableau.variable_name(j),
                value: value_of(j),
            })
            .collect();

        let slack_start = tableau.num_decision();
        let slacks: Vec<VariableValue> = (slack_start..slack_start + tableau.num_slack())
            .map(|j| VariableValue {
                name: tableau.variable_name(j),
                value: value_of(j),
            })
            .collect();

        let analysis = analyze(tableau, &basis, &variables, &slacks, tolerance);

        Self {
            variables,
            slacks,
            objective_value: tableau.objective_value(),
            iterations,
            basis: basis.entries,
            analysis,
        }
    }

    /// Value of a decision or slack variable by name
    pub fn value(&self, name: &str) -> Option<f64> {
        self.variables
            .iter()
            .chain(&self.slacks)
            .find(|v| v.name == name)
            .map(|v| v.value)
    }

    /// Decision variable values, in column order
    pub fn values(&self) -> Vec<f64> {
        self.variables.iter().map(|v| v.value).collect()
    }

    /// Replace positional names with caller-supplied ones: decision
    /// variables take `variables`, constraints in the analysis take
    /// `constraints`
    pub fn relabel(mut self, variables: &[String], constraints: &[String]) -> Self {
        let variable_renames: Vec<(String, String)> = self
            .variables
            .iter_mut()
            .zip(variables)
            .map(|(v, name)| (std::mem::replace(&mut v.name, name.clone()), name.clone()))
            .collect();
        let constraint_renames: Vec<(String, String)> = self
            .slacks
            .iter()
            .zip(constraints)
            .map(|(s, name)| (s.name.clone(), name.clone()))
            .collect();

        let rename = |renames: &[(String, String)], name: &mut String| {
            if let Some((_, to)) = renames.iter().find(|(from, _)| *from == *name) {
                *name = to.clone();
            }
        };

        for entry in &mut self.basis {
            rename(&variable_renames, &mut entry.name);
        }
        for rc in &mut self.analysis.reduced_costs {
            rename(&variable_renames, &mut rc.variable);
        }
        for sp in &mut self.analysis.shadow_prices {
            rename(&constraint_renames, &mut sp.constraint);
        }
        for name in &mut self.analysis.binding_constraints {
            rename(&constraint_renames, name);
        }
        self
    }
}

fn analyze(
    tableau: &Tableau,
    basis: &Basis,
    values: &[VariableValue],
    slacks: &[VariableValue],
    tolerance: f64,
) -> Analysis {
    let p = tableau.p();

    // Shadow prices: objective row entries under the slack columns
    let slack_start = tableau.num_decision();
    let shadow_prices: Vec<ShadowPrice> = (0..tableau.num_slack())
        .map(|i| {
            let value = p[slack_start + i];
            let interpretation = if value.abs() < tolerance {
                "Zero shadow price: extra RHS leaves the objective unchanged".to_string()
            } else if value > 0.0 {
                format!("Increasing RHS by 1 unit would increase the objective by {:.4}", value)
            } else {
                format!("Increasing RHS by 1 unit would decrease the objective by {:.4}", -value)
            };
            ShadowPrice {
                constraint: tableau.variable_name(slack_start + i),
                value,
                interpretation,
            }
        })
        .collect();

    let reduced_costs = values
        .iter()
        .enumerate()
        .map(|(j, v)| {
            let is_basic = basis.is_basic(j);
            ReducedCost {
                variable: v.name.clone(),
                value: v.value,
                reduced_cost: if is_basic { 0.0 } else { p[j] },
                is_basic,
            }
        })
        .collect();

    // A constraint is tight when its slack is zero, whatever its price
    let binding_constraints = slacks
        .iter()
        .filter(|s| s.value.abs() <= tolerance)
        .map(|s| s.name.clone())
        .collect();

    Analysis {
        shadow_prices,
        reduced_costs,
        binding_constraints,
    }
}
