use log::{debug, trace, warn};
use thiserror::Error;

use crate::basis::Basis;
use crate::pivot::{self, Pivot, PivotRule, PivotSelector, RatioTest};
use crate::problem::LpProblem;
use crate::solution::Solution;
use crate::tableau::{ShapeError, Tableau};

/// Tolerance for sign tests, unit-column detection and ratio ties
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Invalid tableau: {0}")]
    Shape(#[from] ShapeError),
    #[error("Problem is unbounded: {name} can increase without limit")]
    Unbounded { column: usize, name: String },
    #[error("Zero pivot value at row {row}, column {column}")]
    Division { row: usize, column: usize },
    #[error("Pivot at row {row}, column {column} is outside the constraint sub-matrix")]
    PivotOutOfRange { row: usize, column: usize },
    #[error("Iteration limit of {0} reached before optimality")]
    IterationLimit(usize),
}

/// State of the tableau after a step
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveState {
    /// Some objective coefficient is still negative
    Iterating,
    /// No objective coefficient is negative
    Optimal,
}

/// Snapshot of the tableau after one pivot (or the initial state)
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct Step {
    /// 0 for the initial tableau, then one per pivot
    pub index: usize,
    /// Pivot applied to reach this state
    pub pivot: Option<Pivot>,
    /// Ratio test that chose `pivot`
    pub ratio_test: Option<RatioTest>,
    pub tableau: Tableau,
    pub basis: Basis,
    pub state: SolveState,
}

/// Tableau simplex solver
#[derive(Debug, Clone)]
pub struct Solver {
    /// Tolerance for floating point comparisons
    tolerance: f64,
    /// Entering/leaving variable rule
    rule: PivotRule,
    /// Maximum pivots before giving up, unlimited when `None`
    max_iterations: Option<usize>,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            rule: PivotRule::Dantzig,
            max_iterations: None,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_rule(mut self, rule: PivotRule) -> Self {
        self.rule = rule;
        self
    }

    /// Stop with [`SolveError::IterationLimit`] after `max` pivots.
    ///
    /// Without a limit, a degenerate tableau can cycle forever under
    /// [`PivotRule::Dantzig`].
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn rule(&self) -> PivotRule {
        self.rule
    }

    pub fn selector(&self) -> PivotSelector {
        PivotSelector::new(self.rule, self.tolerance)
    }

    /// Lazily step through the solve, starting with the initial tableau
    pub fn steps(&self, tableau: Tableau) -> Steps<'_> {
        Steps {
            solver: self,
            tableau,
            iterations: 0,
            state: StepsState::Initial,
        }
    }

    /// Pivot until optimal
    pub fn solve(&self, tableau: Tableau) -> Result<Solution, SolveError> {
        self.steps(tableau).into_solution()
    }

    /// Build the tableau for `problem`, solve it, and name the results after
    /// the problem's variables and constraints
    pub fn solve_problem(&self, problem: &LpProblem) -> Result<Solution, SolveError> {
        let tableau = problem.to_tableau()?;
        let solution = self.solve(tableau)?;
        Ok(solution.relabel(&problem.variables, &problem.constraint_names()))
    }
}

#[derive(Debug, Clone)]
enum StepsState {
    Initial,
    Running,
    Done,
    Failed(SolveError),
}

/// Iterator over the tableau states of a solve.
///
/// Yields the initial state, then one [`Step`] per pivot. Ends after the
/// optimal state or after yielding an error.
#[derive(Debug)]
pub struct Steps<'a> {
    solver: &'a Solver,
    tableau: Tableau,
    iterations: usize,
    state: StepsState,
}

impl Steps<'_> {
    /// Current tableau
    pub fn tableau(&self) -> &Tableau {
        &self.tableau
    }

    /// Pivots performed so far
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Run the remaining pivots without snapshots and extract the solution
    pub fn into_solution(mut self) -> Result<Solution, SolveError> {
        if let StepsState::Failed(err) = &self.state {
            return Err(err.clone());
        }
        while self.advance()?.is_some() {}

        debug!(
            "optimal after {} iterations, objective {}",
            self.iterations,
            self.tableau.objective_value()
        );
        Ok(Solution::from_tableau(
            &self.tableau,
            self.iterations,
            self.solver.tolerance,
        ))
    }

    /// Select and apply the next pivot; `None` once optimal
    fn advance(&mut self) -> Result<Option<(Pivot, RatioTest)>, SolveError> {
        let Some((pivot, test)) = self.solver.selector().select(&self.tableau)? else {
            return Ok(None);
        };

        if let Some(limit) = self.solver.max_iterations {
            if self.iterations >= limit {
                warn!("stopping after {} iterations without reaching optimality", limit);
                return Err(SolveError::IterationLimit(limit));
            }
        }

        trace!("{}", test);
        pivot::apply_pivot(&mut self.tableau, pivot)?;
        self.iterations += 1;

        debug!(
            "step {}: {} enters at row {}, objective {}",
            self.iterations,
            self.tableau.variable_name(pivot.column),
            pivot.row + 1,
            self.tableau.objective_value()
        );
        Ok(Some((pivot, test)))
    }

    fn snapshot(&mut self, pivot: Option<Pivot>, ratio_test: Option<RatioTest>) -> Step {
        let state = match self.solver.selector().entering_column(&self.tableau) {
            Some(_) => SolveState::Iterating,
            None => {
                self.state = StepsState::Done;
                SolveState::Optimal
            }
        };

        Step {
            index: self.iterations,
            pivot,
            ratio_test,
            basis: Basis::find(&self.tableau, self.solver.tolerance),
            tableau: self.tableau.clone(),
            state,
        }
    }
}

impl Iterator for Steps<'_> {
    type Item = Result<Step, SolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            StepsState::Initial => {
                self.state = StepsState::Running;
                Some(Ok(self.snapshot(None, None)))
            }
            StepsState::Running => match self.advance() {
                Ok(Some((pivot, test))) => Some(Ok(self.snapshot(Some(pivot), Some(test)))),
                Ok(None) => {
                    self.state = StepsState::Done;
                    None
                }
                Err(err) => {
                    self.state = StepsState::Failed(err.clone());
                    Some(Err(err))
                }
            },
            StepsState::Done | StepsState::Failed(_) => None,
        }
    }
}

impl std::iter::FusedIterator for Steps<'_> {}
