mod basis;
mod pivot;
mod problem;
pub mod report;
mod simplex;
mod solution;
mod tableau;

pub use basis::{Basis, BasisEntry};
pub use pivot::{apply_pivot, Pivot, PivotRule, PivotSelector, RatioEntry, RatioTest};
pub use problem::{Constraint, LpProblem};
pub use simplex::{Solver, SolveError, SolveState, Step, Steps, DEFAULT_TOLERANCE};
pub use solution::{Analysis, ReducedCost, ShadowPrice, Solution, VariableValue};
pub use tableau::{ShapeError, Tableau, VariableKind};
