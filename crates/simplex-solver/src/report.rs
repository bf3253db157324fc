use std::fmt;

use crate::basis::Basis;
use crate::pivot::RatioTest;
use crate::simplex::Step;
use crate::tableau::Tableau;

/// Format a tableau value with at most six decimals and no trailing zeros
pub fn format_value(value: f64) -> String {
    let rounded = format!("{:.6}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        s => s.to_string(),
    }
}

/// Right-aligned text table: one column per cell, padded to the widest cell
pub fn table(cells: &[Vec<String>]) -> String {
    let width = cells
        .iter()
        .flatten()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0);

    cells
        .iter()
        .map(|row| {
            row.iter()
                .map(|c| format!("{:>width$}", c, width = width))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the tableau with column names on top, the basic variable of each
/// constraint row on the left and `P` on the objective row
pub fn tableau_table(tableau: &Tableau, basis: &Basis) -> String {
    let mut cells = Vec::with_capacity(tableau.num_constraints() + 2);

    let mut header = vec![String::new()];
    header.extend(tableau.column_names());
    cells.push(header);

    for (i, values) in tableau.constraint_rows().iter().enumerate() {
        let label = basis
            .entry_for_row(i)
            .map_or_else(|| "-".to_string(), |e| e.name.clone());
        let mut row = vec![label];
        row.extend(values.iter().map(|&v| format_value(v)));
        cells.push(row);
    }

    let mut objective = vec!["P".to_string()];
    objective.extend(tableau.objective_row().iter().map(|&v| format_value(v)));
    cells.push(objective);

    table(&cells)
}

impl fmt::Display for RatioTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ratio test (j={}):", self.column + 1)?;
        write!(f, "  i  RHS/Aij")?;
        for entry in &self.entries {
            write!(
                f,
                "\n{:>3}  {:>6}/{:<3} = {}",
                entry.row + 1,
                format_value(entry.rhs),
                format_value(entry.coefficient),
                format_value(entry.ratio)
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(test) = &self.ratio_test {
            writeln!(f, "{}", test)?;
        }
        if let Some(pivot) = self.pivot {
            writeln!(f, "pivot: ({}, {})", pivot.row + 1, pivot.column + 1)?;
        }
        writeln!(f, "# step: {}", self.index)?;
        write!(f, "{}", tableau_table(&self.tableau, &self.basis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simplex::Solver;

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
    fn test_format_value() {
        assert_eq!(format_value(100.0), "100");
        assert_eq!(format_value(-2.5), "-2.5");
        assert_eq!(format_value(1.0 / 3.0), "0.333333");
        assert_eq!(format_value(-0.0), "0");
        assert_eq!(format_value(-1e-12), "0");
    }

    #[test]
    fn test_initial_table() {
        let tableau = example();
        let basis = Basis::find(&tableau, 1e-9);
        let expected = [
            "     X1  X2  S1  S2  S3 RHS",
            " S1   2   1   1   0   0 100",
            " S2   1   1   0   1   0  80",
            " S3   1   0   0   0   1  40",
            "  P  -3  -2   0   0   0   0",
        ]
        .join("\n");
        assert_eq!(tableau_table(&tableau, &basis), expected);
    }

    #[test]
    fn test_ratio_test_display() {
        let solver = Solver::new();
        let (_, test) = solver.selector().select(&example()).unwrap().unwrap();
        let expected = [
            "Ratio test (j=1):",
            "  i  RHS/Aij",
            "  1     100/2   = 50",
            "  2      80/1   = 80",
            "  3      40/1   = 40",
        ]
        .join("\n");
        assert_eq!(test.to_string(), expected);
    }

    #[test]
    fn test_step_display() {
        let solver = Solver::new();
        let step = solver.steps(example()).nth(1).unwrap().unwrap();
        let rendered = step.to_string();

        assert!(rendered.contains("pivot: (3, 1)"), "{}", rendered);
        assert!(rendered.contains("# step: 1"), "{}", rendered);
        assert!(rendered.ends_with("  P   0  -2   0   0   3 120"), "{}", rendered);
    }
}
