use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use simplex_solver::{LpProblem, PivotRule, Solution, SolveError, Solver, Step, Tableau};
use std::path::{Path, PathBuf};

/// Max 3·X1 + 2·X2 subject to 2·X1 + X2 <= 100, X1 + X2 <= 80, X1 <= 40
const EXAMPLE: [[f64; 6]; 4] = [
    [2.0, 1.0, 1.0, 0.0, 0.0, 100.0],
    [1.0, 1.0, 0.0, 1.0, 0.0, 80.0],
    [1.0, 0.0, 0.0, 0.0, 1.0, 40.0],
    [-3.0, -2.0, 0.0, 0.0, 0.0, 0.0],
];

#[derive(Parser)]
#[command(name = "simplex")]
#[command(about = "Tableau simplex solver for canonical maximization problems", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a tableau or problem stored as JSON
    Solve {
        /// The JSON file to solve
        file: PathBuf,
        #[command(flatten)]
        options: SolveOptions,
    },
    /// Check a JSON file for shape errors
    Check {
        /// The file to check
        file: PathBuf,
    },
    /// Solve the built-in three-constraint example
    Example {
        #[command(flatten)]
        options: SolveOptions,
    },
}

#[derive(clap::Args)]
struct SolveOptions {
    /// Print every tableau state
    #[arg(short, long)]
    trace: bool,
    /// Show detailed analysis
    #[arg(short, long)]
    analysis: bool,
    /// Entering variable rule
    #[arg(long, value_enum, default_value_t = Rule::Dantzig)]
    rule: Rule,
    /// Tolerance for floating point comparisons
    #[arg(long, default_value_t = simplex_solver::DEFAULT_TOLERANCE)]
    tolerance: f64,
    /// Give up after this many pivots
    #[arg(long)]
    max_iterations: Option<usize>,
    /// Output format (json, pretty)
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Rule {
    Dantzig,
    Bland,
}

impl From<Rule> for PivotRule {
    fn from(rule: Rule) -> Self {
        match rule {
            Rule::Dantzig => PivotRule::Dantzig,
            Rule::Bland => PivotRule::Bland,
        }
    }
}

/// Contents of an input file: a raw tableau or a problem description
#[derive(Deserialize)]
#[serde(untagged)]
enum Input {
    Tableau {
        matrix: Vec<Vec<f64>>,
        /// Defaults to one slack per constraint row
        slack: Option<usize>,
        #[serde(default)]
        artificial: usize,
    },
    Problem(LpProblem),
}

/// A tableau plus the names to report results under
struct Loaded {
    tableau: Tableau,
    variables: Vec<String>,
    constraints: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Solve { file, options } => {
            let loaded = load(&file).unwrap_or_else(|e| fail(&e));
            solve(loaded, &options);
        }
        Commands::Check { file } => match load(&file) {
            Ok(loaded) => {
                let tableau = &loaded.tableau;
                println!("✓ {} is valid", file.display());
                println!("  {}", tableau);
                println!("  columns: {}", tableau.column_names().join(" "));
            }
            Err(e) => {
                eprintln!("✗ {} has errors:", file.display());
                eprintln!("  {}", e);
                std::process::exit(1);
            }
        },
        Commands::Example { options } => {
            let matrix = EXAMPLE.iter().map(|row| row.to_vec()).collect();
            let tableau = Tableau::new(matrix).unwrap_or_else(|e| fail(&e.to_string()));
            solve(
                Loaded {
                    tableau,
                    variables: Vec::new(),
                    constraints: Vec::new(),
                },
                &options,
            );
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn load(path: &Path) -> Result<Loaded, String> {
    let source = std::fs::read_to_string(path).map_err(|e| format!("reading {}: {}", path.display(), e))?;
    let input: Input =
        serde_json::from_str(&source).map_err(|e| format!("parsing {}: {}", path.display(), e))?;

    match input {
        Input::Tableau {
            matrix,
            slack,
            artificial,
        } => {
            let slack = slack.unwrap_or_else(|| matrix.len().saturating_sub(1));
            let tableau = Tableau::with_variables(matrix, slack, artificial).map_err(|e| e.to_string())?;
            Ok(Loaded {
                tableau,
                variables: Vec::new(),
                constraints: Vec::new(),
            })
        }
        Input::Problem(problem) => {
            let tableau = problem.to_tableau().map_err(|e| e.to_string())?;
            Ok(Loaded {
                tableau,
                constraints: problem.constraint_names(),
                variables: problem.variables,
            })
        }
    }
}

fn solve(loaded: Loaded, options: &SolveOptions) {
    let mut solver = Solver::new()
        .with_rule(options.rule.into())
        .with_tolerance(options.tolerance);
    if let Some(max) = options.max_iterations {
        solver = solver.with_max_iterations(max);
    }

    let json = options.format == "json";
    if options.trace && !json {
        println!("{}", loaded.tableau);
        println!();
    }

    let mut steps = solver.steps(loaded.tableau);
    let mut trace: Vec<Step> = Vec::new();
    if options.trace {
        for step in steps.by_ref() {
            match step {
                Ok(step) if json => trace.push(step),
                Ok(step) => {
                    println!("{}", step);
                    println!("{}", "-".repeat(50));
                }
                Err(_) => break,
            }
        }
    }

    let result = steps
        .into_solution()
        .map(|s| s.relabel(&loaded.variables, &loaded.constraints));

    if json {
        print_json(&trace, &result);
    } else {
        print_pretty(&result, options.analysis);
    }

    if result.is_err() {
        std::process::exit(1);
    }
}

fn print_json(trace: &[Step], result: &Result<Solution, SolveError>) {
    let output = match result {
        Ok(solution) => serde_json::json!({
            "status": "optimal",
            "steps": trace,
            "solution": solution,
        }),
        Err(e) => serde_json::json!({
            "status": status_name(e),
            "steps": trace,
            "error": e.to_string(),
        }),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&output).unwrap_or_else(|e| format!("Error: {}", e))
    );
}

fn status_name(error: &SolveError) -> &'static str {
    match error {
        SolveError::Shape(_) => "shape_error",
        SolveError::Unbounded { .. } => "unbounded",
        SolveError::Division { .. } => "division_error",
        SolveError::PivotOutOfRange { .. } => "pivot_out_of_range",
        SolveError::IterationLimit(_) => "iteration_limit",
    }
}

fn print_pretty(result: &Result<Solution, SolveError>, analysis: bool) {
    let solution = match result {
        Ok(solution) => solution,
        Err(SolveError::Unbounded { name, .. }) => {
            println!("Status: UNBOUNDED");
            println!("The problem has no finite optimal solution ({} is unlimited).", name);
            return;
        }
        Err(e) => {
            println!("Status: ERROR");
            println!("{}", e);
            return;
        }
    };

    println!("Status: OPTIMAL");
    println!("Objective: {}", simplex_solver::report::format_value(solution.objective_value));
    println!("Iterations: {}", solution.iterations);
    println!();
    println!("Dec. vars:");
    for v in &solution.variables {
        println!("  {:20} {:>12}", v.name, simplex_solver::report::format_value(v.value));
    }

    if analysis {
        println!();
        println!("Analysis:");
        println!();

        if !solution.analysis.binding_constraints.is_empty() {
            println!("Binding constraints:");
            for name in &solution.analysis.binding_constraints {
                println!("  - {}", name);
            }
            println!();
        }

        println!("Shadow prices:");
        for sp in &solution.analysis.shadow_prices {
            println!("  {:30} {:10.4}", sp.constraint, sp.value);
            println!("    {}", sp.interpretation);
        }
        println!();

        println!("Reduced costs (variables not in solution):");
        for rc in &solution.analysis.reduced_costs {
            if !rc.is_basic {
                println!(
                    "  {:20} objective coefficient must rise by {:.4} to enter solution",
                    rc.variable, rc.reduced_cost
                );
            }
        }
    }
}
