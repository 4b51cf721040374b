use clap::{Parser, Subcommand, ValueEnum};
use simplexe_lang::{CompiledProgram, Program, Report};
use simplexe_solver::{
    PhaseOneOutcome, SolutionStatus, SolveError, Solver, SolverConfig, Tableau, TieBreak,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "simplexe")]
#[command(version)]
#[command(about = "Solve linear programs with the two-phase simplex method", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, value_enum, global = true, default_value = "normal")]
    verbosity: Verbosity,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a program and print it back in canonical form
    Parse {
        /// The file to parse
        file: PathBuf,
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: Format,
    },
    /// Solve a program and print the optimal solution
    Solve {
        /// The file containing the program
        file: PathBuf,
        /// Leaving-row tie-break rule
        #[arg(short, long, value_enum, default_value = "lowest-index")]
        tie_break: TieBreakArg,
        /// Maximum pivots per phase
        #[arg(long, default_value_t = 10_000)]
        max_iterations: usize,
        /// Tolerance for comparisons against zero
        #[arg(long, default_value_t = 1e-9)]
        tolerance: f64,
        /// Switch to the lexicographic rule after this many consecutive
        /// degenerate pivots
        #[arg(long)]
        stall_limit: Option<usize>,
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: Format,
        /// Print the starting dictionary, and the dictionary after phase one
        #[arg(short, long)]
        dictionary: bool,
        /// Show shadow prices and reduced costs
        #[arg(short, long)]
        analysis: bool,
    },
    /// Check a program for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
    /// Print each constraint as an equality with its slack variable
    Slack {
        /// The file to rewrite
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum Format {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum TieBreakArg {
    LowestIndex,
    Lexicographic,
    Perturbation,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::LowestIndex => TieBreak::LowestIndex,
            TieBreakArg::Lexicographic => TieBreak::Lexicographic,
            TieBreakArg::Perturbation => TieBreak::Perturbation,
        }
    }
}

/// Verbosity level
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, PartialOrd, Ord)]
enum Verbosity {
    /// No log output
    Quiet,
    /// Warnings only
    Normal,
    /// Phase transitions
    Debug,
    /// Every pivot
    Trace,
}

fn init_logging(verbosity: Verbosity) -> Result<(), String> {
    let level = match verbosity {
        Verbosity::Quiet => return Ok(()),
        Verbosity::Normal => Level::WARN,
        Verbosity::Debug => Level::DEBUG,
        Verbosity::Trace => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to set tracing subscriber: {}", e))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbosity) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Runs one command. `Ok(false)` means the command completed but the program
/// has no optimal solution.
fn run(command: Commands) -> Result<bool, String> {
    match command {
        Commands::Parse { file, format } => {
            let program = parse_file(&file)?;
            match format {
                Format::Pretty => print!("{}", program),
                Format::Json => println!("{}", to_json(&program)?),
            }
            Ok(true)
        }
        Commands::Check { file } => {
            let program = parse_file(&file)?;
            match simplexe_lang::compile(&program) {
                Ok(compiled) => {
                    println!("✓ {} is valid", file.display());
                    println!("  {}", program.objective.sense);
                    println!("  {} variables", compiled.problem.num_variables());
                    println!("  {} constraints", compiled.problem.num_constraints());
                    if compiled.dropped_bounds > 0 {
                        println!("  {} implied sign constraints dropped", compiled.dropped_bounds);
                    }
                    Ok(true)
                }
                Err(e) => {
                    eprintln!("✗ {} has errors:", file.display());
                    Err(format!("  {}", e))
                }
            }
        }
        Commands::Slack { file } => {
            let program = parse_file(&file)?;
            for equality in simplexe_lang::introduce_slack(&program) {
                println!("{}", equality);
            }
            Ok(true)
        }
        Commands::Solve {
            file,
            tie_break,
            max_iterations,
            tolerance,
            stall_limit,
            format,
            dictionary,
            analysis,
        } => {
            let program = parse_file(&file)?;
            let compiled = simplexe_lang::compile(&program).map_err(|e| format!("Compile error: {}", e))?;

            let solver = Solver::with_config(SolverConfig {
                tie_break: tie_break.into(),
                max_iterations,
                tolerance,
                stall_limit,
            });

            if dictionary {
                print_dictionaries(&solver, &compiled)?;
            }

            let solution = solver.solve(&compiled.problem).map_err(solver_error)?;

            let report = compiled.report(&solution);
            match format {
                Format::Json => println!("{}", to_json(&report)?),
                Format::Pretty => print_solution(&report, analysis),
            }
            Ok(solution.is_optimal())
        }
    }
}

fn parse_file(file: &Path) -> Result<Program, String> {
    let source = std::fs::read_to_string(file).map_err(|e| format!("Error reading file: {}", e))?;
    simplexe_lang::Parser::parse(&source).map_err(|e| format!("Parse error: {}", e))
}

fn solver_error(e: SolveError) -> String {
    format!("Solver error: {}", e)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Error writing JSON: {}", e))
}

fn print_dictionaries(solver: &Solver, compiled: &CompiledProgram) -> Result<(), String> {
    let problem = &compiled.problem;
    if problem.rhs.iter().all(|&b| b >= 0.0) {
        println!("Initial dictionary:");
        print!("{}", Tableau::new(problem).map_err(solver_error)?.dictionary());
        println!();
        return Ok(());
    }

    println!("Auxiliary dictionary:");
    print!("{}", Tableau::auxiliary(problem).map_err(solver_error)?.dictionary());
    println!();

    match solver.phase_one(problem).map_err(solver_error)? {
        PhaseOneOutcome::Feasible { tableau, iterations, .. } => {
            println!("Feasible dictionary after {} phase one pivots:", iterations);
            print!("{}", tableau.dictionary());
        }
        PhaseOneOutcome::Infeasible { auxiliary_value, .. } => {
            println!("Phase one ends with auxiliary value {}", auxiliary_value);
        }
        PhaseOneOutcome::IterationLimitExceeded { iterations } => {
            println!("Phase one stopped after {} pivots", iterations);
        }
    }
    println!();
    Ok(())
}

fn print_solution(report: &Report, analysis: bool) {
    println!("Status: {}", report.status);

    match report.status {
        SolutionStatus::Optimal => {
            println!("Objective: {}", report.objective_value);
            println!();
            println!("Variables:");
            for variable in &report.variables {
                println!("  {:20} {:12.6}", variable.name, variable.value);
            }
        }
        SolutionStatus::Infeasible => {
            println!("No nonnegative point satisfies all constraints.");
        }
        SolutionStatus::Unbounded => {
            println!("The objective has no finite optimum.");
        }
        SolutionStatus::IterationLimitExceeded => {
            println!("Gave up after {} pivots.", report.stats.total_iterations());
        }
    }

    let stats = &report.stats;
    println!();
    println!(
        "Pivots: {} in phase one, {} in phase two ({} degenerate)",
        stats.phase_one_iterations, stats.phase_two_iterations, stats.degenerate_pivots
    );
    if stats.stall_recovered {
        println!("Switched to the lexicographic rule after a degenerate stall");
    }

    if analysis && report.status == SolutionStatus::Optimal {
        println!();
        println!("Binding constraints:");
        for constraint in report.constraints.iter().filter(|c| c.binding) {
            println!("  - {}", constraint.name);
        }

        println!();
        println!("Shadow prices:");
        for constraint in &report.constraints {
            if constraint.shadow_price.abs() > 1e-9 {
                println!("  {:20} {:12.6}", constraint.name, constraint.shadow_price);
            }
        }

        println!();
        println!("Reduced costs (objective change per unit entering):");
        for variable in &report.variables {
            if !variable.is_basic && variable.reduced_cost.abs() > 1e-9 {
                println!("  {:20} {:12.6}", variable.name, variable.reduced_cost);
            }
        }
    }
}
