#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
//! Defines the command-line interface for the SID solver application.
//!
//! Uses `clap` for parsing arguments. Besides single-instance solving
//! (`file`, `text`, `dir`), the harness runs batch experiments: a sweep over
//! decimation fractions on a set of random 3-SAT instances, stopping at the
//! first fraction that solves every instance.

use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use survey_sat::sid::config::{SidConfig, CNF_INSTANCES, DEFAULT_FRACTION, EXPERIMENT_FRACTIONS};
use survey_sat::sid::dimacs::{parse_dimacs_text, parse_file};
use survey_sat::sid::generate::{instance_file_name, random_ksat};
use survey_sat::sid::graph::FactorGraph;
use survey_sat::sid::random::SolverRng;
use survey_sat::sid::solver::{SidResult, Solver};

/// Command-line interface of the `survey_sat` binary.
#[derive(Parser, Debug)]
#[command(name = "survey_sat", version, about = "A Survey Inspired Decimation SAT solver")]
pub(crate) struct Cli {
    /// An optional path argument. If provided without a subcommand, it's
    /// treated as a DIMACS .cnf file (or a directory of them) to solve.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute.
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula provided as plain text.
    Text {
        /// Literal DIMACS input as a string, header included.
        #[arg(short, long)]
        input: String,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every .cnf file under a directory.
    Dir {
        /// Path to the directory to scan.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Run the fraction-sweep experiment over a batch of random 3-SAT
    /// instance files.
    Experiment {
        /// Number of variables per instance (N).
        #[arg(short = 'n', long)]
        variables: usize,

        /// Clauses-to-variables ratio (alpha).
        #[arg(short, long)]
        alpha: f64,

        /// Instance generator family the files were produced by.
        #[arg(long, default_value = "random")]
        generator: String,

        /// Number of instances per data point.
        #[arg(long, default_value_t = CNF_INSTANCES)]
        instances: u32,

        /// Directory holding the instance files.
        #[arg(long, default_value = "experiments/instances")]
        dir: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate random 3-SAT instance files for the experiment.
    Generate {
        /// Number of variables per instance (N).
        #[arg(short = 'n', long)]
        variables: usize,

        /// Clauses-to-variables ratio (alpha).
        #[arg(short, long)]
        alpha: f64,

        /// Number of instances to write.
        #[arg(long, default_value_t = CNF_INSTANCES)]
        instances: u32,

        /// Directory to write the instance files into.
        #[arg(long, default_value = "experiments/instances")]
        dir: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across subcommands.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct CommonOptions {
    /// Seed for every random choice the solver makes.
    #[arg(long, default_value_t = 1234)]
    pub(crate) seed: u64,

    /// Fraction of the unassigned variables fixed per decimation round.
    #[arg(short, long, default_value_t = DEFAULT_FRACTION)]
    pub(crate) fraction: f64,

    /// Enable debug output, providing more verbose logging during solving.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Re-check any satisfying assignment against the original formula.
    #[arg(short, long, default_value_t = true)]
    pub(crate) verify: bool,

    /// Print problem and solve statistics after each instance.
    #[arg(short, long, default_value_t = true)]
    pub(crate) stats: bool,

    /// Print the satisfying assignment if one is found.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,
}

impl CommonOptions {
    fn config(&self) -> SidConfig {
        SidConfig::with_fraction(self.fraction)
    }
}

/// Solves a single DIMACS file and reports the outcome.
///
/// # Errors
///
/// Returns an error string when the file cannot be parsed.
pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> Result<bool, String> {
    let start = std::time::Instant::now();
    let graph = parse_file(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let parse_time = start.elapsed();

    println!("Solving: {}", path.display());
    Ok(solve_and_report(graph, common, parse_time))
}

/// Solves DIMACS text passed on the command line.
///
/// # Errors
///
/// Returns an error string when the text cannot be parsed.
pub(crate) fn solve_text(input: &str, common: &CommonOptions) -> Result<bool, String> {
    let start = std::time::Instant::now();
    let graph = parse_dimacs_text(input).map_err(|e| e.to_string())?;
    let parse_time = start.elapsed();
    Ok(solve_and_report(graph, common, parse_time))
}

/// Solves every `.cnf` file under `path`.
///
/// # Errors
///
/// Returns an error string when `path` is not a directory or a file fails to
/// parse.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if !path.is_dir() {
        return Err(format!("not a directory: {}", path.display()));
    }

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !file_path.is_file() || file_path.extension().is_none_or(|ext| ext != "cnf") {
            continue;
        }
        solve_file(file_path, common)?;
        println!();
    }
    Ok(())
}

/// Runs the fraction-sweep experiment: for each decimation fraction, solve
/// the whole instance batch, report the SAT percentage and the SP iteration
/// total, and stop as soon as one fraction solves every instance.
///
/// # Errors
///
/// Returns an error string when an instance file is missing or malformed.
pub(crate) fn run_experiment(
    variables: usize,
    alpha: f64,
    generator: &str,
    instances: u32,
    dir: &Path,
    common: &CommonOptions,
) -> Result<(), String> {
    println!("Running experiment: N = {variables}, alpha = {alpha}, generator = {generator}");

    for (experiment_id, &fraction) in EXPERIMENT_FRACTIONS.iter().enumerate() {
        println!();
        println!("------------------------------");
        println!("Experiment {}:", experiment_id + 1);
        println!(" - N: {variables}");
        println!(" - alpha: {alpha}");
        println!(" - f: {fraction}");
        println!("------------------------------");

        let mut sat_instances = 0_u32;
        let mut sat_sp_iterations = 0_u32;
        for index in 1..=instances {
            let path = dir.join(instance_file_name(generator, variables, alpha, index));
            let graph = parse_file(&path).map_err(|e| format!("{}: {e}", path.display()))?;

            println!("Solving file {}", path.display());
            let config = SidConfig {
                fraction,
                ..SidConfig::default()
            };
            let mut solver = Solver::with_config(graph, common.seed, config);
            let result = solver.solve();
            if result.sat {
                sat_instances += 1;
                sat_sp_iterations += result.total_sp_iterations;
                println!("Solved: SAT");
            } else {
                println!("Solved: UNSAT");
            }
            println!("Elapsed time = {:.3}s", result.elapsed().as_secs_f64());
        }

        let percent = f64::from(sat_instances) * 100.0 / f64::from(instances);
        println!();
        println!("Results:");
        println!(" SAT instances: {sat_instances} ({percent}%)");
        println!(" Total SP it. in SAT instances: {sat_sp_iterations}");

        if sat_instances == instances {
            break;
        }
    }
    Ok(())
}

/// Writes `instances` random 3-SAT files into `dir`.
///
/// # Errors
///
/// Returns an error string on invalid parameters or I/O failure.
pub(crate) fn generate_instances(
    variables: usize,
    alpha: f64,
    instances: u32,
    dir: &Path,
    common: &CommonOptions,
) -> Result<(), String> {
    let num_clauses = (variables as f64 * alpha).round() as usize;
    std::fs::create_dir_all(dir).map_err(|e| format!("{}: {e}", dir.display()))?;

    let mut rng = SolverRng::from_seed(common.seed);
    for index in 1..=instances {
        let graph = random_ksat(variables, num_clauses, 3, &mut rng).map_err(|e| e.to_string())?;
        let path = dir.join(instance_file_name("random", variables, alpha, index));
        let mut file =
            std::fs::File::create(&path).map_err(|e| format!("{}: {e}", path.display()))?;
        write!(file, "{graph}").map_err(|e| format!("{}: {e}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Solves a parsed graph, verifies and prints per the common options, and
/// returns whether the instance was satisfiable.
pub(crate) fn solve_and_report(
    graph: FactorGraph,
    common: &CommonOptions,
    parse_time: Duration,
) -> bool {
    let num_variables = graph.num_variables();
    let num_clauses = graph.num_clauses();
    let num_edges = graph.num_edges();

    let mut solver = Solver::with_config(graph, common.seed, common.config());
    let result = solver.solve();
    let graph = solver.into_graph();

    if common.verify && result.sat {
        let verified = graph.is_model();
        println!("Verified: {verified}");
        assert!(verified, "satisfying assignment failed verification");
    }

    if common.stats {
        print_stats(
            parse_time,
            &result,
            num_variables,
            num_clauses,
            num_edges,
        );
    }

    if result.sat && common.print_solution {
        let rendered = graph
            .assignment()
            .iter()
            .enumerate()
            .map(|(v, value)| match value {
                Some(true) => format!("{}", v + 1),
                _ => format!("-{}", v + 1),
            })
            .collect::<Vec<_>>()
            .join(" ");
        println!("Solution: {rendered} 0");
    }

    println!("{}", if result.sat { "SATISFIABLE" } else { "UNSATISFIABLE" });
    result.sat
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Prints a summary of problem and solve statistics.
pub(crate) fn print_stats(
    parse_time: Duration,
    result: &SidResult,
    num_variables: usize,
    num_clauses: usize,
    num_edges: usize,
) {
    println!("\n====================[ Problem Statistics ]====================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", num_variables);
    stat_line("Clauses", num_clauses);
    stat_line("Literals", num_edges);
    println!("=====================[ Solve Statistics ]=====================");
    stat_line("Total SP iterations", result.total_sp_iterations);
    stat_line(
        "Solve time (s)",
        format!("{:.3}", result.elapsed().as_secs_f64()),
    );
    println!("==============================================================");
}
