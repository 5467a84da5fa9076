//! Binary entry point: argument dispatch and logging setup.

use clap::{CommandFactory, Parser};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod command_line;

use command_line::cli::{self, Cli, Commands};

fn main() {
    let args = Cli::parse();

    let level = if args.common.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to set tracing subscriber");
    }

    let outcome = match args.command {
        Some(Commands::File { path, common }) => cli::solve_file(&path, &common).map(|_| ()),
        Some(Commands::Text { input, common }) => cli::solve_text(&input, &common).map(|_| ()),
        Some(Commands::Dir { path, common }) => cli::solve_dir(&path, &common),
        Some(Commands::Experiment {
            variables,
            alpha,
            generator,
            instances,
            dir,
            common,
        }) => cli::run_experiment(variables, alpha, &generator, instances, &dir, &common),
        Some(Commands::Generate {
            variables,
            alpha,
            instances,
            dir,
            common,
        }) => cli::generate_instances(variables, alpha, instances, &dir, &common),
        Some(Commands::Completions { shell }) => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "survey_sat", &mut std::io::stdout());
            Ok(())
        }
        None => match args.path {
            Some(path) if path.is_dir() => cli::solve_dir(&path, &args.common),
            Some(path) => cli::solve_file(&path, &args.common).map(|_| ()),
            None => {
                Cli::command().print_help().ok();
                Ok(())
            }
        },
    };

    if let Err(message) = outcome {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}
