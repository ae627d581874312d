use clap::{Arg, Command};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use lingo::runner::{self, Mode};

fn main() -> ExitCode {
    init_tracing();

    let matches = Command::new("lingo")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tree-walking interpreter for the Lingo scripting language")
        .arg(
            Arg::new("file")
                .help("The script file to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("tokens")
                .long("tokens")
                .help("Print the token stream instead of running the script")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with("ast"),
        )
        .arg(
            Arg::new("ast")
                .long("ast")
                .help("Print the parsed program instead of running the script")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let mode = if matches.get_flag("tokens") {
        Mode::Tokens
    } else if matches.get_flag("ast") {
        Mode::Ast
    } else {
        Mode::Evaluate
    };

    match matches.get_one::<String>("file") {
        Some(file_path) if !matches.get_flag("interactive") => run_file(file_path, mode),
        _ => {
            lingo::start_repl();
            ExitCode::SUCCESS
        }
    }
}

/// Logs go to stderr, filtered by `LINGO_LOG` (e.g. `LINGO_LOG=lingo=trace`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("LINGO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_file(path: &str, mode: Mode) -> ExitCode {
    let path = Path::new(path);

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let filename = path.display().to_string();
    if runner::run_with_mode(&source, Some(&filename), mode) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
